use serde::{Deserialize, Serialize};

/// Recommendation list returned for a single user
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationResult {
    pub user_id: String,
    pub movies: Vec<String>,
    pub total_count: usize,
    pub message: String,
}

/// Request to store a user's recommendation list
#[derive(Debug, Deserialize)]
pub struct SetRecommendationRequest {
    pub user_id: String,
    pub movies: Vec<String>,
    #[serde(default)]
    pub expire_seconds: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct SetRecommendationResponse {
    pub message: String,
    pub user_id: String,
    pub movie_count: usize,
    pub expire_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct DeleteRecommendationResponse {
    pub message: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub message: String,
    pub users: Vec<String>,
    pub total_count: usize,
}

/// Request body of the content-service compatibility endpoint
#[derive(Debug, Deserialize)]
pub struct BulkIdsRequest {
    pub user_id: String,
}

/// Response shape expected by the content catalog service
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkIdsResponse {
    pub content_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
    pub redis: &'static str,
    pub message: String,
}

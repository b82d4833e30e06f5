pub mod record;
pub mod recommendation;

pub use record::{decode_movies, RecommendationRecord};
pub use recommendation::{
    BulkIdsRequest, BulkIdsResponse, DeleteRecommendationResponse, HealthResponse,
    RecommendationResult, SetRecommendationRequest, SetRecommendationResponse, UserListResponse,
};

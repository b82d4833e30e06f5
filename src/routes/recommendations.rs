use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::{
    error::{AppError, AppResult},
    middleware::{AuthenticatedUser, RequestId},
    models::{
        BulkIdsRequest, BulkIdsResponse, DeleteRecommendationResponse, RecommendationResult,
        SetRecommendationRequest, SetRecommendationResponse, UserListResponse,
    },
    routes::AppState,
    services::{DEFAULT_TTL_SECS, MAX_TTL_SECS},
};

/// Path segments taken by static routes next to `/recommended/:user_id`
const RESERVED_USER_IDS: [&str; 3] = ["health", "users", "bulk-ids"];

fn require_user_id(user_id: &str) -> AppResult<()> {
    if user_id.trim().is_empty() {
        return Err(AppError::InvalidInput("user_id must not be empty".to_string()));
    }
    Ok(())
}

/// A stored id must stay addressable through `/recommended/:user_id`
fn require_addressable_user_id(user_id: &str) -> AppResult<()> {
    require_user_id(user_id)?;
    if RESERVED_USER_IDS.contains(&user_id) {
        return Err(AppError::InvalidInput(format!(
            "user_id '{}' is reserved",
            user_id
        )));
    }
    Ok(())
}

fn require_valid_ttl(expire_seconds: Option<u64>) -> AppResult<u64> {
    match expire_seconds {
        Some(0) => Err(AppError::InvalidInput(
            "expire_seconds must be greater than zero".to_string(),
        )),
        Some(secs) if secs > MAX_TTL_SECS => Err(AppError::InvalidInput(format!(
            "expire_seconds must not exceed {}",
            MAX_TTL_SECS
        ))),
        Some(secs) => Ok(secs),
        None => Ok(DEFAULT_TTL_SECS),
    }
}

/// Handler for fetching a user's recommendations
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
) -> Json<RecommendationResult> {
    tracing::info!(request_id = %request_id, user_id = %user_id, "Fetching recommendations");

    let result = state.recommendations.get_for_user(&user_id).await;
    Json(result)
}

/// Handler for fetching the caller's own recommendations via bearer token
pub async fn get_my_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    user: AuthenticatedUser,
) -> Json<RecommendationResult> {
    tracing::info!(
        request_id = %request_id,
        user_id = %user.user_id,
        username = ?user.username,
        "Fetching recommendations for authenticated user"
    );

    let result = state.recommendations.get_for_user(&user.user_id).await;

    tracing::info!(
        request_id = %request_id,
        total_count = result.total_count,
        "Recommendations served"
    );

    Json(result)
}

/// Handler for storing a user's recommendations
pub async fn set_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SetRecommendationRequest>,
) -> AppResult<Json<SetRecommendationResponse>> {
    require_addressable_user_id(&request.user_id)?;
    let expire_seconds = require_valid_ttl(request.expire_seconds)?;

    tracing::info!(
        request_id = %request_id,
        user_id = %request.user_id,
        movie_count = request.movies.len(),
        expire_seconds,
        "Storing recommendations"
    );

    let stored = state
        .recommendations
        .set_for_user(&request.user_id, &request.movies, Some(expire_seconds))
        .await;

    if !stored {
        return Err(AppError::Internal(
            "Failed to store recommendations".to_string(),
        ));
    }

    Ok(Json(SetRecommendationResponse {
        message: "Recommendations stored successfully".to_string(),
        movie_count: request.movies.len(),
        user_id: request.user_id,
        expire_seconds,
    }))
}

/// Handler for the content-service compatible bulk id lookup
pub async fn bulk_ids(
    State(state): State<AppState>,
    Json(request): Json<BulkIdsRequest>,
) -> AppResult<Json<BulkIdsResponse>> {
    require_user_id(&request.user_id)?;

    let result = state.recommendations.get_for_user(&request.user_id).await;
    Ok(Json(BulkIdsResponse {
        content_ids: result.movies,
    }))
}

/// Handler for deleting a user's recommendations
pub async fn delete_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
) -> AppResult<Json<DeleteRecommendationResponse>> {
    tracing::info!(request_id = %request_id, user_id = %user_id, "Deleting recommendations");

    if !state.recommendations.delete_for_user(&user_id).await? {
        return Err(AppError::NotFound(format!(
            "No recommendations found for user {}",
            user_id
        )));
    }

    Ok(Json(DeleteRecommendationResponse {
        message: "Recommendations deleted successfully".to_string(),
        user_id,
    }))
}

/// Handler for listing users that have stored recommendations
pub async fn list_users(State(state): State<AppState>) -> Json<UserListResponse> {
    let users = state.recommendations.list_users_with_recommendations().await;

    Json(UserListResponse {
        message: "Users with recommendations retrieved successfully".to_string(),
        total_count: users.len(),
        users,
    })
}

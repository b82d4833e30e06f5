use axum::{extract::State, http::StatusCode, Json};

use crate::{models::HealthResponse, routes::AppState};

/// Health check endpoint
///
/// Answers 503 when the recommendation store cannot be reached.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    if state.recommendations.health().await {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                service: state.service_name.clone(),
                redis: "connected",
                message: "Service is running normally".to_string(),
            }),
        )
    } else {
        tracing::warn!(service = %state.service_name, "Health check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                service: state.service_name.clone(),
                redis: "disconnected",
                message: "Service is currently unavailable".to_string(),
            }),
        )
    }
}

use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

pub mod health;
pub mod recommendations;
pub mod state;

pub use state::{AppState, RoutePaths};

/// Creates the application router with all routes
///
/// Bearer-token routes are mounted only when the state carries a verifier.
pub fn create_router(state: AppState) -> Router {
    let paths = state.paths.clone();

    let mut router = Router::new().route("/", get(service_info));
    router = mount(router, &paths.base, recommendation_routes());
    if state.token_verifier.is_some() {
        router = mount(router, &paths.auth_base, authenticated_routes());
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Recommendation routes under the configured base path
fn recommendation_routes() -> Router<AppState> {
    Router::new()
        .route("/recommended", post(recommendations::set_recommendations))
        .route("/recommended/health", get(health::health_check))
        .route("/recommended/users", get(recommendations::list_users))
        .route("/recommended/bulk-ids", post(recommendations::bulk_ids))
        .route(
            "/recommended/:user_id",
            get(recommendations::get_recommendations)
                .delete(recommendations::delete_recommendations),
        )
}

/// Routes resolving the user from a bearer token
fn authenticated_routes() -> Router<AppState> {
    Router::new().route("/movies", get(recommendations::get_my_recommendations))
}

fn mount(router: Router<AppState>, prefix: &str, routes: Router<AppState>) -> Router<AppState> {
    if prefix.is_empty() {
        router.merge(routes)
    } else {
        router.nest(prefix, routes)
    }
}

/// Service description endpoint
async fn service_info(State(state): State<AppState>) -> Json<Value> {
    let base = &state.paths.base;
    let mut endpoints = json!({
        "health": format!("{}/recommended/health", base),
        "get_recommendations": format!("{}/recommended/{{user_id}}", base),
        "set_recommendations": format!("{}/recommended", base),
        "delete_recommendations": format!("{}/recommended/{{user_id}}", base),
        "list_users": format!("{}/recommended/users", base),
        "bulk_ids": format!("{}/recommended/bulk-ids", base),
    });
    if state.token_verifier.is_some() {
        endpoints["my_recommendations"] = json!(format!("{}/movies", state.paths.auth_base));
    }

    Json(json!({
        "service": state.service_name,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "description": "Per-user movie recommendation lists",
        "endpoints": endpoints,
    }))
}

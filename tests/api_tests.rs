use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use recommendation_cache::{
    create_router,
    db::{KeyValueBackend, MemoryBackend, RecommendationStore},
    error::{StoreError, StoreResult},
    middleware::TokenVerifier,
    services::{default_recommendations, RecommendationService, MAX_TTL_SECS},
    AppState, RoutePaths,
};

const JWT_SECRET: &str = "integration-secret";

/// Backend whose every call times out, standing in for an unreachable Redis
struct UnreachableBackend;

fn timed_out(op: &'static str) -> StoreError {
    StoreError::Timeout {
        op,
        after: Duration::from_secs(5),
    }
}

#[async_trait]
impl KeyValueBackend for UnreachableBackend {
    async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(timed_out("GET"))
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl_secs: u64) -> StoreResult<bool> {
        Err(timed_out("SETEX"))
    }

    async fn del(&self, _key: &str) -> StoreResult<bool> {
        Err(timed_out("DEL"))
    }

    async fn scan_match(&self, _pattern: &str) -> StoreResult<Vec<String>> {
        Err(timed_out("SCAN"))
    }

    async fn ping(&self) -> StoreResult<()> {
        Err(timed_out("PING"))
    }

    fn name(&self) -> &'static str {
        "unreachable"
    }
}

// == Helper Functions ==

fn state_with(backend: Arc<dyn KeyValueBackend>) -> AppState {
    let service = RecommendationService::new(RecommendationStore::new(backend));
    AppState::new(Arc::new(service), "test-service")
}

fn create_test_app() -> Router {
    create_router(state_with(Arc::new(MemoryBackend::new())))
}

fn create_authenticated_app() -> Router {
    let verifier = TokenVerifier::new(JWT_SECRET, "HS256").unwrap();
    create_router(state_with(Arc::new(MemoryBackend::new())).with_token_verifier(Arc::new(verifier)))
}

fn create_unreachable_app() -> Router {
    create_router(state_with(Arc::new(UnreachableBackend)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn bearer_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn token_for(sub: &str, expires_in: i64, secret: &str) -> String {
    let claims = json!({
        "sub": sub,
        "username": "tester",
        "exp": chrono::Utc::now().timestamp() + expires_in,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn default_ids() -> Value {
    json!(default_recommendations())
}

// == Health ==

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();

    let (status, body) = send(&app, get("/api/contents/recommended/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "test-service");
    assert_eq!(body["redis"], "connected");
}

#[tokio::test]
async fn test_health_check_unavailable() {
    let app = create_unreachable_app();

    let (status, body) = send(&app, get("/api/contents/recommended/health")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["redis"], "disconnected");
}

#[tokio::test]
async fn test_service_info() {
    let app = create_test_app();

    let (status, body) = send(&app, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["endpoints"]["health"], "/api/contents/recommended/health");
    assert!(body["endpoints"].get("my_recommendations").is_none());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = create_test_app();

    let request = Request::builder()
        .uri("/api/contents/recommended/health")
        .header("x-request-id", "gateway-abc")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "gateway-abc"
    );
}

// == Get / Set ==

#[tokio::test]
async fn test_unknown_user_gets_default_list() {
    let app = create_test_app();

    let (status, body) = send(&app, get("/api/contents/recommended/unknown")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "unknown");
    assert_eq!(body["movies"], default_ids());
    assert_eq!(body["total_count"], 10);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_set_then_get() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        post_json(
            "/api/contents/recommended",
            json!({ "user_id": "u1", "movies": ["m1", "m2"], "expire_seconds": 60 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "u1");
    assert_eq!(body["movie_count"], 2);
    assert_eq!(body["expire_seconds"], 60);

    let (status, body) = send(&app, get("/api/contents/recommended/u1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "user_id": "u1",
            "movies": ["m1", "m2"],
            "total_count": 2,
            "message": body["message"].clone(),
        })
    );
}

#[tokio::test]
async fn test_set_defaults_expire_seconds() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        post_json(
            "/api/contents/recommended",
            json!({ "user_id": "u1", "movies": ["m1"] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expire_seconds"], 3600);
}

#[tokio::test]
async fn test_set_empty_list_is_stored() {
    let app = create_test_app();

    send(
        &app,
        post_json(
            "/api/contents/recommended",
            json!({ "user_id": "u1", "movies": [] }),
        ),
    )
    .await;

    let (_, body) = send(&app, get("/api/contents/recommended/u1")).await;
    assert_eq!(body["movies"], json!([]));
    assert_eq!(body["total_count"], 0);
}

#[tokio::test]
async fn test_set_rejects_invalid_input() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        post_json(
            "/api/contents/recommended",
            json!({ "user_id": "", "movies": ["m1"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        post_json(
            "/api/contents/recommended",
            json!({ "user_id": "u1", "movies": ["m1"], "expire_seconds": 0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_set_rejects_out_of_range_expiry() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        post_json(
            "/api/contents/recommended",
            json!({ "user_id": "u1", "movies": ["m1"], "expire_seconds": u64::MAX }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        post_json(
            "/api/contents/recommended",
            json!({ "user_id": "u1", "movies": ["m1"], "expire_seconds": MAX_TTL_SECS + 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        post_json(
            "/api/contents/recommended",
            json!({ "user_id": "u1", "movies": ["m1"], "expire_seconds": MAX_TTL_SECS }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expire_seconds"], MAX_TTL_SECS);
}

#[tokio::test]
async fn test_set_rejects_user_ids_shadowed_by_routes() {
    let app = create_test_app();

    for user_id in ["users", "health", "bulk-ids"] {
        let (status, _) = send(
            &app,
            post_json(
                "/api/contents/recommended",
                json!({ "user_id": user_id, "movies": ["m1"] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "user_id {}", user_id);
    }

    let (_, body) = send(&app, get("/api/contents/recommended/users")).await;
    assert_eq!(body["users"], json!([]));
}

#[tokio::test]
async fn test_set_fails_when_store_is_unreachable() {
    let app = create_unreachable_app();

    let (status, body) = send(
        &app,
        post_json(
            "/api/contents/recommended",
            json!({ "user_id": "u1", "movies": ["m1"] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_get_falls_back_when_store_is_unreachable() {
    let app = create_unreachable_app();

    let (status, body) = send(&app, get("/api/contents/recommended/u1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movies"], default_ids());
}

// == Bulk ids ==

#[tokio::test]
async fn test_bulk_ids_returns_content_ids() {
    let app = create_test_app();

    send(
        &app,
        post_json(
            "/api/contents/recommended",
            json!({ "user_id": "u1", "movies": ["c1", "c2", "c3"] }),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        post_json("/api/contents/recommended/bulk-ids", json!({ "user_id": "u1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "contentIds": ["c1", "c2", "c3"] }));
}

#[tokio::test]
async fn test_bulk_ids_falls_back_to_default() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        post_json("/api/contents/recommended/bulk-ids", json!({ "user_id": "new" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contentIds"], default_ids());
}

// == Delete ==

#[tokio::test]
async fn test_delete_found_then_not_found() {
    let app = create_test_app();

    send(
        &app,
        post_json(
            "/api/contents/recommended",
            json!({ "user_id": "u1", "movies": ["m1"] }),
        ),
    )
    .await;

    let (status, body) = send(&app, delete("/api/contents/recommended/u1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "u1");

    let (status, body) = send(&app, delete("/api/contents/recommended/u1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (_, body) = send(&app, get("/api/contents/recommended/u1")).await;
    assert_eq!(body["movies"], default_ids());
}

#[tokio::test]
async fn test_delete_fails_when_store_is_unreachable() {
    let app = create_unreachable_app();

    let (status, _) = send(&app, delete("/api/contents/recommended/u1")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// == Users ==

#[tokio::test]
async fn test_list_users() {
    let app = create_test_app();

    for user in ["u1", "u2"] {
        send(
            &app,
            post_json(
                "/api/contents/recommended",
                json!({ "user_id": user, "movies": ["m1"] }),
            ),
        )
        .await;
    }

    let (status, body) = send(&app, get("/api/contents/recommended/users")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 2);
    let mut users: Vec<String> = serde_json::from_value(body["users"].clone()).unwrap();
    users.sort();
    assert_eq!(users, vec!["u1", "u2"]);
}

#[tokio::test]
async fn test_list_users_empty_when_store_is_unreachable() {
    let app = create_unreachable_app();

    let (status, body) = send(&app, get("/api/contents/recommended/users")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"], json!([]));
    assert_eq!(body["total_count"], 0);
}

// == Base path ==

#[tokio::test]
async fn test_custom_base_path() {
    let state = state_with(Arc::new(MemoryBackend::new()))
        .with_paths(RoutePaths::new("/v2/", "/auth"));
    let app = create_router(state);

    let (status, _) = send(&app, get("/v2/recommended/health")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get("/api/contents/recommended/health")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == Bearer token ==

#[tokio::test]
async fn test_authenticated_route_disabled_without_verifier() {
    let app = create_test_app();

    let (status, _) = send(&app, get("/api/recommendations/movies")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_authenticated_route_uses_token_subject() {
    let app = create_authenticated_app();

    send(
        &app,
        post_json(
            "/api/contents/recommended",
            json!({ "user_id": "member-7", "movies": ["m7"] }),
        ),
    )
    .await;

    let token = token_for("member-7", 3600, JWT_SECRET);
    let (status, body) = send(&app, bearer_get("/api/recommendations/movies", &token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "member-7");
    assert_eq!(body["movies"], json!(["m7"]));
}

#[tokio::test]
async fn test_authenticated_route_rejects_missing_token() {
    let app = create_authenticated_app();

    let (status, body) = send(&app, get("/api/recommendations/movies")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_authenticated_route_rejects_bad_tokens() {
    let app = create_authenticated_app();

    let forged = token_for("member-7", 3600, "wrong-secret");
    let (status, _) = send(&app, bearer_get("/api/recommendations/movies", &forged)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = token_for("member-7", -3600, JWT_SECRET);
    let (status, _) = send(&app, bearer_get("/api/recommendations/movies", &expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/recommendations/movies")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

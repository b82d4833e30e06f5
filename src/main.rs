use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recommendation_cache::{
    db::{RecommendationStore, RedisBackend},
    middleware::TokenVerifier,
    services::RecommendationService,
    create_router, AppState, Config, RoutePaths,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recommendation_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // The service must not start serving without its store
    let backend = RedisBackend::connect(
        &config.redis_url,
        config.redis_connect_timeout(),
        config.redis_timeout(),
    )
    .await
    .context("Failed to connect to Redis")?;

    let store = RecommendationStore::new(Arc::new(backend));
    let service = Arc::new(RecommendationService::new(store));

    let mut state = AppState::new(service, config.service_name.clone())
        .with_paths(RoutePaths::from(&config));

    match config.jwt_secret_key.as_deref() {
        Some(secret) => {
            let verifier = TokenVerifier::new(secret, &config.jwt_algorithm)?;
            state = state.with_token_verifier(Arc::new(verifier));
            tracing::info!(path = %state.paths.auth_base, "Bearer-token routes enabled");
        }
        None => tracing::info!("JWT_SECRET_KEY not set, bearer-token routes disabled"),
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    tracing::info!(address = %config.bind_address(), service = %config.service_name, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

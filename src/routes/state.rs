use std::sync::Arc;

use crate::config::Config;
use crate::middleware::TokenVerifier;
use crate::services::RecommendationService;

/// URL prefixes the routers are mounted under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePaths {
    pub base: String,
    pub auth_base: String,
}

impl RoutePaths {
    pub fn new(base: &str, auth_base: &str) -> Self {
        Self {
            base: normalize_prefix(base),
            auth_base: normalize_prefix(auth_base),
        }
    }
}

impl Default for RoutePaths {
    fn default() -> Self {
        Self::new("/api/contents", "/api/recommendations")
    }
}

impl From<&Config> for RoutePaths {
    fn from(config: &Config) -> Self {
        Self::new(&config.base_path, &config.auth_base_path)
    }
}

/// Forces a leading slash and strips trailing ones; the root becomes ""
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub recommendations: Arc<RecommendationService>,
    /// Present only when bearer-token routes are enabled
    pub token_verifier: Option<Arc<TokenVerifier>>,
    pub service_name: String,
    pub paths: RoutePaths,
}

impl AppState {
    pub fn new(recommendations: Arc<RecommendationService>, service_name: impl Into<String>) -> Self {
        Self {
            recommendations,
            token_verifier: None,
            service_name: service_name.into(),
            paths: RoutePaths::default(),
        }
    }

    pub fn with_token_verifier(mut self, verifier: Arc<TokenVerifier>) -> Self {
        self.token_verifier = Some(verifier);
        self
    }

    pub fn with_paths(mut self, paths: RoutePaths) -> Self {
        self.paths = paths;
        self
    }
}

use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Redis connection URL, including password and database index if needed
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Upper bound for a single Redis command, in seconds
    #[serde(default = "default_redis_timeout_secs")]
    pub redis_timeout_secs: u64,

    /// Upper bound for establishing the Redis connection, in seconds
    #[serde(default = "default_redis_timeout_secs")]
    pub redis_connect_timeout_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Prefix for the public recommendation routes
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Prefix for the bearer-token protected routes
    #[serde(default = "default_auth_base_path")]
    pub auth_base_path: String,

    /// Name reported by the health and root endpoints
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Shared secret for verifying bearer tokens. Protected routes are
    /// disabled when unset.
    #[serde(default)]
    pub jwt_secret_key: Option<String>,

    /// HMAC algorithm the tokens are signed with
    #[serde(default = "default_jwt_algorithm")]
    pub jwt_algorithm: String,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_timeout_secs() -> u64 {
    5
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_base_path() -> String {
    "/api/contents".to_string()
}

fn default_auth_base_path() -> String {
    "/api/recommendations".to_string()
}

fn default_service_name() -> String {
    "movie-recommendation-service".to_string()
}

fn default_jwt_algorithm() -> String {
    "HS256".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn redis_timeout(&self) -> Duration {
        Duration::from_secs(self.redis_timeout_secs)
    }

    pub fn redis_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.redis_connect_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

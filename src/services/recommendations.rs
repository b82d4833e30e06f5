use crate::{
    db::RecommendationStore,
    error::AppResult,
    models::RecommendationResult,
};

/// TTL applied when a writer does not supply one (1 hour)
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Longest accepted TTL (about 68 years), inside the range SETEX accepts
pub const MAX_TTL_SECS: u64 = i32::MAX as u64;

/// Fallback content ids served to users without a stored list
pub const DEFAULT_RECOMMENDATIONS: [&str; 10] = [
    "6837be17aec8b2058fac893a",
    "6837be17aec8b2058fac893b",
    "6837be17aec8b2058fac893c",
    "6837be17aec8b2058fac893d",
    "6837be17aec8b2058fac893e",
    "6837be17aec8b2058fac893f",
    "6837be17aec8b2058fac8940",
    "6837be17aec8b2058fac8941",
    "6837be17aec8b2058fac8942",
    "6837be17aec8b2058fac8943",
];

const STORED_MESSAGE: &str = "Recommendations retrieved successfully";
const DEFAULT_MESSAGE: &str = "No stored recommendations, returning default list";

/// Business-facing access to per-user recommendation lists
///
/// Applies the default-list fallback on reads and turns backend faults into
/// the degraded result each operation documents. Holds no state of its own;
/// a single instance is shared by all request handlers.
#[derive(Debug, Clone)]
pub struct RecommendationService {
    store: RecommendationStore,
}

impl RecommendationService {
    pub fn new(store: RecommendationStore) -> Self {
        Self { store }
    }

    /// Returns the user's stored list, or the default list when none exists
    ///
    /// Never fails: an unreachable backend is logged and served the default
    /// list like any other miss.
    pub async fn get_for_user(&self, user_id: &str) -> RecommendationResult {
        let stored = match self.store.get(user_id).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to read recommendations");
                None
            }
        };

        let (movies, message) = match stored {
            Some(movies) => (movies, STORED_MESSAGE),
            None => {
                tracing::info!(user_id = %user_id, "Serving default recommendations");
                (default_recommendations(), DEFAULT_MESSAGE)
            }
        };

        RecommendationResult {
            user_id: user_id.to_string(),
            total_count: movies.len(),
            movies,
            message: message.to_string(),
        }
    }

    /// Stores `movies` for the user, replacing any previous list
    ///
    /// `ttl_secs` defaults to [`DEFAULT_TTL_SECS`]. Returns `false` when the
    /// write could not be confirmed.
    pub async fn set_for_user(&self, user_id: &str, movies: &[String], ttl_secs: Option<u64>) -> bool {
        let ttl_secs = ttl_secs.unwrap_or(DEFAULT_TTL_SECS);

        match self.store.set(user_id, movies, ttl_secs).await {
            Ok(true) => {
                tracing::info!(
                    user_id = %user_id,
                    movie_count = movies.len(),
                    ttl_secs,
                    "Recommendations stored"
                );
                true
            }
            Ok(false) => {
                tracing::warn!(user_id = %user_id, "Backend did not acknowledge recommendation write");
                false
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to store recommendations");
                false
            }
        }
    }

    /// Deletes the user's list, returning whether one existed
    ///
    /// Backend faults are returned so the caller can tell "not found" apart
    /// from "could not confirm".
    pub async fn delete_for_user(&self, user_id: &str) -> AppResult<bool> {
        let removed = self.store.delete(user_id).await.map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to delete recommendations");
            e
        })?;

        if removed {
            tracing::info!(user_id = %user_id, "Recommendations deleted");
        } else {
            tracing::info!(user_id = %user_id, "No recommendations to delete");
        }

        Ok(removed)
    }

    /// Lists users that currently have a stored list; empty if the scan fails
    pub async fn list_users_with_recommendations(&self) -> Vec<String> {
        match self.store.list_users().await {
            Ok(users) => users,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list users with recommendations");
                Vec::new()
            }
        }
    }

    /// Reports whether the backing store is reachable
    pub async fn health(&self) -> bool {
        self.store.health().await
    }
}

/// The static fallback list, in its fixed order
pub fn default_recommendations() -> Vec<String> {
    DEFAULT_RECOMMENDATIONS.iter().map(|id| id.to_string()).collect()
}

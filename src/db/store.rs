use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::instrument;

use super::{KeyValueBackend, RecommendationKey};
use crate::error::StoreResult;
use crate::models::{decode_movies, RecommendationRecord};

/// Persistence for per-user recommendation lists.
///
/// Owns key naming, the stored JSON shape and TTL handling. Malformed records
/// are logged and reported as absent; backend faults are returned to the
/// caller as [`StoreError`](crate::error::StoreError) so it can pick the
/// degraded result.
#[derive(Clone)]
pub struct RecommendationStore {
    backend: Arc<dyn KeyValueBackend>,
}

impl RecommendationStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Fetches the stored movie ids for `user_id`
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: &str) -> StoreResult<Option<Vec<String>>> {
        let key = RecommendationKey::new(user_id).to_string();

        let Some(raw) = self.backend.get(&key).await? else {
            tracing::debug!("No stored recommendations");
            return Ok(None);
        };

        match decode_movies(&raw) {
            Ok(movies) => {
                tracing::debug!(movie_count = movies.len(), "Recommendations loaded");
                Ok(Some(movies))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed recommendation record");
                Ok(None)
            }
        }
    }

    /// Replaces the record for `user_id`, expiring it after `ttl_secs`
    #[instrument(skip(self, movies), fields(movie_count = movies.len()))]
    pub async fn set(&self, user_id: &str, movies: &[String], ttl_secs: u64) -> StoreResult<bool> {
        let key = RecommendationKey::new(user_id).to_string();
        let payload = RecommendationRecord::new(user_id, movies).encode()?;

        let stored = self.backend.set_ex(&key, &payload, ttl_secs).await?;
        tracing::debug!(stored, "Recommendations written");
        Ok(stored)
    }

    /// Removes the record for `user_id`, returning whether one existed
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: &str) -> StoreResult<bool> {
        let key = RecommendationKey::new(user_id).to_string();
        let removed = self.backend.del(&key).await?;
        tracing::debug!(removed, "Recommendation delete finished");
        Ok(removed)
    }

    /// Lists every user id that currently has a live record
    ///
    /// Keys expiring during the scan may or may not be included.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> StoreResult<Vec<String>> {
        let keys = self.backend.scan_match(&RecommendationKey::pattern()).await?;

        // SCAN may return the same key more than once
        let users: BTreeSet<String> = keys
            .iter()
            .filter_map(|key| RecommendationKey::user_id_from(key))
            .map(str::to_string)
            .collect();

        tracing::debug!(user_count = users.len(), "Users with recommendations listed");
        Ok(users.into_iter().collect())
    }

    /// Checks backend reachability without touching any record
    pub async fn health(&self) -> bool {
        match self.backend.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(backend = self.backend.name(), error = %e, "Store health check failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for RecommendationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationStore")
            .field("backend", &self.backend.name())
            .finish()
    }
}

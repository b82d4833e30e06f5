use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::KeyValueBackend;
use crate::error::{StoreError, StoreResult};

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-process backend with per-key expiry, used as a test double.
///
/// The binary always runs against Redis. Expired entries are skipped on read
/// and purged on the next write.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Glob matching limited to an optional trailing `*`
fn matches_pattern(key: &str, pattern: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.read().await;
        let now = Instant::now();
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<bool> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(ttl_secs))
            .ok_or(StoreError::InvalidTtl(ttl_secs))?;

        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(true)
    }

    async fn del(&self, key: &str) -> StoreResult<bool> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        Ok(entries
            .remove(key)
            .is_some_and(|entry| entry.is_live(now)))
    }

    async fn scan_match(&self, pattern: &str) -> StoreResult<Vec<String>> {
        let entries = self.entries.read().await;
        let now = Instant::now();
        Ok(entries
            .iter()
            .filter(|(key, entry)| entry.is_live(now) && matches_pattern(key, pattern))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

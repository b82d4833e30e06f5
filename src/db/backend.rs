use async_trait::async_trait;

use crate::error::StoreResult;

/// Key-value operations the recommendation store relies on.
///
/// Every call is atomic at the key level. Implementations must expire keys on
/// their own once the TTL passed to [`KeyValueBackend::set_ex`] elapses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Returns the value stored under `key`, or `None` if it is absent or expired
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value and TTL.
    ///
    /// Returns whether the backend acknowledged the write.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<bool>;

    /// Removes `key`, returning `true` only if it existed
    async fn del(&self, key: &str) -> StoreResult<bool>;

    /// Lists live keys matching a glob `pattern` without blocking the backend
    async fn scan_match(&self, pattern: &str) -> StoreResult<Vec<String>>;

    /// Verifies the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

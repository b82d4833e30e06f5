use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisResult};

use crate::db::KeyValueBackend;
use crate::error::{StoreError, StoreResult};

/// Keys requested per SCAN round-trip
const SCAN_BATCH: usize = 100;

/// Creates a Redis client for the recommendation store
///
/// The URL carries host, port, password and database index, e.g.
/// `redis://:password@localhost:6379/0`.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Redis-backed key-value store
///
/// Wraps a multiplexed [`ConnectionManager`] that reconnects on its own.
/// Every command is bounded by `op_timeout` so a stalled server fails the
/// request instead of hanging it.
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisBackend {
    /// Connects to Redis and verifies the connection with a PING
    ///
    /// Errors here mean the service cannot start.
    pub async fn connect(
        redis_url: &str,
        connect_timeout: Duration,
        op_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = create_redis_client(redis_url)?;

        let conn = tokio::time::timeout(connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                anyhow::anyhow!("Timed out connecting to Redis after {:?}", connect_timeout)
            })??;

        let backend = Self { conn, op_timeout };
        backend.ping().await?;

        tracing::info!("Redis connection established");
        Ok(backend)
    }

    /// Runs a single command under the operation timeout
    async fn bounded<T, F>(&self, op: &'static str, command: F) -> StoreResult<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, command).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Timeout {
                op,
                after: self.op_timeout,
            }),
        }
    }
}

#[async_trait]
impl KeyValueBackend for RedisBackend {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        self.bounded("GET", conn.get(key)).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        let reply: String = self
            .bounded("SETEX", conn.set_ex(key, value, ttl_secs))
            .await?;
        Ok(reply == "OK")
    }

    async fn del(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = self.bounded("DEL", conn.del(key)).await?;
        Ok(removed > 0)
    }

    async fn scan_match(&self, pattern: &str) -> StoreResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let mut cmd = redis::cmd("SCAN");
            cmd.arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH);

            let (next, batch): (u64, Vec<String>) =
                self.bounded("SCAN", cmd.query_async(&mut conn)).await?;
            keys.extend(batch);

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(keys)
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let cmd = redis::cmd("PING");
        let _: String = self.bounded("PING", cmd.query_async(&mut conn)).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

// Requires a running Redis; point REDIS_URL at it to run these.

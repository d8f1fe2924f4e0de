//! Redis counter store using MULTI/EXEC pipelines over sorted sets.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, RedisError};

use floodgate_core::ports::{CounterStore, StoreError, StoreOp};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Whether Redis should be used at all
    pub enabled: bool,
    /// Redis URL (e.g., redis://localhost:6379/0)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Whether to fall back to the in-memory store if Redis is unreachable at startup
    pub fallback_to_memory: bool,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "redis://localhost:6379/0".to_string(),
            connect_timeout: Duration::from_secs(5),
            fallback_to_memory: true,
        }
    }
}

/// Redis-backed counter store shared by every service instance.
///
/// Uses connection manager for automatic reconnection.
pub struct RedisCounterStore {
    conn: ConnectionManager,
}

impl RedisCounterStore {
    pub async fn new(config: &RedisConfig) -> Result<Self, StoreError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| StoreError::Connection(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| StoreError::Connection("Connection timed out".to_string()))?
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis counter store");

        Ok(Self { conn })
    }

    fn pipeline(ops: &[StoreOp]) -> redis::Pipeline {
        let mut pipe = redis::pipe();
        pipe.atomic();

        for op in ops {
            match op {
                StoreOp::InsertScoredMember { key, member, score } => {
                    pipe.cmd("ZADD").arg(key).arg(*score).arg(member);
                }
                StoreOp::RemoveScoredRange { key, min, max } => {
                    pipe.cmd("ZREMRANGEBYSCORE").arg(key).arg(*min).arg(*max);
                }
                StoreOp::Cardinality { key } => {
                    pipe.cmd("ZCARD").arg(key);
                }
                StoreOp::SetExpiry { key, ttl } => {
                    // EXPIRE has whole-second resolution; zero would delete the key.
                    pipe.cmd("EXPIRE").arg(key).arg(ttl.as_secs().max(1));
                }
            }
        }

        pipe
    }
}

fn classify(err: RedisError) -> StoreError {
    if err.is_io_error()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
        || err.is_timeout()
    {
        StoreError::Connection(err.to_string())
    } else {
        StoreError::Operation(err.to_string())
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn execute_atomically(&self, ops: &[StoreOp]) -> Result<Vec<i64>, StoreError> {
        if ops.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn.clone();
        let replies: Vec<i64> = Self::pipeline(ops)
            .query_async(&mut conn)
            .await
            .map_err(classify)?;

        if replies.len() != ops.len() {
            return Err(StoreError::Protocol(format!(
                "expected {} replies, got {}",
                ops.len(),
                replies.len()
            )));
        }

        Ok(replies)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(classify)?;

        if pong == "PONG" {
            Ok(())
        } else {
            Err(StoreError::Protocol(format!("PING answered {pong}")))
        }
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

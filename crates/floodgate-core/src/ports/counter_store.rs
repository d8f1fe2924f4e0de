//! Counter store port - the shared, atomic, scored-set store the limiter runs on.

use async_trait::async_trait;
use std::time::Duration;

/// One primitive operation against a key's ordered set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// Upsert `member` with `score`. Replies with the number of new members.
    InsertScoredMember {
        key: String,
        member: String,
        score: i64,
    },
    /// Remove members whose score lies in `[min, max]`. Replies with the number removed.
    RemoveScoredRange { key: String, min: i64, max: i64 },
    /// Replies with the number of members in the set.
    Cardinality { key: String },
    /// Set the key's lifetime. Replies 1 if the key exists, 0 otherwise.
    SetExpiry { key: String, ttl: Duration },
}

impl StoreOp {
    pub fn key(&self) -> &str {
        match self {
            StoreOp::InsertScoredMember { key, .. }
            | StoreOp::RemoveScoredRange { key, .. }
            | StoreOp::Cardinality { key }
            | StoreOp::SetExpiry { key, .. } => key,
        }
    }
}

/// Counter store trait - abstraction over shared store backends (Redis, in-memory).
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Execute `ops` as one indivisible unit relative to every other caller.
    /// Returns one integer reply per op, in order.
    async fn execute_atomically(&self, ops: &[StoreOp]) -> Result<Vec<i64>, StoreError>;

    /// Check the store answers.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;
}

/// Counter store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Round-trip exceeded {0} ms")]
    Timeout(u64),

    #[error("Operation failed: {0}")]
    Operation(String),

    #[error("Unexpected reply: {0}")]
    Protocol(String),
}

//! Sliding-window rate limiter over a shared counter store.
//!
//! Each key owns a scored set of admission events. One check runs, as a single
//! atomic batch against the store:
//!
//! 1. `ZADD key now member` - record this request
//! 2. `ZREMRANGEBYSCORE key 0 (now - window)` - prune events a full window old
//! 3. `ZCARD key` - count what is left, including this request
//! 4. `EXPIRE key window` - let abandoned keys age out
//!
//! The count is taken after recording, and a denied request keeps its slot
//! until it is pruned by a later check.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use floodgate_core::ports::{Clock, CounterStore, RateLimiter, StoreError, StoreOp};
use floodgate_core::{AdmissionError, Decision, EventIdentity, LimiterConfig};

use crate::clock::SystemClock;

/// Bound applied to each store round-trip unless overridden.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(250);

/// Distributed sliding-window limiter.
///
/// Holds no mutable state of its own; the store is the single source of truth,
/// so any number of instances may share one store.
pub struct SlidingWindowLimiter {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    config: LimiterConfig,
    timeout: Duration,
}

impl SlidingWindowLimiter {
    pub fn new(store: Arc<dyn CounterStore>, clock: Arc<dyn Clock>, config: LimiterConfig) -> Self {
        Self {
            store,
            clock,
            config,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Limiter on the system wall clock.
    pub fn with_system_clock(store: Arc<dyn CounterStore>, config: LimiterConfig) -> Self {
        Self::new(store, Arc::new(SystemClock), config)
    }

    /// Override the per-round-trip store timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn member(&self, now: u64) -> String {
        match self.config.identity() {
            EventIdentity::Second => now.to_string(),
            EventIdentity::Request => format!("{}:{}", now, Uuid::new_v4()),
        }
    }

    /// Record an admission event for `key` at `now` and return the number of
    /// events left in the window, this one included.
    pub async fn record_and_count(&self, key: &str, now: u64) -> Result<u64, AdmissionError> {
        let score = i64::try_from(now).unwrap_or(i64::MAX);
        // Window fits in i64, checked by LimiterConfig::new.
        let window = self.config.window() as i64;

        let ops = [
            StoreOp::InsertScoredMember {
                key: key.to_string(),
                member: self.member(now),
                score,
            },
            StoreOp::RemoveScoredRange {
                key: key.to_string(),
                min: 0,
                max: score.saturating_sub(window),
            },
            StoreOp::Cardinality {
                key: key.to_string(),
            },
            StoreOp::SetExpiry {
                key: key.to_string(),
                ttl: Duration::from_secs(self.config.window()),
            },
        ];

        let replies = tokio::time::timeout(self.timeout, self.store.execute_atomically(&ops))
            .await
            .map_err(|_| StoreError::Timeout(self.timeout.as_millis() as u64))??;

        let count = replies
            .get(2)
            .copied()
            .ok_or_else(|| StoreError::Protocol("missing cardinality reply".to_string()))?;

        u64::try_from(count)
            .map_err(|_| StoreError::Protocol(format!("negative cardinality {count}")).into())
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowLimiter {
    async fn check(&self, key: &str) -> Result<Decision, AdmissionError> {
        let now = self.clock.now_secs();

        let count = match self.record_and_count(key, now).await {
            Ok(count) => count,
            Err(err) => {
                tracing::error!(
                    key = %key,
                    error = %err,
                    backend = self.store.backend(),
                    policy = self.config.failure_policy().as_str(),
                    "Rate limit check failed"
                );
                return Err(err);
            }
        };

        let decision = Decision::decide(&self.config, count, now);
        if !decision.allowed {
            tracing::debug!(
                key = %key,
                count,
                limit = self.config.limit(),
                window = self.config.window(),
                "Admission denied"
            );
        }

        Ok(decision)
    }

    fn config(&self) -> &LimiterConfig {
        &self.config
    }
}

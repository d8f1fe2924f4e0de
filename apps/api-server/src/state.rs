//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use floodgate_core::LimiterConfig;
use floodgate_core::ports::{CounterStore, RateLimiter, StoreError};
use floodgate_infra::{InMemoryCounterStore, SlidingWindowLimiter};

use crate::config::{AppConfig, LimitsConfig};

#[cfg(feature = "redis")]
use floodgate_infra::RedisCounterStore;

/// How often the in-memory store drops expired keys.
const MEMORY_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CounterStore>,
    pub limiters: Limiters,
    pub limits: LimitsConfig,
}

/// One limiter per route class, all sharing the same store.
#[derive(Clone)]
pub struct Limiters {
    pub general: Arc<dyn RateLimiter>,
    pub auth: Arc<dyn RateLimiter>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Result<Self, StoreError> {
        let store = Self::connect_store(config).await?;
        Ok(Self::with_store(store, config.limits.clone()))
    }

    /// Build limiters for every class on top of `store`.
    pub fn with_store(store: Arc<dyn CounterStore>, limits: LimitsConfig) -> Self {
        let build = |config: &LimiterConfig| -> Arc<dyn RateLimiter> {
            Arc::new(
                SlidingWindowLimiter::with_system_clock(store.clone(), config.clone())
                    .with_timeout(limits.store_timeout),
            )
        };

        let limiters = Limiters {
            general: build(&limits.general),
            auth: build(&limits.auth),
        };

        tracing::info!(
            backend = store.backend(),
            general_limit = limits.general.limit(),
            general_window = limits.general.window(),
            auth_limit = limits.auth.limit(),
            auth_window = limits.auth.window(),
            failure_policy = limits.general.failure_policy().as_str(),
            "Application state initialized"
        );

        Self {
            store,
            limiters,
            limits,
        }
    }

    #[cfg(feature = "redis")]
    async fn connect_store(config: &AppConfig) -> Result<Arc<dyn CounterStore>, StoreError> {
        if !config.redis.enabled {
            tracing::warn!("REDIS_ENABLED is off. Limits are per-process (in-memory store).");
            return Ok(Self::memory_store());
        }

        match RedisCounterStore::new(&config.redis).await {
            Ok(store) => Ok(Arc::new(store)),
            Err(e) if config.redis.fallback_to_memory => {
                tracing::error!(
                    "Failed to connect to Redis: {}. Using in-memory fallback; limits are per-process.",
                    e
                );
                Ok(Self::memory_store())
            }
            Err(e) => Err(e),
        }
    }

    #[cfg(not(feature = "redis"))]
    async fn connect_store(_config: &AppConfig) -> Result<Arc<dyn CounterStore>, StoreError> {
        tracing::info!("Running without redis feature - using in-memory counter store");
        Ok(Self::memory_store())
    }

    fn memory_store() -> Arc<dyn CounterStore> {
        let store = Arc::new(InMemoryCounterStore::new());

        let sweeper = store.clone();
        actix_web::rt::spawn(async move {
            let mut ticker = tokio::time::interval(MEMORY_SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                let purged = sweeper.purge_expired().await;
                if purged > 0 {
                    tracing::debug!(purged, "Purged expired rate limit keys");
                }
            }
        });

        store
    }
}

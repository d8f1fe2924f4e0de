//! # Floodgate Infrastructure
//!
//! Concrete implementations of the ports defined in `floodgate-core`:
//! counter stores, clocks and the sliding-window rate limiter.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `redis` - Redis-backed counter store shared across instances

pub mod clock;
pub mod rate_limit;
pub mod store;

// Re-exports - In-Memory
pub use clock::{ManualClock, SystemClock};
pub use rate_limit::SlidingWindowLimiter;
pub use store::InMemoryCounterStore;

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use store::{RedisConfig, RedisCounterStore};

//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod clock;
mod counter_store;
mod rate_limit;

pub use clock::Clock;
pub use counter_store::{CounterStore, StoreError, StoreOp};
pub use rate_limit::RateLimiter;

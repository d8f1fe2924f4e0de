//! Domain types - limiter configuration, decisions and key derivation.

mod config;
mod decision;
mod key;

pub use config::{EventIdentity, FailurePolicy, LimiterConfig, MAX_WINDOW_SECS};
pub use decision::{Decision, retry_after};
pub use key::{DEFAULT_KEY_PREFIX, client_key};

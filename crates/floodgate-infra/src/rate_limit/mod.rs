//! Rate limiting implementations.

mod sliding_window;

pub use sliding_window::{DEFAULT_STORE_TIMEOUT, SlidingWindowLimiter};

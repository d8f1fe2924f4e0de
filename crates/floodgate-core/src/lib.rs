//! # Floodgate Core
//!
//! The domain layer of the Floodgate admission-control service.
//! This crate contains the limiter's decision logic and the ports its
//! infrastructure must implement, with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use domain::{Decision, EventIdentity, FailurePolicy, LimiterConfig};
pub use error::AdmissionError;

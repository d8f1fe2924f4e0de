//! Limiter configuration.

use std::str::FromStr;

use crate::error::AdmissionError;

/// How an admission event is identified inside a key's ordered set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventIdentity {
    /// The timestamp is the member. Requests landing in the same second
    /// collapse into one stored event.
    Second,
    /// Every request gets its own member, scored by its timestamp.
    #[default]
    Request,
}

impl EventIdentity {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventIdentity::Second => "second",
            EventIdentity::Request => "request",
        }
    }
}

impl FromStr for EventIdentity {
    type Err = AdmissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "second" | "timestamp" => Ok(EventIdentity::Second),
            "request" | "unique" => Ok(EventIdentity::Request),
            other => Err(AdmissionError::InvalidConfiguration(format!(
                "unknown event identity '{other}', expected 'request' or 'second'"
            ))),
        }
    }
}

/// What to do when the counter store cannot answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Admit the request; availability over protection.
    #[default]
    Open,
    /// Reject the request; protection over availability.
    Closed,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Open => "open",
            FailurePolicy::Closed => "closed",
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = AdmissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" | "fail-open" => Ok(FailurePolicy::Open),
            "closed" | "fail-closed" => Ok(FailurePolicy::Closed),
            other => Err(AdmissionError::InvalidConfiguration(format!(
                "unknown failure policy '{other}', expected 'open' or 'closed'"
            ))),
        }
    }
}

/// Longest window accepted, in seconds. Store expiries and scores must be
/// able to represent it.
pub const MAX_WINDOW_SECS: u64 = u32::MAX as u64;

/// Immutable per-limiter settings.
///
/// A process may hold several limiters with different configurations, one per
/// route class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimiterConfig {
    limit: u32,
    window: u64,
    identity: EventIdentity,
    failure_policy: FailurePolicy,
}

impl LimiterConfig {
    /// Build a configuration admitting `limit` events per `window` seconds.
    ///
    /// Fails with [`AdmissionError::InvalidConfiguration`] when either value is zero.
    pub fn new(limit: u32, window: u64) -> Result<Self, AdmissionError> {
        if limit == 0 {
            return Err(AdmissionError::InvalidConfiguration(
                "limit must be greater than zero".to_string(),
            ));
        }
        if window == 0 {
            return Err(AdmissionError::InvalidConfiguration(
                "window must be greater than zero".to_string(),
            ));
        }
        if window > MAX_WINDOW_SECS {
            return Err(AdmissionError::InvalidConfiguration(format!(
                "window of {window} seconds exceeds the maximum of {MAX_WINDOW_SECS}"
            )));
        }

        Ok(Self {
            limit,
            window,
            identity: EventIdentity::default(),
            failure_policy: FailurePolicy::default(),
        })
    }

    pub fn with_identity(mut self, identity: EventIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Maximum admitted events per window.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Window length in seconds.
    pub fn window(&self) -> u64 {
        self.window
    }

    pub fn identity(&self) -> EventIdentity {
        self.identity
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }
}

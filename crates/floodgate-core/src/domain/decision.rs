//! Admission decisions.

use crate::domain::{FailurePolicy, LimiterConfig};
use crate::error::AdmissionError;

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    /// Events counted in the window, including the one just recorded.
    pub count: u64,
    pub limit: u32,
    pub window: u64,
    /// Seconds until the current fixed sub-interval rolls over.
    pub retry_after: u64,
}

/// Coarse retry hint: time left until `now` crosses the next multiple of
/// `window`, folded into `[0, window)`.
pub fn retry_after(window: u64, now: u64) -> u64 {
    (window - now % window) % window
}

impl Decision {
    /// Decide on a post-admission `count`. The event behind `count` has
    /// already been recorded, so a denial still spends a slot.
    pub fn decide(config: &LimiterConfig, count: u64, now: u64) -> Self {
        Self {
            allowed: count <= u64::from(config.limit()),
            count,
            limit: config.limit(),
            window: config.window(),
            retry_after: retry_after(config.window(), now),
        }
    }

    /// Decision handed out when the store is down and the policy is fail-open.
    pub fn fail_open(config: &LimiterConfig) -> Self {
        Self {
            allowed: true,
            count: 0,
            limit: config.limit(),
            window: config.window(),
            retry_after: 0,
        }
    }

    /// Turn a denial into [`AdmissionError::LimitExceeded`].
    pub fn into_result(self) -> Result<Decision, AdmissionError> {
        if self.allowed {
            Ok(self)
        } else {
            Err(AdmissionError::LimitExceeded {
                limit: self.limit,
                window: self.window,
                retry_after: self.retry_after,
            })
        }
    }
}

impl FailurePolicy {
    /// Resolve a raw check result into proceed (`Ok`) or reject (`Err`).
    ///
    /// `StoreUnavailable` is admitted under [`FailurePolicy::Open`] and passed
    /// through under [`FailurePolicy::Closed`]. Other errors always pass through.
    pub fn resolve(
        self,
        config: &LimiterConfig,
        result: Result<Decision, AdmissionError>,
    ) -> Result<Decision, AdmissionError> {
        match result {
            Ok(decision) => decision.into_result(),
            Err(AdmissionError::StoreUnavailable(_)) if self == FailurePolicy::Open => {
                Ok(Decision::fail_open(config))
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(limit: u32, window: u64) -> LimiterConfig {
        LimiterConfig::new(limit, window).unwrap()
    }

    #[test]
    fn test_allows_up_to_limit() {
        let config = config(5, 60);
        for (now, count) in (0..5).zip(1..=5) {
            let decision = Decision::decide(&config, count, now);
            assert!(decision.allowed, "count {count} should be allowed");
            assert_eq!(decision.count, count);
        }
    }

    #[test]
    fn test_denies_past_limit_with_retry_hint() {
        let decision = Decision::decide(&config(5, 60), 6, 5);
        assert!(!decision.allowed);
        assert_eq!(decision.count, 6);
        assert_eq!(decision.retry_after, 55);
    }

    #[test]
    fn test_retry_after_stays_below_window() {
        for window in [1, 7, 60, 3600] {
            for now in [0, 1, window - 1, window, window + 1, 1_700_000_000] {
                let hint = retry_after(window, now);
                assert!(hint < window, "window {window} now {now} gave {hint}");
            }
        }
        assert_eq!(retry_after(60, 120), 0);
        assert_eq!(retry_after(60, 121), 59);
    }

    #[test]
    fn test_denial_becomes_limit_exceeded() {
        let err = Decision::decide(&config(1, 10), 2, 9).into_result().unwrap_err();
        assert_eq!(
            err,
            AdmissionError::LimitExceeded {
                limit: 1,
                window: 10,
                retry_after: 1,
            }
        );
    }

    #[test]
    fn test_fail_open_admits_on_store_failure() {
        let config = config(3, 30);
        let result = FailurePolicy::Open.resolve(
            &config,
            Err(AdmissionError::StoreUnavailable("down".to_string())),
        );
        let decision = result.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.count, 0);
    }

    #[test]
    fn test_fail_closed_rejects_on_store_failure() {
        let config = config(3, 30);
        let result = FailurePolicy::Closed.resolve(
            &config,
            Err(AdmissionError::StoreUnavailable("down".to_string())),
        );
        assert!(matches!(result, Err(AdmissionError::StoreUnavailable(_))));
    }

    #[test]
    fn test_fail_open_still_enforces_limit() {
        let config = config(1, 10);
        let result = FailurePolicy::Open.resolve(&config, Ok(Decision::decide(&config, 2, 0)));
        assert!(matches!(result, Err(AdmissionError::LimitExceeded { .. })));
    }
}

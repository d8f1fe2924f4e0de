//! Rate limiting port.

use async_trait::async_trait;

use crate::domain::{Decision, LimiterConfig};
use crate::error::AdmissionError;

/// Rate limiter trait - abstraction over rate limiting backends.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record an admission event for `key` and decide on it.
    ///
    /// Store failures come back as [`AdmissionError::StoreUnavailable`]; no
    /// failure policy is applied here.
    async fn check(&self, key: &str) -> Result<Decision, AdmissionError>;

    /// The limiter's immutable configuration.
    fn config(&self) -> &LimiterConfig;

    /// Check `key` and resolve the result through the configured failure policy.
    /// `Ok` means proceed, `Err` means reject.
    async fn admit(&self, key: &str) -> Result<Decision, AdmissionError> {
        let result = self.check(key).await;
        let config = self.config();
        config.failure_policy().resolve(config, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FailurePolicy;

    struct Unreachable {
        config: LimiterConfig,
    }

    #[async_trait]
    impl RateLimiter for Unreachable {
        async fn check(&self, _key: &str) -> Result<Decision, AdmissionError> {
            Err(AdmissionError::StoreUnavailable("connection refused".to_string()))
        }

        fn config(&self) -> &LimiterConfig {
            &self.config
        }
    }

    #[tokio::test]
    async fn test_admit_applies_configured_policy() {
        let open = Unreachable {
            config: LimiterConfig::new(1, 1).unwrap(),
        };
        assert!(open.admit("k").await.unwrap().allowed);

        let closed = Unreachable {
            config: LimiterConfig::new(1, 1)
                .unwrap()
                .with_failure_policy(FailurePolicy::Closed),
        };
        assert!(matches!(
            closed.admit("k").await,
            Err(AdmissionError::StoreUnavailable(_))
        ));
    }
}

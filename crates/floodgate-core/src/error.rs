//! Admission-control error types.

use thiserror::Error;

use crate::ports::StoreError;

/// Errors raised while admitting a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// The key has used up its allowance for the current window.
    #[error(
        "Rate limit exceeded. Maximum {limit} requests per {window} seconds allowed."
    )]
    LimitExceeded {
        limit: u32,
        window: u64,
        retry_after: u64,
    },

    /// The shared counter store could not be reached or answered badly.
    #[error("Counter store unavailable: {0}")]
    StoreUnavailable(String),

    /// Limiter constructed with a zero limit or window.
    #[error("Invalid limiter configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<StoreError> for AdmissionError {
    fn from(err: StoreError) -> Self {
        AdmissionError::StoreUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_exceeded_message_names_limit_and_window() {
        let err = AdmissionError::LimitExceeded {
            limit: 5,
            window: 60,
            retry_after: 55,
        };
        assert_eq!(
            err.to_string(),
            "Rate limit exceeded. Maximum 5 requests per 60 seconds allowed."
        );
    }

    #[test]
    fn test_store_errors_become_unavailable() {
        let err: AdmissionError = StoreError::Timeout(250).into();
        assert!(matches!(err, AdmissionError::StoreUnavailable(_)));
    }
}

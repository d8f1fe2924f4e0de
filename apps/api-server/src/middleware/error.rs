//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{
    HttpResponse, ResponseError,
    http::{StatusCode, header},
};
use floodgate_core::{AdmissionError, LimiterConfig};
use floodgate_shared::ErrorResponse;
use std::fmt;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    RateLimited {
        limit: u32,
        window: u64,
        retry_after: u64,
    },
    LimiterUnavailable {
        retry_after: u64,
    },
    Internal(String),
}

impl AppError {
    /// Map a rejection from a limiter configured with `config`.
    pub fn from_admission(err: AdmissionError, config: &LimiterConfig) -> Self {
        match err {
            AdmissionError::LimitExceeded {
                limit,
                window,
                retry_after,
            } => AppError::RateLimited {
                limit,
                window,
                retry_after,
            },
            AdmissionError::StoreUnavailable(_) => AppError::LimiterUnavailable {
                retry_after: config.window(),
            },
            AdmissionError::InvalidConfiguration(msg) => AppError::Internal(msg),
        }
    }

    fn retry_after(&self) -> Option<u64> {
        match self {
            AppError::RateLimited { retry_after, .. }
            | AppError::LimiterUnavailable { retry_after } => Some(*retry_after),
            AppError::Internal(_) => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::RateLimited { limit, window, .. } => write!(
                f,
                "Rate limit exceeded. Maximum {} requests per {} seconds allowed.",
                limit, window
            ),
            AppError::LimiterUnavailable { .. } => {
                write!(f, "Rate limiter unavailable. Please retry later.")
            }
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::LimiterUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::RateLimited { retry_after, .. } => {
                ErrorResponse::too_many_requests(self.to_string(), *retry_after)
            }
            AppError::LimiterUnavailable { retry_after } => {
                ErrorResponse::service_unavailable(self.to_string(), *retry_after)
            }
            AppError::Internal(detail) => {
                // Log internal errors
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        let mut response = HttpResponse::build(self.status_code());
        if let Some(secs) = self.retry_after() {
            response.insert_header((header::RETRY_AFTER, secs.to_string()));
        }
        response.json(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_exceeded_maps_to_429_with_retry_after() {
        let config = LimiterConfig::new(5, 60).unwrap();
        let err = AppError::from_admission(
            AdmissionError::LimitExceeded {
                limit: 5,
                window: 60,
                retry_after: 55,
            },
            &config,
        );

        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "55");
    }

    #[test]
    fn test_store_unavailable_maps_to_503() {
        let config = LimiterConfig::new(5, 30).unwrap();
        let err = AppError::from_admission(
            AdmissionError::StoreUnavailable("connection refused".to_string()),
            &config,
        );

        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "30");
    }
}

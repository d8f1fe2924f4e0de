//! Standardized error responses (RFC 7807).

use serde::{Deserialize, Serialize};

/// Problem type for requests rejected by the rate limiter.
pub const RATE_LIMIT_EXCEEDED_TYPE: &str = "urn:floodgate:rate-limit-exceeded";

/// Problem type for requests rejected because the counter store is down.
pub const LIMITER_UNAVAILABLE_TYPE: &str = "urn:floodgate:limiter-unavailable";

/// RFC 7807 Problem Details for HTTP APIs.
///
/// See: https://datatracker.ietf.org/doc/html/rfc7807
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub error_type: String,

    /// A short, human-readable summary of the problem type.
    pub title: String,

    /// The HTTP status code.
    pub status: u16,

    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Seconds the client should wait before retrying.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl ErrorResponse {
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            error_type: "about:blank".to_string(),
            title: title.into(),
            status,
            detail: None,
            retry_after: None,
        }
    }

    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = error_type.into();
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_retry_after(mut self, secs: u64) -> Self {
        self.retry_after = Some(secs);
        self
    }

    pub fn too_many_requests(detail: impl Into<String>, retry_after: u64) -> Self {
        Self::new(429, "Too Many Requests")
            .with_type(RATE_LIMIT_EXCEEDED_TYPE)
            .with_detail(detail)
            .with_retry_after(retry_after)
    }

    pub fn service_unavailable(detail: impl Into<String>, retry_after: u64) -> Self {
        Self::new(503, "Service Unavailable")
            .with_type(LIMITER_UNAVAILABLE_TYPE)
            .with_detail(detail)
            .with_retry_after(retry_after)
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_many_requests_body() {
        let body = serde_json::to_value(ErrorResponse::too_many_requests(
            "Rate limit exceeded. Maximum 5 requests per 60 seconds allowed.",
            55,
        ))
        .unwrap();

        assert_eq!(body["type"], RATE_LIMIT_EXCEEDED_TYPE);
        assert_eq!(body["title"], "Too Many Requests");
        assert_eq!(body["status"], 429);
        assert_eq!(body["retry_after"], 55);
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let body = serde_json::to_value(ErrorResponse::internal_error()).unwrap();
        assert!(body.get("detail").is_none());
        assert!(body.get("retry_after").is_none());
    }
}

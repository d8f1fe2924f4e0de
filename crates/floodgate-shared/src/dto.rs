//! Data Transfer Objects - response types for the API.

use serde::{Deserialize, Serialize};

/// Health of one backing service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// "connected" or "disconnected".
    pub status: String,
    pub backend: String,
}

/// Backing services reported by the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthServices {
    pub counter_store: ServiceStatus,
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub services: HealthServices,
}

/// Limits enforced for one route class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsResponse {
    pub class: String,
    pub limit: u32,
    pub window_secs: u64,
    pub failure_policy: String,
    pub event_identity: String,
}

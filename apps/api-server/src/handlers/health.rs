//! Health check endpoint.

use std::time::Duration;

use actix_web::{HttpResponse, web};
use floodgate_shared::dto::{HealthResponse, HealthServices, ServiceStatus};

use crate::state::AppState;

const PING_TIMEOUT: Duration = Duration::from_secs(1);

/// Health check endpoint - returns server and counter store status.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let store_status = match tokio::time::timeout(PING_TIMEOUT, state.store.ping()).await {
        Ok(Ok(())) => "connected",
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Counter store ping failed");
            "disconnected"
        }
        Err(_) => {
            tracing::warn!("Counter store ping timed out");
            "disconnected"
        }
    };

    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        services: HealthServices {
            counter_store: ServiceStatus {
                status: store_status.to_string(),
                backend: state.store.backend().to_string(),
            },
        },
    };

    HttpResponse::Ok().json(response)
}

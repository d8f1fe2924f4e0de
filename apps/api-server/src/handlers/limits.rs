//! Limits introspection endpoints.

use actix_web::{HttpResponse, web};
use floodgate_core::ports::RateLimiter;
use floodgate_shared::dto::LimitsResponse;

use crate::state::AppState;

fn describe(class: &str, limiter: &dyn RateLimiter) -> LimitsResponse {
    let config = limiter.config();
    LimitsResponse {
        class: class.to_string(),
        limit: config.limit(),
        window_secs: config.window(),
        failure_policy: config.failure_policy().as_str().to_string(),
        event_identity: config.identity().as_str().to_string(),
    }
}

/// GET /api/limits
pub async fn general_limits(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(describe("general", state.limiters.general.as_ref()))
}

/// GET /api/auth/limits
pub async fn auth_limits(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(describe("auth", state.limiters.auth.as_ref()))
}

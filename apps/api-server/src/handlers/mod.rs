//! HTTP handlers and route configuration.

mod health;
mod limits;

use std::sync::Arc;

use actix_web::web;

use crate::middleware::key::{ClientAddrKey, FixedKey, KeyExtractor};
use crate::middleware::rate_limit::RateLimitMiddleware;
use crate::state::AppState;

/// Configure all application routes.
///
/// `/api/health` is never throttled. General routes share the `general`
/// limiter; `/api/auth` routes get the stricter `auth` limiter under their
/// own key namespace.
pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    let limits = &state.limits;

    let general_key: Arc<dyn KeyExtractor> = match &limits.fixed_key {
        Some(key) => Arc::new(FixedKey(key.clone())),
        None => Arc::new(
            ClientAddrKey::new(limits.key_prefix.clone()).trust_forwarded(limits.trust_forwarded),
        ),
    };
    let auth_key = ClientAddrKey::new(format!("{}:auth", limits.key_prefix))
        .trust_forwarded(limits.trust_forwarded);

    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .wrap(RateLimitMiddleware::new(state.limiters.auth.clone()).with_key(auth_key))
                    .route("/limits", web::get().to(limits::auth_limits)),
            )
            // General API routes
            .service(
                web::scope("")
                    .wrap(
                        RateLimitMiddleware::new(state.limiters.general.clone())
                            .with_key_extractor(general_key),
                    )
                    .route("/limits", web::get().to(limits::general_limits)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitsConfig;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use floodgate_core::LimiterConfig;
    use floodgate_infra::InMemoryCounterStore;
    use floodgate_shared::dto::{HealthResponse, LimitsResponse};
    use std::time::Duration;

    fn state(general: u32, auth: u32) -> AppState {
        AppState::with_store(
            Arc::new(InMemoryCounterStore::new()),
            LimitsConfig {
                general: LimiterConfig::new(general, 60).unwrap(),
                auth: LimiterConfig::new(auth, 60).unwrap(),
                store_timeout: Duration::from_millis(250),
                key_prefix: "rate_limit".to_string(),
                fixed_key: None,
                trust_forwarded: false,
            },
        )
    }

    fn get(uri: &str) -> test::TestRequest {
        test::TestRequest::get()
            .uri(uri)
            .peer_addr("192.0.2.10:40000".parse().unwrap())
    }

    #[actix_web::test]
    async fn test_health_is_not_throttled() {
        let state = state(1, 1);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(|cfg| configure_routes(cfg, &state)),
        )
        .await;

        for _ in 0..5 {
            let res = test::call_service(&app, get("/api/health").to_request()).await;
            assert_eq!(res.status(), StatusCode::OK);
            let body: HealthResponse = test::read_body_json(res).await;
            assert_eq!(body.services.counter_store.status, "connected");
            assert_eq!(body.services.counter_store.backend, "memory");
        }
    }

    #[actix_web::test]
    async fn test_route_classes_have_separate_budgets() {
        let state = state(3, 1);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(|cfg| configure_routes(cfg, &state)),
        )
        .await;

        let res = test::call_service(&app, get("/api/auth/limits").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: LimitsResponse = test::read_body_json(res).await;
        assert_eq!(body.class, "auth");
        assert_eq!(body.limit, 1);

        let res = test::call_service(&app, get("/api/auth/limits").to_request()).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

        // The auth budget is spent; the general one is untouched.
        for _ in 0..3 {
            let res = test::call_service(&app, get("/api/limits").to_request()).await;
            assert_eq!(res.status(), StatusCode::OK);
        }
        let res = test::call_service(&app, get("/api/limits").to_request()).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}

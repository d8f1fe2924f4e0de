//! Rate limiting middleware.
//!
//! Derives a key for each request, records it against the limiter and either
//! forwards the request untouched or answers it directly with 429 (limit hit)
//! or 503 (store down under a fail-closed policy).

use actix_web::{
    Error, ResponseError,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use floodgate_core::AdmissionError;
use floodgate_core::ports::RateLimiter;

use super::error::AppError;
use super::key::{ClientAddrKey, KeyExtractor};

/// Rate limiting middleware factory.
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
    key: Arc<dyn KeyExtractor>,
}

impl RateLimitMiddleware {
    /// Limit by client address under the default `rate_limit` prefix.
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            limiter,
            key: Arc::new(ClientAddrKey::default()),
        }
    }

    /// Replace the key derivation.
    pub fn with_key<K: KeyExtractor + 'static>(self, key: K) -> Self {
        self.with_key_extractor(Arc::new(key))
    }

    pub fn with_key_extractor(mut self, key: Arc<dyn KeyExtractor>) -> Self {
        self.key = key;
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            key: self.key.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
    key: Arc<dyn KeyExtractor>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let limiter = self.limiter.clone();
        let key = self.key.extract(&req);

        Box::pin(async move {
            match limiter.admit(&key).await {
                Ok(_) => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    match &err {
                        AdmissionError::LimitExceeded {
                            limit, retry_after, ..
                        } => {
                            tracing::warn!(
                                key = %key,
                                limit,
                                retry_after,
                                path = %req.path(),
                                "Rate limit exceeded"
                            );
                        }
                        other => {
                            tracing::error!(
                                key = %key,
                                error = %other,
                                "Rejecting request, rate limiter failing closed"
                            );
                        }
                    }

                    let response = AppError::from_admission(err, limiter.config()).error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

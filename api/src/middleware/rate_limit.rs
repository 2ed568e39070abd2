//! Per-IP rate limiting for API endpoints
//!
//! Every request under `/api` counts against the client's `api_per_ip`
//! window. The email and username availability checks also count against
//! the stricter `availability_per_ip` window. Limiter failures let the
//! request through.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::{header::HeaderValue, Method},
    Error, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use sb_core::errors::{AuthError, DomainError};
use sb_core::services::{rate_limit_key, RateLimitStatus, RateLimiterTrait};
use sb_shared::{RateLimitConfig, RateLimitRule};

use crate::handlers::error::{language_of, ApiError};
use crate::handlers::request::client_ip;

const AVAILABILITY_PATHS: [&str; 2] = ["/api/v1/auth/email/check/", "/api/v1/auth/username/check/"];

/// Rate limiter middleware factory
#[derive(Clone)]
pub struct ApiRateLimit {
    limiter: Arc<dyn RateLimiterTrait>,
    config: RateLimitConfig,
    trusted_proxies: Arc<Vec<String>>,
}

impl ApiRateLimit {
    pub fn new(limiter: Arc<dyn RateLimiterTrait>, config: RateLimitConfig, trusted_proxies: Vec<String>) -> Self {
        Self {
            limiter,
            config,
            trusted_proxies: Arc::new(trusted_proxies),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiRateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiRateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiRateLimitMiddleware {
            service: Rc::new(service),
            limiter: Arc::clone(&self.limiter),
            config: self.config.clone(),
            trusted_proxies: Arc::clone(&self.trusted_proxies),
        }))
    }
}

pub struct ApiRateLimitMiddleware<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiterTrait>,
    config: RateLimitConfig,
    trusted_proxies: Arc<Vec<String>>,
}

impl<S, B> Service<ServiceRequest> for ApiRateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = Arc::clone(&self.limiter);
        let config = self.config.clone();
        let trusted_proxies = Arc::clone(&self.trusted_proxies);

        Box::pin(async move {
            if !config.enabled || !is_limited(&req) {
                let response = service.call(req).await?;
                return Ok(response.map_into_left_body());
            }

            let ip = client_ip(req.request(), &trusted_proxies).unwrap_or_else(|| "unknown".to_string());

            let mut rules = vec![("api", config.api_per_ip)];
            if AVAILABILITY_PATHS.contains(&req.path()) {
                rules.push(("availability", config.availability_per_ip));
            }

            let mut tightest: Option<(RateLimitRule, RateLimitStatus)> = None;
            for (action, rule) in rules {
                let status = match limiter.check_rule(&rate_limit_key(action, &ip), rule).await {
                    Ok(status) => status,
                    Err(e) => {
                        tracing::warn!(error = %e, action, "Rate limiter unavailable, allowing request");
                        continue;
                    }
                };

                if !status.allowed {
                    tracing::warn!(ip = %ip, action, path = %req.path(), "Rate limit exceeded");
                    let error = DomainError::Auth(AuthError::RateLimitExceeded {
                        seconds: status.retry_after_seconds,
                    });
                    let mut response = ApiError::new(error, language_of(req.headers())).error_response();
                    insert_limit_headers(response.headers_mut(), rule, status);
                    return Ok(req.into_response(response).map_into_right_body());
                }

                let is_tighter = tightest
                    .map(|(_, current)| status.remaining < current.remaining)
                    .unwrap_or(true);
                if is_tighter {
                    tightest = Some((rule, status));
                }
            }

            let mut response = service.call(req).await?;
            if let Some((rule, status)) = tightest {
                insert_limit_headers(response.headers_mut(), rule, status);
            }
            Ok(response.map_into_left_body())
        })
    }
}

/// Preflight requests and anything outside `/api` are not counted
fn is_limited(req: &ServiceRequest) -> bool {
    req.method() != Method::OPTIONS && req.path().starts_with("/api/")
}

fn insert_limit_headers(headers: &mut actix_web::http::header::HeaderMap, rule: RateLimitRule, status: RateLimitStatus) {
    let pairs = [
        ("x-rate-limit-limit", rule.max_requests as u64),
        ("x-rate-limit-remaining", status.remaining as u64),
        ("x-rate-limit-reset", status.retry_after_seconds),
    ];
    for (name, value) in pairs {
        if let Ok(value) = HeaderValue::from_str(&value.to_string()) {
            headers.insert(actix_web::http::header::HeaderName::from_static(name), value);
        }
    }
}

//! Security middleware: HTTPS enforcement and response hardening headers.
//!
//! In production plain HTTP requests are refused unless a trusted proxy
//! reports `X-Forwarded-Proto: https`. Every response carries the usual
//! hardening headers (HSTS only in production).

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderName, HeaderValue},
    Error, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use sb_core::errors::DomainError;
use sb_shared::{Environment, ServerConfig};

use crate::handlers::error::{language_of, ApiError};

/// Security middleware factory
#[derive(Debug, Clone)]
pub struct SecurityMiddleware {
    enforce_https: bool,
    add_hsts: bool,
    trusted_proxies: Arc<Vec<String>>,
}

impl SecurityMiddleware {
    pub fn from_config(environment: Environment, server: &ServerConfig) -> Self {
        let production = environment.is_production();
        tracing::info!(
            enforce_https = production,
            trusted_proxies = ?server.trusted_proxies,
            "Security middleware configured"
        );

        Self {
            enforce_https: production,
            add_hsts: production,
            trusted_proxies: Arc::new(server.trusted_proxies.clone()),
        }
    }

    /// No HTTPS enforcement, headers only
    pub fn development() -> Self {
        Self {
            enforce_https: false,
            add_hsts: false,
            trusted_proxies: Arc::new(vec!["127.0.0.1".to_string(), "::1".to_string()]),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SecurityMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SecurityMiddlewareService {
            service: Rc::new(service),
            enforce_https: self.enforce_https,
            add_hsts: self.add_hsts,
            trusted_proxies: Arc::clone(&self.trusted_proxies),
        }))
    }
}

pub struct SecurityMiddlewareService<S> {
    service: Rc<S>,
    enforce_https: bool,
    add_hsts: bool,
    trusted_proxies: Arc<Vec<String>>,
}

impl<S, B> Service<ServiceRequest> for SecurityMiddlewareService<S>
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
        let enforce_https = self.enforce_https;
        let add_hsts = self.add_hsts;
        let trusted_proxies = Arc::clone(&self.trusted_proxies);

        Box::pin(async move {
            if enforce_https && !is_secure_request(&req, &trusted_proxies) {
                tracing::warn!(method = %req.method(), path = %req.path(), "Insecure request blocked");
                let response = ApiError::new(DomainError::Forbidden, language_of(req.headers())).error_response();
                let mut response = req.into_response(response);
                add_security_headers(response.headers_mut(), add_hsts);
                return Ok(response.map_into_right_body());
            }

            let mut response = service.call(req).await?;
            add_security_headers(response.headers_mut(), add_hsts);
            Ok(response.map_into_left_body())
        })
    }
}

/// True for TLS connections, HTTPS reported by a trusted proxy, or localhost
fn is_secure_request(req: &ServiceRequest, trusted_proxies: &[String]) -> bool {
    if req.app_config().secure() {
        return true;
    }

    let peer_ip = req.peer_addr().map(|addr| addr.ip().to_string());
    let from_trusted_proxy = peer_ip
        .as_deref()
        .map(|ip| trusted_proxies.iter().any(|trusted| trusted == ip))
        .unwrap_or(false);

    if from_trusted_proxy {
        let forwarded_https = req
            .headers()
            .get("x-forwarded-proto")
            .and_then(|value| value.to_str().ok())
            .map(|proto| proto.eq_ignore_ascii_case("https"))
            .unwrap_or(false);
        if forwarded_https {
            return true;
        }
    }

    req.headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(|host| host.starts_with("localhost") || host.starts_with("127.0.0.1") || host.starts_with("[::1]"))
        .unwrap_or(false)
}

fn add_security_headers(headers: &mut header::HeaderMap, add_hsts: bool) {
    if add_hsts {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("strict-origin-when-cross-origin"));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none';"),
    );
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static("camera=(), microphone=(), payment=(), usb=()"),
    );
}

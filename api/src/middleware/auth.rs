//! JWT authentication middleware for protecting API endpoints.
//!
//! The middleware extracts the Bearer token from the `Authorization` header,
//! verifies it with the `TokenService` held in the application state
//! (signature, expiry, issuer, audience and blacklist), checks that the
//! token's session and user are still active, and stores an
//! [`AuthContext`] in the request extensions for handlers to extract.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};
use uuid::Uuid;

use sb_core::domain::entities::Claims;
use sb_core::errors::{DomainError, TokenError};

use crate::handlers::error::{language_of, ApiError};
use crate::state::AppState;

/// Authenticated caller, taken from verified access token claims
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    /// Login session the token was issued for
    pub session_id: Option<Uuid>,
    pub email: String,
    pub is_verified: bool,
    pub claims: Claims,
}

impl AuthContext {
    pub fn from_claims(claims: Claims) -> Result<Self, DomainError> {
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidClaims))?;
        let session_id = claims.session_id().ok();

        Ok(Self {
            user_id,
            session_id,
            email: claims.email.clone(),
            is_verified: claims.is_verified,
            claims,
        })
    }
}

/// JWT authentication middleware factory
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtAuth;

impl JwtAuth {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
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

        Box::pin(async move {
            let language = language_of(req.headers());

            let context = match authenticate(&req).await {
                Ok(context) => context,
                Err(error) => {
                    tracing::debug!(path = %req.path(), error = %error, "Rejected unauthenticated request");
                    let response = ApiError::new(error, language).error_response();
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            req.extensions_mut().insert(context);

            let response = service.call(req).await?;
            Ok(response.map_into_left_body())
        })
    }
}

async fn authenticate(req: &ServiceRequest) -> Result<AuthContext, DomainError> {
    let token = extract_bearer_token(req).ok_or(DomainError::Unauthorized)?;

    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| DomainError::internal("Application state is not configured"))?;

    let claims = state.tokens.verify_access_token(&token).await?;
    state.auth.authorize(&claims).await?;
    AuthContext::from_claims(claims)
}

/// Extracts Bearer token from Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::new(DomainError::Unauthorized, language_of(req.headers())).into());

        ready(result)
    }
}

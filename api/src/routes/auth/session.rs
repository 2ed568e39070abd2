//! Registration, login, logout and token refresh

use actix_web::{web, HttpRequest, HttpResponse};

use sb_core::domain::value_objects::LoginOutcome;
use sb_shared::MessageResponse;

use crate::dto::auth::{
    LoginRequest, LogoutRequest, RefreshTokenRequest, RegisterRequest, RegisterResponse,
    TwoFactorRequiredResponse,
};
use crate::handlers::error::localized;
use crate::handlers::{api_error, request_context, request_language, validated, ApiError};
use crate::middleware::AuthContext;
use crate::state::AppState;

/// Handler for POST /api/v1/auth/register/
///
/// Creates an unverified account and emails a verification code.
///
/// ## Errors
/// - 400: invalid fields, weak password, disallowed email domain
/// - 409: email or username already taken
/// - 429: too many registrations from this IP
pub async fn register(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let payload = validated(body.into_inner(), lang)?;
    let context = request_context(&req, state.trusted_proxies());

    let user = state
        .auth
        .register(payload.into(), &context)
        .await
        .map_err(api_error(lang))?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: localized(
            lang,
            "Conta criada. Enviamos um código de verificação para o seu email.",
            "Account created. A verification code was sent to your email.",
        ),
        user,
    }))
}

/// Handler for POST /api/v1/auth/login/
///
/// ## Success
/// - 200: token pair and user
/// - 202: `{"requires_2fa": true}`, a code was emailed; repeat with `verification_code`
///
/// ## Errors
/// - 401: invalid credentials
/// - 403: email not verified or account inactive
/// - 429: too many attempts from this IP
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let payload = validated(body.into_inner(), lang)?;
    let context = request_context(&req, state.trusted_proxies());

    let outcome = state
        .auth
        .login(payload.into(), &context)
        .await
        .map_err(api_error(lang))?;

    match outcome {
        LoginOutcome::Authenticated(response) => Ok(HttpResponse::Ok().json(*response)),
        LoginOutcome::TwoFactorRequired => Ok(HttpResponse::Accepted().json(TwoFactorRequiredResponse {
            requires_2fa: true,
            message: localized(
                lang,
                "Enviamos um código de verificação para o seu email.",
                "A verification code was sent to your email.",
            ),
        })),
    }
}

/// Handler for POST /api/v1/auth/logout/
///
/// Blacklists the current access token, revokes the refresh token when one
/// is sent, and closes the session.
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    body: Option<web::Json<LogoutRequest>>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let body = body.map(web::Json::into_inner).unwrap_or_default();

    state
        .auth
        .logout(&auth.claims, body.refresh_token.as_deref())
        .await
        .map_err(api_error(lang))?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(localized(
        lang,
        "Sessão encerrada com sucesso",
        "Logged out successfully",
    ))))
}

/// Handler for POST /api/v1/auth/token/refresh/
///
/// Rotates the refresh token and returns a new pair. Reusing a rotated
/// token revokes the whole token family.
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let payload = validated(body.into_inner(), lang)?;

    let response = state
        .auth
        .refresh(&payload.refresh_token)
        .await
        .map_err(api_error(lang))?;

    Ok(HttpResponse::Ok().json(response))
}

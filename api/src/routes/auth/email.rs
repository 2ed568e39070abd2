//! Public endpoints driven by emailed codes, plus availability checks

use actix_web::{web, HttpRequest, HttpResponse};

use sb_shared::MessageResponse;

use crate::dto::auth::{
    EmailCheckRequest, EmailRequest, PasswordResetConfirmRequest, UsernameCheckRequest,
    VerifyEmailRequest,
};
use crate::handlers::error::localized;
use crate::handlers::{api_error, request_language, validated, ApiError};
use crate::state::AppState;

/// Handler for POST /api/v1/auth/email/verify/
///
/// Marks the account verified. Returns the updated user.
pub async fn verify_email(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<VerifyEmailRequest>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let payload = validated(body.into_inner(), lang)?;

    let user = state
        .auth
        .verify_email(&payload.email, &payload.code)
        .await
        .map_err(api_error(lang))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": localized(lang, "Email verificado com sucesso", "Email verified successfully"),
        "user": user,
    })))
}

/// Handler for POST /api/v1/auth/email/resend/
///
/// Answers the same way for unknown addresses.
///
/// ## Errors
/// - 400: already verified
/// - 429: a code was sent less than 5 minutes ago, or hourly limit reached
pub async fn resend_verification(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<EmailRequest>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let payload = validated(body.into_inner(), lang)?;

    state
        .auth
        .resend_verification(&payload.email)
        .await
        .map_err(api_error(lang))?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(localized(
        lang,
        "Se o email estiver cadastrado, um novo código foi enviado",
        "If the email is registered, a new code was sent",
    ))))
}

/// Handler for POST /api/v1/auth/password/reset/
pub async fn request_password_reset(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<EmailRequest>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let payload = validated(body.into_inner(), lang)?;

    state
        .auth
        .request_password_reset(&payload.email)
        .await
        .map_err(api_error(lang))?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(localized(
        lang,
        "Se o email estiver cadastrado, enviamos um código de redefinição",
        "If the email is registered, a reset code was sent",
    ))))
}

/// Handler for POST /api/v1/auth/password/reset/confirm/
pub async fn confirm_password_reset(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<PasswordResetConfirmRequest>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let payload = validated(body.into_inner(), lang)?;

    state
        .auth
        .confirm_password_reset(
            &payload.email,
            &payload.code,
            &payload.new_password,
            &payload.new_password_confirm,
        )
        .await
        .map_err(api_error(lang))?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(localized(
        lang,
        "Senha redefinida com sucesso",
        "Password reset successfully",
    ))))
}

/// Handler for POST /api/v1/auth/email/check/
pub async fn check_email(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<EmailCheckRequest>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let payload = validated(body.into_inner(), lang)?;

    let availability = state
        .auth
        .check_email_available(&payload.email)
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::Ok().json(availability))
}

/// Handler for POST /api/v1/auth/username/check/
///
/// Taken usernames come back with a few free alternatives.
pub async fn check_username(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<UsernameCheckRequest>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let payload = validated(body.into_inner(), lang)?;

    let availability = state
        .auth
        .check_username_available(&payload.username)
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::Ok().json(availability))
}

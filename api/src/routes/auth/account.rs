//! Endpoints acting on the logged-in account

use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use sb_core::domain::value_objects::TwoFactorToggle;
use sb_shared::MessageResponse;

use crate::dto::auth::{
    AccountProfileResponse, ChangePasswordRequest, ToggleTwoFactorRequest, TwoFactorStatusResponse,
    UpdateProfileRequest, VerificationRequiredResponse,
};
use crate::handlers::error::localized;
use crate::handlers::{api_error, request_language, validated, ApiError};
use crate::middleware::AuthContext;
use crate::state::AppState;

/// Handler for GET /api/v1/auth/profile/
pub async fn get_profile(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let account = state.auth.get_account(auth.user_id).await.map_err(api_error(lang))?;
    Ok(HttpResponse::Ok().json(AccountProfileResponse::from(account)))
}

/// Handler for PATCH /api/v1/auth/profile/
///
/// Only the fields present in the body change, including those of the
/// nested `profile` object.
pub async fn update_profile(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let payload = validated(body.into_inner(), lang)?;

    let (update, preferences) = payload.into_updates();
    let account = state
        .auth
        .update_account(auth.user_id, update, preferences)
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::Ok().json(AccountProfileResponse::from(account)))
}

/// Handler for POST /api/v1/auth/password/change/
///
/// Every refresh token of the account is revoked on success.
pub async fn change_password(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let payload = validated(body.into_inner(), lang)?;

    state
        .auth
        .change_password(
            auth.user_id,
            &payload.old_password,
            &payload.new_password,
            &payload.new_password_confirm,
        )
        .await
        .map_err(api_error(lang))?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(localized(
        lang,
        "Senha alterada com sucesso",
        "Password changed successfully",
    ))))
}

/// Handler for POST /api/v1/auth/2fa/toggle/
///
/// ## Success
/// - 200: `{"is_2fa_enabled": bool}`
/// - 202: `{"requires_verification": true}`, a code was emailed; repeat with `code`
pub async fn toggle_two_factor(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    body: web::Json<ToggleTwoFactorRequest>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let payload = validated(body.into_inner(), lang)?;

    let outcome = state
        .auth
        .toggle_two_factor(auth.user_id, payload.enable, payload.code.as_deref())
        .await
        .map_err(api_error(lang))?;

    match outcome {
        TwoFactorToggle::Updated { enabled } => {
            let message = if enabled {
                localized(lang, "Autenticação em dois fatores ativada", "Two-factor authentication enabled")
            } else {
                localized(
                    lang,
                    "Autenticação em dois fatores desativada",
                    "Two-factor authentication disabled",
                )
            };
            Ok(HttpResponse::Ok().json(TwoFactorStatusResponse {
                is_2fa_enabled: enabled,
                message,
            }))
        }
        TwoFactorToggle::VerificationRequired => Ok(HttpResponse::Accepted().json(VerificationRequiredResponse {
            requires_verification: true,
            message: localized(
                lang,
                "Enviamos um código de confirmação para o seu email.",
                "A confirmation code was sent to your email.",
            ),
        })),
    }
}

/// Handler for GET /api/v1/auth/stats/
pub async fn stats(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let stats = state.auth.stats(auth.user_id).await.map_err(api_error(lang))?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Handler for GET /api/v1/auth/security/log/
///
/// Last 50 login attempts, newest first.
pub async fn security_log(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let attempts = state.auth.security_log(auth.user_id).await.map_err(api_error(lang))?;
    Ok(HttpResponse::Ok().json(attempts))
}

/// Handler for GET /api/v1/auth/sessions/
pub async fn list_sessions(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let sessions = state.auth.list_sessions(auth.user_id).await.map_err(api_error(lang))?;
    Ok(HttpResponse::Ok().json(sessions))
}

/// Handler for DELETE /api/v1/auth/sessions/{id}/
pub async fn revoke_session(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);

    state
        .auth
        .revoke_session(auth.user_id, path.into_inner())
        .await
        .map_err(api_error(lang))?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(localized(
        lang,
        "Sessão encerrada",
        "Session revoked",
    ))))
}

/// Handler for DELETE /api/v1/auth/delete/
///
/// Deactivates the account, frees its email and username, and revokes
/// every token and session.
pub async fn delete_account(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    state.auth.delete_account(auth.user_id).await.map_err(api_error(lang))?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(localized(
        lang,
        "Conta excluída",
        "Account deleted",
    ))))
}

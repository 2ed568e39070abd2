//! Payment methods, subscriptions, payment intents and the gateway webhook

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use uuid::Uuid;

use sb_core::errors::{DomainError, PaymentError};
use sb_core::services::WebhookEvent;

use crate::dto::payment::{
    AddPaymentMethodRequest, CreatePaymentIntentRequest, SubscribeRequest, WebhookAck, WebhookQuery,
};
use crate::handlers::{api_error, request_language, validated, ApiError};
use crate::middleware::{AuthContext, JwtAuth};
use crate::state::AppState;

/// Mounts the `/payments` scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("/webhook/", web::post().to(webhook))
            .service(
                web::resource("/methods/")
                    .wrap(JwtAuth::new())
                    .route(web::get().to(list_methods))
                    .route(web::post().to(add_method)),
            )
            .service(
                web::resource("/methods/{id}/")
                    .wrap(JwtAuth::new())
                    .route(web::delete().to(remove_method)),
            )
            .service(
                web::resource("/methods/{id}/default/")
                    .wrap(JwtAuth::new())
                    .route(web::post().to(set_default_method)),
            )
            .service(
                web::resource("/subscription/")
                    .wrap(JwtAuth::new())
                    .route(web::get().to(current_subscription))
                    .route(web::post().to(subscribe)),
            )
            .service(
                web::resource("/subscription/cancel/")
                    .wrap(JwtAuth::new())
                    .route(web::post().to(cancel_subscription)),
            )
            .service(
                web::resource("/intents/")
                    .wrap(JwtAuth::new())
                    .route(web::get().to(list_intents))
                    .route(web::post().to(create_intent)),
            )
            .service(
                web::resource("/intents/{id}/")
                    .wrap(JwtAuth::new())
                    .route(web::get().to(get_intent)),
            ),
    );
}

/// Handler for GET /api/v1/payments/methods/
pub async fn list_methods(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let methods = state
        .payments
        .list_payment_methods(auth.user_id)
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::Ok().json(methods))
}

/// Handler for POST /api/v1/payments/methods/
///
/// The first card of an account becomes its default.
pub async fn add_method(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    body: web::Json<AddPaymentMethodRequest>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let payload = validated(body.into_inner(), lang)?;

    let method = state
        .payments
        .add_payment_method(auth.user_id, payload.into())
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::Created().json(method))
}

/// Handler for DELETE /api/v1/payments/methods/{id}/
pub async fn remove_method(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    state
        .payments
        .remove_payment_method(auth.user_id, path.into_inner())
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::NoContent().finish())
}

/// Handler for POST /api/v1/payments/methods/{id}/default/
pub async fn set_default_method(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let method = state
        .payments
        .set_default_payment_method(auth.user_id, path.into_inner())
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::Ok().json(method))
}

/// Handler for GET /api/v1/payments/subscription/
///
/// 404 when the account never subscribed or its last subscription was
/// cancelled.
pub async fn current_subscription(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let subscription = state
        .payments
        .current_subscription(auth.user_id)
        .await
        .map_err(api_error(lang))?
        .ok_or_else(|| ApiError::new(DomainError::Payment(PaymentError::NoActiveSubscription), lang))?;
    Ok(HttpResponse::Ok().json(subscription))
}

/// Handler for POST /api/v1/payments/subscription/
///
/// Paid plans answer with a pending subscription and the payment intent
/// to complete; the webhook activates it once the charge is approved.
pub async fn subscribe(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    body: web::Json<SubscribeRequest>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let checkout = state
        .payments
        .subscribe(auth.user_id, body.plan)
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::Created().json(checkout))
}

/// Handler for POST /api/v1/payments/subscription/cancel/
pub async fn cancel_subscription(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let subscription = state
        .payments
        .cancel_subscription(auth.user_id)
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::Ok().json(subscription))
}

/// Handler for GET /api/v1/payments/intents/
pub async fn list_intents(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let intents = state
        .payments
        .list_payment_intents(auth.user_id)
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::Ok().json(intents))
}

/// Handler for POST /api/v1/payments/intents/
pub async fn create_intent(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    body: web::Json<CreatePaymentIntentRequest>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let payload = validated(body.into_inner(), lang)?;

    let intent = state
        .payments
        .create_payment_intent(auth.user_id, payload.amount_cents, &payload.description)
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::Created().json(intent))
}

/// Handler for GET /api/v1/payments/intents/{id}/
pub async fn get_intent(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let intent = state
        .payments
        .get_payment_intent(auth.user_id, path.into_inner())
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::Ok().json(intent))
}

/// Handler for POST /api/v1/payments/webhook/
///
/// Called by Mercado Pago. The `x-signature` header is checked against the
/// `data.id` query parameter (falling back to the body) and `x-request-id`
/// before anything in the body is trusted. A body describing a different
/// object than the signed id is rejected.
///
/// ## Success
/// 200 `{"status": "processed" | "duplicate" | "ignored"}`
///
/// ## Errors
/// - 400: body is not a notification
/// - 401: missing, invalid or stale signature
pub async fn webhook(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<WebhookQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);

    let event: WebhookEvent = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Malformed webhook body");
        ApiError::bad_request(format!("malformed notification: {}", e), lang)
    })?;

    let data_id = query
        .into_inner()
        .data_id
        .unwrap_or_else(|| event.data.id.clone());

    state
        .payments
        .verify_webhook_signature(
            header_str(&req, "x-signature"),
            header_str(&req, "x-request-id"),
            &data_id,
            Utc::now(),
        )
        .map_err(api_error(lang))?;

    // the signature only covers the query id, so the body must name the same object
    if !event.data.id.eq_ignore_ascii_case(&data_id) {
        tracing::warn!(
            signed_id = %data_id,
            body_id = %event.data.id,
            event = "webhook_rejected",
            "Webhook body does not match the signed id"
        );
        return Err(ApiError::new(DomainError::Payment(PaymentError::InvalidSignature), lang));
    }

    let outcome = state.payments.handle_webhook(event).await.map_err(api_error(lang))?;
    Ok(HttpResponse::Ok().json(WebhookAck::from(outcome)))
}

fn header_str<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|value| value.to_str().ok())
}

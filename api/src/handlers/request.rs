//! Extraction helpers: client address, request context, body validation

use actix_web::{error, web, HttpRequest};
use validator::Validate;

use sb_core::services::RequestContext;
use sb_shared::Language;

use super::error::{language_of, request_language, ApiError};

/// Address of the client.
///
/// `X-Forwarded-For` is only honoured when the direct peer is one of the
/// trusted proxies.
pub fn client_ip(req: &HttpRequest, trusted_proxies: &[String]) -> Option<String> {
    let peer = req.peer_addr().map(|addr| addr.ip().to_string());

    let from_trusted_proxy = peer
        .as_deref()
        .map(|ip| trusted_proxies.iter().any(|trusted| trusted == ip))
        .unwrap_or(false);

    if from_trusted_proxy {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty());
        if forwarded.is_some() {
            return forwarded;
        }
    }

    peer
}

pub fn request_context(req: &HttpRequest, trusted_proxies: &[String]) -> RequestContext {
    let user_agent = req
        .headers()
        .get(actix_web::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    RequestContext::new(client_ip(req, trusted_proxies), user_agent)
}

/// Run `validator` checks on a request body
pub fn validated<T: Validate>(payload: T, language: Language) -> Result<T, ApiError> {
    payload
        .validate()
        .map_err(|errors| ApiError::invalid_input(&errors, language))?;
    Ok(payload)
}

/// JSON extractor settings: size limit and localized error bodies
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, req| {
            let detail = match &err {
                error::JsonPayloadError::OverflowKnownLength { .. } | error::JsonPayloadError::Overflow { .. } => {
                    "payload too large".to_string()
                }
                error::JsonPayloadError::ContentType => "expected application/json".to_string(),
                other => other.to_string(),
            };
            ApiError::bad_request(detail, request_language(req)).into()
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, req| ApiError::bad_request(err.to_string(), language_of(req.headers())).into())
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, req| ApiError::bad_request(err.to_string(), language_of(req.headers())).into())
}

//! Mapping from domain errors to HTTP responses.
//!
//! Every error body is an [`ErrorResponse`] with a stable code and a
//! message in the caller's language (Brazilian Portuguese unless the
//! `Accept-Language` header prefers English).

use std::collections::HashMap;
use std::fmt;

use actix_web::http::header::{self, HeaderMap, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use validator::ValidationErrors;

use sb_core::errors::{AuthError, DomainError, PaymentError, TokenError, ValidationError};
use sb_shared::{error_codes, ErrorResponse, Language};

/// Language preference of a request
pub fn language_of(headers: &HeaderMap) -> Language {
    headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .map(Language::from_accept_language)
        .unwrap_or_default()
}

pub fn request_language(req: &HttpRequest) -> Language {
    language_of(req.headers())
}

pub(crate) fn localized(lang: Language, pt: &str, en: &str) -> String {
    match lang {
        Language::Portuguese => pt.to_string(),
        Language::English => en.to_string(),
    }
}

/// A domain error on its way to the client
#[derive(Debug)]
pub struct ApiError {
    error: DomainError,
    language: Language,
    field_errors: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    pub fn new(error: DomainError, language: Language) -> Self {
        Self {
            error,
            language,
            field_errors: None,
        }
    }

    /// Request body failed `validator` checks
    pub fn invalid_input(errors: &ValidationErrors, language: Language) -> Self {
        let field_errors: HashMap<String, Vec<String>> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let codes = errs.iter().map(|e| e.code.to_string()).collect();
                (field.to_string(), codes)
            })
            .collect();

        let mut fields: Vec<&String> = field_errors.keys().collect();
        fields.sort();
        let message = format!(
            "Invalid fields: {}",
            fields.iter().map(|f| f.as_str()).collect::<Vec<_>>().join(", ")
        );

        Self {
            error: DomainError::Validation { message },
            language,
            field_errors: Some(field_errors),
        }
    }

    /// Malformed JSON, query string or path parameter
    pub fn bad_request(detail: impl Into<String>, language: Language) -> Self {
        Self::new(
            DomainError::Validation {
                message: detail.into(),
            },
            language,
        )
    }

    pub fn domain_error(&self) -> &DomainError {
        &self.error
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_for(&self.error)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self.error, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self.error, status = status.as_u16(), "Request rejected");
        }

        let mut body = ErrorResponse::new(code_for(&self.error), message_for(&self.error, self.language));
        body = with_details(body, &self.error);
        if let Some(field_errors) = &self.field_errors {
            body = body.add_detail("fields", field_errors);
        }

        let mut response = HttpResponse::build(status);
        if let Some(seconds) = retry_after(&self.error) {
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.insert_header((header::RETRY_AFTER, value));
            }
        }
        response.json(body)
    }
}

/// Adapter for `map_err`, e.g. `service.call().await.map_err(api_error(lang))?`
pub fn api_error(language: Language) -> impl Fn(DomainError) -> ApiError {
    move |error| ApiError::new(error, language)
}

fn retry_after(error: &DomainError) -> Option<u64> {
    match error {
        DomainError::Auth(AuthError::RateLimitExceeded { seconds })
        | DomainError::Auth(AuthError::ResendTooSoon { seconds }) => Some(*seconds),
        _ => None,
    }
}

pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Validation { .. } | DomainError::ValidationErr(_) => StatusCode::BAD_REQUEST,
        DomainError::BusinessRule { .. } => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden => StatusCode::FORBIDDEN,
        DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        DomainError::Auth(auth) => match auth {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::EmailNotVerified | AuthError::AccountInactive => StatusCode::FORBIDDEN,
            AuthError::EmailAlreadyExists | AuthError::UsernameAlreadyExists => StatusCode::CONFLICT,
            AuthError::UserNotFound | AuthError::SessionNotFound => StatusCode::NOT_FOUND,
            AuthError::MaxAttemptsExceeded
            | AuthError::RateLimitExceeded { .. }
            | AuthError::ResendTooSoon { .. } => StatusCode::TOO_MANY_REQUESTS,
            AuthError::EmailServiceFailure => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::PasswordMismatch
            | AuthError::IncorrectPassword
            | AuthError::PasswordUnchanged
            | AuthError::WeakPassword { .. }
            | AuthError::AlreadyVerified
            | AuthError::InvalidVerificationCode
            | AuthError::VerificationCodeExpired
            | AuthError::VerificationCodeUsed => StatusCode::BAD_REQUEST,
        },
        DomainError::Token(TokenError::TokenGenerationFailed) => StatusCode::INTERNAL_SERVER_ERROR,
        DomainError::Token(_) => StatusCode::UNAUTHORIZED,
        DomainError::Payment(payment) => match payment {
            PaymentError::MissingSignature | PaymentError::InvalidSignature | PaymentError::StaleWebhook => {
                StatusCode::UNAUTHORIZED
            }
            PaymentError::AlreadySubscribed { .. } => StatusCode::CONFLICT,
            PaymentError::NoActiveSubscription => StatusCode::NOT_FOUND,
            PaymentError::UnsupportedEvent { .. }
            | PaymentError::InvalidAmount
            | PaymentError::PaymentMethodExpired => StatusCode::BAD_REQUEST,
        },
    }
}

pub fn code_for(error: &DomainError) -> &'static str {
    match error {
        DomainError::Validation { .. } | DomainError::ValidationErr(_) => error_codes::VALIDATION_ERROR,
        DomainError::BusinessRule { .. } => error_codes::BAD_REQUEST,
        DomainError::NotFound { .. } => error_codes::NOT_FOUND,
        DomainError::Unauthorized => error_codes::UNAUTHORIZED,
        DomainError::Forbidden => error_codes::FORBIDDEN,
        DomainError::Internal { .. } => error_codes::INTERNAL_ERROR,
        DomainError::Auth(auth) => match auth {
            AuthError::InvalidCredentials | AuthError::IncorrectPassword => error_codes::INVALID_CREDENTIALS,
            AuthError::EmailNotVerified => error_codes::EMAIL_NOT_VERIFIED,
            AuthError::AccountInactive => error_codes::ACCOUNT_INACTIVE,
            AuthError::EmailAlreadyExists | AuthError::UsernameAlreadyExists => error_codes::CONFLICT,
            AuthError::UserNotFound | AuthError::SessionNotFound => error_codes::NOT_FOUND,
            AuthError::WeakPassword { .. } => error_codes::WEAK_PASSWORD,
            AuthError::PasswordMismatch | AuthError::PasswordUnchanged | AuthError::AlreadyVerified => {
                error_codes::BAD_REQUEST
            }
            AuthError::InvalidVerificationCode | AuthError::VerificationCodeUsed => {
                error_codes::VERIFICATION_CODE_INVALID
            }
            AuthError::VerificationCodeExpired => error_codes::VERIFICATION_CODE_EXPIRED,
            AuthError::MaxAttemptsExceeded => error_codes::VERIFICATION_ATTEMPTS_EXCEEDED,
            AuthError::RateLimitExceeded { .. } | AuthError::ResendTooSoon { .. } => {
                error_codes::RATE_LIMIT_EXCEEDED
            }
            AuthError::EmailServiceFailure => error_codes::EMAIL_SERVICE_ERROR,
        },
        DomainError::Token(token) => match token {
            TokenError::TokenExpired => error_codes::TOKEN_EXPIRED,
            TokenError::TokenRevoked | TokenError::TokenReuseDetected => error_codes::TOKEN_REVOKED,
            TokenError::TokenGenerationFailed => error_codes::INTERNAL_ERROR,
            _ => error_codes::TOKEN_INVALID,
        },
        DomainError::Payment(payment) => match payment {
            PaymentError::MissingSignature | PaymentError::InvalidSignature | PaymentError::StaleWebhook => {
                error_codes::WEBHOOK_SIGNATURE_INVALID
            }
            PaymentError::AlreadySubscribed { .. } => error_codes::CONFLICT,
            PaymentError::NoActiveSubscription => error_codes::NOT_FOUND,
            _ => error_codes::PAYMENT_ERROR,
        },
    }
}

fn with_details(body: ErrorResponse, error: &DomainError) -> ErrorResponse {
    match error {
        DomainError::Auth(AuthError::WeakPassword { errors }) => body.add_detail("password", errors),
        DomainError::Auth(AuthError::RateLimitExceeded { seconds })
        | DomainError::Auth(AuthError::ResendTooSoon { seconds }) => body.add_detail("retry_after", seconds),
        DomainError::ValidationErr(ValidationError::RequiredField { field })
        | DomainError::ValidationErr(ValidationError::InvalidFormat { field })
        | DomainError::ValidationErr(ValidationError::TooLong { field, .. })
        | DomainError::ValidationErr(ValidationError::OutOfRange { field, .. }) => body.add_detail("field", field),
        _ => body,
    }
}

pub fn message_for(error: &DomainError, lang: Language) -> String {
    match error {
        DomainError::Validation { message } => match lang {
            Language::Portuguese => format!("Dados inválidos: {}", message),
            Language::English => format!("Invalid input: {}", message),
        },
        DomainError::BusinessRule { message } => message.clone(),
        DomainError::NotFound { resource } => match lang {
            Language::Portuguese => format!("Recurso não encontrado: {}", resource),
            Language::English => format!("{} not found", resource),
        },
        DomainError::Unauthorized => localized(lang, "Autenticação necessária", "Authentication required"),
        DomainError::Forbidden => localized(
            lang,
            "Você não tem permissão para esta ação",
            "You are not allowed to perform this action",
        ),
        DomainError::Internal { .. } => localized(lang, "Ocorreu um erro interno", "An internal error occurred"),
        DomainError::Auth(auth) => auth_message(auth, lang),
        DomainError::Token(token) => token_message(token, lang),
        DomainError::ValidationErr(validation) => validation_message(validation, lang),
        DomainError::Payment(payment) => payment_message(payment, lang),
    }
}

fn auth_message(error: &AuthError, lang: Language) -> String {
    match error {
        AuthError::InvalidCredentials => localized(lang, "Email ou senha inválidos", "Invalid email or password"),
        AuthError::EmailNotVerified => localized(
            lang,
            "Email não verificado. Verifique sua caixa de entrada",
            "Email not verified. Please check your inbox",
        ),
        AuthError::AccountInactive => localized(lang, "Conta desativada", "Account is inactive"),
        AuthError::EmailAlreadyExists => localized(lang, "Este email já está em uso", "This email is already in use"),
        AuthError::UsernameAlreadyExists => localized(
            lang,
            "Este nome de usuário já está em uso",
            "This username is already taken",
        ),
        AuthError::UserNotFound => localized(lang, "Usuário não encontrado", "User not found"),
        AuthError::PasswordMismatch => localized(lang, "As senhas não coincidem", "Passwords do not match"),
        AuthError::IncorrectPassword => localized(lang, "Senha atual incorreta", "Current password is incorrect"),
        AuthError::PasswordUnchanged => localized(
            lang,
            "A nova senha deve ser diferente da atual",
            "The new password must differ from the current one",
        ),
        AuthError::WeakPassword { .. } => localized(
            lang,
            "A senha não atende aos requisitos de segurança",
            "Password does not meet the security requirements",
        ),
        AuthError::AlreadyVerified => localized(lang, "Email já verificado", "Email is already verified"),
        AuthError::InvalidVerificationCode => localized(
            lang,
            "Código de verificação inválido",
            "Invalid verification code",
        ),
        AuthError::VerificationCodeExpired => localized(
            lang,
            "Código de verificação expirado. Solicite um novo código",
            "Verification code has expired. Please request a new one",
        ),
        AuthError::VerificationCodeUsed => localized(
            lang,
            "Este código já foi utilizado",
            "This code has already been used",
        ),
        AuthError::MaxAttemptsExceeded => localized(
            lang,
            "Número máximo de tentativas excedido. Solicite um novo código",
            "Maximum verification attempts exceeded. Please request a new code",
        ),
        AuthError::RateLimitExceeded { seconds } => match lang {
            Language::Portuguese => format!("Muitas requisições. Tente novamente em {} segundos", seconds),
            Language::English => format!("Too many requests. Please try again in {} seconds", seconds),
        },
        AuthError::ResendTooSoon { seconds } => match lang {
            Language::Portuguese => format!("Aguarde {} segundos antes de solicitar um novo código", seconds),
            Language::English => format!("Please wait {} seconds before requesting a new code", seconds),
        },
        AuthError::EmailServiceFailure => localized(
            lang,
            "Serviço de email indisponível. Tente novamente mais tarde",
            "Email service is temporarily unavailable. Please try again later",
        ),
        AuthError::SessionNotFound => localized(lang, "Sessão não encontrada", "Session not found"),
    }
}

fn token_message(error: &TokenError, lang: Language) -> String {
    match error {
        TokenError::TokenExpired => localized(
            lang,
            "Token expirado. Faça login novamente",
            "Token has expired. Please log in again",
        ),
        TokenError::TokenRevoked | TokenError::TokenReuseDetected => {
            localized(lang, "Token revogado", "Token has been revoked")
        }
        TokenError::TokenGenerationFailed => localized(lang, "Ocorreu um erro interno", "An internal error occurred"),
        _ => localized(lang, "Token inválido", "Invalid token"),
    }
}

fn validation_message(error: &ValidationError, lang: Language) -> String {
    match error {
        ValidationError::RequiredField { field } => match lang {
            Language::Portuguese => format!("O campo {} é obrigatório", field),
            Language::English => format!("The {} field is required", field),
        },
        ValidationError::InvalidFormat { field } => match lang {
            Language::Portuguese => format!("Formato inválido para {}", field),
            Language::English => format!("Invalid format for {}", field),
        },
        ValidationError::OutOfRange { field, min, max } => match lang {
            Language::Portuguese => format!("{} deve estar entre {} e {}", field, min, max),
            Language::English => format!("{} must be between {} and {}", field, min, max),
        },
        ValidationError::TooLong { field, max } => match lang {
            Language::Portuguese => format!("{} deve ter no máximo {} caracteres", field, max),
            Language::English => format!("{} must be at most {} characters", field, max),
        },
        ValidationError::InvalidEmail => localized(lang, "Email inválido", "Invalid email address"),
        ValidationError::EmailDomainNotAllowed => localized(
            lang,
            "Domínio de email não permitido",
            "Email domain is not allowed",
        ),
        ValidationError::InvalidCoordinate => localized(lang, "Coordenadas inválidas", "Invalid coordinates"),
    }
}

fn payment_message(error: &PaymentError, lang: Language) -> String {
    match error {
        PaymentError::MissingSignature | PaymentError::InvalidSignature | PaymentError::StaleWebhook => {
            localized(lang, "Assinatura do webhook inválida", "Invalid webhook signature")
        }
        PaymentError::UnsupportedEvent { event_type } => match lang {
            Language::Portuguese => format!("Evento não suportado: {}", event_type),
            Language::English => format!("Unsupported event: {}", event_type),
        },
        PaymentError::InvalidAmount => localized(lang, "Valor inválido", "Invalid amount"),
        PaymentError::PaymentMethodExpired => localized(lang, "Cartão expirado", "Card has expired"),
        PaymentError::AlreadySubscribed { plan } => match lang {
            Language::Portuguese => format!("Você já assina o plano {}", plan),
            Language::English => format!("You are already subscribed to the {} plan", plan),
        },
        PaymentError::NoActiveSubscription => localized(
            lang,
            "Nenhuma assinatura ativa",
            "No active subscription",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::test::TestRequest;

    #[test]
    fn test_language_from_headers() {
        let req = TestRequest::default()
            .insert_header((header::ACCEPT_LANGUAGE, "en-US,en;q=0.9"))
            .to_http_request();
        assert_eq!(request_language(&req), Language::English);

        let req = TestRequest::default().to_http_request();
        assert_eq!(request_language(&req), Language::Portuguese);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&AuthError::EmailAlreadyExists.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&AuthError::MaxAttemptsExceeded.into()),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(status_for(&TokenError::TokenExpired.into()), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_for(&PaymentError::InvalidSignature.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_for(&DomainError::Forbidden), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_rate_limit_response_has_retry_after() {
        let error = ApiError::new(AuthError::RateLimitExceeded { seconds: 42 }.into(), Language::English);
        let response = error.error_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "42");

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "RATE_LIMIT_EXCEEDED");
        assert_eq!(json["details"]["retry_after"], 42);
        assert!(json["message"].as_str().unwrap().contains("42 seconds"));
    }

    #[actix_web::test]
    async fn test_internal_errors_hide_details() {
        let error = ApiError::new(DomainError::internal("db password leaked"), Language::Portuguese);
        let body = to_bytes(error.error_response().into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("leaked"));
        assert!(text.contains("Ocorreu um erro interno"));
    }
}

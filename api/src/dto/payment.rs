use serde::{Deserialize, Serialize};
use validator::Validate;

use sb_core::domain::entities::SubscriptionPlan;
use sb_core::services::{NewPaymentMethod, WebhookOutcome};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddPaymentMethodRequest {
    /// Card token issued by the gateway's client SDK
    #[validate(length(min = 1, max = 255))]
    pub provider_id: String,

    #[validate(length(min = 1, max = 50))]
    pub brand: String,

    #[validate(length(equal = 4))]
    pub last_four: String,

    #[validate(range(min = 1, max = 12))]
    pub exp_month: u32,

    #[validate(range(min = 2000, max = 2100))]
    pub exp_year: i32,
}

impl From<AddPaymentMethodRequest> for NewPaymentMethod {
    fn from(request: AddPaymentMethodRequest) -> Self {
        Self {
            provider_id: request.provider_id,
            brand: request.brand,
            last_four: request.last_four,
            exp_month: request.exp_month,
            exp_year: request.exp_year,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub plan: SubscriptionPlan,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePaymentIntentRequest {
    /// Amount in BRL cents; must be positive
    pub amount_cents: i64,

    #[validate(length(min = 1, max = 255))]
    pub description: String,
}

/// Query string Mercado Pago appends to notification URLs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookQuery {
    #[serde(rename = "data.id")]
    pub data_id: Option<String>,
    #[serde(rename = "type")]
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub status: String,
}

impl From<WebhookOutcome> for WebhookAck {
    fn from(outcome: WebhookOutcome) -> Self {
        let status = match outcome {
            WebhookOutcome::Processed => "processed",
            WebhookOutcome::Duplicate => "duplicate",
            WebhookOutcome::Ignored => "ignored",
        };
        Self {
            status: status.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_method_validation() {
        let request = AddPaymentMethodRequest {
            provider_id: "card_123".to_string(),
            brand: "visa".to_string(),
            last_four: "4242".to_string(),
            exp_month: 13,
            exp_year: 2030,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("exp_month"));
    }

    #[test]
    fn test_webhook_query_reads_dotted_key() {
        let query: WebhookQuery = parse_query("data.id=123456&type=payment");
        assert_eq!(query.data_id.as_deref(), Some("123456"));
        assert_eq!(query.topic.as_deref(), Some("payment"));
    }

    fn parse_query(query: &str) -> WebhookQuery {
        actix_web::web::Query::<WebhookQuery>::from_query(query)
            .unwrap()
            .into_inner()
    }

    #[test]
    fn test_unknown_plan_is_rejected() {
        assert!(serde_json::from_str::<SubscribeRequest>(r#"{"plan": "gold"}"#).is_err());
        let request: SubscribeRequest = serde_json::from_str(r#"{"plan": "premium"}"#).unwrap();
        assert_eq!(request.plan, SubscriptionPlan::Premium);
    }
}

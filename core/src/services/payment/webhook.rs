//! Mercado Pago webhook notifications and their signatures.
//!
//! The `x-signature` header looks like `ts=1704908010,v1=<hex>`. The signed
//! manifest is `id:{data.id};request-id:{x-request-id};ts:{ts};`, with parts
//! left out when the value is absent.

use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sha2::Sha256;

use crate::errors::PaymentError;

type HmacSha256 = Hmac<Sha256>;

pub const PAYMENT_EVENT: &str = "payment";
pub const SUBSCRIPTION_EVENT: &str = "subscription_preapproval";

/// Timestamps above this are in milliseconds
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Notification body posted by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Notification id, used for idempotency
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub action: Option<String>,
    pub data: WebhookData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookData {
    /// Gateway id of the payment or preapproval
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Gateway status, when included in the notification
    #[serde(default)]
    pub status: Option<String>,
    /// Our own id, set when the object was created
    #[serde(default)]
    pub external_reference: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Builds the string the gateway signs
pub fn build_manifest(data_id: &str, request_id: Option<&str>, ts: &str) -> String {
    let mut manifest = String::new();
    if !data_id.is_empty() {
        // alphanumeric ids are signed lowercased
        manifest.push_str(&format!("id:{};", data_id.to_lowercase()));
    }
    if let Some(request_id) = request_id.filter(|r| !r.is_empty()) {
        manifest.push_str(&format!("request-id:{};", request_id));
    }
    manifest.push_str(&format!("ts:{};", ts));
    manifest
}

/// Hex encoded HMAC-SHA256 of `manifest`
pub fn compute_signature(secret: &str, manifest: &str) -> Result<String, PaymentError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| PaymentError::InvalidSignature)?;
    mac.update(manifest.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks an `x-signature` header
///
/// # Errors
/// * `MissingSignature` - header absent or without `ts`/`v1`
/// * `StaleWebhook` - timestamp further than `tolerance_seconds` from `now`
/// * `InvalidSignature` - HMAC mismatch
pub fn verify_signature(
    secret: &str,
    signature_header: Option<&str>,
    request_id: Option<&str>,
    data_id: &str,
    now: DateTime<Utc>,
    tolerance_seconds: i64,
) -> Result<(), PaymentError> {
    let header = signature_header.ok_or(PaymentError::MissingSignature)?;

    let mut ts = None;
    let mut v1 = None;
    for part in header.split(',') {
        if let Some((key, value)) = part.split_once('=') {
            match key.trim() {
                "ts" => ts = Some(value.trim()),
                "v1" => v1 = Some(value.trim()),
                _ => {}
            }
        }
    }
    let ts = ts.ok_or(PaymentError::MissingSignature)?;
    let v1 = v1.ok_or(PaymentError::MissingSignature)?;

    let timestamp: i64 = ts.parse().map_err(|_| PaymentError::InvalidSignature)?;
    let timestamp = if timestamp > MILLIS_THRESHOLD {
        timestamp / 1000
    } else {
        timestamp
    };
    let skew = now
        .timestamp()
        .checked_sub(timestamp)
        .map(i64::unsigned_abs)
        .ok_or(PaymentError::StaleWebhook)?;
    if timestamp <= 0 || skew > tolerance_seconds.unsigned_abs() {
        return Err(PaymentError::StaleWebhook);
    }

    let expected = compute_signature(secret, &build_manifest(data_id, request_id, ts))?;
    if !constant_time_eq(expected.as_bytes(), v1.to_lowercase().as_bytes()) {
        return Err(PaymentError::InvalidSignature);
    }

    Ok(())
}

use chrono::{Duration, Utc};
use serde_json::json;

use std::sync::Arc;

use super::{failing_service, FailingIntentUpdates, Fixture, SECRET};
use crate::domain::entities::payment::{PaymentStatus, SubscriptionStatus};
use crate::domain::entities::user::SubscriptionPlan;
use crate::errors::{DomainError, PaymentError};
use crate::repositories::{PaymentRepository, UserRepository};
use crate::services::payment::{
    build_manifest, compute_signature, verify_signature, WebhookEvent, WebhookOutcome,
};

fn signed_header(data_id: &str, request_id: Option<&str>, ts: i64) -> String {
    let manifest = build_manifest(data_id, request_id, &ts.to_string());
    let signature = compute_signature(SECRET, &manifest).unwrap();
    format!("ts={},v1={}", ts, signature)
}

fn payment_event(id: &str, data_id: &str, status: &str, reference: Option<String>) -> WebhookEvent {
    serde_json::from_value(json!({
        "id": id,
        "type": "payment",
        "action": "payment.updated",
        "data": {
            "id": data_id,
            "status": status,
            "external_reference": reference,
        }
    }))
    .unwrap()
}

#[test]
fn test_manifest_format() {
    assert_eq!(
        build_manifest("ABC123", Some("req-1"), "1704908010"),
        "id:abc123;request-id:req-1;ts:1704908010;"
    );
    assert_eq!(build_manifest("123", None, "1"), "id:123;ts:1;");
}

#[test]
fn test_valid_signature_accepted() {
    let now = Utc::now();
    let header = signed_header("98765", Some("req-42"), now.timestamp());

    assert_eq!(
        verify_signature(SECRET, Some(&header), Some("req-42"), "98765", now, 300),
        Ok(())
    );
}

#[test]
fn test_millisecond_timestamps_accepted() {
    let now = Utc::now();
    let header = signed_header("98765", None, now.timestamp_millis());

    assert_eq!(verify_signature(SECRET, Some(&header), None, "98765", now, 300), Ok(()));
}

#[test]
fn test_signature_rejections() {
    let now = Utc::now();

    assert_eq!(
        verify_signature(SECRET, None, None, "1", now, 300),
        Err(PaymentError::MissingSignature)
    );
    assert_eq!(
        verify_signature(SECRET, Some("v1=abc"), None, "1", now, 300),
        Err(PaymentError::MissingSignature)
    );

    let stale = signed_header("1", None, (now - Duration::minutes(10)).timestamp());
    assert_eq!(
        verify_signature(SECRET, Some(&stale), None, "1", now, 300),
        Err(PaymentError::StaleWebhook)
    );

    let header = signed_header("1", None, now.timestamp());
    assert_eq!(
        verify_signature("other-secret", Some(&header), None, "1", now, 300),
        Err(PaymentError::InvalidSignature)
    );
    // signed for a different object
    assert_eq!(
        verify_signature(SECRET, Some(&header), None, "2", now, 300),
        Err(PaymentError::InvalidSignature)
    );
}

#[test]
fn test_extreme_timestamps_are_stale() {
    let now = Utc::now();

    for ts in ["-9223372036854775000", "-1", "0", "9223372036854775807"] {
        let header = format!("ts={},v1=00", ts);
        assert_eq!(
            verify_signature(SECRET, Some(&header), Some("req"), "1", now, 300),
            Err(PaymentError::StaleWebhook),
            "ts={}",
            ts
        );
    }

    let future = signed_header("1", None, (now + Duration::hours(2)).timestamp());
    assert_eq!(
        verify_signature(SECRET, Some(&future), None, "1", now, 300),
        Err(PaymentError::StaleWebhook)
    );

    let stale_millis = signed_header("1", None, (now - Duration::minutes(10)).timestamp_millis());
    assert_eq!(
        verify_signature(SECRET, Some(&stale_millis), None, "1", now, 300),
        Err(PaymentError::StaleWebhook)
    );
}

#[test]
fn test_event_accepts_numeric_ids() {
    let event: WebhookEvent = serde_json::from_value(json!({
        "id": 12345678,
        "type": "payment",
        "data": { "id": 999 }
    }))
    .unwrap();
    assert_eq!(event.id, "12345678");
    assert_eq!(event.data.id, "999");
    assert!(event.data.status.is_none());
}

#[test]
fn test_service_signature_check() {
    let fixture = Fixture::new();
    let now = Utc::now();
    let header = signed_header("55", Some("r"), now.timestamp());

    assert!(fixture
        .service
        .verify_webhook_signature(Some(&header), Some("r"), "55", now)
        .is_ok());
    assert_eq!(
        fixture.service.verify_webhook_signature(Some(&header), None, "55", now),
        Err(DomainError::Payment(PaymentError::InvalidSignature))
    );
}

#[tokio::test]
async fn test_approved_payment_activates_subscription() {
    let fixture = Fixture::new();
    let user = fixture.user().await;
    let checkout = fixture.service.subscribe(user.id, SubscriptionPlan::Basic).await.unwrap();
    let intent = checkout.payment_intent.unwrap();

    let event = payment_event("evt-1", "mp-777", "approved", Some(intent.id.to_string()));
    let outcome = fixture.service.handle_webhook(event).await.unwrap();
    assert_eq!(outcome, WebhookOutcome::Processed);

    let intent = fixture.payments.find_intent(intent.id).await.unwrap().unwrap();
    assert_eq!(intent.status, PaymentStatus::Approved);
    assert_eq!(intent.provider_payment_id.as_deref(), Some("mp-777"));

    let subscription = fixture
        .payments
        .find_subscription(checkout.subscription.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(subscription.status, SubscriptionStatus::Active);
    assert!(subscription.current_period_end.is_some());

    let user = fixture.users.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(user.subscription_plan, SubscriptionPlan::Basic);
    assert!(user.is_subscription_active());
}

#[tokio::test]
async fn test_duplicate_webhook_is_noop() {
    let fixture = Fixture::new();
    let user = fixture.user().await;
    let intent = fixture
        .service
        .create_payment_intent(user.id, 990, "Relatório")
        .await
        .unwrap();

    let event = payment_event("evt-dup", "mp-1", "rejected", Some(intent.id.to_string()));
    assert_eq!(
        fixture.service.handle_webhook(event.clone()).await.unwrap(),
        WebhookOutcome::Processed
    );

    // a later redelivery with a different status must not apply
    let mut replay = event;
    replay.data.status = Some("approved".to_string());
    assert_eq!(
        fixture.service.handle_webhook(replay).await.unwrap(),
        WebhookOutcome::Duplicate
    );

    let intent = fixture.payments.find_intent(intent.id).await.unwrap().unwrap();
    assert_eq!(intent.status, PaymentStatus::Rejected);
}

#[tokio::test]
async fn test_failed_processing_is_retried_on_redelivery() {
    let fixture = Fixture::new();
    let user = fixture.user().await;
    let intent = fixture
        .service
        .create_payment_intent(user.id, 990, "Relatório")
        .await
        .unwrap();

    let repository = Arc::new(FailingIntentUpdates::new(fixture.payments.clone()));
    let service = failing_service(repository.clone(), fixture.users.clone());

    let event = payment_event("evt-retry", "mp-9", "approved", Some(intent.id.to_string()));
    assert!(service.handle_webhook(event.clone()).await.is_err());

    let stored = fixture.payments.find_intent(intent.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Pending);

    repository.recover();
    assert_eq!(
        service.handle_webhook(event.clone()).await.unwrap(),
        WebhookOutcome::Processed
    );
    assert_eq!(service.handle_webhook(event).await.unwrap(), WebhookOutcome::Duplicate);

    let stored = fixture.payments.find_intent(intent.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Approved);
}

#[tokio::test]
async fn test_payment_found_by_provider_id() {
    let fixture = Fixture::new();
    let user = fixture.user().await;
    let intent = fixture
        .service
        .create_payment_intent(user.id, 990, "Relatório")
        .await
        .unwrap();

    let first = payment_event("evt-a", "mp-55", "in_process", Some(intent.id.to_string()));
    fixture.service.handle_webhook(first).await.unwrap();

    let second = payment_event("evt-b", "mp-55", "refunded", None);
    assert_eq!(
        fixture.service.handle_webhook(second).await.unwrap(),
        WebhookOutcome::Processed
    );

    let intent = fixture.payments.find_intent(intent.id).await.unwrap().unwrap();
    assert_eq!(intent.status, PaymentStatus::Refunded);
}

#[tokio::test]
async fn test_unknown_events_are_ignored() {
    let fixture = Fixture::new();

    let unknown_payment = payment_event("evt-x", "mp-404", "approved", None);
    assert_eq!(
        fixture.service.handle_webhook(unknown_payment).await.unwrap(),
        WebhookOutcome::Ignored
    );

    let odd_status = payment_event("evt-y", "mp-404", "something_new", None);
    assert_eq!(
        fixture.service.handle_webhook(odd_status).await.unwrap(),
        WebhookOutcome::Ignored
    );

    let other_type: WebhookEvent = serde_json::from_value(json!({
        "id": "evt-z",
        "type": "point_integration_wh",
        "data": { "id": "1" }
    }))
    .unwrap();
    assert_eq!(
        fixture.service.handle_webhook(other_type).await.unwrap(),
        WebhookOutcome::Ignored
    );
}

#[tokio::test]
async fn test_preapproval_cancellation() {
    let fixture = Fixture::new();
    let user = fixture.user().await;
    let checkout = fixture.service.subscribe(user.id, SubscriptionPlan::Premium).await.unwrap();

    let event: WebhookEvent = serde_json::from_value(json!({
        "id": "evt-sub",
        "type": "subscription_preapproval",
        "data": {
            "id": "pre-1",
            "status": "cancelled",
            "external_reference": checkout.subscription.id.to_string(),
        }
    }))
    .unwrap();
    assert_eq!(
        fixture.service.handle_webhook(event).await.unwrap(),
        WebhookOutcome::Processed
    );

    let subscription = fixture
        .payments
        .find_subscription(checkout.subscription.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(subscription.status, SubscriptionStatus::Cancelled);
    assert_eq!(subscription.provider_id.as_deref(), Some("pre-1"));
}

//! Payout confirmation flow.

mod common;

use bus_claims_api::models::payment::PayoutStatus;
use common::*;
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

const CONFIRM: &str = "/api/admin/payouts/confirm";

fn confirm_body(claim_id: Uuid, payment_id: Uuid, reference: &str) -> Value {
    json!({
        "claimId": claim_id,
        "paymentId": payment_id,
        "reference": reference,
    })
}

#[tokio::test]
async fn confirms_payout_and_returns_receipt() {
    let app = TestApp::spawn().await;
    let payment = app.seed_payment(10_000, Some(8_500)).await;

    let response = app
        .post_json(CONFIRM, Some(ADMIN_TOKEN), &confirm_body(payment.claim_id, payment.id, "TRF-42"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let receipt: Value = response.json().await.expect("Failed to parse receipt");
    assert_eq!(receipt["success"], true);
    assert_eq!(receipt["paymentId"], payment.id.to_string());
    assert_eq!(receipt["claimId"], payment.claim_id.to_string());
    assert_eq!(receipt["reference"], "TRF-42");
    assert_eq!(receipt["payoutAmountCents"], 8_500);
    assert_eq!(receipt["commissionCents"], 1_500);
    assert_eq!(receipt["notificationSent"], true);

    let stored = app.store.payment(payment.id).await.expect("payment stored");
    assert_eq!(stored.payout_status(), PayoutStatus::Completed);
    assert_eq!(stored.payout_reference.as_deref(), Some("TRF-42"));
    assert!(stored.payout_completed_at.is_some());

    let events = app.notifier.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].payment_id, payment.id);
}

#[tokio::test]
async fn applies_commission_rate_without_fixed_payout() {
    let app = TestApp::spawn().await;
    let payment = app.seed_payment(10_000, None).await;

    let response = app
        .post_json(CONFIRM, Some(SUPER_ADMIN_TOKEN), &confirm_body(payment.claim_id, payment.id, "TRF-43"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let receipt: Value = response.json().await.expect("Failed to parse receipt");
    assert_eq!(receipt["payoutAmountCents"], 8_000);
    assert_eq!(receipt["commissionCents"], 2_000);
}

#[tokio::test]
async fn commission_rate_setting_drives_split() {
    let app = TestApp::spawn().await;
    let response = app
        .put_json("/api/admin/settings", Some(ADMIN_TOKEN), &json!({"commission_rate": 0.15}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let payment = app.seed_payment(10_000, None).await;
    let response = app
        .post_json(CONFIRM, Some(ADMIN_TOKEN), &confirm_body(payment.claim_id, payment.id, "TRF-48"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let receipt: Value = response.json().await.expect("Failed to parse receipt");
    assert_eq!(receipt["payoutAmountCents"], 8_500);
    assert_eq!(receipt["commissionCents"], 1_500);

    let stored = app.store.payment(payment.id).await.expect("payment stored");
    assert_eq!(stored.commission_cents, Some(1_500));
}

#[tokio::test]
async fn second_confirmation_conflicts() {
    let app = TestApp::spawn().await;
    let payment = app.seed_payment(10_000, None).await;
    let body = confirm_body(payment.claim_id, payment.id, "TRF-44");

    let first = app.post_json(CONFIRM, Some(ADMIN_TOKEN), &body).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.post_json(CONFIRM, Some(ADMIN_TOKEN), &body).await;
    assert_error(second, StatusCode::CONFLICT, "PAYOUT_ALREADY_COMPLETED").await;

    // Only the first confirmation notified the customer
    assert_eq!(app.notifier.events().await.len(), 1);
}

#[tokio::test]
async fn notification_failure_keeps_payout_completed() {
    let app = TestApp::builder()
        .notifier(bus_claims_api::testing::RecordingNotifier::failing())
        .spawn()
        .await;
    let payment = app.seed_payment(5_000, None).await;

    let response = app
        .post_json(CONFIRM, Some(ADMIN_TOKEN), &confirm_body(payment.claim_id, payment.id, "TRF-45"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let receipt: Value = response.json().await.expect("Failed to parse receipt");
    assert_eq!(receipt["success"], true);
    assert_eq!(receipt["notificationSent"], false);

    let stored = app.store.payment(payment.id).await.expect("payment stored");
    assert_eq!(stored.payout_status(), PayoutStatus::Completed);
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(CONFIRM, Some(ADMIN_TOKEN), &json!({"claimId": Uuid::new_v4(), "reference": "TRF"}))
        .await;
    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_REQUEST").await;

    let response = app
        .post_json(
            CONFIRM,
            Some(ADMIN_TOKEN),
            &json!({"claimId": Uuid::new_v4(), "paymentId": Uuid::new_v4(), "reference": "  "}),
        )
        .await;
    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_REQUEST").await;
}

#[tokio::test]
async fn unknown_payment_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(CONFIRM, Some(ADMIN_TOKEN), &confirm_body(Uuid::new_v4(), Uuid::new_v4(), "TRF-46"))
        .await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[tokio::test]
async fn payment_of_another_claim_is_not_found() {
    let app = TestApp::spawn().await;
    let payment = app.seed_payment(10_000, None).await;

    let response = app
        .post_json(CONFIRM, Some(ADMIN_TOKEN), &confirm_body(Uuid::new_v4(), payment.id, "TRF-47"))
        .await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;

    let stored = app.store.payment(payment.id).await.expect("payment stored");
    assert_eq!(stored.payout_status(), PayoutStatus::Pending);
}

#[tokio::test]
async fn mistyped_ids_are_invalid_requests() {
    let app = TestApp::spawn().await;
    let payment = app.seed_payment(10_000, None).await;
    let body = json!({
        "claimId": 123,
        "paymentId": payment.id,
        "reference": "TRF-50",
    });

    let response = app.post_json(CONFIRM, Some(ADMIN_TOKEN), &body).await;
    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_REQUEST").await;

    let stored = app.store.payment(payment.id).await.expect("payment stored");
    assert_eq!(stored.payout_status(), PayoutStatus::Pending);
}

//! Payout notifications sent to the external notification workflow.
//!
//! When a payout is completed the customer is told about it by a workflow
//! living outside this service. We hand the event over with a signed HTTP
//! POST; delivery failures are reported to the caller, which decides
//! whether they matter (for payouts, they do not).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use std::time::Duration;
use uuid::Uuid;

use crate::{error::AppError, models::payment::PayoutCompletion};

type HmacSha256 = Hmac<Sha256>;

/// Event type sent for completed payouts.
pub const PAYOUT_COMPLETED_EVENT: &str = "payout.completed";

#[async_trait]
pub trait PayoutNotifier: Send + Sync {
    /// Notify that a payout was completed.
    ///
    /// Returns `Ok(true)` when the workflow accepted the event and
    /// `Ok(false)` when notifications are disabled.
    async fn payout_completed(&self, completion: &PayoutCompletion) -> Result<bool, AppError>;
}

/// Body posted to the notification workflow.
///
/// ```json
/// {
///   "eventType": "payout.completed",
///   "eventId": "550e8400-...",
///   "createdAt": "2026-10-19T10:00:00Z",
///   "data": { "paymentId": "...", "claimId": "...", "payoutAmountCents": 8000, ... }
/// }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent<'a> {
    pub event_type: &'static str,
    pub event_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub data: &'a PayoutCompletion,
}

/// Notifier used when no workflow URL is configured.
#[derive(Debug, Clone, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl PayoutNotifier for DisabledNotifier {
    async fn payout_completed(&self, completion: &PayoutCompletion) -> Result<bool, AppError> {
        tracing::debug!(payment_id = %completion.payment_id, "notifications disabled, skipping");
        Ok(false)
    }
}

/// Notifier that POSTs events to a webhook-triggered workflow.
///
/// # Headers Sent
///
/// - `Content-Type: application/json`
/// - `X-Webhook-Event-Id: <uuid>`
/// - `X-Webhook-Signature: sha256=<hex>` (only when a secret is configured)
///
/// # Timeout
///
/// 5 seconds per delivery.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    secret: Option<String>,
}

impl WebhookNotifier {
    pub fn new(url: &str, secret: Option<&str>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
            secret: secret.map(str::to_string),
        })
    }
}

#[async_trait]
impl PayoutNotifier for WebhookNotifier {
    async fn payout_completed(&self, completion: &PayoutCompletion) -> Result<bool, AppError> {
        let event_id = Uuid::new_v4();
        let event = NotificationEvent {
            event_type: PAYOUT_COMPLETED_EVENT,
            event_id,
            created_at: Utc::now(),
            data: completion,
        };
        let body = serde_json::to_string(&event)
            .map_err(|e| AppError::Internal(format!("Failed to serialize notification: {e}")))?;

        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("X-Webhook-Event-Id", event_id.to_string());

        if let Some(secret) = &self.secret {
            request = request.header("X-Webhook-Signature", generate_signature(secret, &body)?);
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Notification delivery failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Notification workflow answered {status}"
            )));
        }

        tracing::info!(%event_id, payment_id = %completion.payment_id, "payout notification sent");
        Ok(true)
    }
}

/// Generate HMAC-SHA256 signature for a notification body.
///
/// # Format
///
/// `sha256=<hex_encoded_hmac>`
pub fn generate_signature(secret: &str, payload: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid notification secret: {e}")))?;
    mac.update(payload.as_bytes());
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

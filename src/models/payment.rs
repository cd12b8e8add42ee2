//! Payment data models and payout confirmation request/response types.
//!
//! This module defines:
//! - `Payment`: Database entity for an incoming payment tied to a claim
//! - `ConfirmPayoutRequest`: Request body for confirming a payout
//! - `PayoutCompletion`: Result produced by the commission engine
//! - `PayoutReceipt`: Response body returned to the admin client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Represents a payment record from the database.
///
/// # Database Table
///
/// Maps to the `payments` table. Amounts are stored as `i64` cents.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Payment {
    pub id: Uuid,

    /// Claim this payment settles
    pub claim_id: Uuid,

    /// Customer who filed the claim
    pub user_id: Uuid,

    /// Total amount received for the claim, in cents
    pub amount_cents: i64,

    /// One of "pending", "processing", "completed", "failed"
    pub payout_status: String,

    /// Agreed payout to the customer, if fixed before completion
    pub payout_amount_cents: Option<i64>,

    /// Bank transfer reference recorded on completion
    pub payout_reference: Option<String>,

    pub payout_completed_at: Option<DateTime<Utc>>,

    /// Portion retained as commission, set on completion
    pub commission_cents: Option<i64>,

    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn payout_status(&self) -> PayoutStatus {
        // Unknown values are treated as still open
        self.payout_status.parse().unwrap_or(PayoutStatus::Pending)
    }
}

/// Payout lifecycle state stored in `payments.payout_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Processing => "processing",
            PayoutStatus::Completed => "completed",
            PayoutStatus::Failed => "failed",
        }
    }
}

impl FromStr for PayoutStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PayoutStatus::Pending),
            "processing" => Ok(PayoutStatus::Processing),
            "completed" => Ok(PayoutStatus::Completed),
            "failed" => Ok(PayoutStatus::Failed),
            other => Err(format!("unknown payout status '{other}'")),
        }
    }
}

/// Request body for confirming a payout.
///
/// # JSON Example
///
/// ```json
/// {
///   "claimId": "550e8400-e29b-41d4-a716-446655440000",
///   "paymentId": "660e8400-e29b-41d4-a716-446655440001",
///   "reference": "TRF-2026-0042"
/// }
/// ```
///
/// Fields are optional at the serde level so that a missing field produces
/// the API's own 400 response instead of a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPayoutRequest {
    pub claim_id: Option<String>,
    pub payment_id: Option<String>,
    pub reference: Option<String>,
}

impl ConfirmPayoutRequest {
    /// Check required fields and return `(claim_id, payment_id, reference)`.
    pub fn validate(self) -> Result<(Uuid, Uuid, String), String> {
        let claim_id = self.claim_id.as_deref().map(str::trim).unwrap_or_default();
        let payment_id = self.payment_id.as_deref().map(str::trim).unwrap_or_default();
        let reference = self.reference.as_deref().map(str::trim).unwrap_or_default();

        if claim_id.is_empty() || payment_id.is_empty() || reference.is_empty() {
            return Err("claimId, paymentId and reference are required".to_string());
        }

        let claim_id = claim_id
            .parse::<Uuid>()
            .map_err(|_| "claimId must be a UUID".to_string())?;
        let payment_id = payment_id
            .parse::<Uuid>()
            .map_err(|_| "paymentId must be a UUID".to_string())?;

        Ok((claim_id, payment_id, reference.to_string()))
    }
}

/// Outcome of completing a payout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutCompletion {
    pub payment_id: Uuid,
    pub claim_id: Uuid,
    pub user_id: Uuid,
    pub reference: String,
    pub payout_amount_cents: i64,
    pub commission_cents: i64,
    pub completed_at: DateTime<Utc>,
}

/// Response body for a confirmed payout.
///
/// ```json
/// {
///   "success": true,
///   "claimId": "550e8400-...",
///   "paymentId": "660e8400-...",
///   "reference": "TRF-2026-0042",
///   "payoutAmountCents": 8000,
///   "commissionCents": 2000,
///   "completedAt": "2026-10-19T10:00:00Z",
///   "notificationSent": true
/// }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutReceipt {
    pub success: bool,
    pub claim_id: Uuid,
    pub payment_id: Uuid,
    pub reference: String,
    pub payout_amount_cents: i64,
    pub commission_cents: i64,
    pub completed_at: DateTime<Utc>,
    pub notification_sent: bool,
}

impl PayoutReceipt {
    pub fn new(completion: PayoutCompletion, notification_sent: bool) -> Self {
        Self {
            success: true,
            claim_id: completion.claim_id,
            payment_id: completion.payment_id,
            reference: completion.reference,
            payout_amount_cents: completion.payout_amount_cents,
            commission_cents: completion.commission_cents,
            completed_at: completion.completed_at,
            notification_sent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_request_requires_all_fields() {
        let request = ConfirmPayoutRequest {
            claim_id: Some(Uuid::new_v4().to_string()),
            payment_id: None,
            reference: Some("TRF-1".into()),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn confirm_request_rejects_malformed_ids() {
        let request = ConfirmPayoutRequest {
            claim_id: Some("claim-1".into()),
            payment_id: Some(Uuid::new_v4().to_string()),
            reference: Some("TRF-1".into()),
        };
        assert_eq!(request.validate().unwrap_err(), "claimId must be a UUID");
    }

    #[test]
    fn confirm_request_trims_reference() {
        let claim_id = Uuid::new_v4();
        let payment_id = Uuid::new_v4();
        let request = ConfirmPayoutRequest {
            claim_id: Some(claim_id.to_string()),
            payment_id: Some(payment_id.to_string()),
            reference: Some("  TRF-1 ".into()),
        };
        assert_eq!(
            request.validate().unwrap(),
            (claim_id, payment_id, "TRF-1".to_string())
        );
    }

    #[test]
    fn parses_payout_status_names() {
        assert_eq!("completed".parse::<PayoutStatus>(), Ok(PayoutStatus::Completed));
        assert!("settled".parse::<PayoutStatus>().is_err());
    }
}

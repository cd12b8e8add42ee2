//! Commission engine - completes payouts and splits payments.
//!
//! A payment received for a claim is split into the customer's payout and
//! the service's commission. Completing a payout records that split, the
//! transfer reference, and moves the claim to `paid`.
//!
//! # Atomicity Guarantees
//!
//! The Postgres engine performs the completion inside one transaction with
//! the payment row locked, so concurrent confirmations complete a payout at
//! most once.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    db::DbPool,
    error::AppError,
    models::payment::{Payment, PayoutCompletion, PayoutStatus},
};

/// Settings key holding the commission fraction.
pub const COMMISSION_RATE_KEY: &str = "commission_rate";

/// Commission fraction used when the setting is absent or invalid.
pub const DEFAULT_COMMISSION_RATE: f64 = 0.20;

#[async_trait]
pub trait CommissionService: Send + Sync {
    /// Mark `payment`'s payout completed under `reference`.
    ///
    /// # Errors
    ///
    /// - `PayoutAlreadyCompleted`: another confirmation won the race
    /// - `NotFound`: the payment disappeared
    async fn complete_payout(
        &self,
        payment: &Payment,
        reference: &str,
    ) -> Result<PayoutCompletion, AppError>;
}

/// Read the commission rate from a stored setting value.
///
/// Accepts a JSON number or a numeric string; anything outside `[0, 1]`
/// falls back to the default.
pub fn commission_rate(value: Option<&Value>) -> f64 {
    let rate = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    rate.filter(|r| (0.0..=1.0).contains(r))
        .unwrap_or(DEFAULT_COMMISSION_RATE)
}

/// Split `amount_cents` into `(payout, commission)`.
///
/// A payout fixed on the payment wins; it is capped at the amount so the
/// commission never goes negative. Otherwise the commission is the rounded
/// rate share of the amount.
pub fn split_payment(amount_cents: i64, payout_override: Option<i64>, rate: f64) -> (i64, i64) {
    match payout_override {
        Some(payout) => {
            let payout = payout.clamp(0, amount_cents.max(0));
            (payout, amount_cents - payout)
        }
        None => {
            let commission = (amount_cents as f64 * rate).round() as i64;
            let commission = commission.clamp(0, amount_cents.max(0));
            (amount_cents - commission, commission)
        }
    }
}

/// Commission engine running against the hosted PostgreSQL database.
#[derive(Debug, Clone)]
pub struct PgCommissionService {
    pool: DbPool,
}

impl PgCommissionService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommissionService for PgCommissionService {
    /// # Process
    ///
    /// 1. Start database transaction
    /// 2. Lock the payment row and re-check its payout status
    /// 3. Read the commission rate and split the amount
    /// 4. Mark the payment completed and the claim paid
    /// 5. Commit (or rollback on error)
    async fn complete_payout(
        &self,
        payment: &Payment,
        reference: &str,
    ) -> Result<PayoutCompletion, AppError> {
        let mut tx = self.pool.begin().await?;

        // FOR UPDATE serializes concurrent confirmations of the same payment
        let locked = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, claim_id, user_id, amount_cents, payout_status, payout_amount_cents,
                   payout_reference, payout_completed_at, commission_cents, created_at
            FROM payments
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(payment.id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(locked) = locked else {
            tx.rollback().await?;
            return Err(AppError::NotFound("Payment not found".to_string()));
        };

        if locked.payout_status() == PayoutStatus::Completed {
            tx.rollback().await?;
            return Err(AppError::PayoutAlreadyCompleted);
        }

        let rate_value: Option<Value> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = $1")
                .bind(COMMISSION_RATE_KEY)
                .fetch_optional(&mut *tx)
                .await?;
        let rate = commission_rate(rate_value.as_ref());

        let (payout_cents, commission_cents) =
            split_payment(locked.amount_cents, locked.payout_amount_cents, rate);

        let completed_at: DateTime<Utc> = sqlx::query_scalar(
            r#"
            UPDATE payments
            SET payout_status = 'completed',
                payout_amount_cents = $2,
                commission_cents = $3,
                payout_reference = $4,
                payout_completed_at = NOW()
            WHERE id = $1
            RETURNING payout_completed_at
            "#,
        )
        .bind(locked.id)
        .bind(payout_cents)
        .bind(commission_cents)
        .bind(reference)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE claims SET status = 'paid', updated_at = NOW() WHERE id = $1")
            .bind(locked.claim_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(PayoutCompletion {
            payment_id: locked.id,
            claim_id: locked.claim_id,
            user_id: locked.user_id,
            reference: reference.to_string(),
            payout_amount_cents: payout_cents,
            commission_cents,
            completed_at,
        })
    }
}

//! PostgreSQL implementation of [`Store`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::Store;
use crate::{
    db::DbPool,
    error::AppError,
    models::{
        incident::Incident,
        payment::Payment,
        profile::Role,
        setting::Setting,
        withdrawal::{WithdrawalRow, WithdrawalStatus},
    },
};

/// Store backed by the hosted PostgreSQL database.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_role(&self, user_id: Uuid) -> Result<Option<Role>, AppError> {
        let role: Option<String> = sqlx::query_scalar("SELECT role FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        // An unrecognised role grants nothing beyond a plain user
        Ok(role.map(|r| r.parse().unwrap_or(Role::User)))
    }

    async fn find_payment(
        &self,
        payment_id: Uuid,
        claim_id: Uuid,
    ) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, claim_id, user_id, amount_cents, payout_status, payout_amount_cents,
                   payout_reference, payout_completed_at, commission_cents, created_at
            FROM payments
            WHERE id = $1 AND claim_id = $2
            "#,
        )
        .bind(payment_id)
        .bind(claim_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    async fn list_settings(&self) -> Result<Vec<Setting>, AppError> {
        let settings = sqlx::query_as::<_, Setting>(
            "SELECT key, value, updated_at, updated_by FROM settings ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(settings)
    }

    async fn upsert_setting(
        &self,
        key: &str,
        value: &Value,
        updated_by: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at, updated_by)
            VALUES ($1, $2, NOW(), $3)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value,
                updated_at = EXCLUDED.updated_at,
                updated_by = EXCLUDED.updated_by
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(updated_by)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_withdrawals(
        &self,
        statuses: &[WithdrawalStatus],
    ) -> Result<Vec<WithdrawalRow>, AppError> {
        let statuses: Vec<&str> = statuses.iter().map(WithdrawalStatus::as_str).collect();

        let rows = sqlx::query_as::<_, WithdrawalRow>(
            r#"
            SELECT w.id, w.user_id, w.claim_id, w.amount_cents, w.status, w.payment_method,
                   w.requested_at, w.processed_at,
                   p.full_name AS profile_full_name,
                   p.email AS profile_email,
                   p.phone AS profile_phone,
                   c.status AS claim_status,
                   c.bus_line AS claim_bus_line,
                   c.compensation_cents AS claim_compensation_cents
            FROM withdrawal_requests w
            LEFT JOIN profiles p ON p.id = w.user_id
            LEFT JOIN claims c ON c.id = w.claim_id
            WHERE w.status = ANY($1)
            ORDER BY w.requested_at ASC
            "#,
        )
        .bind(&statuses)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_incident(&self, incident_id: Uuid) -> Result<Option<Incident>, AppError> {
        let incident = sqlx::query_as::<_, Incident>(
            r#"
            SELECT id, user_id, bus_line, bus_company, user_latitude, user_longitude,
                   incident_time, verified, verification_data, verified_at, created_at
            FROM incidents
            WHERE id = $1
            "#,
        )
        .bind(incident_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(incident)
    }

    async fn save_verification(
        &self,
        incident_id: Uuid,
        verified: bool,
        verification_data: &Value,
        verified_at: DateTime<Utc>,
    ) -> Result<Incident, AppError> {
        sqlx::query_as::<_, Incident>(
            r#"
            UPDATE incidents
            SET verified = $2,
                verification_data = $3,
                verified_at = $4
            WHERE id = $1
            RETURNING id, user_id, bus_line, bus_company, user_latitude, user_longitude,
                      incident_time, verified, verification_data, verified_at, created_at
            "#,
        )
        .bind(incident_id)
        .bind(verified)
        .bind(verification_data)
        .bind(verified_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Incident not found".to_string()))
    }
}

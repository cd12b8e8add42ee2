//! Access to the hosted relational store.
//!
//! Handlers talk to the store through the `Store` trait so the same handler
//! code runs against PostgreSQL in production and against
//! [`crate::testing::MemoryStore`] in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        incident::Incident,
        payment::Payment,
        profile::Role,
        setting::Setting,
        withdrawal::{WithdrawalRow, WithdrawalStatus},
    },
};

pub mod postgres;

pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Verify the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;

    /// Role on the caller's profile, `None` when no profile exists.
    async fn find_role(&self, user_id: Uuid) -> Result<Option<Role>, AppError>;

    /// Payment `payment_id`, only if it belongs to `claim_id`.
    async fn find_payment(
        &self,
        payment_id: Uuid,
        claim_id: Uuid,
    ) -> Result<Option<Payment>, AppError>;

    async fn list_settings(&self) -> Result<Vec<Setting>, AppError>;

    /// Insert or replace a single setting.
    async fn upsert_setting(
        &self,
        key: &str,
        value: &Value,
        updated_by: Uuid,
    ) -> Result<(), AppError>;

    /// Withdrawals in any of `statuses`, oldest request first.
    async fn list_withdrawals(
        &self,
        statuses: &[WithdrawalStatus],
    ) -> Result<Vec<WithdrawalRow>, AppError>;

    async fn find_incident(&self, incident_id: Uuid) -> Result<Option<Incident>, AppError>;

    /// Store a verification verdict on an incident and return the updated row.
    async fn save_verification(
        &self,
        incident_id: Uuid,
        verified: bool,
        verification_data: &Value,
        verified_at: DateTime<Utc>,
    ) -> Result<Incident, AppError>;
}

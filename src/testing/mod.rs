//! In-memory collaborators for tests.
//!
//! These stand in for the hosted store, the identity service, the commission
//! engine, the notification workflow and the verification service, so the
//! real router can be exercised without any external system.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        incident::{Incident, VerificationOutcome, VerificationRequest},
        payment::{Payment, PayoutCompletion, PayoutStatus},
        profile::Role,
        setting::Setting,
        withdrawal::{WithdrawalRow, WithdrawalStatus},
    },
    repository::Store,
    services::{
        commission::{COMMISSION_RATE_KEY, CommissionService, commission_rate, split_payment},
        identity::{AuthenticatedUser, IdentityProvider},
        notification::PayoutNotifier,
        verification::IncidentVerifier,
    },
};

#[derive(Debug, Default)]
struct MemoryData {
    roles: HashMap<Uuid, Role>,
    payments: HashMap<Uuid, Payment>,
    settings: BTreeMap<String, Setting>,
    withdrawals: Vec<WithdrawalRow>,
    incidents: HashMap<Uuid, Incident>,
    failing_setting_keys: HashSet<String>,
}

/// [`Store`] kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_role(&self, user_id: Uuid, role: Role) {
        self.data.write().await.roles.insert(user_id, role);
    }

    pub async fn insert_payment(&self, payment: Payment) {
        self.data.write().await.payments.insert(payment.id, payment);
    }

    pub async fn payment(&self, payment_id: Uuid) -> Option<Payment> {
        self.data.read().await.payments.get(&payment_id).cloned()
    }

    pub async fn setting(&self, key: &str) -> Option<Setting> {
        self.data.read().await.settings.get(key).cloned()
    }

    /// Make every write of `key` fail with a database error.
    pub async fn fail_setting_writes(&self, key: &str) {
        self.data
            .write()
            .await
            .failing_setting_keys
            .insert(key.to_string());
    }

    pub async fn insert_withdrawal(&self, row: WithdrawalRow) {
        self.data.write().await.withdrawals.push(row);
    }

    pub async fn insert_incident(&self, incident: Incident) {
        self.data.write().await.incidents.insert(incident.id, incident);
    }

    pub async fn incident(&self, incident_id: Uuid) -> Option<Incident> {
        self.data.read().await.incidents.get(&incident_id).cloned()
    }

    /// Complete a payout the way the Postgres engine does, rate included.
    async fn complete_payout(
        &self,
        payment_id: Uuid,
        reference: &str,
    ) -> Result<PayoutCompletion, AppError> {
        let mut data = self.data.write().await;
        let rate = commission_rate(data.settings.get(COMMISSION_RATE_KEY).map(|s| &s.value));

        let payment = data
            .payments
            .get_mut(&payment_id)
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

        if payment.payout_status() == PayoutStatus::Completed {
            return Err(AppError::PayoutAlreadyCompleted);
        }

        let (payout_cents, commission_cents) =
            split_payment(payment.amount_cents, payment.payout_amount_cents, rate);
        let completed_at = Utc::now();

        payment.payout_status = PayoutStatus::Completed.as_str().to_string();
        payment.payout_amount_cents = Some(payout_cents);
        payment.commission_cents = Some(commission_cents);
        payment.payout_reference = Some(reference.to_string());
        payment.payout_completed_at = Some(completed_at);

        Ok(PayoutCompletion {
            payment_id: payment.id,
            claim_id: payment.claim_id,
            user_id: payment.user_id,
            reference: reference.to_string(),
            payout_amount_cents: payout_cents,
            commission_cents,
            completed_at,
        })
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn find_role(&self, user_id: Uuid) -> Result<Option<Role>, AppError> {
        Ok(self.data.read().await.roles.get(&user_id).copied())
    }

    async fn find_payment(
        &self,
        payment_id: Uuid,
        claim_id: Uuid,
    ) -> Result<Option<Payment>, AppError> {
        Ok(self
            .data
            .read()
            .await
            .payments
            .get(&payment_id)
            .filter(|p| p.claim_id == claim_id)
            .cloned())
    }

    async fn list_settings(&self) -> Result<Vec<Setting>, AppError> {
        Ok(self.data.read().await.settings.values().cloned().collect())
    }

    async fn upsert_setting(
        &self,
        key: &str,
        value: &Value,
        updated_by: Uuid,
    ) -> Result<(), AppError> {
        let mut data = self.data.write().await;
        if data.failing_setting_keys.contains(key) {
            return Err(AppError::Database(sqlx::Error::Protocol(format!(
                "write rejected for {key}"
            ))));
        }

        data.settings.insert(
            key.to_string(),
            Setting {
                key: key.to_string(),
                value: value.clone(),
                updated_at: Utc::now(),
                updated_by: Some(updated_by),
            },
        );
        Ok(())
    }

    async fn list_withdrawals(
        &self,
        statuses: &[WithdrawalStatus],
    ) -> Result<Vec<WithdrawalRow>, AppError> {
        let mut rows: Vec<WithdrawalRow> = self
            .data
            .read()
            .await
            .withdrawals
            .iter()
            .filter(|w| statuses.iter().any(|s| s.as_str() == w.status))
            .cloned()
            .collect();
        rows.sort_by_key(|w| w.requested_at);
        Ok(rows)
    }

    async fn find_incident(&self, incident_id: Uuid) -> Result<Option<Incident>, AppError> {
        Ok(self.incident(incident_id).await)
    }

    async fn save_verification(
        &self,
        incident_id: Uuid,
        verified: bool,
        verification_data: &Value,
        verified_at: DateTime<Utc>,
    ) -> Result<Incident, AppError> {
        let mut data = self.data.write().await;
        let incident = data
            .incidents
            .get_mut(&incident_id)
            .ok_or_else(|| AppError::NotFound("Incident not found".to_string()))?;

        incident.verified = verified;
        incident.verification_data = Some(verification_data.clone());
        incident.verified_at = Some(verified_at);
        Ok(incident.clone())
    }
}

/// Commission engine completing payouts inside a [`MemoryStore`].
///
/// The rate comes from the store's `commission_rate` setting.
#[derive(Debug, Clone)]
pub struct MemoryCommission {
    store: Arc<MemoryStore>,
}

impl MemoryCommission {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommissionService for MemoryCommission {
    async fn complete_payout(
        &self,
        payment: &Payment,
        reference: &str,
    ) -> Result<PayoutCompletion, AppError> {
        self.store.complete_payout(payment.id, reference).await
    }
}

/// Identity provider accepting a fixed set of tokens.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    users: HashMap<String, AuthenticatedUser>,
}

impl StaticIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, token: &str, user_id: Uuid) -> Self {
        self.users.insert(
            token.to_string(),
            AuthenticatedUser {
                id: user_id,
                email: Some(format!("{token}@example.com")),
            },
        );
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        self.users.get(token).cloned().ok_or(AppError::Unauthorized)
    }
}

/// Notifier recording every event; optionally failing each delivery.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: RwLock<Vec<PayoutCompletion>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            events: RwLock::default(),
            fail: true,
        }
    }

    pub async fn events(&self) -> Vec<PayoutCompletion> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl PayoutNotifier for RecordingNotifier {
    async fn payout_completed(&self, completion: &PayoutCompletion) -> Result<bool, AppError> {
        self.events.write().await.push(completion.clone());
        if self.fail {
            return Err(AppError::Upstream("notification workflow down".to_string()));
        }
        Ok(true)
    }
}

/// Verifier answering every request with the same verdict.
#[derive(Debug)]
pub struct StubVerifier {
    outcome: VerificationOutcome,
    requests: RwLock<Vec<VerificationRequest>>,
}

impl StubVerifier {
    pub fn new(outcome: VerificationOutcome) -> Self {
        Self {
            outcome,
            requests: RwLock::default(),
        }
    }

    /// Verdict confirming the incident at `distance_meters` from the bus.
    pub fn verified(distance_meters: f64) -> Self {
        Self::new(VerificationOutcome {
            verified: true,
            confidence: Some(0.9),
            distance_meters: Some(distance_meters),
            vehicle_ref: Some("7412345".to_string()),
            reason: None,
            details: serde_json::Map::new(),
        })
    }

    pub async fn requests(&self) -> Vec<VerificationRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl IncidentVerifier for StubVerifier {
    async fn verify(&self, request: &VerificationRequest) -> Result<VerificationOutcome, AppError> {
        self.requests.write().await.push(request.clone());
        Ok(self.outcome.clone())
    }
}

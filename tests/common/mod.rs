//! Shared test infrastructure: the real router served on an ephemeral port
//! with in-memory collaborators.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use bus_claims_api::{
    app,
    models::{
        incident::Incident,
        payment::Payment,
        profile::Role,
        withdrawal::WithdrawalRow,
    },
    services::siri::SiriClient,
    state::AppState,
    testing::{MemoryCommission, MemoryStore, RecordingNotifier, StaticIdentity, StubVerifier},
};
use chrono::{DateTime, Utc};
use reqwest::{Response, StatusCode};
use serde_json::Value;
use uuid::Uuid;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const SUPER_ADMIN_TOKEN: &str = "super-admin-token";
pub const USER_TOKEN: &str = "user-token";
/// Valid token whose user has no profile row.
pub const STRANGER_TOKEN: &str = "stranger-token";

pub const SIRI_ENDPOINT: &str = "http://siri.test/Siri/SiriServices";

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub verifier: Arc<StubVerifier>,
    pub admin_id: Uuid,
    pub super_admin_id: Uuid,
    pub user_id: Uuid,
    pub stranger_id: Uuid,
}

pub struct TestAppBuilder {
    notifier: RecordingNotifier,
    verifier: StubVerifier,
    siri: SiriClient,
}

impl TestAppBuilder {
    pub fn notifier(mut self, notifier: RecordingNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn siri(mut self, siri: SiriClient) -> Self {
        self.siri = siri;
        self
    }

    pub async fn spawn(self) -> TestApp {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(self.notifier);
        let verifier = Arc::new(self.verifier);

        let admin_id = Uuid::new_v4();
        let super_admin_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let stranger_id = Uuid::new_v4();

        store.set_role(admin_id, Role::Admin).await;
        store.set_role(super_admin_id, Role::SuperAdmin).await;
        store.set_role(user_id, Role::User).await;

        let identity = StaticIdentity::new()
            .with_user(ADMIN_TOKEN, admin_id)
            .with_user(SUPER_ADMIN_TOKEN, super_admin_id)
            .with_user(USER_TOKEN, user_id)
            .with_user(STRANGER_TOKEN, stranger_id);

        let state = AppState {
            store: store.clone(),
            identity: Arc::new(identity),
            commission: Arc::new(MemoryCommission::new(store.clone())),
            notifier: notifier.clone(),
            verifier: verifier.clone(),
            siri: Arc::new(self.siri),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        tokio::spawn(async move {
            axum::serve(listener, app::router(state))
                .await
                .expect("Test server failed");
        });

        TestApp {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            store,
            notifier,
            verifier,
            admin_id,
            super_admin_id,
            user_id,
            stranger_id,
        }
    }
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder {
            notifier: RecordingNotifier::new(),
            verifier: StubVerifier::verified(120.0),
            siri: SiriClient::unconfigured(SIRI_ENDPOINT, "BUSCLAIMS"),
        }
    }

    pub async fn spawn() -> TestApp {
        Self::builder().spawn().await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Response {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to send request")
    }

    pub async fn post_json(&self, path: &str, token: Option<&str>, body: &Value) -> Response {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to send request")
    }

    pub async fn put_json(&self, path: &str, token: Option<&str>, body: &Value) -> Response {
        let mut request = self.client.put(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to send request")
    }

    /// Send `body` verbatim as a JSON request, valid or not.
    pub async fn send_raw(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
        body: &str,
    ) -> Response {
        let mut request = self
            .client
            .request(method, self.url(path))
            .header("content-type", "application/json")
            .body(body.to_string());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to send request")
    }

    /// Seed a payment awaiting payout and return it.
    pub async fn seed_payment(&self, amount_cents: i64, payout_amount_cents: Option<i64>) -> Payment {
        let payment = Payment {
            id: Uuid::new_v4(),
            claim_id: Uuid::new_v4(),
            user_id: self.user_id,
            amount_cents,
            payout_status: "pending".to_string(),
            payout_amount_cents,
            payout_reference: None,
            payout_completed_at: None,
            commission_cents: None,
            created_at: Utc::now(),
        };
        self.store.insert_payment(payment.clone()).await;
        payment
    }

    /// Seed a withdrawal request by the regular user.
    pub async fn seed_withdrawal(&self, status: &str, requested_at: DateTime<Utc>) -> Uuid {
        let id = Uuid::new_v4();
        self.store
            .insert_withdrawal(WithdrawalRow {
                id,
                user_id: self.user_id,
                claim_id: Some(Uuid::new_v4()),
                amount_cents: 8_000,
                status: status.to_string(),
                payment_method: Some("bank_transfer".to_string()),
                requested_at,
                processed_at: None,
                profile_full_name: Some("Dana Levi".to_string()),
                profile_email: Some("dana@example.com".to_string()),
                profile_phone: Some("+972501234567".to_string()),
                claim_status: Some("approved".to_string()),
                claim_bus_line: Some("480".to_string()),
                claim_compensation_cents: Some(8_000),
            })
            .await;
        id
    }

    /// Seed an unverified incident owned by `owner`.
    pub async fn seed_incident(&self, owner: Uuid) -> Incident {
        let incident = Incident {
            id: Uuid::new_v4(),
            user_id: owner,
            bus_line: "480".to_string(),
            bus_company: Some("Egged".to_string()),
            user_latitude: 32.0853,
            user_longitude: 34.7818,
            incident_time: Utc::now() - chrono::Duration::hours(2),
            verified: false,
            verification_data: None,
            verified_at: None,
            created_at: Utc::now(),
        };
        self.store.insert_incident(incident.clone()).await;
        incident
    }
}

/// Assert the status and error code of an error response.
pub async fn assert_error(response: Response, status: StatusCode, code: &str) -> Value {
    assert_eq!(response.status(), status);
    let body: Value = response.json().await.expect("Failed to parse error body");
    assert_eq!(body["error"]["code"], code, "unexpected error body: {body}");
    body
}

/// SIRI client routed through a proxy at `proxy_url`.
pub fn proxied_siri(proxy_url: &str, timeout: Duration) -> SiriClient {
    SiriClient::new(SIRI_ENDPOINT, "BUSCLAIMS", Some(proxy_url), timeout)
        .expect("Failed to build SIRI client")
}

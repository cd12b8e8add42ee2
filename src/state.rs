//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::{
    config::Config,
    db::DbPool,
    repository::{PgStore, Store},
    services::{
        commission::{CommissionService, PgCommissionService},
        identity::{IdentityProvider, SupabaseIdentity},
        notification::{DisabledNotifier, PayoutNotifier, WebhookNotifier},
        siri::SiriClient,
        verification::{HttpIncidentVerifier, IncidentVerifier},
    },
};

/// Collaborators reachable from handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub identity: Arc<dyn IdentityProvider>,
    pub commission: Arc<dyn CommissionService>,
    pub notifier: Arc<dyn PayoutNotifier>,
    pub verifier: Arc<dyn IncidentVerifier>,
    pub siri: Arc<SiriClient>,
}

impl AppState {
    /// Wire the production collaborators from configuration.
    pub fn from_config(config: &Config, pool: DbPool) -> anyhow::Result<Self> {
        let identity = SupabaseIdentity::new(&config.supabase_url, &config.supabase_anon_key)?;

        let notifier: Arc<dyn PayoutNotifier> = match config.notification_webhook_url() {
            Some(url) => {
                url::Url::parse(url)?;
                Arc::new(WebhookNotifier::new(
                    url,
                    config.notification_webhook_secret(),
                )?)
            }
            None => {
                tracing::warn!("NOTIFICATION_WEBHOOK_URL not set, payout notifications disabled");
                Arc::new(DisabledNotifier)
            }
        };

        if config.siri_proxy_url().is_none() {
            tracing::warn!("SIRI_PROXY_URL not set, SIRI proxy requests will fail");
        }
        let siri = SiriClient::new(
            &config.siri_endpoint_url,
            &config.siri_requestor_ref,
            config.siri_proxy_url(),
            config.siri_timeout(),
        )?;

        let verifier = HttpIncidentVerifier::new(config.verification_service_url())?;

        Ok(Self {
            store: Arc::new(PgStore::new(pool.clone())),
            identity: Arc::new(identity),
            commission: Arc::new(PgCommissionService::new(pool)),
            notifier,
            verifier: Arc::new(verifier),
            siri: Arc::new(siri),
        })
    }
}

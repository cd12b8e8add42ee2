//! Application configuration management.
//!
//! Configuration is read from environment variables with the `envy` crate,
//! after an optional `.env` file has been loaded by `dotenvy`.

use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string of the hosted store
/// - `SUPABASE_URL` (required): base URL of the hosted identity service
/// - `SUPABASE_ANON_KEY` (required): project API key sent as the `apikey` header
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `RUN_MIGRATIONS` (optional): apply `migrations/` on startup, defaults to false
/// - `SIRI_PROXY_URL` (optional): HTTP(S) proxy for the transit API
/// - `SIRI_ENDPOINT_URL` (optional): SIRI SOAP endpoint
/// - `SIRI_REQUESTOR_REF` (optional): requestor reference sent in SIRI requests
/// - `SIRI_TIMEOUT_SECS` (optional): SIRI request timeout, defaults to 30
/// - `NOTIFICATION_WEBHOOK_URL` (optional): payout notification workflow
/// - `NOTIFICATION_WEBHOOK_SECRET` (optional): HMAC key for notification payloads
/// - `VERIFICATION_SERVICE_URL` (optional): incident verification service
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    pub supabase_url: String,

    pub supabase_anon_key: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default)]
    pub run_migrations: bool,

    #[serde(default)]
    pub siri_proxy_url: Option<String>,

    #[serde(default = "default_siri_endpoint")]
    pub siri_endpoint_url: String,

    #[serde(default = "default_requestor_ref")]
    pub siri_requestor_ref: String,

    #[serde(default = "default_siri_timeout")]
    pub siri_timeout_secs: u64,

    #[serde(default)]
    pub notification_webhook_url: Option<String>,

    #[serde(default)]
    pub notification_webhook_secret: Option<String>,

    #[serde(default)]
    pub verification_service_url: Option<String>,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_siri_endpoint() -> String {
    "http://siri.motrealtime.co.il:8081/Siri/SiriServices".to_string()
}

fn default_requestor_ref() -> String {
    "BUSCLAIMS".to_string()
}

fn default_siri_timeout() -> u64 {
    30
}

/// Treat blank optional values the same as missing ones.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or a value cannot
    /// be parsed into its expected type.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        // Field names are converted automatically: siri_proxy_url -> SIRI_PROXY_URL
        envy::from_env::<Config>()
    }

    pub fn siri_proxy_url(&self) -> Option<&str> {
        non_blank(&self.siri_proxy_url)
    }

    pub fn siri_timeout(&self) -> Duration {
        Duration::from_secs(self.siri_timeout_secs)
    }

    pub fn notification_webhook_url(&self) -> Option<&str> {
        non_blank(&self.notification_webhook_url)
    }

    pub fn notification_webhook_secret(&self) -> Option<&str> {
        non_blank(&self.notification_webhook_secret)
    }

    pub fn verification_service_url(&self) -> Option<&str> {
        non_blank(&self.verification_service_url)
    }
}

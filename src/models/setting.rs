//! Key/value settings managed from the admin console.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Longest key accepted by the settings endpoint.
pub const MAX_KEY_LEN: usize = 100;

/// Represents a row of the `settings` table.
///
/// `value` is stored as JSONB so numbers, flags and nested objects survive
/// a round trip unchanged.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Setting {
    pub key: String,
    pub value: Value,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

/// Collapse setting rows into the flat `{ key: value }` object returned by GET.
pub fn flatten(settings: Vec<Setting>) -> Map<String, Value> {
    settings.into_iter().map(|s| (s.key, s.value)).collect()
}

/// Check a key before it is written.
pub fn validate_key(key: &str) -> Result<(), String> {
    if key.trim().is_empty() {
        return Err("key must not be blank".to_string());
    }
    if key.chars().count() > MAX_KEY_LEN {
        return Err(format!("key exceeds {MAX_KEY_LEN} characters"));
    }
    Ok(())
}

/// Response body for a successful settings update.
#[derive(Debug, Serialize)]
pub struct SettingsUpdateResponse {
    pub success: bool,
    pub updated: Vec<String>,
}

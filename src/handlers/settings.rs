//! Admin settings HTTP handlers.
//!
//! - GET /api/admin/settings - All settings as a flat object
//! - PUT /api/admin/settings - Upsert the keys present in the body

use crate::{
    error::AppError,
    middleware::admin::AdminContext,
    models::setting::{self, SettingsUpdateResponse},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::{Map, Value};

/// List all settings.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "commission_rate": 0.2,
///   "support_email": "help@example.com"
/// }
/// ```
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<Map<String, Value>>, AppError> {
    let settings = state.store.list_settings().await?;

    Ok(Json(setting::flatten(settings)))
}

/// Upsert every key in the request body.
///
/// # Request Body
///
/// Any JSON object; each top-level key becomes one setting.
///
/// ```json
/// { "commission_rate": 0.15, "maintenance": { "enabled": false } }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: `{ "success": true, "updated": ["commission_rate", "maintenance"] }`
/// - **Error (400)**: Body is not valid JSON, or not a non-empty object
/// - **Error (500)**: One or more keys failed; the message lists each failure
///
/// Keys are written independently, so keys that succeeded stay written even
/// when another key fails.
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SettingsUpdateResponse>, AppError> {
    let Json(body) = payload?;
    let Value::Object(entries) = body else {
        return Err(AppError::InvalidRequest(
            "Request body must be a JSON object".to_string(),
        ));
    };
    if entries.is_empty() {
        return Err(AppError::InvalidRequest("No settings provided".to_string()));
    }

    let mut updated = Vec::with_capacity(entries.len());
    let mut errors = Vec::new();

    for (key, value) in &entries {
        let result = match setting::validate_key(key) {
            Ok(()) => state
                .store
                .upsert_setting(key, value, admin.user_id)
                .await
                .map_err(|e| e.to_string()),
            Err(msg) => Err(msg),
        };

        match result {
            Ok(()) => updated.push(key.clone()),
            Err(msg) => {
                tracing::warn!(key = %key, error = %msg, "setting update failed");
                errors.push(format!("{key}: {msg}"));
            }
        }
    }

    if !errors.is_empty() {
        return Err(AppError::SettingsUpdate(errors.join(", ")));
    }

    tracing::info!(
        updated_by = %admin.user_id,
        role = %admin.role,
        keys = ?updated,
        "settings updated"
    );

    Ok(Json(SettingsUpdateResponse {
        success: true,
        updated,
    }))
}

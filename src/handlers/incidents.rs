//! Incident verification HTTP handlers.
//!
//! - POST /api/incidents/verify - Verify an incident against real-time bus positions
//! - GET /api/incidents/{id}/verification - Stored verification status

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::incident::{Incident, VerificationStatusResponse, VerifyIncidentRequest},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use chrono::Utc;
use uuid::Uuid;

/// Load an incident the caller may see.
///
/// Returns 404 both when the incident does not exist and when it belongs
/// to someone else and the caller is not an admin.
async fn load_incident(
    state: &AppState,
    auth: &AuthContext,
    incident_id: Uuid,
) -> Result<Incident, AppError> {
    let not_found = || AppError::NotFound("Incident not found".to_string());

    let incident = state
        .store
        .find_incident(incident_id)
        .await?
        .ok_or_else(not_found)?;

    if incident.user_id == auth.user_id {
        return Ok(incident);
    }

    match state.store.find_role(auth.user_id).await? {
        Some(role) if role.is_admin() => Ok(incident),
        _ => Err(not_found()),
    }
}

/// Verify an incident.
///
/// # Request Body
///
/// ```json
/// {
///   "incidentId": "550e8400-e29b-41d4-a716-446655440000",
///   "userLatitude": 32.0853,
///   "userLongitude": 34.7818,
///   "busLine": "480",
///   "busCompany": "Egged",
///   "incidentTime": "2026-10-19T07:45:00Z"
/// }
/// ```
///
/// `incidentTime` is optional and defaults to the time stored on the incident.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "incidentId": "550e8400-...",
///   "verified": true,
///   "verification": { "verified": true, "confidence": 0.92, "distanceMeters": 140.5, ... },
///   "verifiedAt": "2026-10-19T08:00:00Z"
/// }
/// ```
pub async fn verify_incident(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<VerifyIncidentRequest>, JsonRejection>,
) -> Result<Json<VerificationStatusResponse>, AppError> {
    let Json(request) = payload?;
    let (incident_id, fields) = request.validate().map_err(AppError::InvalidRequest)?;

    let incident = load_incident(&state, &auth, incident_id).await?;
    let verification_request = fields.into_request(&incident);

    let outcome = state.verifier.verify(&verification_request).await?;

    let payload = serde_json::to_value(&outcome)
        .map_err(|e| AppError::Internal(format!("Failed to serialize verification: {e}")))?;

    let incident = state
        .store
        .save_verification(incident_id, outcome.verified, &payload, Utc::now())
        .await?;

    tracing::info!(
        %incident_id,
        verified = outcome.verified,
        bus_line = %verification_request.bus_line,
        "incident verified"
    );

    Ok(Json(incident.into()))
}

/// Return the stored verification status of an incident.
///
/// # Response
///
/// - **Success (200 OK)**: Same shape as [`verify_incident`]; `verification`
///   and `verifiedAt` are null until the incident has been verified
/// - **Error (400)**: `id` is not a UUID
/// - **Error (404)**: Incident not found or not visible to the caller
pub async fn get_verification(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    incident_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<VerificationStatusResponse>, AppError> {
    let Path(incident_id) = incident_id?;
    let incident = load_incident(&state, &auth, incident_id).await?;

    Ok(Json(incident.into()))
}

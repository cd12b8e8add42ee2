//! Incident models for GPS-based verification.
//!
//! An incident is a customer's report that a bus line failed to serve them.
//! Verification compares the reported position and time against real-time
//! vehicle positions; that comparison lives in the external verification
//! service, and only its outcome is stored here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Represents a row of the `incidents` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Incident {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bus_line: String,
    pub bus_company: Option<String>,
    pub user_latitude: f64,
    pub user_longitude: f64,
    pub incident_time: DateTime<Utc>,
    pub verified: bool,
    pub verification_data: Option<Value>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /api/incidents/verify`.
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
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyIncidentRequest {
    pub incident_id: Option<String>,
    pub user_latitude: Option<f64>,
    pub user_longitude: Option<f64>,
    pub bus_line: Option<String>,
    pub bus_company: Option<String>,
    pub incident_time: Option<DateTime<Utc>>,
}

/// Validated input handed to the verification service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub incident_id: Uuid,
    pub user_latitude: f64,
    pub user_longitude: f64,
    pub bus_line: String,
    pub bus_company: String,
    pub incident_time: DateTime<Utc>,
}

impl VerifyIncidentRequest {
    /// Check required fields and coordinate ranges.
    ///
    /// `incident_time` is left unset here when absent; the handler falls
    /// back to the stored incident time.
    pub fn validate(self) -> Result<(Uuid, ValidatedFields), String> {
        let mut missing = Vec::new();
        if blank(&self.incident_id) {
            missing.push("incidentId");
        }
        if self.user_latitude.is_none() {
            missing.push("userLatitude");
        }
        if self.user_longitude.is_none() {
            missing.push("userLongitude");
        }
        if blank(&self.bus_line) {
            missing.push("busLine");
        }
        if blank(&self.bus_company) {
            missing.push("busCompany");
        }
        if !missing.is_empty() {
            return Err(format!("Missing required fields: {}", missing.join(", ")));
        }

        let incident_id = self
            .incident_id
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .parse::<Uuid>()
            .map_err(|_| "incidentId must be a UUID".to_string())?;

        let latitude = self.user_latitude.unwrap_or_default();
        let longitude = self.user_longitude.unwrap_or_default();
        if !(-90.0..=90.0).contains(&latitude) {
            return Err("userLatitude must be between -90 and 90".to_string());
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err("userLongitude must be between -180 and 180".to_string());
        }

        Ok((
            incident_id,
            ValidatedFields {
                user_latitude: latitude,
                user_longitude: longitude,
                bus_line: self.bus_line.unwrap_or_default().trim().to_string(),
                bus_company: self.bus_company.unwrap_or_default().trim().to_string(),
                incident_time: self.incident_time,
            },
        ))
    }
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct ValidatedFields {
    pub user_latitude: f64,
    pub user_longitude: f64,
    pub bus_line: String,
    pub bus_company: String,
    pub incident_time: Option<DateTime<Utc>>,
}

impl ValidatedFields {
    pub fn into_request(self, incident: &Incident) -> VerificationRequest {
        VerificationRequest {
            incident_id: incident.id,
            user_latitude: self.user_latitude,
            user_longitude: self.user_longitude,
            bus_line: self.bus_line,
            bus_company: self.bus_company,
            incident_time: self.incident_time.unwrap_or(incident.incident_time),
        }
    }
}

/// Verdict returned by the verification service.
///
/// Unknown fields in the service's answer are kept in `details` so the
/// stored payload is never narrower than what the service produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub verified: bool,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub distance_meters: Option<f64>,
    #[serde(default)]
    pub vehicle_ref: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub details: serde_json::Map<String, Value>,
}

/// Response body for both verification endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStatusResponse {
    pub incident_id: Uuid,
    pub verified: bool,
    pub verification: Option<Value>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl From<Incident> for VerificationStatusResponse {
    fn from(incident: Incident) -> Self {
        Self {
            incident_id: incident.id,
            verified: incident.verified,
            verification: incident.verification_data,
            verified_at: incident.verified_at,
        }
    }
}

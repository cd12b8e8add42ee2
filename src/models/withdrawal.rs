//! Withdrawal request models for the admin listing.
//!
//! This module defines:
//! - `WithdrawalStatus` and the `status` query filter parser
//! - `WithdrawalRow`: flat row of the withdrawal/profile/claim join
//! - `WithdrawalResponse`: nested shape returned to the admin console

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Filter applied when the `status` query parameter is absent.
pub const DEFAULT_STATUS_FILTER: &str = "pending,processing";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    Pending,
    Processing,
    Completed,
    Rejected,
    Cancelled,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Processing => "processing",
            WithdrawalStatus::Completed => "completed",
            WithdrawalStatus::Rejected => "rejected",
            WithdrawalStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for WithdrawalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(WithdrawalStatus::Pending),
            "processing" => Ok(WithdrawalStatus::Processing),
            "completed" => Ok(WithdrawalStatus::Completed),
            "rejected" => Ok(WithdrawalStatus::Rejected),
            "cancelled" => Ok(WithdrawalStatus::Cancelled),
            other => Err(format!("unknown withdrawal status '{other}'")),
        }
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a comma-separated status filter.
///
/// Entries are trimmed, blanks skipped and duplicates dropped. A filter with
/// no entries falls back to `pending,processing`.
pub fn parse_status_filter(raw: Option<&str>) -> Result<Vec<WithdrawalStatus>, String> {
    let mut statuses = Vec::new();
    for part in raw.unwrap_or(DEFAULT_STATUS_FILTER).split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let status: WithdrawalStatus = part.parse()?;
        if !statuses.contains(&status) {
            statuses.push(status);
        }
    }

    if statuses.is_empty() {
        return parse_status_filter(None);
    }
    Ok(statuses)
}

/// Query string for `GET /api/admin/withdrawals`.
#[derive(Debug, Default, Deserialize)]
pub struct WithdrawalQuery {
    pub status: Option<String>,
}

/// One row of the withdrawal/profile/claim join.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WithdrawalRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub claim_id: Option<Uuid>,
    pub amount_cents: i64,
    pub status: String,
    pub payment_method: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub profile_full_name: Option<String>,
    pub profile_email: Option<String>,
    pub profile_phone: Option<String>,
    pub claim_status: Option<String>,
    pub claim_bus_line: Option<String>,
    pub claim_compensation_cents: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalProfile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalClaim {
    pub id: Uuid,
    pub status: Option<String>,
    pub bus_line: Option<String>,
    pub compensation_cents: Option<i64>,
}

/// Withdrawal as shown in the admin console.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalResponse {
    pub id: Uuid,
    pub amount_cents: i64,
    pub status: String,
    pub payment_method: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub profile: WithdrawalProfile,
    pub claim: Option<WithdrawalClaim>,
}

impl From<WithdrawalRow> for WithdrawalResponse {
    fn from(row: WithdrawalRow) -> Self {
        let claim = row.claim_id.map(|id| WithdrawalClaim {
            id,
            status: row.claim_status,
            bus_line: row.claim_bus_line,
            compensation_cents: row.claim_compensation_cents,
        });

        Self {
            id: row.id,
            amount_cents: row.amount_cents,
            status: row.status,
            payment_method: row.payment_method,
            requested_at: row.requested_at,
            processed_at: row.processed_at,
            profile: WithdrawalProfile {
                id: row.user_id,
                full_name: row.profile_full_name,
                email: row.profile_email,
                phone: row.profile_phone,
            },
            claim,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WithdrawalListResponse {
    pub withdrawals: Vec<WithdrawalResponse>,
    pub count: usize,
}

//! Data models representing database entities and API payloads.

/// Incident and verification payloads
pub mod incident;
/// Payment and payout confirmation models
pub mod payment;
/// Profile roles
pub mod profile;
/// Admin settings
pub mod setting;
/// Withdrawal requests
pub mod withdrawal;

//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, query string, path params)
//! 2. Validates it and calls the store or an external collaborator
//! 3. Returns an HTTP response (JSON or XML, status code)

/// Service health
pub mod health;
/// Incident verification
pub mod incidents;
/// Payout confirmation
pub mod payouts;
/// Admin settings
pub mod settings;
/// SIRI proxy
pub mod siri;
/// Withdrawal listing
pub mod withdrawals;

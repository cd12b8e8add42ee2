//! HTTP middleware components.
//!
//! Middleware run before route handlers and short-circuit requests that
//! fail authentication or authorization.

/// Admin role check
pub mod admin;
/// Bearer token authentication
pub mod auth;

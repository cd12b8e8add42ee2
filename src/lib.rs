//! Bus-delay claims admin API.
//!
//! HTTP handlers backing the claims web application: payout confirmation,
//! admin settings, withdrawal listing, a SIRI real-time proxy and incident
//! verification.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: the hosted backend's PostgreSQL, through sqlx
//! - **Authentication**: bearer tokens checked against the hosted identity API
//! - **Format**: JSON requests/responses (raw XML for the SIRI proxy)

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;
pub mod state;
pub mod testing;

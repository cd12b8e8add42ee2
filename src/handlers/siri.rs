//! SIRI proxy HTTP handler.
//!
//! - GET /api/siri/stop-monitoring?stopCode=21472 - Real-time visits for a stop

use crate::{error::AppError, services::siri::validate_stop_code, state::AppState};
use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::header::CONTENT_TYPE,
    response::IntoResponse,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopMonitoringQuery {
    pub stop_code: Option<String>,
}

/// Forward a stop-monitoring request to the operator's SIRI endpoint.
///
/// # Authentication
///
/// None; the endpoint is used by the public claim form.
///
/// # Response
///
/// - **Success (200 OK)**: Raw SIRI XML (`application/xml`)
/// - **Error (500 `PROXY_NOT_CONFIGURED`)**: No proxy configured, reported before input validation
/// - **Error (400)**: Missing or non-numeric `stopCode`
/// - **Error (502)**: Operator error or unreachable
/// - **Error (504)**: Operator did not answer within the timeout
pub async fn stop_monitoring(
    State(state): State<AppState>,
    query: Result<Query<StopMonitoringQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    if !state.siri.is_configured() {
        return Err(AppError::ProxyNotConfigured);
    }
    let Query(query) = query?;

    let stop_code = validate_stop_code(query.stop_code.as_deref())?;

    let xml = state.siri.stop_monitoring(stop_code).await?;

    Ok(([(CONTENT_TYPE, "application/xml; charset=utf-8")], xml))
}

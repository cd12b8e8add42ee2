//! Withdrawal listing HTTP handler.

use crate::{
    error::AppError,
    models::withdrawal::{
        WithdrawalListResponse, WithdrawalQuery, WithdrawalResponse, parse_status_filter,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

/// List withdrawal requests for the admin console.
///
/// # Endpoint
///
/// `GET /api/admin/withdrawals?status=pending,processing`
///
/// `status` is a comma-separated filter, `pending,processing` when absent.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "withdrawals": [
///     {
///       "id": "770e8400-...",
///       "amountCents": 8000,
///       "status": "pending",
///       "paymentMethod": "bank_transfer",
///       "requestedAt": "2026-10-18T09:00:00Z",
///       "processedAt": null,
///       "profile": { "id": "...", "fullName": "Dana Levi", "email": "...", "phone": "..." },
///       "claim": { "id": "...", "status": "approved", "busLine": "480", "compensationCents": 8000 }
///     }
///   ],
///   "count": 1
/// }
/// ```
///
/// # Ordering
///
/// Oldest request first.
pub async fn list_withdrawals(
    State(state): State<AppState>,
    query: Result<Query<WithdrawalQuery>, QueryRejection>,
) -> Result<Json<WithdrawalListResponse>, AppError> {
    let Query(query) = query?;
    let statuses = parse_status_filter(query.status.as_deref()).map_err(AppError::InvalidRequest)?;

    let rows = state.store.list_withdrawals(&statuses).await?;

    let withdrawals: Vec<WithdrawalResponse> = rows.into_iter().map(Into::into).collect();

    Ok(Json(WithdrawalListResponse {
        count: withdrawals.len(),
        withdrawals,
    }))
}

//! Payout confirmation HTTP handler.
//!
//! - POST /api/admin/payouts/confirm - Record a completed bank transfer

use crate::{
    error::AppError,
    middleware::admin::AdminContext,
    models::payment::{ConfirmPayoutRequest, PayoutReceipt, PayoutStatus},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};

/// Confirm that a claim's payout was transferred to the customer.
///
/// # Endpoint
///
/// `POST /api/admin/payouts/confirm`
///
/// # Authentication
///
/// Requires a bearer token of an `admin` or `super_admin` profile.
///
/// # Request Body
///
/// ```json
/// {
///   "claimId": "550e8400-e29b-41d4-a716-446655440000",
///   "paymentId": "660e8400-e29b-41d4-a716-446655440001",
///   "reference": "TRF-2026-0042"
/// }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: Returns a [`PayoutReceipt`]
/// - **Error (400)**: Missing, mistyped or malformed fields
/// - **Error (404)**: Payment not found for this claim
/// - **Error (409)**: Payout already completed
///
/// # Notifications
///
/// The customer notification is sent after the payout is committed. A
/// failed notification is logged and reported as `notificationSent: false`;
/// the payout stays completed.
pub async fn confirm_payout(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    payload: Result<Json<ConfirmPayoutRequest>, JsonRejection>,
) -> Result<Json<PayoutReceipt>, AppError> {
    let Json(request) = payload?;
    let (claim_id, payment_id, reference) =
        request.validate().map_err(AppError::InvalidRequest)?;

    let payment = state
        .store
        .find_payment(payment_id, claim_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

    if payment.payout_status() == PayoutStatus::Completed {
        return Err(AppError::PayoutAlreadyCompleted);
    }

    let completion = state.commission.complete_payout(&payment, &reference).await?;

    tracing::info!(
        %payment_id,
        %claim_id,
        confirmed_by = %admin.user_id,
        role = %admin.role,
        payout_cents = completion.payout_amount_cents,
        commission_cents = completion.commission_cents,
        "payout completed"
    );

    let notification_sent = match state.notifier.payout_completed(&completion).await {
        Ok(sent) => sent,
        Err(e) => {
            tracing::warn!(%payment_id, error = %e, "payout notification failed");
            false
        }
    };

    Ok(Json(PayoutReceipt::new(completion, notification_sent)))
}

//! Admin role check for management endpoints.
//!
//! Runs after [`super::auth::auth_middleware`] and rejects callers whose
//! profile does not carry the `admin` or `super_admin` role.

use crate::{error::AppError, middleware::auth::AuthContext, models::profile::Role, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Attached to requests that passed the admin check.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub user_id: Uuid,
    pub role: Role,
}

/// # Returns
///
/// - `Err(AppError::Unauthorized)` when authentication did not run first
/// - `Err(AppError::Forbidden)` when the caller has no profile or no admin role
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = request
        .extensions()
        .get::<AuthContext>()
        .map(|auth| auth.user_id)
        .ok_or(AppError::Unauthorized)?;

    let role = match state.store.find_role(user_id).await? {
        Some(role) if role.is_admin() => role,
        _ => {
            tracing::warn!(%user_id, "non-admin caller rejected");
            return Err(AppError::Forbidden);
        }
    };

    request.extensions_mut().insert(AdminContext { user_id, role });

    Ok(next.run(request).await)
}

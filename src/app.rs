//! HTTP router assembly.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{health, incidents, payouts, settings, siri, withdrawals},
    middleware::{admin::require_admin, auth::auth_middleware},
    state::AppState,
};

/// Build the application router.
///
/// # Route Groups
///
/// - Public: `/health`, `/api/siri/stop-monitoring`
/// - Authenticated: incident verification
/// - Admin (authenticated + admin role): payouts, settings, withdrawals
pub fn router(state: AppState) -> Router {
    // Layers run outermost-last: authentication wraps the admin check
    let admin_routes = Router::new()
        .route("/api/admin/payouts/confirm", post(payouts::confirm_payout))
        .route(
            "/api/admin/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route(
            "/api/admin/withdrawals",
            get(withdrawals::list_withdrawals),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let authenticated_routes = Router::new()
        .route("/api/incidents/verify", post(incidents::verify_incident))
        .route(
            "/api/incidents/{id}/verification",
            get(incidents::get_verification),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/siri/stop-monitoring", get(siri::stop_monitoring))
        .merge(admin_routes)
        .merge(authenticated_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

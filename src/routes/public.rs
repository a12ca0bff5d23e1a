use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints that need no session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // GET /api/settings/routes
        // The settings-provider contract: current route flags and maintenance state.
        .route("/api/settings/routes", get(handlers::get_route_settings))
        // GET /api/gate/check
        // Forward-auth decision for the URI in X-Forwarded-Uri.
        .route("/api/gate/check", get(handlers::check_gate))
}

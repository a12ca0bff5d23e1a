use crate::{AppState, handlers};
use axum::{Router, routing::put};

/// Admin Router Module
///
/// Endpoints that change what the gate lets through. Each handler takes the
/// `AuthUser` extractor (401 without a valid session) and checks for the
/// admin role itself (403 otherwise).
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // PUT /api/admin/settings/routes
        // Partial update of maintenance mode and route flags.
        .route(
            "/api/admin/settings/routes",
            put(handlers::update_route_settings),
        )
}

use crate::{
    AppState,
    auth::AuthUser,
    gate::paths,
    models::{GateCheckResponse, Role, RouteSettingsPayload, RouteSettingsUpdate},
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};

/// Headers a reverse proxy uses to pass the original request URI to a
/// forward-auth endpoint (Traefik first, then nginx).
const FORWARDED_URI_HEADERS: &[&str] = &["x-forwarded-uri", "x-original-uri"];

// --- Handlers ---

/// get_route_settings
///
/// [Public Route] Serves the current route settings. This is the endpoint the
/// gate's HTTP settings provider reads; missing fields on the wire fall back
/// to the payload defaults.
#[utoipa::path(
    get,
    path = "/api/settings/routes",
    responses((status = 200, description = "Current route settings", body = RouteSettingsPayload))
)]
pub async fn get_route_settings(State(state): State<AppState>) -> Json<RouteSettingsPayload> {
    Json(state.store.load().await)
}

/// update_route_settings
///
/// [Admin Route] Partially updates the route settings and drops the gate's
/// cached snapshot so the change applies from the next request on.
#[utoipa::path(
    put,
    path = "/api/admin/settings/routes",
    request_body = RouteSettingsUpdate,
    responses(
        (status = 200, description = "Updated", body = RouteSettingsPayload),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Not an admin"),
        (status = 422, description = "Maintenance target is not a usable redirect")
    )
)]
pub async fn update_route_settings(
    AuthUser { id, role, .. }: AuthUser,
    State(state): State<AppState>,
    Json(update): Json<RouteSettingsUpdate>,
) -> Result<Json<RouteSettingsPayload>, StatusCode> {
    if role != Role::Admin {
        tracing::warn!(user_id = %id, role = role.as_str(), "Settings update refused");
        return Err(StatusCode::FORBIDDEN);
    }

    if let Some(target) = update.maintenance_redirect_url.as_deref()
        && !target.trim().is_empty()
        && !paths::is_redirect_target(target)
    {
        tracing::warn!(
            user_id = %id,
            redirect_target = ?target,
            "Settings update rejected: bad maintenance target"
        );
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let payload = state.store.update(update).await;
    state.gate.invalidate_settings().await;

    tracing::info!(
        user_id = %id,
        maintenance = payload.maintenance_mode,
        "Route settings updated"
    );
    Ok(Json(payload))
}

/// check_gate
///
/// [Public Route] Forward-auth check for a frontend deployed behind a reverse
/// proxy. The proxy passes the original URI in `X-Forwarded-Uri` (or
/// `X-Original-Uri`) along with the client's cookies and Authorization header.
///
/// Returns 200 when the request may continue, and 307 with a `Location`
/// header otherwise.
#[utoipa::path(
    get,
    path = "/api/gate/check",
    responses(
        (status = 200, description = "Request may continue", body = GateCheckResponse),
        (status = 307, description = "Client must be redirected", body = GateCheckResponse),
        (status = 400, description = "No forwarded URI header")
    )
)]
pub async fn check_gate(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(path) = forwarded_path(&headers) else {
        return (StatusCode::BAD_REQUEST, "missing x-forwarded-uri").into_response();
    };

    let decision = state.gate.decide_for(&path, &headers).await;
    let body = Json(GateCheckResponse::from(&decision));

    match decision.location() {
        None => (StatusCode::OK, body).into_response(),
        Some(location) => (
            StatusCode::TEMPORARY_REDIRECT,
            [(header::LOCATION, location.to_string())],
            body,
        )
            .into_response(),
    }
}

/// The path component of the forwarded URI, query string dropped.
fn forwarded_path(headers: &HeaderMap) -> Option<String> {
    FORWARDED_URI_HEADERS
        .iter()
        .find_map(|name| headers.get(*name).and_then(|value| value.to_str().ok()))
        .map(|uri| uri.split(['?', '#']).next().unwrap_or(uri).to_string())
        .filter(|path| path.starts_with('/'))
}

use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::{HeaderName, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Duration;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Gate collaborators.
pub mod auth;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod settings;
pub mod store;

// The decision engine.
pub mod gate;

// HTTP surface.
pub mod handlers;
pub mod routes;
use routes::{admin, public};

// --- Public Re-exports ---

pub use cache::SettingsCache;
pub use clock::{Clock, ClockState, ManualClock, SystemClock};
pub use config::AppConfig;
pub use error::{GateError, GateResult};
pub use gate::{GateState, RequestGate};
pub use models::{GateDecision, Role, RouteSettings, Session};
pub use settings::{
    HttpSettingsProvider, MockSettingsProvider, SettingsProvider, SettingsProviderState,
    StoreSettingsProvider,
};
pub use store::{InMemorySettingsStore, SettingsStore, SettingsStoreState};

use auth::{JwtVerifier, VerifierState, extract_credential};

/// ApiDoc
///
/// OpenAPI document for the gate's own endpoints, served at
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_route_settings,
        handlers::update_route_settings,
        handlers::check_gate
    ),
    components(
        schemas(
            models::RouteSettingsPayload,
            models::RouteSettingsUpdate,
            models::GateCheckResponse,
        )
    ),
    tags(
        (name = "gym-gate", description = "Request gate for the gym portals")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything the handlers and the gate middleware share. Cheap to clone:
/// every service sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The request gate (settings cache + token verifier + clock).
    pub gate: GateState,
    /// Mutable route settings served by the settings endpoint.
    pub store: SettingsStoreState,
    /// Session token verification, shared with the `AuthUser` extractor.
    pub verifier: VerifierState,
    pub config: AppConfig,
}

impl AppState {
    /// from_config
    ///
    /// Wires the production services: a JWT verifier over the configured
    /// secret, an in-memory settings store, and either a remote HTTP settings
    /// provider (when `settings_url` is set) or one reading that store.
    pub fn from_config(config: AppConfig) -> GateResult<Self> {
        let store: SettingsStoreState = Arc::new(InMemorySettingsStore::default());
        let verifier: VerifierState = Arc::new(JwtVerifier::new(&config.jwt_secret));

        let provider: SettingsProviderState = match &config.settings_url {
            Some(url) => Arc::new(HttpSettingsProvider::new(
                url.clone(),
                std::time::Duration::from_secs(config.settings_timeout_secs),
            )?) as SettingsProviderState,
            None => Arc::new(StoreSettingsProvider::new(store.clone())) as SettingsProviderState,
        };

        Ok(Self::with_services(
            config,
            store,
            verifier,
            provider,
            Arc::new(SystemClock),
        ))
    }

    /// Assembles the state from explicit services. Tests use this to inject
    /// a mock provider or a manual clock.
    pub fn with_services(
        config: AppConfig,
        store: SettingsStoreState,
        verifier: VerifierState,
        provider: SettingsProviderState,
        clock: ClockState,
    ) -> Self {
        let cache = SettingsCache::new(provider, Duration::seconds(config.settings_ttl_secs));
        let gate = Arc::new(RequestGate::new(
            cache,
            verifier.clone(),
            clock,
            config.session_cookie_name.clone(),
        ));

        Self {
            gate,
            store,
            verifier,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for GateState {
    fn from_ref(app_state: &AppState) -> GateState {
        app_state.gate.clone()
    }
}

impl FromRef<AppState> for SettingsStoreState {
    fn from_ref(app_state: &AppState) -> SettingsStoreState {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for VerifierState {
    fn from_ref(app_state: &AppState) -> VerifierState {
        app_state.verifier.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// gate_middleware
///
/// Runs the request gate in front of every route. A `Continue` decision
/// hands the request to the inner service; anything else answers with a
/// 307 to the decision's location.
pub async fn gate_middleware(
    State(gate): State<GateState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let credential = extract_credential(request.headers(), gate.cookie_name());
    let decision = gate.decide(&path, credential.as_deref()).await;

    match decision.location() {
        None => next.run(request).await,
        Some(location) => Redirect::temporary(location).into_response(),
    }
}

/// Page paths the gate let through but this service does not serve; the
/// portal pages themselves live in the frontend.
async fn page_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}

/// create_router
///
/// Assembles the routes, the gate, and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(admin::admin_routes())
        .fallback(page_not_found)
        // The gate sees every request; API, asset, and probe paths bypass it by rule.
        .layer(middleware::from_fn_with_state(
            state.gate.clone(),
            gate_middleware,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one HTTP request, tagged with its `x-request-id` so every gate
/// log line for that request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}

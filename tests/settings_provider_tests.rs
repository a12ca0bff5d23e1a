use axum::{Router, http::StatusCode, routing::get};
use chrono::Utc;
use gym_gate::{GateError, HttpSettingsProvider, RouteSettings, SettingsCache, SettingsProvider};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;

// --- Local Settings Server ---

const SETTINGS_PATH: &str = "/api/settings/routes";

/// Serves `router` on an ephemeral port and returns the settings URL.
async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}{}", addr, SETTINGS_PATH)
}

async fn serve_body(status: StatusCode, body: &'static str) -> String {
    serve(Router::new().route(SETTINGS_PATH, get(move || async move { (status, body) }))).await
}

fn provider(url: String) -> HttpSettingsProvider {
    HttpSettingsProvider::new(url, Duration::from_secs(2)).unwrap()
}

// --- Tests ---

#[tokio::test]
async fn test_partial_body_takes_defaults() {
    let url = serve_body(
        StatusCode::OK,
        r#"{"maintenanceMode": true, "routeCoachEnabled": true}"#,
    )
    .await;

    let settings = provider(url).fetch().await.unwrap();

    assert!(settings.maintenance_mode);
    assert_eq!(settings.maintenance_redirect_target, "/maintenance");
    assert_eq!(settings.route_enabled("/coach"), Some(true));
    assert_eq!(settings.route_enabled("/user"), Some(false));
    assert_eq!(settings.route_enabled("/events"), Some(true));
}

#[tokio::test]
async fn test_server_error_is_fetch_failure() {
    let url = serve_body(StatusCode::INTERNAL_SERVER_ERROR, r#"{"maintenanceMode": true}"#).await;
    let provider = Arc::new(provider(url));

    let result = provider.fetch().await;
    assert!(matches!(result, Err(GateError::ConfigFetch(_))));

    // The body of a failed answer is never trusted.
    let cache = SettingsCache::with_default_ttl(provider);
    let settings = cache.get(Utc::now()).await;
    assert_eq!(settings, RouteSettings::default());
    assert!(!settings.maintenance_mode);
    assert!(cache.peek().await.is_none());
}

#[tokio::test]
async fn test_malformed_body_is_fetch_failure() {
    let url = serve_body(StatusCode::OK, "<html>maintenance</html>").await;

    let result = provider(url).fetch().await;

    assert!(matches!(result, Err(GateError::ConfigFetch(_))));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let url = serve(Router::new().route(
        SETTINGS_PATH,
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "{}"
        }),
    ))
    .await;
    let provider = HttpSettingsProvider::new(url, Duration::from_millis(200)).unwrap();

    match provider.fetch().await {
        Err(GateError::ConfigFetch(reason)) => assert!(reason.contains("timed out"), "{reason}"),
        other => panic!("expected a timeout, got {:?}", other.map(|s| s.maintenance_mode)),
    }
}

#[tokio::test]
async fn test_unreachable_provider_is_fetch_failure() {
    // Reserve a port, then close it so nothing is listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = provider(format!("http://{}{}", addr, SETTINGS_PATH)).fetch().await;

    assert!(matches!(result, Err(GateError::ConfigFetch(_))));
}

use axum::http::{HeaderMap, HeaderValue, header};
use chrono::{Duration, TimeZone, Utc};
use gym_gate::{
    GateDecision, ManualClock, MockSettingsProvider, RequestGate, RouteSettings, SettingsCache,
    auth::{Claims, JwtVerifier},
    models::RouteSettingsPayload,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{sync::Arc, time::SystemTime};

// --- Helpers ---

const SECRET: &str = "gate-test-secret";

fn token(role: &str, secret: &str) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;
    let claims = Claims {
        sub: "user-42".to_string(),
        email: "coach@gym.test".to_string(),
        role: role.to_string(),
        iat: now,
        exp: now + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

struct Harness {
    gate: RequestGate,
    provider: Arc<MockSettingsProvider>,
    clock: Arc<ManualClock>,
}

fn harness(provider: MockSettingsProvider) -> Harness {
    let provider = Arc::new(provider);
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
    ));
    let gate = RequestGate::new(
        SettingsCache::with_default_ttl(provider.clone()),
        Arc::new(JwtVerifier::new(SECRET)),
        clock.clone(),
        "session_token",
    );
    Harness {
        gate,
        provider,
        clock,
    }
}

fn maintenance(target: &str) -> RouteSettings {
    RouteSettingsPayload {
        maintenance_mode: true,
        maintenance_redirect_url: target.to_string(),
        ..Default::default()
    }
    .into()
}

// --- Tests ---

#[tokio::test]
async fn test_assets_do_not_touch_settings() {
    let h = harness(MockSettingsProvider::new(maintenance("/maintenance")));

    assert_eq!(h.gate.decide("/favicon.ico", None).await, GateDecision::Continue);
    assert_eq!(
        h.gate.decide("/_next/static/app.js", None).await,
        GateDecision::Continue
    );
    assert_eq!(h.provider.call_count(), 0);
}

#[tokio::test]
async fn test_maintenance_redirect_from_provider_settings() {
    let h = harness(MockSettingsProvider::new(maintenance("/waitlist")));

    assert_eq!(
        h.gate.decide("/", None).await,
        GateDecision::RedirectTo("/waitlist".to_string())
    );
}

#[tokio::test]
async fn test_provider_failure_still_decides() {
    let h = harness(MockSettingsProvider::new_failing());

    // Maintenance is treated as off.
    assert_eq!(h.gate.decide("/", None).await, GateDecision::Continue);
    assert_eq!(h.gate.decide("/login", None).await, GateDecision::Continue);
    assert_eq!(
        h.gate.decide("/coach", None).await,
        GateDecision::RedirectTo("/coach/login?redirect=/coach".to_string())
    );
}

#[tokio::test]
async fn test_decisions_share_snapshot_within_ttl() {
    let h = harness(MockSettingsProvider::new(maintenance("/maintenance")));

    let first = h.gate.decide("/", None).await;
    h.provider.set_settings(RouteSettings::default());
    h.clock.advance(Duration::seconds(15));
    let second = h.gate.decide("/", None).await;

    assert_eq!(first, second);
    assert_eq!(h.provider.call_count(), 1);

    h.clock.advance(Duration::seconds(16));
    assert_eq!(h.gate.decide("/", None).await, GateDecision::Continue);
    assert_eq!(h.provider.call_count(), 2);
}

#[tokio::test]
async fn test_valid_token_passes_role_check() {
    let h = harness(MockSettingsProvider::new(RouteSettings::default()));
    let professor = token("professor", SECRET);

    assert_eq!(
        h.gate.decide("/coach/agenda", Some(&professor)).await,
        GateDecision::Continue
    );
    assert_eq!(
        h.gate.decide("/admin", Some(&professor)).await,
        GateDecision::Unauthorized
    );
}

#[tokio::test]
async fn test_invalid_token_is_same_as_no_token() {
    let h = harness(MockSettingsProvider::new(RouteSettings::default()));
    let forged = token("admin", "not-the-secret");

    let anonymous = h.gate.decide("/admin/dashboard", None).await;
    let with_forged = h.gate.decide("/admin/dashboard", Some(&forged)).await;
    let with_garbage = h.gate.decide("/admin/dashboard", Some("garbage")).await;

    assert_eq!(
        anonymous,
        GateDecision::RedirectTo("/admin/login?redirect=/admin/dashboard".to_string())
    );
    assert_eq!(with_forged, anonymous);
    assert_eq!(with_garbage, anonymous);
}

#[tokio::test]
async fn test_decide_for_reads_cookie() {
    let h = harness(MockSettingsProvider::new(RouteSettings::default()));
    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("session_token={}", token("funcionario", SECRET))).unwrap(),
    );

    assert_eq!(
        h.gate.decide_for("/employee/checkins", &headers).await,
        GateDecision::Continue
    );
    assert_eq!(h.gate.cookie_name(), "session_token");
}

#[tokio::test]
async fn test_invalidate_settings_applies_next_request() {
    let h = harness(MockSettingsProvider::new(RouteSettings::default()));

    assert_eq!(h.gate.decide("/", None).await, GateDecision::Continue);

    h.provider.set_settings(maintenance("/maintenance"));
    h.gate.invalidate_settings().await;

    assert_eq!(
        h.gate.decide("/", None).await,
        GateDecision::RedirectTo("/maintenance".to_string())
    );
}

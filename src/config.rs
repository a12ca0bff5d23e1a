use std::env;

use crate::cache::DEFAULT_SETTINGS_TTL_SECS;

/// Local-only signing secret; production must set JWT_SECRET.
const LOCAL_JWT_SECRET: &str = "gym-gate-local-development-secret";

/// AppConfig
///
/// The gate's configuration, loaded once at startup and shared read-only
/// through the application state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects log format and secret handling.
    pub env: Env,
    // Secret used to verify session tokens (HS256).
    pub jwt_secret: String,
    // Remote settings endpoint. None means the service's own settings store is used.
    pub settings_url: Option<String>,
    // Seconds a fetched settings snapshot stays fresh.
    pub settings_ttl_secs: i64,
    // Upper bound on a single settings fetch, in seconds.
    pub settings_timeout_secs: u64,
    // Cookie consulted when no bearer header is present.
    pub session_cookie_name: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
///
/// Local runs get pretty logs and a development signing secret; production
/// gets JSON logs and refuses to start without a real secret.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking values for tests.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            settings_url: None,
            settings_ttl_secs: DEFAULT_SETTINGS_TTL_SECS,
            settings_timeout_secs: 4,
            session_cookie_name: "session_token".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in production when JWT_SECRET is missing, so the gate never
    /// starts verifying tokens against a known development secret.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").unwrap_or_default().as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            Env::Local => env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
        };

        let defaults = Self::default();

        Self {
            env,
            jwt_secret,
            settings_url: env::var("SETTINGS_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            settings_ttl_secs: parse_var("SETTINGS_TTL_SECS").unwrap_or(defaults.settings_ttl_secs),
            settings_timeout_secs: parse_var("SETTINGS_TIMEOUT_SECS")
                .unwrap_or(defaults.settings_timeout_secs),
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or(defaults.session_cookie_name),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.trim().parse().ok())
}

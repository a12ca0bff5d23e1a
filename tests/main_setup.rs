use gym_gate::{AppConfig, AppState, config::Env};
use serial_test::serial;
use std::{env, panic};

// --- Setup/Teardown Utilities ---

const CONFIG_VARS: &[&str] = &[
    "APP_ENV",
    "JWT_SECRET",
    "SETTINGS_URL",
    "SETTINGS_TTL_SECS",
    "SETTINGS_TIMEOUT_SECS",
    "SESSION_COOKIE_NAME",
    "BIND_ADDR",
];

/// Runs `test` with the given variables set (and every other config variable
/// cleared), then restores the original environment.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    let result = run_with_env(&[("APP_ENV", "production")], || {
        panic::catch_unwind(AppConfig::load)
    });

    assert!(
        result.is_err(),
        "Production config loading should panic without JWT_SECRET"
    );
}

#[test]
#[serial]
fn test_app_config_production_with_secret() {
    let config = run_with_env(
        &[("APP_ENV", "production"), ("JWT_SECRET", "prod-secret")],
        AppConfig::load,
    );

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.jwt_secret, "prod-secret");
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(&[("APP_ENV", "local")], AppConfig::load);

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.settings_url, None);
    assert_eq!(config.settings_ttl_secs, 30);
    assert_eq!(config.settings_timeout_secs, 4);
    assert_eq!(config.session_cookie_name, "session_token");
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.jwt_secret, AppConfig::default().jwt_secret);
}

#[test]
#[serial]
fn test_app_config_overrides() {
    let config = run_with_env(
        &[
            ("SETTINGS_URL", "http://settings.internal/api/settings/routes"),
            ("SETTINGS_TTL_SECS", "10"),
            ("SETTINGS_TIMEOUT_SECS", "3"),
            ("SESSION_COOKIE_NAME", "gym_session"),
        ],
        AppConfig::load,
    );

    assert_eq!(
        config.settings_url.as_deref(),
        Some("http://settings.internal/api/settings/routes")
    );
    assert_eq!(config.settings_ttl_secs, 10);
    assert_eq!(config.settings_timeout_secs, 3);
    assert_eq!(config.session_cookie_name, "gym_session");
}

#[test]
#[serial]
fn test_app_config_ignores_unparseable_numbers() {
    let config = run_with_env(
        &[("SETTINGS_TTL_SECS", "soon"), ("SETTINGS_URL", "  ")],
        AppConfig::load,
    );

    assert_eq!(config.settings_ttl_secs, 30);
    assert_eq!(config.settings_url, None);
}

#[test]
fn test_state_from_config_with_remote_settings() {
    let config = AppConfig {
        settings_url: Some("http://127.0.0.1:9/api/settings/routes".to_string()),
        ..AppConfig::default()
    };

    assert!(AppState::from_config(config).is_ok());
}

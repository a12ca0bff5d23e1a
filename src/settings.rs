use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{
    error::{GateError, GateResult},
    models::{RouteSettings, RouteSettingsPayload},
    store::SettingsStoreState,
};

// 1. SettingsProvider Contract
/// SettingsProvider
///
/// Where the gate's route settings come from. The cache in front of it
/// decides how often `fetch` is called and what to do when it fails; a
/// provider only reports what it got.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn fetch(&self) -> GateResult<RouteSettings>;
}

// 2. Remote Implementation
/// HttpSettingsProvider
///
/// Reads settings from a remote `GET <settings-url>` endpoint. The client
/// carries a hard timeout so a slow settings backend cannot hold up every
/// request behind it; a timeout is reported as an ordinary fetch failure.
#[derive(Clone)]
pub struct HttpSettingsProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpSettingsProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> GateResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GateError::ConfigFetch(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl SettingsProvider for HttpSettingsProvider {
    async fn fetch(&self) -> GateResult<RouteSettings> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GateError::ConfigFetch(format!(
                "settings endpoint answered {}",
                status
            )));
        }

        let payload = response.json::<RouteSettingsPayload>().await?;
        Ok(payload.into())
    }
}

// 3. Local Implementation
/// StoreSettingsProvider
///
/// Reads the in-process settings store directly. Used when the service hosts
/// its own settings endpoint and no remote URL is configured.
#[derive(Clone)]
pub struct StoreSettingsProvider {
    store: SettingsStoreState,
}

impl StoreSettingsProvider {
    pub fn new(store: SettingsStoreState) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SettingsProvider for StoreSettingsProvider {
    async fn fetch(&self) -> GateResult<RouteSettings> {
        Ok(self.store.load().await.into())
    }
}

// 4. The Mock Implementation (For Tests)
/// MockSettingsProvider
///
/// Serves canned settings and counts how often it was asked, so tests can
/// observe whether the cache went to the provider. Flip `set_failing` to
/// simulate an unreachable backend.
#[derive(Debug, Default)]
pub struct MockSettingsProvider {
    settings: Mutex<RouteSettings>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MockSettingsProvider {
    pub fn new(settings: RouteSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn new_failing() -> Self {
        let provider = Self::default();
        provider.set_failing(true);
        provider
    }

    pub fn set_settings(&self, settings: RouteSettings) {
        let mut current = self
            .settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = settings;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `fetch` calls so far, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettingsProvider for MockSettingsProvider {
    async fn fetch(&self) -> GateResult<RouteSettings> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(GateError::ConfigFetch(
                "Mock settings error: simulation requested".to_string(),
            ));
        }

        let settings = self
            .settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(settings.clone())
    }
}

/// SettingsProviderState
///
/// The shared handle the cache fetches through.
pub type SettingsProviderState = Arc<dyn SettingsProvider>;

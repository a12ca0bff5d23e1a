use crate::models::{RouteSettingsPayload, RouteSettingsUpdate};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// SettingsStore Trait
///
/// The mutable source of truth behind the settings endpoint. The gate never
/// writes here; only the admin settings endpoint does.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Current settings in wire form.
    async fn load(&self) -> RouteSettingsPayload;
    /// Applies a partial update and returns the resulting settings.
    async fn update(&self, update: RouteSettingsUpdate) -> RouteSettingsPayload;
}

/// SettingsStoreState
///
/// The concrete type used to share the settings store across the application state.
pub type SettingsStoreState = Arc<dyn SettingsStore>;

/// InMemorySettingsStore
///
/// Process-local store. Contents reset to the seed on restart.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    payload: RwLock<RouteSettingsPayload>,
}

impl InMemorySettingsStore {
    pub fn new(seed: RouteSettingsPayload) -> Self {
        Self {
            payload: RwLock::new(seed),
        }
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self) -> RouteSettingsPayload {
        self.payload.read().await.clone()
    }

    async fn update(&self, update: RouteSettingsUpdate) -> RouteSettingsPayload {
        let mut payload = self.payload.write().await;
        payload.apply(update);
        payload.clone()
    }
}

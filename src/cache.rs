use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::{models::RouteSettings, settings::SettingsProviderState};

/// How long a fetched settings snapshot is served before refetching.
pub const DEFAULT_SETTINGS_TTL_SECS: i64 = 30;

/// CachedSettings
///
/// One fetched snapshot and the instant it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSettings {
    pub value: RouteSettings,
    pub fetched_at: DateTime<Utc>,
}

impl CachedSettings {
    /// A snapshot is fresh while `now - fetched_at < ttl`.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at >= ttl
    }
}

/// SettingsCache
///
/// TTL cache in front of a `SettingsProvider`, shared by all requests.
///
/// The lock is never held across the provider call: two requests that both
/// miss right after expiry may both fetch, and whichever finishes last owns
/// the slot. A fetch that started before an `invalidate` is not stored.
pub struct SettingsCache {
    provider: SettingsProviderState,
    ttl: Duration,
    slot: RwLock<Option<CachedSettings>>,
    /// Bumped by `invalidate`, checked under the write lock before storing.
    generation: AtomicU64,
}

impl SettingsCache {
    pub fn new(provider: SettingsProviderState, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            slot: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_default_ttl(provider: SettingsProviderState) -> Self {
        Self::new(provider, Duration::seconds(DEFAULT_SETTINGS_TTL_SECS))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// get
    ///
    /// Returns the cached snapshot while fresh, otherwise fetches once.
    ///
    /// A failed fetch is not stored. That request gets the last snapshot it
    /// can find (even a stale one), or the default table when nothing was
    /// ever fetched: maintenance off and the public areas open.
    pub async fn get(&self, now: DateTime<Utc>) -> RouteSettings {
        let generation = self.generation.load(Ordering::SeqCst);
        let previous = self.slot.read().await.clone();

        if let Some(cached) = &previous {
            if !cached.is_stale(now, self.ttl) {
                return cached.value.clone();
            }
        }

        match self.provider.fetch().await {
            Ok(value) => {
                let mut slot = self.slot.write().await;
                if self.generation.load(Ordering::SeqCst) == generation {
                    *slot = Some(CachedSettings {
                        value: value.clone(),
                        fetched_at: now,
                    });
                    tracing::debug!(
                        maintenance = value.maintenance_mode,
                        "Route settings refreshed"
                    );
                } else {
                    tracing::debug!("Settings invalidated during fetch, snapshot not stored");
                }
                value
            }
            Err(e) => match previous {
                Some(stale) => {
                    tracing::warn!(
                        error = %e,
                        fetched_at = %stale.fetched_at,
                        "Settings fetch failed, serving stale snapshot"
                    );
                    stale.value
                }
                None => {
                    tracing::warn!(
                        error = %e,
                        "Settings fetch failed, using default route settings"
                    );
                    RouteSettings::default()
                }
            },
        }
    }

    /// The current slot contents, without fetching.
    pub async fn peek(&self) -> Option<CachedSettings> {
        self.slot.read().await.clone()
    }

    /// Drops the cached snapshot; the next `get` fetches.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *slot = None;
    }
}

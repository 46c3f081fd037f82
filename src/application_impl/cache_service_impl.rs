use crate::application_port::{CacheService, ConnectionState};
use crate::domain_port::{CacheStore, CacheStoreError};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const DISCONNECTED: u8 = 0;
const CONNECTING: u8 = 1;
const CONNECTED: u8 = 2;

fn decode_state(raw: u8) -> ConnectionState {
    match raw {
        CONNECTED => ConnectionState::Connected,
        CONNECTING => ConnectionState::Connecting,
        _ => ConnectionState::Disconnected,
    }
}

/// Cache service over a [`CacheStore`]. Until the store has been connected,
/// and again after any connection-level failure, every operation
/// short-circuits without touching the backend.
pub struct RealCacheService {
    store: Arc<dyn CacheStore>,
    state: AtomicU8,
}

impl RealCacheService {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        RealCacheService {
            store,
            state: AtomicU8::new(DISCONNECTED),
        }
    }

    fn usable(&self) -> bool {
        self.state.load(Ordering::Acquire) == CONNECTED
    }

    fn on_error(&self, op: &'static str, target: &str, err: &CacheStoreError) {
        if err.is_connection() {
            let was = self.state.swap(DISCONNECTED, Ordering::AcqRel);
            if was == CONNECTED {
                error!(op, target, error = %err, "cache connection lost");
            } else {
                debug!(op, target, error = %err, "cache still unavailable");
            }
        } else {
            warn!(op, target, error = %err, "cache operation failed");
        }
    }
}

#[async_trait::async_trait]
impl CacheService for RealCacheService {
    fn state(&self) -> ConnectionState {
        decode_state(self.state.load(Ordering::Acquire))
    }

    async fn connect(&self) -> bool {
        self.state.store(CONNECTING, Ordering::Release);
        match self.store.connect().await {
            Ok(()) => {
                self.state.store(CONNECTED, Ordering::Release);
                info!("cache connected");
                true
            }
            Err(e) => {
                self.state.store(DISCONNECTED, Ordering::Release);
                error!(error = %e, "cache connection failed");
                false
            }
        }
    }

    async fn get(&self, key: &str) -> Option<serde_json::Value> {
        if !self.usable() {
            return None;
        }
        match self.store.get(key).await {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(value) => {
                    debug!(key, "cache hit");
                    Some(value)
                }
                Err(e) => {
                    warn!(key, error = %e, "discarding malformed cache payload");
                    None
                }
            },
            Ok(None) => {
                debug!(key, "cache miss");
                None
            }
            Err(e) => {
                self.on_error("get", key, &e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &serde_json::Value, ttl_secs: u64) -> bool {
        if ttl_secs == 0 {
            warn!(key, "refusing to cache without a ttl");
            return false;
        }
        if !self.usable() {
            return false;
        }
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key, error = %e, "value not serializable");
                return false;
            }
        };
        match self
            .store
            .set_ex(key, &payload, Duration::from_secs(ttl_secs))
            .await
        {
            Ok(()) => {
                debug!(key, ttl_secs, "cache set");
                true
            }
            Err(e) => {
                self.on_error("set", key, &e);
                false
            }
        }
    }

    async fn delete(&self, key: &str) -> bool {
        if !self.usable() {
            return false;
        }
        match self.store.del(key).await {
            Ok(()) => true,
            Err(e) => {
                self.on_error("delete", key, &e);
                false
            }
        }
    }

    async fn delete_pattern(&self, pattern: &str) -> bool {
        if !self.usable() {
            return false;
        }
        match self.store.del_matching(pattern).await {
            Ok(removed) => {
                debug!(pattern, removed, "cache pattern deleted");
                true
            }
            Err(e) => {
                self.on_error("delete_pattern", pattern, &e);
                false
            }
        }
    }

    async fn clear(&self) -> bool {
        if !self.usable() {
            return false;
        }
        match self.store.flush().await {
            Ok(()) => {
                info!("cache cleared");
                true
            }
            Err(e) => {
                self.on_error("clear", "*", &e);
                false
            }
        }
    }
}

/// Periodically reconnects a cache that has dropped to `Disconnected`.
/// `interval` must be non-zero. Stops when `cancel` fires.
pub fn spawn_cache_supervisor(
    cache: Arc<dyn CacheService>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if cache.state() == ConnectionState::Disconnected {
                        debug!("retrying cache connection");
                        cache.connect().await;
                    }
                }
            }
        }
        debug!("cache supervisor stopped");
    })
}

use crate::domain_port::{CacheStore, CacheStoreError};
use crate::infra_memory::glob_match;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Expired entries are swept on every this many writes.
const PRUNE_EVERY: u64 = 64;

#[derive(Debug, Clone)]
struct MemoryEntry {
    payload: String,
    expires_at: Instant,
}

/// In-process cache backend with per-key expiry. It can be switched off to
/// behave like an unreachable server.
pub struct MemoryCacheStore {
    entries: DashMap<String, MemoryEntry>,
    available: AtomicBool,
    writes: AtomicU64,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        MemoryCacheStore {
            entries: DashMap::new(),
            available: AtomicBool::new(true),
            writes: AtomicU64::new(0),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    /// Number of unexpired entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| e.expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn prune_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, e| e.expires_at > now);
    }

    fn check_available(&self) -> Result<(), CacheStoreError> {
        if self.available.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(CacheStoreError::Connection(
                "memory cache is unavailable".to_string(),
            ))
        }
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryCacheStore {
    async fn connect(&self) -> Result<(), CacheStoreError> {
        self.check_available()
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheStoreError> {
        self.check_available()?;
        let now = Instant::now();
        let found = self
            .entries
            .get(key)
            .map(|e| (e.payload.clone(), e.expires_at > now));
        match found {
            Some((payload, true)) => Ok(Some(payload)),
            Some((_, false)) => {
                self.entries.remove_if(key, |_, e| e.expires_at <= now);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(
        &self,
        key: &str,
        payload: &str,
        ttl: Duration,
    ) -> Result<(), CacheStoreError> {
        self.check_available()?;
        if (self.writes.fetch_add(1, Ordering::Relaxed) + 1) % PRUNE_EVERY == 0 {
            self.prune_expired();
        }
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                payload: payload.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheStoreError> {
        self.check_available()?;
        self.entries.remove(key);
        Ok(())
    }

    async fn del_matching(&self, pattern: &str) -> Result<u64, CacheStoreError> {
        self.check_available()?;
        let mut removed = 0u64;
        self.entries.retain(|key, _| {
            let hit = glob_match(pattern, key);
            if hit {
                removed += 1;
            }
            !hit
        });
        Ok(removed)
    }

    async fn flush(&self) -> Result<(), CacheStoreError> {
        self.check_available()?;
        self.entries.clear();
        Ok(())
    }
}

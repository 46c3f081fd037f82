use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Best-effort JSON cache. No method fails: backend trouble reads as a miss
/// (`None`) or as `false`, and is logged where it happens.
#[async_trait::async_trait]
pub trait CacheService: Send + Sync {
    fn state(&self) -> ConnectionState;

    /// Attempt to (re)connect. Returns whether the cache is now usable.
    async fn connect(&self) -> bool;

    async fn get(&self, key: &str) -> Option<serde_json::Value>;

    async fn set(&self, key: &str, value: &serde_json::Value, ttl_secs: u64) -> bool;

    async fn delete(&self, key: &str) -> bool;

    async fn delete_pattern(&self, pattern: &str) -> bool;

    async fn clear(&self) -> bool;
}

/// A value produced by a read-through lookup, with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub value: T,
    pub hit: bool,
}

impl<T> Cached<T> {
    pub fn hit(value: T) -> Self {
        Cached { value, hit: true }
    }

    pub fn miss(value: T) -> Self {
        Cached { value, hit: false }
    }
}

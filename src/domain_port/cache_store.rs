use std::time::Duration;

/// Raw key/value backend behind the cache service. Implementations report
/// every failure; absorbing them is the cache service's job.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Establish (or re-establish) the backend connection and confirm it answers.
    async fn connect(&self) -> Result<(), CacheStoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheStoreError>;

    async fn set_ex(&self, key: &str, payload: &str, ttl: Duration)
    -> Result<(), CacheStoreError>;

    /// Deleting an absent key is not an error.
    async fn del(&self, key: &str) -> Result<(), CacheStoreError>;

    /// Delete every key matching a Redis-style glob. Returns the number removed.
    async fn del_matching(&self, pattern: &str) -> Result<u64, CacheStoreError>;

    /// Drop everything in this store's namespace.
    async fn flush(&self) -> Result<(), CacheStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CacheStoreError {
    #[error("cache connection error: {0}")]
    Connection(String),
    #[error("cache backend error: {0}")]
    Backend(String),
}

impl CacheStoreError {
    pub fn is_connection(&self) -> bool {
        matches!(self, CacheStoreError::Connection(_))
    }
}

use crate::domain_port::{CacheStore, CacheStoreError};
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, RedisError};
use std::time::Duration;
use tokio::sync::RwLock;

const SCAN_BATCH: usize = 500;
const CONNECT_RETRIES: usize = 1;

/// Redis-backed cache store. All keys live under `prefix`. The connection
/// manager is created by [`CacheStore::connect`]; before that every call fails
/// with a connection error.
pub struct RedisCacheStore {
    client: redis::Client,
    conn: RwLock<Option<ConnectionManager>>,
    prefix: String,
    connect_timeout: Duration,
    response_timeout: Duration,
}

impl RedisCacheStore {
    pub fn new(
        url: &str,
        prefix: impl Into<String>,
        connect_timeout: Duration,
        response_timeout: Duration,
    ) -> Result<Self, CacheStoreError> {
        let client = redis::Client::open(url).map_err(classify)?;
        Ok(RedisCacheStore {
            client,
            conn: RwLock::new(None),
            prefix: prefix.into(),
            connect_timeout,
            response_timeout,
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    async fn conn(&self) -> Result<ConnectionManager, CacheStoreError> {
        self.conn
            .read()
            .await
            .clone()
            .ok_or_else(|| CacheStoreError::Connection("redis not connected".to_string()))
    }

    async fn scan_keys(
        &self,
        conn: &mut ConnectionManager,
        pattern: &str,
    ) -> Result<Vec<String>, CacheStoreError> {
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(conn)
                .await
                .map_err(classify)?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(keys)
    }
}

fn classify(e: RedisError) -> CacheStoreError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout()
    {
        CacheStoreError::Connection(e.to_string())
    } else {
        CacheStoreError::Backend(e.to_string())
    }
}

#[async_trait::async_trait]
impl CacheStore for RedisCacheStore {
    async fn connect(&self) -> Result<(), CacheStoreError> {
        let config = ConnectionManagerConfig::new()
            .set_connection_timeout(self.connect_timeout)
            .set_response_timeout(self.response_timeout)
            .set_number_of_retries(CONNECT_RETRIES);
        let mut manager = self
            .client
            .get_connection_manager_with_config(config)
            .await
            .map_err(classify)?;
        let _: String = redis::cmd("PING")
            .query_async(&mut manager)
            .await
            .map_err(classify)?;
        *self.conn.write().await = Some(manager);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheStoreError> {
        let mut conn = self.conn().await?;
        conn.get(self.key(key)).await.map_err(classify)
    }

    async fn set_ex(
        &self,
        key: &str,
        payload: &str,
        ttl: Duration,
    ) -> Result<(), CacheStoreError> {
        let mut conn = self.conn().await?;
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        let _: () = conn
            .pset_ex(self.key(key), payload, millis)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheStoreError> {
        let mut conn = self.conn().await?;
        let _: () = conn.del(self.key(key)).await.map_err(classify)?;
        Ok(())
    }

    async fn del_matching(&self, pattern: &str) -> Result<u64, CacheStoreError> {
        let mut conn = self.conn().await?;
        let keys = self.scan_keys(&mut conn, &self.key(pattern)).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        let removed: u64 = conn.del(&keys).await.map_err(classify)?;
        Ok(removed)
    }

    async fn flush(&self) -> Result<(), CacheStoreError> {
        if !self.prefix.is_empty() {
            self.del_matching("*").await?;
            return Ok(());
        }
        let mut conn = self.conn().await?;
        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut conn)
            .await
            .map_err(classify)?;
        Ok(())
    }
}

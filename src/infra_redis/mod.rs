mod cache_store_redis;

pub use cache_store_redis::*;

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::warn;

pub const USER_TTL: Duration = Duration::from_secs(300);
pub const FOOD_TTL: Duration = Duration::from_secs(3600);
pub const PREFERENCES_TTL: Duration = Duration::from_secs(1800);

/// Key/value store for serialized records.
#[async_trait]
pub trait CacheClient: Send + Sync {
    async fn get_raw(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> anyhow::Result<()>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}

/// Reads a cached record. Backend or decode failures are logged and read as a miss.
pub async fn get_json<T: DeserializeOwned>(cache: &dyn CacheClient, key: &str) -> Option<T> {
    let raw = match cache.get_raw(key).await {
        Ok(v) => v?,
        Err(e) => {
            warn!(error = %e, key, "cache get failed");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(error = %e, key, "cache entry undecodable; ignoring");
            None
        }
    }
}

pub async fn set_json<T: Serialize>(cache: &dyn CacheClient, key: &str, value: &T, ttl: Duration) {
    let raw = match serde_json::to_string(value) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, key, "cache encode failed");
            return;
        }
    };
    if let Err(e) = cache.set_raw(key, raw, ttl).await {
        warn!(error = %e, key, "cache set failed");
    }
}

pub async fn invalidate(cache: &dyn CacheClient, key: &str) {
    if let Err(e) = cache.delete(key).await {
        warn!(error = %e, key, "cache delete failed");
    }
}

#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url).context("open redis client")?;
        let manager = ConnectionManager::new(client)
            .await
            .context("connect to redis")?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheClient for RedisCache {
    async fn get_raw(&self, key: &str) -> anyhow::Result<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await.context("redis GET")?;
        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> anyhow::Result<()> {
        let mut conn = self.manager.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
            .await
            .context("redis SETEX")?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(key).await.context("redis DEL")?;
        Ok(())
    }
}

/// Process-local cache, used when no Redis URL is configured and in tests.
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, (String, Instant)>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    async fn get_raw(&self, key: &str) -> anyhow::Result<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, expires_at)) if *expires_at > now => return Ok(Some(value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // expired
        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> anyhow::Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        // drop keys nobody reads anymore
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key.to_string(), (value, now + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

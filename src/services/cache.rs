use redis::aio::ConnectionManager;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::CandidateKind;

/// Errors that can occur with cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    Miss(String),
}

/// Cache key builder so every call site agrees on the layout.
pub struct CacheKey;

impl CacheKey {
    /// Key for a person's recommendation shortlist of the given kind.
    pub fn recommendations(person_id: &str, kind: CandidateKind) -> String {
        match kind {
            CandidateKind::Counselor => format!("rec:counselor:{}", person_id),
            CandidateKind::Group => format!("rec:group:{}", person_id),
        }
    }
}

/// Two-tier cache for recommendation shortlists.
///
/// L1 is an in-process moka cache, L2 is Redis shared across instances.
/// Recommendations are advisory, so a stale entry within the TTL is fine;
/// match creation invalidates the requesting person's entries.
pub struct CacheManager {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    l1_cache: moka::future::Cache<String, String>,
    ttl_secs: u64,
}

impl CacheManager {
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            l1_cache,
            ttl_secs,
        })
    }

    /// Get a value, trying L1 before L2 and promoting L2 hits.
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: DeserializeOwned,
    {
        if let Some(json) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_str(&json)?);
        }

        let mut conn = self.redis.lock().await;
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut *conn).await?;
        drop(conn);

        match value {
            Some(json) => {
                tracing::trace!("L2 cache hit: {}", key);
                self.l1_cache.insert(key.to_string(), json.clone()).await;
                Ok(serde_json::from_str(&json)?)
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Err(CacheError::Miss(key.to_string()))
            }
        }
    }

    /// Set a value in both tiers with the configured TTL.
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        self.l1_cache.insert(key.to_string(), json.clone()).await;

        let mut conn = self.redis.lock().await;
        redis::cmd("SETEX")
            .arg(key)
            .arg(self.ttl_secs)
            .arg(json)
            .query_async::<()>(&mut *conn)
            .await?;

        Ok(())
    }

    /// Delete a key from both tiers.
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;
        let mut conn = self.redis.lock().await;
        redis::cmd("DEL").arg(key).query_async::<()>(&mut *conn).await?;
        Ok(())
    }

    /// Drop the cached shortlists of both kinds for one person.
    pub async fn invalidate_recommendations(&self, person_id: &str) -> Result<(), CacheError> {
        self.delete(&CacheKey::recommendations(person_id, CandidateKind::Counselor))
            .await?;
        self.delete(&CacheKey::recommendations(person_id, CandidateKind::Group))
            .await
    }
}

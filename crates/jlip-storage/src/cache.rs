//! Hot-list cache markers: short-TTL freshness signals for downstream
//! list views, keyed by source, location, and skill. Strictly
//! best-effort; a cache failure never fails an ingestion.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jlip_core::CanonicalJob;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::StoreError;

/// How many of a job's skills get their own hot-list marker.
const MAX_SKILL_KEYS: usize = 5;

/// Keyed marker store with TTL-based eviction. Injected so tests can
/// substitute the in-memory implementation and production can wire a
/// shared cache.
#[async_trait]
pub trait HotListCache: Send + Sync {
    async fn set(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;
    async fn get(&self, key: &str) -> Result<bool, StoreError>;
}

/// In-process cache; entries expire by deadline and are pruned lazily.
#[derive(Debug, Default)]
pub struct MemoryHotListCache {
    entries: Mutex<HashMap<String, Instant>>,
}

impl MemoryHotListCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HotListCache for MemoryHotListCache {
    async fn set(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        entries.retain(|_, deadline| *deadline > now);
        entries.insert(key.to_string(), now + ttl);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(deadline) if *deadline > Instant::now() => Ok(true),
            Some(_) => {
                entries.remove(key);
                Ok(false)
            }
            None => Ok(false),
        }
    }
}

/// Cache keys a job keeps warm: its source, its (country, city) pair when
/// both are known, and up to five of its skills.
pub fn hot_list_keys(job: &CanonicalJob) -> Vec<String> {
    let mut keys = vec![format!("hot:source:{}", job.source)];
    if let (Some(country), Some(city)) =
        (job.location.country.as_deref(), job.location.city.as_deref())
    {
        keys.push(format!(
            "hot:loc:{}:{}",
            country.to_lowercase(),
            city.to_lowercase()
        ));
    }
    for skill in job.skills.iter().take(MAX_SKILL_KEYS) {
        keys.push(format!("hot:skill:{}", skill.to_lowercase()));
    }
    keys
}

/// Write the job's hot-list markers, logging and swallowing failures.
pub async fn warm_hot_lists(cache: &dyn HotListCache, job: &CanonicalJob, ttl: Duration) {
    for key in hot_list_keys(job) {
        if let Err(err) = cache.set(&key, ttl).await {
            warn!(key = %key, error = %err, "hot list warm failed");
        }
    }
}

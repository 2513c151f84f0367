//! Repository contract and the in-memory implementation used by tests
//! and fixture-first runs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use jlip_core::CanonicalJob;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::merge::{fill_or_improve, supplied_fields};

/// What an upsert did: the stored record after the call, the visible
/// field changes, and whether the record was newly created.
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub job: CanonicalJob,
    pub updated_fields: Vec<String>,
    pub created: bool,
}

/// Aggregate counts for a bulk write. Individual-item failures are
/// counted, never propagated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkWriteStats {
    pub matched: u64,
    pub modified: u64,
    pub upserted: u64,
    pub failed: u64,
}

/// Canonical job repository keyed by composite key. The unique
/// constraint on the key is the only serialization point for concurrent
/// writers; implementations must turn a lost insert race into an update,
/// never into an error.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn upsert_by_composite_key(&self, job: CanonicalJob) -> Result<UpsertOutcome, StoreError>;

    async fn find_by_composite_key(&self, key: &str) -> Result<Option<CanonicalJob>, StoreError>;

    async fn bulk_upsert(&self, jobs: Vec<CanonicalJob>) -> Result<BulkWriteStats, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}

/// HashMap-backed store. Mirrors the Postgres merge semantics exactly so
/// pipeline behavior can be asserted without a database.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<String, CanonicalJob>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn upsert_by_composite_key(&self, job: CanonicalJob) -> Result<UpsertOutcome, StoreError> {
        let now = Utc::now();
        let mut jobs = self.jobs.lock().await;
        match jobs.get(&job.composite_key) {
            Some(existing) => {
                let (merged, updated_fields) = fill_or_improve(existing, &job, now);
                jobs.insert(merged.composite_key.clone(), merged.clone());
                Ok(UpsertOutcome {
                    job: merged,
                    updated_fields,
                    created: false,
                })
            }
            None => {
                let updated_fields = supplied_fields(&job);
                jobs.insert(job.composite_key.clone(), job.clone());
                Ok(UpsertOutcome {
                    job,
                    updated_fields,
                    created: true,
                })
            }
        }
    }

    async fn find_by_composite_key(&self, key: &str) -> Result<Option<CanonicalJob>, StoreError> {
        Ok(self.jobs.lock().await.get(key).cloned())
    }

    async fn bulk_upsert(&self, jobs: Vec<CanonicalJob>) -> Result<BulkWriteStats, StoreError> {
        let mut stats = BulkWriteStats::default();
        for job in jobs {
            match self.upsert_by_composite_key(job).await {
                Ok(outcome) if outcome.created => stats.upserted += 1,
                Ok(outcome) => {
                    stats.matched += 1;
                    if !outcome.updated_fields.is_empty() {
                        stats.modified += 1;
                    }
                }
                Err(_) => stats.failed += 1,
            }
        }
        Ok(stats)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.jobs.lock().await.len() as u64)
    }
}

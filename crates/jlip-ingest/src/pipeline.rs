//! Single-record and bulk ingestion pipelines.
//!
//! The single pipeline is a linear sequence: validate → normalize →
//! redact → derive identity → enrich → merge-upsert → warm cache →
//! audit. Persistence is the durability boundary: anything after the
//! upsert is best-effort and never rolls the write back. The bulk
//! pipeline fans out over a bounded worker pool and isolates per-item
//! failures.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jlip_core::{AuditAction, AuditEntry, CanonicalJob, IngestResult, JobDto};
use jlip_normalize::{composite_key, content_hash, enrich, normalize, redact, validate};
use jlip_storage::{
    warm_hot_lists, AuditSink, HotListCache, JobStore, MemoryHotListCache, PgAuditSink, PgJobStore,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::IngestConfig;
use crate::error::IngestError;

/// Aggregate outcome of a bulk ingestion. `results[i]` corresponds to
/// input item `i` (after truncation to the max batch size).
#[derive(Debug)]
pub struct BulkSummary {
    pub success: usize,
    pub failed: usize,
    pub results: Vec<Result<IngestResult, IngestError>>,
}

#[derive(Clone)]
pub struct IngestPipeline {
    config: IngestConfig,
    store: Arc<dyn JobStore>,
    cache: Arc<dyn HotListCache>,
    audit: Arc<dyn AuditSink>,
}

impl IngestPipeline {
    pub fn new(
        config: IngestConfig,
        store: Arc<dyn JobStore>,
        cache: Arc<dyn HotListCache>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            config,
            store,
            cache,
            audit,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Run one record through the full pipeline.
    ///
    /// A validation failure aborts before any side effect. A store
    /// failure propagates to the caller as retryable. Cache and audit
    /// failures after a successful upsert are logged and swallowed.
    pub async fn ingest_one(&self, dto: JobDto) -> Result<IngestResult, IngestError> {
        let now = Utc::now();
        validate(&dto, now).map_err(IngestError::Validation)?;

        let dto = normalize(dto, &self.config.normalize_options());
        let hash = content_hash(&dto);
        let key = composite_key(&dto, &hash);

        let mut job = CanonicalJob::from_dto(dto, hash, key, now);
        if self.config.redact_pii {
            job.sanitized_description = job.description.as_deref().map(redact);
        }
        let job = enrich(job);

        let outcome = self.store.upsert_by_composite_key(job).await?;

        warm_hot_lists(
            self.cache.as_ref(),
            &outcome.job,
            Duration::from_secs(self.config.hot_list_ttl_secs),
        )
        .await;

        let effectful = outcome.created || !outcome.updated_fields.is_empty();
        if self.config.audit_enabled && effectful {
            let entry = AuditEntry {
                id: Uuid::new_v4(),
                job_id: outcome.job.id,
                action: if outcome.created {
                    AuditAction::Create
                } else {
                    AuditAction::Update
                },
                source: outcome.job.provenance.last_source,
                diff: serde_json::json!({ "updated_fields": outcome.updated_fields.clone() }),
                created_at: now,
            };
            if let Err(err) = self.audit.append(entry).await {
                warn!(
                    composite_key = %outcome.job.composite_key,
                    error = %err,
                    "audit append failed after persisted write"
                );
            }
        }

        debug!(
            composite_key = %outcome.job.composite_key,
            created = outcome.created,
            updated = outcome.updated_fields.len(),
            "record ingested"
        );

        Ok(IngestResult {
            composite_key: outcome.job.composite_key.clone(),
            job_id: outcome.job.id,
            deduped: !outcome.created,
            updated_fields: outcome.updated_fields,
        })
    }

    /// Run a batch under the configured concurrency bound. Oversized
    /// input is truncated to the max batch size; one item's failure
    /// never aborts its siblings.
    pub async fn ingest_bulk(&self, mut dtos: Vec<JobDto>) -> BulkSummary {
        if dtos.len() > self.config.max_batch {
            debug!(
                dropped = dtos.len() - self.config.max_batch,
                max_batch = self.config.max_batch,
                "bulk input truncated"
            );
            dtos.truncate(self.config.max_batch);
        }

        let total = dtos.len();
        let limit = Arc::new(Semaphore::new(self.config.bulk_concurrency.max(1)));
        let mut tasks = JoinSet::new();
        for (index, dto) in dtos.into_iter().enumerate() {
            let pipeline = self.clone();
            let limit = limit.clone();
            tasks.spawn(async move {
                let _permit = limit.acquire_owned().await.expect("semaphore not closed");
                (index, pipeline.ingest_one(dto).await)
            });
        }

        let mut slots: Vec<Option<Result<IngestResult, IngestError>>> = Vec::new();
        slots.resize_with(total, || None);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(join_err) => warn!(error = %join_err, "bulk worker task failed"),
            }
        }

        let results: Vec<Result<IngestResult, IngestError>> = slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| Err(IngestError::Internal("worker task lost".to_string())))
            })
            .collect();
        let success = results.iter().filter(|r| r.is_ok()).count();
        let failed = results.len() - success;

        info!(total, success, failed, "bulk ingestion finished");
        BulkSummary {
            success,
            failed,
            results,
        }
    }
}

/// Production wiring: Postgres store and audit sink over one pool, the
/// in-process hot-list cache, schema bootstrap per config.
pub async fn connect_from_env() -> anyhow::Result<IngestPipeline> {
    use anyhow::Context;

    let config = IngestConfig::from_env();
    let store = PgJobStore::connect(&config.database_url)
        .await
        .context("connecting to job store")?;
    if config.ensure_indexes_on_start {
        store.ensure_ready().await.context("ensuring schema")?;
    }
    let audit = PgAuditSink::new(store.pool().clone());
    Ok(IngestPipeline::new(
        config,
        Arc::new(store),
        Arc::new(MemoryHotListCache::new()),
        Arc::new(audit),
    ))
}

//! Append-only audit trail. This core only appends; entries are never
//! mutated or deleted here.

use async_trait::async_trait;
use jlip_core::AuditEntry;
use sqlx::postgres::PgPool;
use tokio::sync::Mutex;

use crate::error::StoreError;

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> Result<(), StoreError>;
}

/// Postgres sink sharing the store's pool. Assumes the schema bootstrap
/// has run (the store's `ensure_ready` creates `audit_entries`).
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn append(&self, entry: AuditEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO audit_entries (id, job_id, action, source, diff, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.id)
        .bind(entry.job_id)
        .bind(entry.action.as_str())
        .bind(entry.source.as_str())
        .bind(&entry.diff)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Vec-backed sink for tests; exposes a snapshot of appended entries.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, entry: AuditEntry) -> Result<(), StoreError> {
        self.entries.lock().await.push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jlip_core::{AuditAction, JobSource};
    use uuid::Uuid;

    #[tokio::test]
    async fn memory_sink_appends_in_order() {
        let sink = MemoryAuditSink::new();
        for action in [AuditAction::Create, AuditAction::Update] {
            sink.append(AuditEntry {
                id: Uuid::new_v4(),
                job_id: Uuid::new_v4(),
                action,
                source: JobSource::Api,
                diff: serde_json::json!({"updated_fields": []}),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        }
        let entries = sink.entries().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, AuditAction::Create);
        assert_eq!(entries[1].action, AuditAction::Update);
    }
}

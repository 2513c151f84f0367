//! Postgres-backed job repository. Records are stored as JSONB documents
//! alongside extracted columns for the supporting indexes; the unique
//! index on `composite_key` arbitrates concurrent writers.

use async_trait::async_trait;
use chrono::Utc;
use jlip_core::CanonicalJob;
use sqlx::postgres::PgPool;
use sqlx::Row;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::merge::{fill_or_improve, supplied_fields};
use crate::schema;
use crate::store::{BulkWriteStats, JobStore, UpsertOutcome};

pub struct PgJobStore {
    pool: PgPool,
    schema_ready: OnceCell<()>,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            schema_ready: OnceCell::new(),
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the fixed DDL exactly once per store instance.
    pub async fn ensure_ready(&self) -> Result<(), StoreError> {
        self.schema_ready
            .get_or_try_init(|| schema::ensure_schema(&self.pool))
            .await?;
        Ok(())
    }

    async fn fetch_by_key(&self, key: &str) -> Result<Option<CanonicalJob>, StoreError> {
        let row = sqlx::query("SELECT data_json FROM jobs WHERE composite_key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => {
                let value: serde_json::Value = row.try_get("data_json")?;
                Ok(Some(serde_json::from_value(value)?))
            }
            None => Ok(None),
        }
    }

    /// Insert-if-absent. Returns false when another writer holds the key.
    async fn try_insert(&self, job: &CanonicalJob) -> Result<bool, StoreError> {
        let data_json = serde_json::to_value(job)?;
        let result = sqlx::query(
            r#"
            INSERT INTO jobs (
                id, composite_key, source, country, city, seniority, skills,
                normalized_annual_min, normalized_annual_max,
                posted_at, created_at, updated_at, data_json
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (composite_key) DO NOTHING
            "#,
        )
        .bind(job.id)
        .bind(&job.composite_key)
        .bind(job.source.as_str())
        .bind(job.location.country.as_deref())
        .bind(job.location.city.as_deref())
        .bind(job.seniority.as_str())
        .bind(&job.skills)
        .bind(job.salary.as_ref().and_then(|s| s.normalized_annual_min))
        .bind(job.salary.as_ref().and_then(|s| s.normalized_annual_max))
        .bind(job.posted_at)
        .bind(job.created_at)
        .bind(job.updated_at)
        .bind(data_json)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn update_row(&self, job: &CanonicalJob) -> Result<(), StoreError> {
        let data_json = serde_json::to_value(job)?;
        sqlx::query(
            r#"
            UPDATE jobs
               SET source = $2,
                   country = $3,
                   city = $4,
                   seniority = $5,
                   skills = $6,
                   normalized_annual_min = $7,
                   normalized_annual_max = $8,
                   posted_at = $9,
                   updated_at = $10,
                   data_json = $11
             WHERE composite_key = $1
            "#,
        )
        .bind(&job.composite_key)
        .bind(job.source.as_str())
        .bind(job.location.country.as_deref())
        .bind(job.location.city.as_deref())
        .bind(job.seniority.as_str())
        .bind(&job.skills)
        .bind(job.salary.as_ref().and_then(|s| s.normalized_annual_min))
        .bind(job.salary.as_ref().and_then(|s| s.normalized_annual_max))
        .bind(job.posted_at)
        .bind(job.updated_at)
        .bind(data_json)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn upsert_by_composite_key(&self, job: CanonicalJob) -> Result<UpsertOutcome, StoreError> {
        self.ensure_ready().await?;
        loop {
            if let Some(existing) = self.fetch_by_key(&job.composite_key).await? {
                let (merged, updated_fields) = fill_or_improve(&existing, &job, Utc::now());
                self.update_row(&merged).await?;
                return Ok(UpsertOutcome {
                    job: merged,
                    updated_fields,
                    created: false,
                });
            }

            if self.try_insert(&job).await? {
                let updated_fields = supplied_fields(&job);
                return Ok(UpsertOutcome {
                    job,
                    updated_fields,
                    created: true,
                });
            }

            // Lost the insert race: the key exists now. Jobs are never
            // deleted, so the next iteration takes the merge path.
            debug!(composite_key = %job.composite_key, "insert raced; retrying as update");
        }
    }

    async fn find_by_composite_key(&self, key: &str) -> Result<Option<CanonicalJob>, StoreError> {
        self.ensure_ready().await?;
        self.fetch_by_key(key).await
    }

    async fn bulk_upsert(&self, jobs: Vec<CanonicalJob>) -> Result<BulkWriteStats, StoreError> {
        self.ensure_ready().await?;
        let mut stats = BulkWriteStats::default();
        for job in jobs {
            let key = job.composite_key.clone();
            match self.upsert_by_composite_key(job).await {
                Ok(outcome) if outcome.created => stats.upserted += 1,
                Ok(outcome) => {
                    stats.matched += 1;
                    if !outcome.updated_fields.is_empty() {
                        stats.modified += 1;
                    }
                }
                Err(err) => {
                    warn!(composite_key = %key, error = %err, "bulk item failed");
                    stats.failed += 1;
                }
            }
        }
        Ok(stats)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.ensure_ready().await?;
        let row = sqlx::query("SELECT COUNT(*) AS n FROM jobs")
            .fetch_one(&self.pool)
            .await?;
        let n: i64 = row.try_get("n")?;
        Ok(n as u64)
    }
}

//! Schema and index bootstrap. Definitions are fixed, idempotent DDL;
//! callers guard the once-per-process contract (see `PgJobStore`).

use sqlx::PgPool;
use tracing::debug;

use crate::error::StoreError;

/// Fixed DDL, in dependency order. The unique index on `composite_key`
/// is the store's one strong consistency guarantee; the rest support the
/// common query shapes of downstream readers.
const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id UUID PRIMARY KEY,
        composite_key TEXT NOT NULL,
        source TEXT NOT NULL,
        country TEXT,
        city TEXT,
        seniority TEXT NOT NULL,
        skills TEXT[] NOT NULL DEFAULT '{}',
        normalized_annual_min DOUBLE PRECISION,
        normalized_annual_max DOUBLE PRECISION,
        posted_at TIMESTAMPTZ NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL,
        data_json JSONB NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS jobs_composite_key_uidx ON jobs (composite_key)",
    "CREATE INDEX IF NOT EXISTS jobs_created_at_idx ON jobs (created_at)",
    "CREATE INDEX IF NOT EXISTS jobs_posted_at_idx ON jobs (posted_at)",
    "CREATE INDEX IF NOT EXISTS jobs_source_posted_at_idx ON jobs (source, posted_at)",
    "CREATE INDEX IF NOT EXISTS jobs_geo_posted_at_idx ON jobs (country, city, posted_at)",
    "CREATE INDEX IF NOT EXISTS jobs_seniority_posted_at_idx ON jobs (seniority, posted_at)",
    "CREATE INDEX IF NOT EXISTS jobs_skills_idx ON jobs USING GIN (skills)",
    "CREATE INDEX IF NOT EXISTS jobs_salary_range_idx ON jobs (normalized_annual_min, normalized_annual_max)",
    r#"
    CREATE TABLE IF NOT EXISTS audit_entries (
        id UUID PRIMARY KEY,
        job_id UUID NOT NULL,
        action TEXT NOT NULL,
        source TEXT NOT NULL,
        diff JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS audit_entries_job_created_idx ON audit_entries (job_id, created_at)",
];

/// Apply the fixed schema. Safe to call repeatedly; every statement is
/// IF NOT EXISTS.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    debug!(statements = SCHEMA_STATEMENTS.len(), "schema ensured");
    Ok(())
}

//! Core domain model for JLIP: producer DTOs, canonical records, audit types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CRATE_NAME: &str = "jlip-core";

/// Known record origins. Producers outside this list must go through
/// `Manual` or `Api`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSource {
    Greenhouse,
    Lever,
    Workable,
    Indeed,
    Linkedin,
    Manual,
    Api,
}

impl JobSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobSource::Greenhouse => "greenhouse",
            JobSource::Lever => "lever",
            JobSource::Workable => "workable",
            JobSource::Indeed => "indeed",
            JobSource::Linkedin => "linkedin",
            JobSource::Manual => "manual",
            JobSource::Api => "api",
        }
    }
}

impl std::fmt::Display for JobSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteType {
    Onsite,
    Hybrid,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryPeriod {
    Hour,
    Day,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
    Entry,
    Mid,
    Senior,
    Lead,
    Director,
    Vp,
    Cxo,
    Unknown,
}

impl Seniority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Seniority::Entry => "entry",
            Seniority::Mid => "mid",
            Seniority::Senior => "senior",
            Seniority::Lead => "lead",
            Seniority::Director => "director",
            Seniority::Vp => "vp",
            Seniority::Cxo => "cxo",
            Seniority::Unknown => "unknown",
        }
    }
}

/// Embedded company value object. Company is not a separate aggregate in
/// this core; branding/domain resolution lives outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Location {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub remote_type: Option<RemoteType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Salary {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub period: Option<SalaryPeriod>,
    /// Annualized bounds computed by the normalizer. Period conversion
    /// only; amounts are never converted across currencies.
    #[serde(default)]
    pub normalized_annual_min: Option<f64>,
    #[serde(default)]
    pub normalized_annual_max: Option<f64>,
    #[serde(default)]
    pub normalized_currency: Option<String>,
}

/// Untrusted producer-supplied record, before validation and
/// normalization. Everything a producer might omit is optional here;
/// the validator decides what is acceptable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDto {
    pub source: JobSource,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub canonical_url: Option<String>,
    pub title: String,
    pub company: Company,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub salary: Option<Salary>,
    #[serde(default)]
    pub seniority: Option<Seniority>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub application_count: Option<u32>,
    #[serde(default)]
    pub referral_available: Option<bool>,
}

/// First/last-seen bookkeeping attached to every canonical record.
/// `first_seen_at` is set once at creation and never mutated;
/// `last_seen_at` moves forward on every ingestion touching the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub last_source: JobSource,
}

/// Canonical persisted job posting.
///
/// `composite_key` is the durable identity: `source:externalId` when the
/// source supplies one, else `source:normalizedUrl`, else `source:hash`.
/// It is immutable once assigned and unique in the store. Note the hash
/// fallback is content-sensitive: on sources without ids or URLs, a
/// trivial edit to the posting text mints a new logical job rather than
/// updating the old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalJob {
    pub id: Uuid,
    pub composite_key: String,
    /// Content fingerprint over (title, company, city, country, leading
    /// description), case-folded. Fallback identity and cheap change signal.
    pub hash: String,
    pub source: JobSource,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub canonical_url: Option<String>,
    pub title: String,
    pub company: Company,
    pub location: Location,
    #[serde(default)]
    pub salary: Option<Salary>,
    pub seniority: Seniority,
    #[serde(default)]
    pub description: Option<String>,
    /// PII-redacted copy of `description`, populated when redaction is
    /// enabled. External-facing read paths use this field.
    #[serde(default)]
    pub sanitized_description: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub posted_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub application_count: Option<u32>,
    #[serde(default)]
    pub referral_available: bool,
    pub provenance: Provenance,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CanonicalJob {
    /// Build a canonical record from an already-normalized DTO and its
    /// derived identity. `posted_at` falls back to `now` only as a guard;
    /// the validator rejects DTOs without one before this is reached.
    pub fn from_dto(
        dto: JobDto,
        hash: String,
        composite_key: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            composite_key,
            hash,
            source: dto.source,
            external_id: dto.external_id,
            canonical_url: dto.canonical_url,
            title: dto.title,
            company: dto.company,
            location: dto.location,
            salary: dto.salary,
            seniority: dto.seniority.unwrap_or(Seniority::Unknown),
            description: dto.description,
            sanitized_description: None,
            skills: dto.skills,
            benefits: dto.benefits,
            posted_at: dto.posted_at.unwrap_or(now),
            expires_at: dto.expires_at,
            application_count: dto.application_count,
            referral_available: dto.referral_available.unwrap_or(false),
            provenance: Provenance {
                first_seen_at: now,
                last_seen_at: now,
                last_source: dto.source,
            },
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }
}

/// Append-only audit record; one per effectful ingestion. Never mutated
/// or deleted by this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub job_id: Uuid,
    pub action: AuditAction,
    pub source: JobSource,
    pub diff: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Outcome of one record's trip through the pipeline.
/// `deduped` means the record resolved to an existing composite key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResult {
    pub composite_key: String,
    pub job_id: Uuid,
    pub deduped: bool,
    pub updated_fields: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn source_round_trips_through_serde() {
        let json = serde_json::to_string(&JobSource::Greenhouse).unwrap();
        assert_eq!(json, "\"greenhouse\"");
        let back: JobSource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, JobSource::Greenhouse);
    }

    #[test]
    fn dto_deserializes_with_minimal_fields() {
        let dto: JobDto = serde_json::from_str(
            r#"{
                "source": "manual",
                "title": "Backend Engineer",
                "company": {"name": "Acme"}
            }"#,
        )
        .unwrap();
        assert_eq!(dto.title, "Backend Engineer");
        assert!(dto.external_id.is_none());
        assert!(dto.skills.is_empty());
        assert!(dto.posted_at.is_none());
    }

    #[test]
    fn canonical_from_dto_seeds_provenance_once() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().unwrap();
        let dto: JobDto = serde_json::from_str(
            r#"{
                "source": "lever",
                "title": "Data Engineer",
                "company": {"name": "Acme"},
                "posted_at": "2026-02-27T00:00:00Z"
            }"#,
        )
        .unwrap();
        let job = CanonicalJob::from_dto(dto, "h".into(), "lever:x".into(), now);
        assert_eq!(job.provenance.first_seen_at, now);
        assert_eq!(job.provenance.last_seen_at, now);
        assert_eq!(job.provenance.last_source, JobSource::Lever);
        assert_eq!(job.seniority, Seniority::Unknown);
        assert!(!job.referral_available);
    }
}

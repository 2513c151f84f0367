//! Ingestion error taxonomy. Validation failures are recoverable and
//! carry structured issues; store failures are retryable by the caller;
//! anything else is a programming defect surfaced as `Internal`.

use jlip_normalize::ValidationIssue;
use jlip_storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("validation failed ({} issue(s))", .0.len())]
    Validation(Vec<ValidationIssue>),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal pipeline error: {0}")]
    Internal(String),
}

impl IngestError {
    /// Structured issues when this is a validation failure.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            IngestError::Validation(issues) => issues,
            _ => &[],
        }
    }
}

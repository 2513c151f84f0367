//! Pure CPU stages of the ingestion pipeline: validation, normalization,
//! PII redaction, identity derivation, and dictionary enrichment.
//! Nothing in this crate performs I/O or suspends.

pub mod enrich;
pub mod identity;
pub mod normalize;
pub mod redact;
pub mod validate;

pub use enrich::enrich;
pub use identity::{composite_key, content_hash, normalize_url};
pub use normalize::{normalize, NormalizeOptions};
pub use redact::redact;
pub use validate::{validate, ValidationIssue};

pub const CRATE_NAME: &str = "jlip-normalize";

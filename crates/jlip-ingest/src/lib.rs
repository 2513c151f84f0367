//! Pipeline composition: validation through persistence, cache warming,
//! and audit logging, for one record or a bounded-concurrency batch.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::IngestConfig;
pub use error::IngestError;
pub use pipeline::{connect_from_env, BulkSummary, IngestPipeline};

pub const CRATE_NAME: &str = "jlip-ingest";

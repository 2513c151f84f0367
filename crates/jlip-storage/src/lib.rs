//! Persistence for canonical jobs: the merge-upsert repository (Postgres
//! and in-memory), schema/index bootstrap, the hot-list cache, and the
//! append-only audit sink.

pub mod audit;
pub mod cache;
pub mod error;
pub mod merge;
pub mod pg;
pub mod schema;
pub mod store;

pub use audit::{AuditSink, MemoryAuditSink, PgAuditSink};
pub use cache::{hot_list_keys, warm_hot_lists, HotListCache, MemoryHotListCache};
pub use error::StoreError;
pub use merge::{fill_or_improve, supplied_fields};
pub use pg::PgJobStore;
pub use schema::ensure_schema;
pub use store::{BulkWriteStats, JobStore, MemoryJobStore, UpsertOutcome};

pub const CRATE_NAME: &str = "jlip-storage";

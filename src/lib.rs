//! Daily synchronization of Find a Tender procurement notices into Airtable.
//!
//! A cycle fetches OCDS releases for the tender and planning stages,
//! normalizes each release into a flat record, and upserts the records into
//! their tables keyed by OCID.

pub mod config;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod schedule;
pub mod schema;
pub mod source;
pub mod store;
pub mod utils;

// Re-export the most common types for easier use
pub use config::SyncConfig;
pub use error::{Error, Result};
pub use normalize::{ProcessOutcome, process_releases};
pub use pipeline::{RunSummary, SyncPipeline, run_cycle};
pub use reconcile::{BatchCounts, Reconciler, UpsertOutcome};
pub use schema::{FieldMap, FieldValue, FlatRecord, PipelineRecord, RecordType, TenderRecord};
pub use source::{FindTenderClient, ReleaseSource};
pub use store::{AirtableClient, MemoryTable, Table};

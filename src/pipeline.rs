//! One sync cycle: fetch, normalize, reconcile
//!
//! Both record types are fetched first, then each is normalized in full and
//! reconciled record by record. Failures of individual releases or records
//! are counted and logged; only configuration problems abort a cycle.

use log::{info, warn};

use crate::config::SyncConfig;
use crate::error::Result;
use crate::normalize::{Normalize, process_releases};
use crate::reconcile::{BatchCounts, Reconciler};
use crate::schema::{PipelineRecord, RecordType, ReleasePackage, TenderRecord};
use crate::source::{FindTenderClient, ReleaseSource};
use crate::store::{AirtableClient, Table};
use crate::utils::logging::log_warning;

/// Counts for one record type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeSummary {
    /// Whether the source delivered a package
    pub fetched: bool,
    pub releases: usize,
    pub normalized: usize,
    pub skipped: usize,
    pub upserts: BatchCounts,
}

/// Counts for a whole cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub tender: TypeSummary,
    pub pipeline: TypeSummary,
}

impl RunSummary {
    /// Records handed to the reconciler
    #[must_use]
    pub const fn total_processed(&self) -> usize {
        self.tender.normalized + self.pipeline.normalized
    }

    #[must_use]
    pub const fn total_failed(&self) -> usize {
        self.tender.upserts.failed + self.pipeline.upserts.failed
    }
}

/// Source and reconciler wired together
pub struct SyncPipeline<'a> {
    source: &'a dyn ReleaseSource,
    reconciler: &'a Reconciler<'a>,
}

impl<'a> SyncPipeline<'a> {
    #[must_use]
    pub fn new(source: &'a dyn ReleaseSource, reconciler: &'a Reconciler<'a>) -> Self {
        Self { source, reconciler }
    }

    /// Run one full cycle for both record types
    pub fn run_once(&self) -> RunSummary {
        info!("Starting tender extraction cycle");

        let tender_package = self.source.fetch(RecordType::Tender);
        let pipeline_package = self.source.fetch(RecordType::Pipeline);

        let summary = RunSummary {
            tender: self.sync::<TenderRecord>(tender_package.as_ref()),
            pipeline: self.sync::<PipelineRecord>(pipeline_package.as_ref()),
        };

        info!(
            "Extraction completed. Total records processed: {}",
            summary.total_processed()
        );
        summary
    }

    fn sync<R: Normalize>(&self, package: Option<&ReleasePackage>) -> TypeSummary {
        let record_type = R::RECORD_TYPE;
        let Some(package) = package else {
            log_warning("No data available this run", Some(record_type.name()));
            return TypeSummary::default();
        };

        let outcome = process_releases::<R>(Some(package));
        let mut summary = TypeSummary {
            fetched: true,
            releases: package.len(),
            normalized: outcome.records.len(),
            skipped: outcome.skipped,
            upserts: BatchCounts::default(),
        };
        if outcome.records.is_empty() {
            info!("No {record_type} records to sync");
            return summary;
        }

        summary.upserts = self.reconciler.batch_upsert(&outcome.records);
        info!(
            "{} processing: {} success, {} failed",
            record_type.label(),
            summary.upserts.success,
            summary.upserts.failed
        );
        summary
    }
}

/// Build the production collaborators from `config` and run one cycle.
///
/// # Errors
/// Returns an error if an HTTP client cannot be constructed.
pub fn run_cycle(config: &SyncConfig) -> Result<RunSummary> {
    let source = FindTenderClient::new(config.fetch.clone())?;
    let airtable = AirtableClient::new(&config.airtable)?;

    let tender_table = airtable.table(&config.airtable.base_id, &config.airtable.tender_table_id);
    let pipeline_table = config
        .airtable
        .pipeline_table_id
        .as_deref()
        .map(|table_id| airtable.table(&config.airtable.base_id, table_id));
    if pipeline_table.is_none() {
        warn!("Pipeline table not configured; pipeline records will not be stored");
    }

    let reconciler = Reconciler::new(
        &tender_table,
        pipeline_table.as_ref().map(|table| table as &dyn Table),
    );
    Ok(SyncPipeline::new(&source, &reconciler).run_once())
}

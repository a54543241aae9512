//! Idempotent upserts keyed by the natural key
//!
//! Each record is looked up by its natural key and then updated in place or
//! inserted. The lookup and the write are separate store calls, so two runs
//! racing on the same key can both see no match and both insert. Runs are
//! expected to be scheduled one at a time; overlapping runs may leave
//! duplicate rows.

use log::{error, info, warn};

use crate::error::StoreError;
use crate::schema::{FieldMap, FlatRecord, RecordType};
use crate::store::{FieldEquals, Table};

/// Column used for log lines
const LABEL_FIELD: &str = "Title";

/// Result of upserting a single record
#[derive(Debug)]
pub enum UpsertOutcome {
    /// A new row was inserted
    Created { row_id: String },
    /// An existing row with the same key was overwritten
    Updated { row_id: String },
    /// The record has no natural key; the store was not touched
    MissingKey,
    /// The store failed or no table is configured
    Failed(StoreError),
}

impl UpsertOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Created { .. } | Self::Updated { .. })
    }
}

/// Success and failure tally of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounts {
    pub success: usize,
    pub failed: usize,
}

impl BatchCounts {
    pub fn record(&mut self, outcome: &UpsertOutcome) {
        if outcome.is_success() {
            self.success += 1;
        } else {
            self.failed += 1;
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.success + self.failed
    }
}

/// Writes records into their tables
pub struct Reconciler<'a> {
    tender_table: &'a dyn Table,
    pipeline_table: Option<&'a dyn Table>,
}

impl<'a> Reconciler<'a> {
    /// The pipeline table is optional; without it pipeline upserts fail
    #[must_use]
    pub fn new(tender_table: &'a dyn Table, pipeline_table: Option<&'a dyn Table>) -> Self {
        Self {
            tender_table,
            pipeline_table,
        }
    }

    fn table_for(&self, record_type: RecordType) -> Result<&'a dyn Table, StoreError> {
        match record_type {
            RecordType::Tender => Ok(self.tender_table),
            RecordType::Pipeline => self
                .pipeline_table
                .ok_or(StoreError::TableNotConfigured(RecordType::Pipeline.name())),
        }
    }

    /// Update the row with the record's natural key, or insert one.
    ///
    /// Never fails: store errors are logged and returned as
    /// [`UpsertOutcome::Failed`].
    pub fn upsert<R: FlatRecord>(&self, record: &R) -> UpsertOutcome {
        let record_type = R::RECORD_TYPE;
        let fields = record.to_fields();
        let label = fields.text(LABEL_FIELD).unwrap_or("Unknown");

        let Some(key) = record.natural_key() else {
            warn!("{record_type} record missing {}, skipping", R::KEY_FIELD);
            return UpsertOutcome::MissingKey;
        };

        let filter = FieldEquals::new(R::KEY_FIELD, key);
        match self.write(record_type, &filter, &fields) {
            Ok(outcome) => {
                match &outcome {
                    UpsertOutcome::Created { .. } => info!("Created {record_type}: {label}"),
                    _ => info!("Updated {record_type}: {label}"),
                }
                outcome
            }
            Err(err) => {
                error!("Error upserting {record_type} {label} ({key}): {err}");
                UpsertOutcome::Failed(err)
            }
        }
    }

    fn write(
        &self,
        record_type: RecordType,
        filter: &FieldEquals,
        fields: &FieldMap,
    ) -> Result<UpsertOutcome, StoreError> {
        let table = self.table_for(record_type)?;
        let existing = table.query(filter)?;

        if existing.len() > 1 {
            warn!(
                "{} rows in {} share {}; updating the first",
                existing.len(),
                table.name(),
                filter.to_formula()
            );
        }

        match existing.first() {
            Some(row) => {
                let row = table.update(&row.id, fields)?;
                Ok(UpsertOutcome::Updated { row_id: row.id })
            }
            None => {
                let row = table.create(fields)?;
                Ok(UpsertOutcome::Created { row_id: row.id })
            }
        }
    }

    /// Upsert records one at a time and tally the outcomes.
    ///
    /// A failed record never stops the remaining ones.
    pub fn batch_upsert<R: FlatRecord>(&self, records: &[R]) -> BatchCounts {
        let mut counts = BatchCounts::default();
        for record in records {
            counts.record(&self.upsert(record));
        }
        counts
    }
}

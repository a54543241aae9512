//! Tabular store access
//!
//! The reconciler only needs three operations from a table: query by a
//! field equality filter, create a row, and update a row by its id. The
//! store's row ids are only used within a single upsert.

pub mod airtable;
pub mod memory;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::schema::FieldMap;

pub use airtable::{AirtableClient, AirtableTable};
pub use memory::MemoryTable;

/// A row as returned by the store
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRow {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub created_time: Option<String>,
}

impl StoredRow {
    /// String value of a column
    #[must_use]
    pub fn text(&self, column: &str) -> Option<&str> {
        self.fields.get(column).and_then(Value::as_str)
    }
}

/// Equality filter on one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEquals {
    pub field: String,
    pub value: String,
}

impl FieldEquals {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Airtable formula, e.g. `{OCID} = 'ocds-1'`
    #[must_use]
    pub fn to_formula(&self) -> String {
        format!("{{{}}} = '{}'", self.field, escape_formula_string(&self.value))
    }

    /// Whether a row satisfies the filter
    #[must_use]
    pub fn matches(&self, row: &StoredRow) -> bool {
        row.text(&self.field) == Some(self.value.as_str())
    }
}

fn escape_formula_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// A table in the external store
pub trait Table {
    /// Name used in log lines
    fn name(&self) -> &str;

    /// All rows matching the filter
    fn query(&self, filter: &FieldEquals) -> Result<Vec<StoredRow>, StoreError>;

    /// Insert a new row
    fn create(&self, fields: &FieldMap) -> Result<StoredRow, StoreError>;

    /// Overwrite the given columns of an existing row; other columns are kept
    fn update(&self, row_id: &str, fields: &FieldMap) -> Result<StoredRow, StoreError>;
}

//! In-memory table.
//!
//! Behaves like a store table for the three operations the reconciler uses.
//! Writes for selected keys can be made to fail, which makes it suitable for
//! exercising the failure paths of a sync run.

use std::cell::{Cell, RefCell};

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

use crate::error::StoreError;
use crate::schema::FieldMap;
use crate::store::{FieldEquals, StoredRow, Table};

/// Table kept in memory, rows in insertion order
#[derive(Debug, Default)]
pub struct MemoryTable {
    name: String,
    rows: RefCell<Vec<StoredRow>>,
    index: RefCell<FxHashMap<String, usize>>,
    next_id: Cell<u64>,
    /// (column, value) pairs whose writes are rejected
    failing_writes: FxHashSet<(String, String)>,
    failing_queries: Cell<bool>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Reject creates and updates whose `column` equals `value`
    #[must_use]
    pub fn fail_writes_where(mut self, column: &str, value: &str) -> Self {
        self.failing_writes
            .insert((column.to_string(), value.to_string()));
        self
    }

    /// Make every query fail until reset
    pub fn set_query_failure(&self, fail: bool) {
        self.failing_queries.set(fail);
    }

    /// Add a row directly, bypassing failure injection
    pub fn insert_row(&self, fields: &FieldMap) -> StoredRow {
        let row = StoredRow {
            id: self.allocate_id(),
            fields: fields.to_json_map(),
            created_time: None,
        };
        let mut rows = self.rows.borrow_mut();
        self.index.borrow_mut().insert(row.id.clone(), rows.len());
        rows.push(row.clone());
        row
    }

    /// Snapshot of all rows
    #[must_use]
    pub fn rows(&self) -> Vec<StoredRow> {
        self.rows.borrow().clone()
    }

    /// Rows whose `column` equals `value`
    #[must_use]
    pub fn rows_where(&self, column: &str, value: &str) -> Vec<StoredRow> {
        let filter = FieldEquals::new(column, value);
        self.rows
            .borrow()
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }

    fn allocate_id(&self) -> String {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        format!("rec{id:06}")
    }

    fn check_write(&self, fields: &FieldMap) -> Result<(), StoreError> {
        let rejected = fields.iter().find(|(column, value)| {
            value.as_text().is_some_and(|text| {
                self.failing_writes
                    .contains(&((*column).to_string(), text.to_string()))
            })
        });

        match rejected {
            Some((column, value)) => Err(StoreError::Api {
                status: 422,
                message: format!("write rejected for {column} = {value:?}"),
            }),
            None => Ok(()),
        }
    }
}

impl Table for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, filter: &FieldEquals) -> Result<Vec<StoredRow>, StoreError> {
        if self.failing_queries.get() {
            return Err(StoreError::Api {
                status: 503,
                message: "query unavailable".to_string(),
            });
        }
        Ok(self.rows_where(&filter.field, &filter.value))
    }

    fn create(&self, fields: &FieldMap) -> Result<StoredRow, StoreError> {
        self.check_write(fields)?;
        Ok(self.insert_row(fields))
    }

    fn update(&self, row_id: &str, fields: &FieldMap) -> Result<StoredRow, StoreError> {
        self.check_write(fields)?;

        let position = self.index.borrow().get(row_id).copied();
        let Some(position) = position else {
            return Err(StoreError::Api {
                status: 404,
                message: format!("no row {row_id}"),
            });
        };

        let mut rows = self.rows.borrow_mut();
        let row = &mut rows[position];
        for (column, value) in fields.to_json_map() {
            row.fields.insert(column, value);
        }
        Ok(row.clone())
    }
}

/// Convenience for assertions on a column
#[must_use]
pub fn column<'a>(row: &'a StoredRow, name: &str) -> &'a Value {
    row.fields.get(name).unwrap_or(&Value::Null)
}

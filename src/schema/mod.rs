//! Record schemas
//!
//! This module defines the input side (OCDS releases as returned by the notice
//! API) and the output side (flat records with named columns) of the
//! normalization step.

pub mod records;
pub mod release;

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Number, Value};

pub use records::{PipelineRecord, TenderRecord};
pub use release::{Release, ReleasePackage};

/// The two output record types and the API stage each one is fetched from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// Open tenders, fetched from the `tender` stage
    Tender,
    /// Upcoming procurements, fetched from the `planning` stage
    Pipeline,
}

impl RecordType {
    /// Stage value sent to the notice API
    #[must_use]
    pub const fn stage(self) -> &'static str {
        match self {
            Self::Tender => "tender",
            Self::Pipeline => "planning",
        }
    }

    /// Capitalized name used in summaries
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tender => "Tender",
            Self::Pipeline => "Pipeline",
        }
    }

    /// Lowercase name used in log lines
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tender => "tender",
            Self::Pipeline => "pipeline",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single column value of a flat record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// No value; clears the column on update
    Empty,
    Text(String),
    Number(Number),
    List(Vec<String>),
}

impl FieldValue {
    /// The text content, if this is a text value
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_none(),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Number(number) => number.serialize(serializer),
            Self::List(items) => items.serialize(serializer),
        }
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Empty => Self::Null,
            FieldValue::Text(text) => Self::String(text),
            FieldValue::Number(number) => Self::Number(number),
            FieldValue::List(items) => Self::Array(items.into_iter().map(Self::String).collect()),
        }
    }
}

/// Conversion of a record field into a column value
pub trait ToFieldValue {
    fn to_field_value(&self) -> FieldValue;
}

impl ToFieldValue for String {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }
}

impl ToFieldValue for Option<String> {
    fn to_field_value(&self) -> FieldValue {
        self.as_ref()
            .map_or(FieldValue::Empty, |text| FieldValue::Text(text.clone()))
    }
}

impl ToFieldValue for Option<Number> {
    fn to_field_value(&self) -> FieldValue {
        self.as_ref()
            .map_or(FieldValue::Empty, |number| FieldValue::Number(number.clone()))
    }
}

impl ToFieldValue for Vec<String> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::List(self.clone())
    }
}

/// Column name to value mapping, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, FieldValue)>,
}

impl FieldMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Set a column, replacing any previous value for it
    pub fn insert(&mut self, column: impl Into<String>, value: FieldValue) {
        let column = column.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((column, value)),
        }
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Text value of a column, if present and textual
    #[must_use]
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(FieldValue::as_text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert into a JSON object, the shape the store expects
    #[must_use]
    pub fn to_json_map(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(name, value)| (name.clone(), Value::from(value.clone())))
            .collect()
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A flat record that can be written to a store table.
///
/// Implemented with `#[derive(FlatRecord)]`.
pub trait FlatRecord {
    /// Record type, which also selects the target table
    const RECORD_TYPE: RecordType;
    /// Column holding the natural key
    const KEY_FIELD: &'static str;
    /// All columns in declaration order
    const FIELD_NAMES: &'static [&'static str];

    /// The natural key, `None` when absent or blank
    fn natural_key(&self) -> Option<&str>;

    /// All columns with their values
    fn to_fields(&self) -> FieldMap;
}

//! Procedural macros for the tender-sync crate
//!
//! This crate provides the `FlatRecord` derive, which turns a plain struct
//! into a flat store record with named columns and a natural key.

use proc_macro::TokenStream;

mod flat_record;
mod utils;

/// Derive macro for flat store records
///
/// Every named field becomes one column. The column name defaults to the
/// field identifier and can be overridden with `#[field(name = "...")]`.
/// Exactly one field must be marked as the natural key with `key`.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(FlatRecord)]
/// #[record(kind = "Tender")]
/// struct TenderRecord {
///     #[field(name = "OCID", key)]
///     ocid: Option<String>,
///
///     #[field(name = "Title")]
///     title: String,
///
///     #[field(name = "CPV Codes")]
///     cpv_codes: Vec<String>,
/// }
/// ```
#[proc_macro_derive(FlatRecord, attributes(record, field))]
pub fn derive_flat_record(input: TokenStream) -> TokenStream {
    flat_record::process_derive_flat_record(input)
}

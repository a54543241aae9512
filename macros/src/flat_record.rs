//! FlatRecord derive macro implementation
//!
//! This module contains the implementation of the FlatRecord derive macro,
//! which maps a struct onto the column layout of a store table.

use darling::{ast, FromDeriveInput, FromField};
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, DeriveInput};

use crate::utils;

/// Receiver for the struct that derives `FlatRecord`
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(record), supports(struct_named))]
struct FlatRecordReceiver {
    /// The struct identifier
    ident: syn::Ident,
    /// `RecordType` variant this struct is stored as
    kind: String,
    /// The struct data with parsed fields
    data: ast::Data<(), FlatFieldReceiver>,
}

/// Receiver for the fields in the struct
#[derive(Debug, FromField)]
#[darling(attributes(field))]
struct FlatFieldReceiver {
    /// The field identifier
    ident: Option<syn::Ident>,
    /// The field type
    ty: syn::Type,
    /// Column name attribute
    #[darling(default, rename = "name")]
    column_name: Option<String>,
    /// Marks the natural key column
    #[darling(default)]
    key: bool,
}

impl FlatFieldReceiver {
    fn column(&self) -> String {
        self.column_name.clone().unwrap_or_else(|| {
            self.ident
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default()
        })
    }
}

/// Process the FlatRecord derive macro
pub fn process_derive_flat_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let receiver = match FlatRecordReceiver::from_derive_input(&input) {
        Ok(receiver) => receiver,
        Err(err) => return err.write_errors().into(),
    };

    let ast::Data::Struct(fields) = &receiver.data else {
        unreachable!("Darling ensures this is a struct")
    };

    let keys: Vec<&FlatFieldReceiver> = fields.iter().filter(|field| field.key).collect();
    let key_field = match keys.as_slice() {
        [key] => *key,
        [] => {
            return darling::Error::custom("FlatRecord needs exactly one `#[field(key)]` column")
                .with_span(&receiver.ident)
                .write_errors()
                .into();
        }
        _ => {
            return darling::Error::custom("FlatRecord allows only one `#[field(key)]` column")
                .with_span(&receiver.ident)
                .write_errors()
                .into();
        }
    };

    TokenStream::from(generate_flat_record_impl(&receiver, fields, key_field))
}

/// Generate the `FlatRecord` trait implementation
fn generate_flat_record_impl(
    receiver: &FlatRecordReceiver,
    fields: &ast::Fields<FlatFieldReceiver>,
    key_field: &FlatFieldReceiver,
) -> proc_macro2::TokenStream {
    let struct_name = &receiver.ident;
    let kind = format_ident!("{}", receiver.kind);

    let columns: Vec<String> = fields.iter().map(FlatFieldReceiver::column).collect();
    let field_count = columns.len();
    let key_column = key_field.column();

    let inserts = fields.iter().filter_map(|field| {
        let ident = field.ident.as_ref()?;
        let column = field.column();
        Some(quote! {
            fields.insert(#column, crate::schema::ToFieldValue::to_field_value(&self.#ident));
        })
    });

    let key_access = key_field
        .ident
        .as_ref()
        .map(|ident| utils::generate_key_access(ident, &key_field.ty))
        .unwrap_or_else(|| quote! { None });

    quote! {
        impl crate::schema::FlatRecord for #struct_name {
            const RECORD_TYPE: crate::schema::RecordType = crate::schema::RecordType::#kind;
            const KEY_FIELD: &'static str = #key_column;
            const FIELD_NAMES: &'static [&'static str] = &[#(#columns),*];

            fn natural_key(&self) -> Option<&str> {
                #key_access
            }

            fn to_fields(&self) -> crate::schema::FieldMap {
                let mut fields = crate::schema::FieldMap::with_capacity(#field_count);
                #(#inserts)*
                fields
            }
        }
    }
}

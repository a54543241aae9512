//! Utility functions for procedural macros
//!
//! Type inspection and small code generators shared by the derive macros.

use proc_macro2::TokenStream;
use quote::quote;
use syn::Type;

/// Check if a type is an Option<T>
pub fn is_option_type(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => {
            let path = &type_path.path;
            if path.segments.len() == 1 {
                let segment = &path.segments[0];
                segment.ident == "Option"
            } else {
                false
            }
        }
        _ => false,
    }
}

/// Generate the body of `natural_key` for the key field.
///
/// Blank keys are reported as missing.
pub fn generate_key_access(field_name: &syn::Ident, field_type: &Type) -> TokenStream {
    if is_option_type(field_type) {
        quote! {
            self.#field_name
                .as_deref()
                .filter(|key| !key.trim().is_empty())
        }
    } else {
        quote! {
            Some(self.#field_name.as_str()).filter(|key| !key.trim().is_empty())
        }
    }
}

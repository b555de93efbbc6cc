//! Code generation for Bean derive macro.

mod bean_impl;

use crate::parse::BeanInput;
use darling::FromDeriveInput;
use proc_macro2::TokenStream;
use std::collections::HashSet;
use syn::DeriveInput;

/// Main entry point for code generation.
pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let parsed = BeanInput::from_derive_input(input)
        .map_err(|e| syn::Error::new_spanned(input, e.to_string()))?;

    validate(&parsed)?;

    bean_impl::generate(&parsed)
}

fn validate(input: &BeanInput) -> syn::Result<()> {
    // Shapes are cached by TypeId, which needs a single concrete type.
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Bean)] does not support generic structs.",
        ));
    }

    let mut names = HashSet::new();
    let mut id_field = None;

    for field in input.fields() {
        if field.read_only && field.write_only {
            return Err(syn::Error::new_spanned(
                field.ident(),
                "#[bean(read_only)] and #[bean(write_only)] cannot be used together.",
            ));
        }

        if field.id {
            if field.skip {
                return Err(syn::Error::new_spanned(
                    field.ident(),
                    "#[bean(id)] and #[bean(skip)] cannot be used together. \
                     The identifier must be a property.",
                ));
            }
            if let Some(first) = id_field.replace(field.ident()) {
                return Err(syn::Error::new_spanned(
                    field.ident(),
                    format!("#[bean(id)] is already set on `{}`.", first),
                ));
            }
        }

        if field.is_included() && !names.insert(field.property_name()) {
            return Err(syn::Error::new_spanned(
                field.ident(),
                format!("duplicate property name `{}`.", field.property_name()),
            ));
        }
    }

    Ok(())
}

//! Derive macro for the beankit `Bean` trait.
//!
//! This crate provides the `#[derive(Bean)]` macro that generates:
//! - `impl BeanClass for {Name}`: the property descriptor table
//! - `impl Bean for {Name}`: name-based get/set over the fields, plus
//!   `get_raw`/`set_raw`, which ignore the access flags
//! - `impl Identified for {Name}` when a field is marked `#[bean(id)]`
//!
//! # Usage
//!
//! ```ignore
//! use beankit::{Bean, Shared};
//!
//! #[derive(Default, Bean)]
//! struct Order {
//!     #[bean(id)]
//!     id: i64,
//!     customer: Option<Shared<Customer>>,
//!     lines: Vec<String>,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod codegen;
mod parse;

/// Derive the `Bean` trait for a struct.
///
/// Every field type must implement `beankit::PropertyValue`, and the struct
/// must implement `Default`.
///
/// # Attributes
///
/// ## Struct Attributes
///
/// - `#[bean(rename = "Name")]`: Type name used in declared types and errors
///
/// ## Field Attributes
///
/// - `#[bean(rename = "prop")]`: Use a different property name
/// - `#[bean(skip)]`: Not a property (left at its value on copy, default on clone)
/// - `#[bean(read_only)]`: Readable but never written by the engine
/// - `#[bean(write_only)]`: Writable but never read by the engine
/// - `#[bean(id)]`: The record's identifier; implements `Identified`
///
/// # Examples
///
/// ```ignore
/// use beankit::{get_property, set_property, Bean};
///
/// #[derive(Default, Bean)]
/// struct Account {
///     #[bean(id)]
///     id: u32,
///     #[bean(rename = "displayName")]
///     name: String,
///     #[bean(read_only)]
///     created: String,
///     #[bean(skip)]
///     dirty: bool,
/// }
///
/// let mut account = Account::default();
/// set_property(&mut account, "displayName", "Ops")?;
/// assert_eq!(account.name, "Ops");
/// ```
#[proc_macro_derive(Bean, attributes(bean))]
pub fn derive_bean(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match codegen::expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

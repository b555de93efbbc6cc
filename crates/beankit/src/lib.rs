//! Typed property access, conversion, copy and clone for runtime-described records.
//!
//! `beankit` moves data between records ("beans") whose shapes are only known
//! at the call site: a DTO onto an entity, a form map onto a struct, one
//! version of a record onto another.
//!
//! # Core Concepts
//!
//! - **Bean**: Object-safe trait for name-based property get/set, generated by `#[derive(Bean)]`
//! - **Value**: Dynamic value flowing between beans
//! - **Shape**: Cached per-type property descriptors
//! - **PropertyPath**: Parsed path expression (`customer.addresses[0].lines(home)`)
//! - **ConverterRegistry**: Coercions between mismatched but compatible types
//! - **Shared**: Reference handle for nested beans
//!
//! # Path Syntax
//!
//! ```text
//! name               simple property
//! customer.name      nested bean property
//! lines[2]           list element
//! scores(math)       map entry
//! ```
//!
//! Reads through an absent value yield `Ok(None)`. Writes never create
//! missing structure.
//!
//! # Quick Start
//!
//! ```ignore
//! use beankit::{copy_properties, get_property, Bean, Value};
//!
//! #[derive(Default, Bean)]
//! struct UserForm {
//!     name: String,
//!     age: String,
//! }
//!
//! #[derive(Default, Bean)]
//! struct User {
//!     #[bean(id)]
//!     id: i64,
//!     name: String,
//!     age: i32,
//! }
//!
//! let form = UserForm { name: "Alice".into(), age: "30".into() };
//! let mut user = User::default();
//!
//! // "30" is converted to the destination's declared type
//! copy_properties(&form, &mut user)?;
//! assert_eq!(user.age, 30);
//! assert_eq!(get_property(&user, "name")?, Some(Value::from("Alice")));
//! ```
//!
//! # Copy Variants
//!
//! | Function | Behavior |
//! |----------|----------|
//! | [`copy_properties`] | every common property, with conversion |
//! | [`copy_properties_strict`] | no conversion; mismatches fail |
//! | [`copy_excluding`] | skip named properties |
//! | [`copy_mapped`] | arbitrary path to path, best effort |
//! | [`copy_exclude_id`] / [`reset`] | keep the destination's identity |
//! | [`copy_new`] / [`copy_list`] | construct destinations |
//!
//! Cloning is [`shallow_clone`] (nested beans shared) or [`deep_clone`]
//! (nested beans duplicated, cycles preserved).

extern crate self as beankit;

mod bean;
mod clone;
pub mod convert;
mod copy;
mod error;
mod path;
mod resolve;
mod shape;
mod shared;
mod value;

// Core types
pub use bean::{Bean, BeanClass, Identified};
pub use error::{
    AccessResult, BeanCopyError, CloneError, CloneResult, ConversionError, CopyResult,
    PropertyAccessError,
};
pub use path::{PropertyPath, Seg};
pub use shape::{describe, PropertyDescriptor, Shape};
pub use shared::{BeanRef, OpaqueRef, Resource, Shared};
pub use value::{BeanType, PropertyValue, Value, ValueType};

// Conversion
pub use convert::{ConversionConfig, Converter, ConverterRegistry};

// Operations
pub use clone::{deep_clone, deep_clone_shared, deep_clone_value, shallow_clone, GraphCloner};
pub use copy::{
    copy_exclude_id, copy_excluding, copy_list, copy_mapped, copy_new, copy_properties,
    copy_properties_strict, copy_shared, reset, FieldMapping, MappedCopy,
};
pub use resolve::{describe_values, get_property, populate, read, set_property, write};

// Re-export derive macro when feature is enabled
#[cfg(feature = "derive")]
pub use beankit_derive::Bean;

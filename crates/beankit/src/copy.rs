//! Property transfer between beans.
//!
//! All variants except [`copy_mapped`] abort on the first failing property
//! and report it as a [`BeanCopyError`] wrapping the cause. Nested beans are
//! copied by handle: source and destination end up sharing them.

use crate::convert;
use crate::error::{BeanCopyError, CopyResult, PropertyAccessError};
use crate::resolve;
use crate::{Bean, BeanClass, BeanRef, Identified};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Coercion {
    Convert,
    Exact,
}

/// Copy every property that is writable on `dest` and readable on `orig`,
/// converting values to the destination's declared types.
///
/// A `null` source value is skipped when the destination property is not
/// optional.
pub fn copy_properties(orig: &dyn Bean, dest: &mut dyn Bean) -> CopyResult<()> {
    transfer(orig, dest, &[], Coercion::Convert)
}

/// Like [`copy_properties`], but a value that is not assignable to the
/// destination's declared type fails with
/// [`BeanCopyError::ConversionRequired`] instead of being converted.
pub fn copy_properties_strict(orig: &dyn Bean, dest: &mut dyn Bean) -> CopyResult<()> {
    transfer(orig, dest, &[], Coercion::Exact)
}

/// Like [`copy_properties`], skipping the named top-level properties.
///
/// Names that are not properties of either bean are ignored.
pub fn copy_excluding(orig: &dyn Bean, dest: &mut dyn Bean, exclude: &[&str]) -> CopyResult<()> {
    transfer(orig, dest, exclude, Coercion::Convert)
}

/// [`copy_properties`] between two shared beans.
///
/// Copying a bean onto itself is a no-op.
pub fn copy_shared(orig: &BeanRef, dest: &BeanRef) -> CopyResult<()> {
    if orig.ptr_eq(dest) {
        return Ok(());
    }
    let source = orig.read();
    let mut target = dest.write();
    transfer(&*source, &mut *target, &[], Coercion::Convert)
}

fn transfer(
    orig: &dyn Bean,
    dest: &mut dyn Bean,
    exclude: &[&str],
    coercion: Coercion,
) -> CopyResult<()> {
    let from = orig.type_name();
    let to = dest.type_name();
    let source_shape = orig.shape();
    let dest_shape = dest.shape();

    for target in dest_shape.writable() {
        let name = target.name();
        if exclude.contains(&name) {
            continue;
        }
        match source_shape.get(name) {
            Some(source) if source.is_readable() => {}
            _ => continue,
        }

        let value = orig
            .get(name)
            .map_err(|e| BeanCopyError::property(from, to, name, e))?;

        let value = if value.is_assignable_to(target.value_type()) {
            value
        } else if value.is_null() {
            // The destination cannot hold "no value"; it keeps its own.
            continue;
        } else if coercion == Coercion::Exact {
            return Err(BeanCopyError::ConversionRequired {
                to,
                property: name.to_string(),
                found: value.kind_name(),
                expected: target.value_type().clone(),
            });
        } else {
            convert::convert(value, target.value_type()).map_err(|e| {
                BeanCopyError::property(from, to, name, PropertyAccessError::conversion(to, name, e))
            })?
        };

        dest.set(name, value)
            .map_err(|e| BeanCopyError::property(from, to, name, e))?;
    }

    Ok(())
}

/// Source path to destination path table for [`copy_mapped`].
///
/// Deserializes from a JSON object, so mappings can live in configuration:
///
/// ```
/// use beankit::FieldMapping;
///
/// let mapping: FieldMapping = serde_json::from_str(r#"{"a": "x", "b[0]": "y"}"#).unwrap();
/// assert_eq!(mapping.get("b[0]"), Some("y"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping(HashMap<String, String>);

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry and return self (builder pattern).
    pub fn with(mut self, source: impl Into<String>, dest: impl Into<String>) -> Self {
        self.insert(source, dest);
        self
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, source: impl Into<String>, dest: impl Into<String>) {
        self.0.insert(source.into(), dest.into());
    }

    /// Destination path for a source path.
    pub fn get(&self, source: &str) -> Option<&str> {
        self.0.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(s, d)| (s.as_str(), d.as_str()))
    }
}

impl<S: Into<String>, D: Into<String>> FromIterator<(S, D)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (S, D)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(s, d)| (s.into(), d.into()))
                .collect(),
        )
    }
}

/// Outcome of a [`copy_mapped`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MappedCopy {
    /// Entries written to the destination.
    pub applied: usize,
    /// Entries whose source had no value or could not be read.
    pub skipped: usize,
    /// Entries whose destination write failed.
    pub failed: usize,
}

/// Copy values between arbitrary paths, best effort.
///
/// For each entry the source path is read; absent values are skipped. A
/// source that cannot be read (bad path, unknown property) or a destination
/// write that fails is logged and skipped; the remaining entries are still
/// processed.
pub fn copy_mapped(src: &dyn Bean, dest: &mut dyn Bean, mapping: &FieldMapping) -> MappedCopy {
    let mut outcome = MappedCopy::default();

    for (source_path, dest_path) in mapping.iter() {
        let value = match resolve::get_property(src, source_path) {
            Ok(Some(value)) => value,
            Ok(None) => {
                outcome.skipped += 1;
                continue;
            }
            Err(error) => {
                tracing::warn!(
                    source = %source_path,
                    dest = %dest_path,
                    %error,
                    "skipping unreadable mapping source"
                );
                outcome.skipped += 1;
                continue;
            }
        };

        match resolve::set_property(dest, dest_path, value) {
            Ok(()) => outcome.applied += 1,
            Err(error) => {
                tracing::warn!(
                    source = %source_path,
                    dest = %dest_path,
                    %error,
                    "mapped property write failed"
                );
                outcome.failed += 1;
            }
        }
    }

    outcome
}

/// Copy `src` onto `dest` without changing `dest`'s identity.
///
/// The id is restored even when the copy fails part way.
pub fn copy_exclude_id<D>(src: &dyn Bean, dest: &mut D) -> CopyResult<()>
where
    D: Bean + Identified,
{
    let id = dest.id();
    let copied = copy_properties(src, dest);
    dest.set_id(id);
    copied
}

/// Reset every property of `record` to its default, keeping its identity.
pub fn reset<T>(record: &mut T) -> CopyResult<()>
where
    T: BeanClass + Identified,
{
    let id = record.id();
    let defaults = T::default();
    let copied = copy_properties(&defaults, record);
    record.set_id(id);
    copied
}

/// Build a new `T` from `src`.
pub fn copy_new<T: BeanClass>(src: &dyn Bean) -> CopyResult<T> {
    let mut dest = T::default();
    copy_properties(src, &mut dest)?;
    Ok(dest)
}

/// Build one `T` per source, in order. The first failure aborts the batch.
pub fn copy_list<S, T>(sources: &[S]) -> CopyResult<Vec<T>>
where
    S: Bean,
    T: BeanClass,
{
    sources
        .iter()
        .enumerate()
        .map(|(index, src)| copy_new(src).map_err(|e| BeanCopyError::batch(index, e)))
        .collect()
}

//! Path resolution against beans.
//!
//! Reads walk the path step by step and turn any absent intermediate (a
//! `null` property, a missing map key, an index past the end) into
//! `Ok(None)`. Writes locate the terminal container with the same walk but
//! never create missing structure: an absent container is an error.
//!
//! Nested beans are reached through their shared handles; each handle is
//! locked only for the single get or set performed on it.

use crate::convert;
use crate::error::{AccessResult, PropertyAccessError};
use crate::path::{PropertyPath, Seg};
use crate::value::{Value, ValueType};
use crate::{Bean, BeanRef};
use std::collections::BTreeMap;

/// Read the value at `path`.
///
/// Returns `Ok(None)` when the walk meets an absent value; errors are
/// reserved for paths that cannot exist on this bean's shape.
pub fn read(bean: &dyn Bean, path: &PropertyPath) -> AccessResult<Option<Value>> {
    let root = bean.type_name();
    let in_context = |e: PropertyAccessError| e.in_context(root, path);

    let Some((first, rest)) = path.segments().split_first() else {
        return Err(PropertyAccessError::malformed("", "empty path"));
    };

    let Some(mut current) = step(bean, first).map_err(in_context)? else {
        return Ok(None);
    };

    for seg in rest {
        let next = match &current {
            Value::Bean(node) => step(&*node.read(), seg).map_err(in_context)?,
            other => {
                return Err(PropertyAccessError::type_mismatch(
                    root,
                    path.to_string(),
                    "bean",
                    other.kind_name(),
                ))
            }
        };
        match next {
            Some(value) => current = value,
            None => return Ok(None),
        }
    }

    Ok(Some(current))
}

/// Write `value` at `path`, converting it to the declared type if needed.
pub fn write(bean: &mut dyn Bean, path: &PropertyPath, value: Value) -> AccessResult<()> {
    let root = bean.type_name();
    let in_context = |e: PropertyAccessError| e.in_context(root, path);

    let Some((last, parents)) = path.segments().split_last() else {
        return Err(PropertyAccessError::malformed("", "empty path"));
    };

    let Some((first, rest)) = parents.split_first() else {
        return assign(bean, last, value).map_err(in_context);
    };

    let mut node = container(step(&*bean, first).map_err(in_context)?, root, path)?;
    for seg in rest {
        let next = step(&*node.read(), seg).map_err(in_context)?;
        node = container(next, root, path)?;
    }

    let mut target = node.write();
    let assigned = assign(&mut *target, last, value);
    assigned.map_err(in_context)
}

/// Parse `path` and [`read`] it.
pub fn get_property(bean: &dyn Bean, path: &str) -> AccessResult<Option<Value>> {
    read(bean, &PropertyPath::parse(path)?)
}

/// Parse `path` and [`write`] it.
pub fn set_property(bean: &mut dyn Bean, path: &str, value: impl Into<Value>) -> AccessResult<()> {
    write(bean, &PropertyPath::parse(path)?, value.into())
}

/// Snapshot every readable top-level property.
pub fn describe_values(bean: &dyn Bean) -> AccessResult<BTreeMap<String, Value>> {
    let shape = bean.shape();
    shape
        .readable()
        .map(|p| bean.get(p.name()).map(|v| (p.name().to_string(), v)))
        .collect()
}

/// Write each entry as a top-level property, with conversion.
///
/// Names that are not writable properties of the bean are skipped. Returns
/// the number of properties written; the first failing assignment aborts.
pub fn populate(bean: &mut dyn Bean, values: BTreeMap<String, Value>) -> AccessResult<usize> {
    let shape = bean.shape();
    let mut written = 0;
    for (name, value) in values {
        match shape.get(&name) {
            Some(p) if p.is_writable() => {
                assign(bean, &Seg::Property(name), value)?;
                written += 1;
            }
            _ => continue,
        }
    }
    Ok(written)
}

/// Perform one step on `bean`: read the named property and, for indexed or
/// keyed steps, the element inside it.
fn step(bean: &dyn Bean, seg: &Seg) -> AccessResult<Option<Value>> {
    let value = bean.get(seg.name())?;
    let found = match seg {
        Seg::Property(_) => Some(value),
        Seg::Indexed(_, index) => match value {
            Value::Null => None,
            Value::List(mut items) => {
                if *index < items.len() {
                    Some(items.swap_remove(*index))
                } else {
                    None
                }
            }
            other => {
                return Err(PropertyAccessError::type_mismatch(
                    bean.type_name(),
                    seg.to_string(),
                    "list",
                    other.kind_name(),
                ))
            }
        },
        Seg::Keyed(_, key) => match value {
            Value::Null => None,
            Value::Map(mut entries) => entries.remove(key),
            other => {
                return Err(PropertyAccessError::type_mismatch(
                    bean.type_name(),
                    seg.to_string(),
                    "map",
                    other.kind_name(),
                ))
            }
        },
    };
    Ok(found.filter(|v| !v.is_null()))
}

fn container(value: Option<Value>, root: &'static str, path: &PropertyPath) -> AccessResult<BeanRef> {
    match value {
        Some(Value::Bean(node)) => Ok(node),
        None => Err(PropertyAccessError::missing_container(root, path.to_string())),
        Some(other) => Err(PropertyAccessError::type_mismatch(
            root,
            path.to_string(),
            "bean",
            other.kind_name(),
        )),
    }
}

/// Convert `value` to `ty` if it is not already assignable.
pub(crate) fn coerce(value: Value, ty: &ValueType) -> Result<Value, crate::ConversionError> {
    if value.is_assignable_to(ty) {
        Ok(value)
    } else {
        convert::convert(value, ty)
    }
}

/// Typed assignment of the terminal step.
fn assign(target: &mut dyn Bean, seg: &Seg, value: Value) -> AccessResult<()> {
    let bean = target.type_name();
    let shape = target.shape();
    let name = seg.name();
    let descriptor = shape
        .get(name)
        .ok_or_else(|| PropertyAccessError::unknown_property(bean, name))?;
    if !descriptor.is_writable() {
        return Err(PropertyAccessError::not_writable(bean, name));
    }
    let declared = descriptor.value_type();

    match seg {
        Seg::Property(_) => {
            let value =
                coerce(value, declared).map_err(|e| PropertyAccessError::conversion(bean, name, e))?;
            target.set(name, value)
        }
        Seg::Indexed(_, index) => {
            let elem = declared.element().ok_or_else(|| {
                PropertyAccessError::type_mismatch(bean, seg.to_string(), "list", "scalar property")
            })?;
            match target.get(name)? {
                Value::List(mut items) => {
                    if *index >= items.len() {
                        return Err(PropertyAccessError::index_out_of_bounds(
                            bean,
                            seg.to_string(),
                            *index,
                            items.len(),
                        ));
                    }
                    items[*index] = coerce(value, elem)
                        .map_err(|e| PropertyAccessError::conversion(bean, seg.to_string(), e))?;
                    target.set(name, Value::List(items))
                }
                Value::Null => Err(PropertyAccessError::missing_container(bean, seg.to_string())),
                other => Err(PropertyAccessError::type_mismatch(
                    bean,
                    seg.to_string(),
                    "list",
                    other.kind_name(),
                )),
            }
        }
        Seg::Keyed(_, key) => {
            let elem = declared.element().ok_or_else(|| {
                PropertyAccessError::type_mismatch(bean, seg.to_string(), "map", "scalar property")
            })?;
            match target.get(name)? {
                Value::Map(mut entries) => {
                    let value = coerce(value, elem)
                        .map_err(|e| PropertyAccessError::conversion(bean, seg.to_string(), e))?;
                    entries.insert(key.clone(), value);
                    target.set(name, Value::Map(entries))
                }
                Value::Null => Err(PropertyAccessError::missing_container(bean, seg.to_string())),
                other => Err(PropertyAccessError::type_mismatch(
                    bean,
                    seg.to_string(),
                    "map",
                    other.kind_name(),
                )),
            }
        }
    }
}

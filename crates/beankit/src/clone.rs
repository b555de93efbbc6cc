//! Shallow and deep duplication of beans.
//!
//! A shallow clone is a default-constructed bean with every property copied,
//! so nested beans and resources are the same handles as in the original.
//!
//! A deep clone duplicates every bean reachable through [`Value::Bean`]
//! handles. The [`GraphCloner`] keeps an identity-keyed map from original
//! handles to their duplicates; a node is registered before its properties
//! are cloned, so a bean shared by two parents is duplicated once and a
//! cycle comes out as the same cycle over the new nodes. Every property is
//! carried over, including read-only and write-only ones.

use crate::copy;
use crate::error::{CloneError, CloneResult};
use crate::{Bean, BeanClass, BeanRef, Shared, Value};
use std::collections::HashMap;

/// Duplicate `source`, sharing nested beans and resources.
pub fn shallow_clone<T: BeanClass>(source: &T) -> CloneResult<T> {
    Ok(copy::copy_new(source)?)
}

/// Duplicate `source` and every bean reachable from it.
///
/// Fails with [`CloneError::Unclonable`] if any reachable property holds a
/// [`Resource`](crate::Resource).
pub fn deep_clone<T: BeanClass>(source: &T) -> CloneResult<T> {
    GraphCloner::new().clone_bean(source)
}

/// Deep clone behind a shared handle. Cycles that pass through `source`
/// itself are redirected to the returned handle.
pub fn deep_clone_shared<T: BeanClass>(source: &Shared<T>) -> CloneResult<Shared<T>> {
    let node = GraphCloner::new().clone_ref(&source.to_bean_ref())?;
    node.downcast::<T>().ok_or(CloneError::TypeMismatch {
        expected: T::TYPE_NAME,
        found: node.type_name(),
    })
}

/// Deep clone a dynamic value.
pub fn deep_clone_value(value: &Value) -> CloneResult<Value> {
    GraphCloner::new().clone_value(value)
}

/// Deep-cloning walker.
///
/// Reusing one cloner across several calls keeps their duplicates linked: a
/// node reached from two roots is duplicated once. A call that fails leaves
/// no trace: the nodes it registered are dropped again.
#[derive(Debug, Default)]
pub struct GraphCloner {
    visited: HashMap<usize, BeanRef>,
    // Nodes registered by the call in progress.
    added: Vec<usize>,
}

impl GraphCloner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct beans duplicated so far.
    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    /// Deep clone an unshared bean.
    pub fn clone_bean<T: BeanClass>(&mut self, source: &T) -> CloneResult<T> {
        self.atomically(|cloner| {
            let values = snapshot(source)?;
            let values = cloner.clone_all(T::TYPE_NAME, values)?;
            let mut target = T::default();
            fill(&mut target, values)?;
            Ok(target)
        })
    }

    /// Duplicate the bean behind `node`, or return its existing duplicate.
    pub fn clone_ref(&mut self, node: &BeanRef) -> CloneResult<BeanRef> {
        self.atomically(|cloner| cloner.clone_node(node))
    }

    /// Deep clone a dynamic value.
    pub fn clone_value(&mut self, value: &Value) -> CloneResult<Value> {
        self.atomically(|cloner| cloner.clone_value_in(value, "value", ""))
    }

    fn atomically<R>(&mut self, f: impl FnOnce(&mut Self) -> CloneResult<R>) -> CloneResult<R> {
        let result = f(self);
        let added = std::mem::take(&mut self.added);
        if result.is_err() {
            for addr in added {
                self.visited.remove(&addr);
            }
        }
        result
    }

    fn clone_node(&mut self, node: &BeanRef) -> CloneResult<BeanRef> {
        if let Some(done) = self.visited.get(&node.addr()) {
            return Ok(done.clone());
        }

        let fresh = node.read().new_default().share();
        self.visited.insert(node.addr(), fresh.clone());
        self.added.push(node.addr());

        let values = snapshot(&*node.read())?;
        let values = self.clone_all(node.type_name(), values)?;
        fill(&mut *fresh.write(), values)?;
        Ok(fresh)
    }

    fn clone_all(
        &mut self,
        owner: &'static str,
        values: Vec<(&'static str, Value)>,
    ) -> CloneResult<Vec<(&'static str, Value)>> {
        values
            .into_iter()
            .map(|(name, value)| Ok((name, self.clone_value_in(&value, owner, name)?)))
            .collect()
    }

    fn clone_value_in(
        &mut self,
        value: &Value,
        owner: &'static str,
        property: &str,
    ) -> CloneResult<Value> {
        Ok(match value {
            Value::List(items) => Value::List(
                items
                    .iter()
                    .map(|item| self.clone_value_in(item, owner, property))
                    .collect::<CloneResult<_>>()?,
            ),
            Value::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), self.clone_value_in(v, owner, property)?)))
                    .collect::<CloneResult<_>>()?,
            ),
            Value::Bean(node) => Value::Bean(self.clone_node(node)?),
            Value::Opaque(handle) => {
                return Err(CloneError::Unclonable {
                    bean: owner,
                    property: property.to_string(),
                    kind: handle.type_name(),
                })
            }
            scalar => scalar.clone(),
        })
    }
}

/// Values of every property, whatever its access flags.
fn snapshot(bean: &dyn Bean) -> CloneResult<Vec<(&'static str, Value)>> {
    let owner = bean.type_name();
    let shape = bean.shape();
    shape
        .properties()
        .iter()
        .map(|p| {
            bean.get_raw(p.name())
                .map(|v| (p.name(), v))
                .map_err(|source| CloneError::Property {
                    bean: owner,
                    property: p.name().to_string(),
                    source,
                })
        })
        .collect()
}

fn fill(target: &mut dyn Bean, values: Vec<(&'static str, Value)>) -> CloneResult<()> {
    let owner = target.type_name();
    for (name, value) in values {
        target
            .set_raw(name, value)
            .map_err(|source| CloneError::Property {
                bean: owner,
                property: name.to_string(),
                source,
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_scalar_value() {
        let value = Value::List(vec![Value::Int(1), Value::from("a")]);
        assert_eq!(deep_clone_value(&value).unwrap(), value);
    }

    #[test]
    fn test_clone_opaque_value_fails() {
        let handle = crate::Resource::new(42u32);
        let value = crate::PropertyValue::to_value(&handle);
        let err = deep_clone_value(&value).unwrap_err();
        assert!(matches!(err, CloneError::Unclonable { kind: "u32", .. }));
    }
}

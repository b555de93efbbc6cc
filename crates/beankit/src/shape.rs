//! Property descriptors and the per-type shape cache.

use crate::value::ValueType;
use crate::BeanClass;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// One property of a bean type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDescriptor {
    name: &'static str,
    value_type: ValueType,
    readable: bool,
    writable: bool,
}

impl PropertyDescriptor {
    pub fn new(name: &'static str, value_type: ValueType, readable: bool, writable: bool) -> Self {
        Self {
            name,
            value_type,
            readable,
            writable,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type of the property.
    #[inline]
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    #[inline]
    pub fn is_readable(&self) -> bool {
        self.readable
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.writable
    }
}

/// The set of properties of one bean type. Immutable once built.
#[derive(Debug)]
pub struct Shape {
    type_name: &'static str,
    properties: Vec<PropertyDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl Shape {
    /// Build a shape. A repeated name keeps its first descriptor.
    pub fn new(type_name: &'static str, properties: Vec<PropertyDescriptor>) -> Self {
        let mut index = HashMap::with_capacity(properties.len());
        for (i, p) in properties.iter().enumerate() {
            index.entry(p.name).or_insert(i);
        }
        Self {
            type_name,
            properties,
            index,
        }
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All descriptors in declaration order.
    #[inline]
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Look up a property by name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.index.get(name).map(|&i| &self.properties[i])
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn readable(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| p.readable)
    }

    pub fn writable(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| p.writable)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

type ShapeCache = RwLock<HashMap<TypeId, Arc<Shape>>>;

fn cache() -> &'static ShapeCache {
    static SHAPES: OnceLock<ShapeCache> = OnceLock::new();
    SHAPES.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Get the cached shape of `T`, building it on first use.
///
/// Concurrent first calls may each build a shape; only the first one stored
/// is ever returned.
pub fn describe<T: BeanClass>() -> Arc<Shape> {
    let key = TypeId::of::<T>();
    if let Some(shape) = cache()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return shape.clone();
    }

    let built = Arc::new(Shape::new(T::TYPE_NAME, T::properties()));
    let mut shapes = cache().write().unwrap_or_else(PoisonError::into_inner);
    shapes
        .entry(key)
        .or_insert_with(|| {
            tracing::debug!(
                bean = T::TYPE_NAME,
                properties = built.len(),
                "cached bean shape"
            );
            built
        })
        .clone()
}

//! Dynamic property values and declared property types.
//!
//! [`Value`] is what flows between beans during get/set/copy. [`ValueType`]
//! is what a property declares it accepts. [`PropertyValue`] ties a Rust
//! field type to both.

use crate::error::ConversionError;
use crate::shared::{BeanRef, OpaqueRef, Resource, Shared};
use crate::BeanClass;
use chrono::{NaiveDate, NaiveDateTime};
use std::any::TypeId;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// A dynamically typed property value.
///
/// Nested beans and opaque resources are held by shared handle, so cloning a
/// `Value` never duplicates them.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Any integer property. Wide enough for every Rust integer up to
    /// 64 bits, signed or not.
    Int(i128),
    /// Any floating point property.
    Float(f64),
    /// Text.
    Text(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time without zone.
    DateTime(NaiveDateTime),
    /// Ordered sequence.
    List(Vec<Value>),
    /// String-keyed mapping.
    Map(BTreeMap<String, Value>),
    /// Shared nested bean.
    Bean(BeanRef),
    /// Shared resource that cannot be duplicated.
    Opaque(OpaqueRef),
}

impl Value {
    /// Short name of this value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Bean(_) => "bean",
            Value::Opaque(_) => "opaque",
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i128> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_bean(&self) -> Option<&BeanRef> {
        match self {
            Value::Bean(node) => Some(node),
            _ => None,
        }
    }

    /// Check whether this value can be stored in a property of type `ty`
    /// without conversion.
    pub fn is_assignable_to(&self, ty: &ValueType) -> bool {
        match (ty, self) {
            (ValueType::Any, _) => true,
            (ValueType::Optional(_), Value::Null) => true,
            (ValueType::Optional(inner), value) => value.is_assignable_to(inner),
            (ValueType::Bool, Value::Bool(_))
            | (ValueType::Int, Value::Int(_))
            | (ValueType::Float, Value::Float(_))
            | (ValueType::Text, Value::Text(_))
            | (ValueType::Date, Value::Date(_))
            | (ValueType::DateTime, Value::DateTime(_)) => true,
            (ValueType::List(elem), Value::List(items)) => {
                items.iter().all(|item| item.is_assignable_to(elem))
            }
            (ValueType::Map(elem), Value::Map(entries)) => {
                entries.values().all(|item| item.is_assignable_to(elem))
            }
            (ValueType::Bean(ty), Value::Bean(node)) => node.bean_type() == *ty,
            (ValueType::Opaque(name), Value::Opaque(handle)) => handle.type_name() == *name,
            _ => false,
        }
    }

    /// Build a value from JSON data. Integral numbers become `Int`, other
    /// numbers `Float`, objects `Map`.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Value::Int(i128::from(i)),
                (None, Some(u)) => Value::Int(i128::from(u)),
                _ => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Render this value as JSON.
    ///
    /// Nested beans become objects of their readable properties. A bean that
    /// is reached again while it is still being rendered (a cycle) and opaque
    /// values render as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        self.to_json_guarded(&mut HashSet::new())
    }

    fn to_json_guarded(&self, active: &mut HashSet<usize>) -> serde_json::Value {
        match self {
            Value::Null | Value::Opaque(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => match (i64::try_from(*i), u64::try_from(*i)) {
                (Ok(i), _) => serde_json::Value::from(i),
                (_, Ok(u)) => serde_json::Value::from(u),
                _ => serde_json::Value::Null,
            },
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => serde_json::Value::String(d.to_string()),
            Value::DateTime(dt) => serde_json::Value::String(dt.to_string()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(|v| v.to_json_guarded(active)).collect())
            }
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json_guarded(active)))
                    .collect(),
            ),
            Value::Bean(node) => {
                if !active.insert(node.addr()) {
                    return serde_json::Value::Null;
                }
                let values: Vec<(&'static str, Value)> = {
                    let bean = node.read();
                    let shape = bean.shape();
                    shape
                        .readable()
                        .filter_map(|p| bean.get(p.name()).ok().map(|v| (p.name(), v)))
                        .collect()
                };
                let object = values
                    .into_iter()
                    .map(|(name, v)| (name.to_string(), v.to_json_guarded(active)))
                    .collect();
                active.remove(&node.addr());
                serde_json::Value::Object(object)
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // Handles compare by identity.
            (Value::Bean(a), Value::Bean(b)) => a.ptr_eq(b),
            (Value::Opaque(a), Value::Opaque(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i128::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i128::from(i))
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Int(i128::from(u))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BeanRef> for Value {
    fn from(node: BeanRef) -> Self {
        Value::Bean(node)
    }
}

/// Declared type of a bean property.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Accepts every value.
    Any,
    Bool,
    Int,
    Float,
    Text,
    Date,
    DateTime,
    /// Sequence with the given element type.
    List(Box<ValueType>),
    /// String-keyed mapping with the given value type.
    Map(Box<ValueType>),
    /// Nullable variant of the inner type.
    Optional(Box<ValueType>),
    /// Nested bean of the given type.
    Bean(BeanType),
    /// Resource handle of the named Rust type.
    Opaque(&'static str),
}

static ANY: ValueType = ValueType::Any;

/// Identity of a bean type: its bean name plus the Rust type behind it.
///
/// Two types that share a name (same ident in different modules, or a
/// `#[bean(rename)]`) are distinct bean types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BeanType {
    name: &'static str,
    id: TypeId,
}

impl BeanType {
    pub fn of<T: BeanClass>() -> Self {
        Self {
            name: T::TYPE_NAME,
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl fmt::Display for BeanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl ValueType {
    /// Declared type of a `Shared<T>` property.
    pub fn bean<T: BeanClass>() -> Self {
        ValueType::Bean(BeanType::of::<T>())
    }

    /// Element type of a list or map property (through `Optional`).
    ///
    /// `Any` properties can hold containers of anything.
    pub fn element(&self) -> Option<&ValueType> {
        match self {
            ValueType::List(elem) | ValueType::Map(elem) => Some(elem),
            ValueType::Optional(inner) => inner.element(),
            ValueType::Any => Some(&ANY),
            _ => None,
        }
    }

    /// The type with any `Optional` wrapper removed.
    pub fn non_optional(&self) -> &ValueType {
        match self {
            ValueType::Optional(inner) => inner.non_optional(),
            other => other,
        }
    }

    #[inline]
    pub fn is_optional(&self) -> bool {
        matches!(self, ValueType::Optional(_))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Any => write!(f, "any"),
            ValueType::Bool => write!(f, "bool"),
            ValueType::Int => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
            ValueType::Text => write!(f, "text"),
            ValueType::Date => write!(f, "date"),
            ValueType::DateTime => write!(f, "datetime"),
            ValueType::List(elem) => write!(f, "list<{}>", elem),
            ValueType::Map(elem) => write!(f, "map<{}>", elem),
            ValueType::Optional(inner) => write!(f, "optional<{}>", inner),
            ValueType::Bean(ty) => write!(f, "{}", ty),
            ValueType::Opaque(name) => write!(f, "opaque<{}>", name),
        }
    }
}

/// A Rust type that can be stored in a bean property.
///
/// `from_value` performs no coercion: the value must already be assignable
/// to `value_type()`. Coercion is the conversion registry's job and happens
/// before a value reaches the bean.
pub trait PropertyValue: Sized {
    /// Declared type of properties of this Rust type.
    fn value_type() -> ValueType;

    /// Read the field as a value. Shared handles are cloned, not duplicated.
    fn to_value(&self) -> Value;

    /// Build the field from a value.
    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

fn mismatch(value: &Value, to: ValueType) -> ConversionError {
    ConversionError::invalid(value.kind_name(), to, "value is not assignable")
}

macro_rules! int_property_value {
    ($($ty:ty),* $(,)?) => {$(
        impl PropertyValue for $ty {
            fn value_type() -> ValueType {
                ValueType::Int
            }

            fn to_value(&self) -> Value {
                // lossless: every listed type is at most 64 bits wide
                Value::Int(*self as i128)
            }

            fn from_value(value: Value) -> Result<Self, ConversionError> {
                match value {
                    Value::Int(i) => <$ty>::try_from(i).map_err(|_| {
                        ConversionError::invalid(
                            "int",
                            ValueType::Int,
                            format!("{} does not fit in {}", i, stringify!($ty)),
                        )
                    }),
                    other => Err(mismatch(&other, ValueType::Int)),
                }
            }
        }
    )*};
}

int_property_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! scalar_property_value {
    ($ty:ty, $variant:ident, $value_type:ident) => {
        impl PropertyValue for $ty {
            fn value_type() -> ValueType {
                ValueType::$value_type
            }

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }

            fn from_value(value: Value) -> Result<Self, ConversionError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(mismatch(&other, ValueType::$value_type)),
                }
            }
        }
    };
}

scalar_property_value!(bool, Bool, Bool);
scalar_property_value!(f64, Float, Float);
scalar_property_value!(String, Text, Text);
scalar_property_value!(NaiveDate, Date, Date);
scalar_property_value!(NaiveDateTime, DateTime, DateTime);

impl PropertyValue for f32 {
    fn value_type() -> ValueType {
        ValueType::Float
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(f) => Ok(f as f32),
            other => Err(mismatch(&other, ValueType::Float)),
        }
    }
}

impl PropertyValue for Value {
    fn value_type() -> ValueType {
        ValueType::Any
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        Ok(value)
    }
}

impl<T: PropertyValue> PropertyValue for Option<T> {
    fn value_type() -> ValueType {
        ValueType::Optional(Box::new(T::value_type()))
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: PropertyValue> PropertyValue for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::List(Box::new(T::value_type()))
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(PropertyValue::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch(&other, Self::value_type())),
        }
    }
}

impl<T: PropertyValue> PropertyValue for BTreeMap<String, T> {
    fn value_type() -> ValueType {
        ValueType::Map(Box::new(T::value_type()))
    }

    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                .collect(),
            other => Err(mismatch(&other, Self::value_type())),
        }
    }
}

impl<T: PropertyValue> PropertyValue for HashMap<String, T> {
    fn value_type() -> ValueType {
        ValueType::Map(Box::new(T::value_type()))
    }

    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                .collect(),
            other => Err(mismatch(&other, Self::value_type())),
        }
    }
}

impl<T: BeanClass> PropertyValue for Shared<T> {
    fn value_type() -> ValueType {
        ValueType::bean::<T>()
    }

    fn to_value(&self) -> Value {
        Value::Bean(self.to_bean_ref())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bean(node) => node.downcast::<T>().ok_or_else(|| {
                ConversionError::invalid(
                    "bean",
                    Self::value_type(),
                    format!("bean is a {}", node.type_name()),
                )
            }),
            other => Err(mismatch(&other, Self::value_type())),
        }
    }
}

impl<T: std::any::Any + Send + Sync> PropertyValue for Resource<T> {
    fn value_type() -> ValueType {
        ValueType::Opaque(std::any::type_name::<T>())
    }

    fn to_value(&self) -> Value {
        Value::Opaque(self.to_opaque_ref())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Opaque(handle) => handle.downcast::<T>().ok_or_else(|| {
                ConversionError::invalid(
                    "opaque",
                    Self::value_type(),
                    format!("resource is a {}", handle.type_name()),
                )
            }),
            other => Err(mismatch(&other, Self::value_type())),
        }
    }
}

//! Type conversion registry.
//!
//! A converter coerces an arbitrary value into one target type. The registry
//! maps target types to converters and recurses through `Optional`, `List`
//! and `Map` structure itself, so converters only deal with leaf types.
//!
//! The process-wide registry is reached through [`register`], [`configure`]
//! and [`convert`]. Register custom converters during initialization, before
//! any copy relies on them: there is no per-call override.

use crate::error::ConversionError;
use crate::value::{Value, ValueType};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// A function coercing a value into one target type.
pub type Converter = Arc<dyn Fn(&Value) -> Result<Value, ConversionError> + Send + Sync>;

/// Formats used by the default text/date converters.
///
/// Formats use chrono `strftime` syntax.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Format for `Date` values.
    pub date_format: String,
    /// Format for `DateTime` values.
    pub datetime_format: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
            datetime_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

impl ConversionConfig {
    /// Load a config from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Target type to converter table.
#[derive(Clone)]
pub struct ConverterRegistry {
    converters: HashMap<ValueType, Converter>,
    config: ConversionConfig,
}

impl ConverterRegistry {
    /// A registry with no converters at all.
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
            config: ConversionConfig::default(),
        }
    }

    /// A registry with the default converters and formats.
    pub fn new() -> Self {
        Self::with_config(ConversionConfig::default())
    }

    /// A registry with the default converters using the given formats.
    pub fn with_config(config: ConversionConfig) -> Self {
        let mut registry = Self {
            converters: HashMap::new(),
            config,
        };
        registry.install_scalar_defaults();
        registry.install_date_defaults();
        registry
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Change the date formats.
    ///
    /// Re-installs the text/date converters, replacing custom converters
    /// registered for `Text`, `Date` or `DateTime`.
    pub fn configure(&mut self, config: ConversionConfig) {
        self.config = config;
        self.install_date_defaults();
    }

    /// Register (or replace) the converter for a target type.
    pub fn register<F>(&mut self, target: ValueType, converter: F)
    where
        F: Fn(&Value) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        self.converters.insert(target, Arc::new(converter));
    }

    #[inline]
    pub fn has_converter(&self, target: &ValueType) -> bool {
        self.converters.contains_key(target)
    }

    /// Convert `value` into `target`.
    ///
    /// Assignable values are returned unchanged. Otherwise containers are
    /// converted element-wise and leaves go through the registered
    /// converter, whose result must be assignable to `target`.
    pub fn convert(&self, value: Value, target: &ValueType) -> Result<Value, ConversionError> {
        if value.is_assignable_to(target) {
            return Ok(value);
        }

        match (target, value) {
            (ValueType::Optional(inner), value) => self.convert(value, inner),
            (ValueType::List(elem), Value::List(items)) => items
                .into_iter()
                .map(|item| self.convert(item, elem))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            (ValueType::Map(elem), Value::Map(entries)) => entries
                .into_iter()
                .map(|(k, v)| self.convert(v, elem).map(|v| (k, v)))
                .collect::<Result<_, _>>()
                .map(Value::Map),
            (target, value) => {
                let converter = self
                    .converters
                    .get(target)
                    .ok_or_else(|| ConversionError::no_converter(value.kind_name(), target.clone()))?;
                let converted = converter(&value)?;
                if converted.is_assignable_to(target) {
                    Ok(converted)
                } else {
                    Err(ConversionError::invalid(
                        value.kind_name(),
                        target.clone(),
                        format!("converter produced {}", converted.kind_name()),
                    ))
                }
            }
        }
    }

    fn install_scalar_defaults(&mut self) {
        self.register(ValueType::Int, |value| match value {
            Value::Text(s) => s
                .trim()
                .parse::<i128>()
                .map(Value::Int)
                .map_err(|e| ConversionError::invalid("text", ValueType::Int, e.to_string())),
            other => Err(ConversionError::no_converter(other.kind_name(), ValueType::Int)),
        });

        self.register(ValueType::Float, |value| match value {
            Value::Int(i) => Ok(Value::Float(*i as f64)),
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| ConversionError::invalid("text", ValueType::Float, e.to_string())),
            other => Err(ConversionError::no_converter(other.kind_name(), ValueType::Float)),
        });

        self.register(ValueType::Bool, |value| match value {
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err(ConversionError::invalid(
                    "text",
                    ValueType::Bool,
                    format!("`{}` is not a boolean", s),
                )),
            },
            other => Err(ConversionError::no_converter(other.kind_name(), ValueType::Bool)),
        });
    }

    fn install_date_defaults(&mut self) {
        let date_format = self.config.date_format.clone();
        let datetime_format = self.config.datetime_format.clone();

        let (df, dtf) = (date_format.clone(), datetime_format.clone());
        self.register(ValueType::Text, move |value| match value {
            Value::Int(i) => Ok(Value::Text(i.to_string())),
            Value::Float(f) => Ok(Value::Text(f.to_string())),
            Value::Bool(b) => Ok(Value::Text(b.to_string())),
            Value::Date(d) => Ok(Value::Text(d.format(&df).to_string())),
            Value::DateTime(dt) => Ok(Value::Text(dt.format(&dtf).to_string())),
            other => Err(ConversionError::no_converter(other.kind_name(), ValueType::Text)),
        });

        let (df, dtf) = (date_format.clone(), datetime_format.clone());
        self.register(ValueType::Date, move |value| match value {
            Value::DateTime(dt) => Ok(Value::Date(dt.date())),
            Value::Text(s) => parse_date(s.trim(), &df)
                .or_else(|| parse_datetime(s.trim(), &dtf).map(|dt| dt.date()))
                .map(Value::Date)
                .ok_or_else(|| {
                    ConversionError::invalid(
                        "text",
                        ValueType::Date,
                        format!("`{}` does not match `{}`", s, df),
                    )
                }),
            other => Err(ConversionError::no_converter(other.kind_name(), ValueType::Date)),
        });

        let (df, dtf) = (date_format, datetime_format);
        self.register(ValueType::DateTime, move |value| match value {
            Value::Date(d) => Ok(Value::DateTime(d.and_time(NaiveTime::MIN))),
            Value::Text(s) => parse_datetime(s.trim(), &dtf)
                .or_else(|| parse_date(s.trim(), &df).map(|d| d.and_time(NaiveTime::MIN)))
                .map(Value::DateTime)
                .ok_or_else(|| {
                    ConversionError::invalid(
                        "text",
                        ValueType::DateTime,
                        format!("`{}` does not match `{}`", s, dtf),
                    )
                }),
            other => Err(ConversionError::no_converter(other.kind_name(), ValueType::DateTime)),
        });
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut targets: Vec<String> = self.converters.keys().map(|t| t.to_string()).collect();
        targets.sort();
        f.debug_struct("ConverterRegistry")
            .field("targets", &targets)
            .field("config", &self.config)
            .finish()
    }
}

fn parse_date(s: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, format).ok()
}

fn parse_datetime(s: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, format).ok()
}

// Copy-on-write: conversions run against a snapshot, so a converter may call
// back into `convert` without holding the lock.
fn global() -> &'static RwLock<Arc<ConverterRegistry>> {
    static REGISTRY: OnceLock<RwLock<Arc<ConverterRegistry>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(Arc::new(ConverterRegistry::new())))
}

fn snapshot() -> Arc<ConverterRegistry> {
    global()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Register a converter in the process-wide registry.
pub fn register<F>(target: ValueType, converter: F)
where
    F: Fn(&Value) -> Result<Value, ConversionError> + Send + Sync + 'static,
{
    tracing::debug!(target_type = %target, "registering converter");
    let mut registry = global().write().unwrap_or_else(PoisonError::into_inner);
    Arc::make_mut(&mut *registry).register(target, converter);
}

/// Change the date formats of the process-wide registry.
pub fn configure(config: ConversionConfig) {
    tracing::debug!(
        date_format = %config.date_format,
        datetime_format = %config.datetime_format,
        "configuring conversion registry"
    );
    let mut registry = global().write().unwrap_or_else(PoisonError::into_inner);
    Arc::make_mut(&mut *registry).configure(config);
}

/// Current configuration of the process-wide registry.
pub fn config() -> ConversionConfig {
    snapshot().config().clone()
}

/// Returns true if the process-wide registry has a converter for `target`.
pub fn has_converter(target: &ValueType) -> bool {
    snapshot().has_converter(target)
}

/// Convert through the process-wide registry.
pub fn convert(value: Value, target: &ValueType) -> Result<Value, ConversionError> {
    snapshot().convert(value, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_assignable_is_unchanged() {
        let registry = ConverterRegistry::empty();
        let value = Value::from("x");
        assert_eq!(registry.convert(value.clone(), &ValueType::Text).unwrap(), value);
    }

    #[test]
    fn test_missing_converter() {
        let registry = ConverterRegistry::empty();
        let err = registry
            .convert(Value::from("1"), &ValueType::Int)
            .unwrap_err();
        assert_eq!(err, ConversionError::no_converter("text", ValueType::Int));
    }

    #[test]
    fn test_text_to_datetime_default_format() {
        let registry = ConverterRegistry::new();
        let value = registry
            .convert(Value::from("2024-03-01 08:30:00"), &ValueType::DateTime)
            .unwrap();
        assert_eq!(value, Value::DateTime(datetime("2024-03-01 08:30:00")));

        let value = registry
            .convert(Value::from("2024-03-01"), &ValueType::DateTime)
            .unwrap();
        assert_eq!(value, Value::DateTime(datetime("2024-03-01 00:00:00")));
    }

    #[test]
    fn test_configured_format() {
        let config = ConversionConfig::from_json(r#"{"date_format": "%d/%m/%Y"}"#).unwrap();
        assert_eq!(config.datetime_format, "%Y-%m-%d %H:%M:%S");

        let mut registry = ConverterRegistry::new();
        registry.configure(config);
        let value = registry
            .convert(Value::from("01/03/2024"), &ValueType::Date)
            .unwrap();
        assert_eq!(
            value,
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert!(registry
            .convert(Value::from("2024-03-01"), &ValueType::Date)
            .is_err());
    }

    #[test]
    fn test_structural_conversion() {
        let registry = ConverterRegistry::new();
        let target = ValueType::Optional(Box::new(ValueType::List(Box::new(ValueType::Int))));
        let value = registry
            .convert(Value::List(vec![Value::from("1"), Value::Int(2)]), &target)
            .unwrap();
        assert_eq!(value, Value::List(vec![Value::Int(1), Value::Int(2)]));
        assert_eq!(registry.convert(Value::Null, &target).unwrap(), Value::Null);
    }

    #[test]
    fn test_scalar_defaults() {
        let registry = ConverterRegistry::new();
        assert_eq!(
            registry.convert(Value::Int(3), &ValueType::Float).unwrap(),
            Value::Float(3.0)
        );
        assert_eq!(
            registry.convert(Value::from(" yes "), &ValueType::Bool).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            registry.convert(Value::Int(42), &ValueType::Text).unwrap(),
            Value::from("42")
        );
        assert!(matches!(
            registry.convert(Value::from("abc"), &ValueType::Int),
            Err(ConversionError::Invalid { .. })
        ));
        // No lossy float -> int default.
        assert!(matches!(
            registry.convert(Value::Float(1.5), &ValueType::Int),
            Err(ConversionError::NoConverter { .. })
        ));
    }

    #[test]
    fn test_custom_converter_output_checked() {
        let mut registry = ConverterRegistry::empty();
        registry.register(ValueType::Int, |_| Ok(Value::from("not an int")));
        let err = registry
            .convert(Value::Bool(true), &ValueType::Int)
            .unwrap_err();
        assert!(matches!(err, ConversionError::Invalid { .. }));
    }
}

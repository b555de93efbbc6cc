//! Integration tests for the conversion registry.
#![allow(missing_docs)]

mod common;

use beankit::{
    convert, copy_properties, set_property, ConversionConfig, ConversionError, ConverterRegistry,
    PropertyAccessError, PropertyValue, Shared, Value, ValueType,
};
use chrono::NaiveDate;
use common::*;

#[test]
fn test_default_scalar_conversions() {
    let registry = ConverterRegistry::new();
    assert_eq!(
        registry.convert(Value::from(" 42 "), &ValueType::Int).unwrap(),
        Value::Int(42)
    );
    assert_eq!(
        registry.convert(Value::Int(2), &ValueType::Float).unwrap(),
        Value::Float(2.0)
    );
    assert_eq!(
        registry.convert(Value::from("yes"), &ValueType::Bool).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        registry.convert(Value::Int(7), &ValueType::Text).unwrap(),
        Value::from("7")
    );
}

#[test]
fn test_container_conversion() {
    let registry = ConverterRegistry::new();
    let ty = ValueType::List(Box::new(ValueType::Int));
    let value = Value::List(vec![Value::from("1"), Value::Int(2)]);
    assert_eq!(
        registry.convert(value, &ty).unwrap(),
        Value::List(vec![Value::Int(1), Value::Int(2)])
    );

    let err = registry
        .convert(Value::List(vec![Value::from("x")]), &ty)
        .unwrap_err();
    assert!(matches!(err, ConversionError::Invalid { .. }));
}

#[test]
fn test_no_converter_for_bean_target() {
    let registry = ConverterRegistry::new();
    let err = registry
        .convert(Value::Int(1), &ValueType::bean::<Address>())
        .unwrap_err();
    assert_eq!(
        err,
        ConversionError::no_converter("int", ValueType::bean::<Address>())
    );
}

#[test]
fn test_converter_output_must_be_assignable() {
    let mut registry = ConverterRegistry::empty();
    registry.register(ValueType::Int, |_| Ok(Value::from("not an int")));
    let err = registry
        .convert(Value::Bool(true), &ValueType::Int)
        .unwrap_err();
    assert!(matches!(err, ConversionError::Invalid { .. }));
}

#[test]
fn test_registry_with_config() {
    let config = ConversionConfig::from_json(r#"{"date_format": "%d/%m/%Y"}"#).unwrap();
    assert_eq!(config.datetime_format, "%Y-%m-%d %H:%M:%S");

    let registry = ConverterRegistry::with_config(config);
    assert_eq!(
        registry
            .convert(Value::from("15/01/2024"), &ValueType::Date)
            .unwrap(),
        Value::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
    );
    assert_eq!(
        registry
            .convert(
                Value::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
                &ValueType::Text
            )
            .unwrap(),
        Value::from("15/01/2024")
    );
}

#[test]
fn test_global_custom_converter_used_by_resolver_and_copy() {
    let target = <Shared<Address> as PropertyValue>::value_type();
    convert::register(target.clone(), |value| match value {
        Value::Text(city) => Ok(Value::Bean(address(city).to_bean_ref())),
        other => Err(ConversionError::no_converter(
            other.kind_name(),
            ValueType::bean::<Address>(),
        )),
    });
    assert!(convert::has_converter(&target));

    let mut c = Customer::default();
    set_property(&mut c, "address", "Vienna").unwrap();
    assert_eq!(c.address.as_ref().unwrap().read().city, "Vienna");

    let err = set_property(&mut c, "address", 5).unwrap_err();
    assert!(matches!(err, PropertyAccessError::Conversion { .. }));

    #[derive(Debug, Default, beankit::Bean)]
    struct Flat {
        address: String,
    }
    let flat = Flat {
        address: "Graz".to_string(),
    };
    let mut dest = Customer::default();
    copy_properties(&flat, &mut dest).unwrap();
    assert_eq!(dest.address.unwrap().read().city, "Graz");
}

#[test]
fn test_global_configure() {
    let previous = convert::config();
    convert::configure(ConversionConfig {
        date_format: "%Y%m%d".to_string(),
        ..Default::default()
    });
    assert_eq!(
        convert::convert(Value::from("20240229"), &ValueType::Date).unwrap(),
        Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
    );
    // scalar converters survive a reconfiguration
    assert!(convert::has_converter(&ValueType::Int));
    convert::configure(previous);
}

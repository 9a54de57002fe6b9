//! Integration tests for compiling predicates into filters.

mod common;

use common::Product;
use querybridge::error::{CompileError, SchemaError};
use querybridge::filter::{FilterLogic, FilterOperator, FilterValue};
use querybridge::predicate::{Predicate, compile, constant, member, static_call};
use querybridge::schema::ValueKind;

/// Holder for values captured by predicates.
struct TestRequest {
    value_property: Option<i32>,
    value_field: Option<i32>,
}

impl TestRequest {
    fn value_method(&self) -> Option<i32> {
        self.value_field
    }
}

fn static_method(arg: &str) -> String {
    format!("test{arg}")
}

#[test]
fn test_logical_connectors() -> Result<(), CompileError> {
    let filter = compile::<Product>(&member("IsActive").eq(true))?;
    assert_eq!(filter.property_name, "IsActive");

    let filter2 = compile::<Product>(&member("IsActive").eq(true).and(member("Id").eq("123")))?;
    assert_eq!(filter2.property_name, "IsActive");
    assert_eq!(filter2.value, FilterValue::Bool(true));
    assert_eq!(filter2.connectors[0].logic, FilterLogic::And);
    assert_eq!(filter2.connectors[0].filter.property_name, "Id");
    assert_eq!(filter2.connectors[0].filter.value.to_string(), "123");

    let filter3 = compile::<Product>(
        &member("IsActive")
            .eq(true)
            .and(member("Id").eq("123").or(member("Name").eq("456"))),
    )?;
    assert_eq!(filter3.property_name, "IsActive");
    assert_eq!(filter3.value, FilterValue::Bool(true));
    let inner = &filter3.connectors[0].filter;
    assert_eq!(inner.property_name, "Id");
    assert_eq!(inner.connectors[0].logic, FilterLogic::Or);
    assert_eq!(inner.connectors[0].filter.property_name, "Name");
    Ok(())
}

#[test]
fn test_nullable_int() -> Result<(), CompileError> {
    let filter = compile::<Product>(&member("TestNullableInt").eq(3))?;
    assert_eq!(filter.property_name, "TestNullableInt");
    assert_eq!(filter.value, FilterValue::Int(3));

    let value = 4 + 1;
    let filter2 = compile::<Product>(&member("TestNullableInt").eq(value))?;
    assert_eq!(filter2.value, FilterValue::Int(5));
    Ok(())
}

#[test]
fn test_conversion_of_nullable_values() -> Result<(), CompileError> {
    let request = TestRequest {
        value_property: Some(5),
        value_field: Some(5),
    };

    let from_property = compile::<Product>(
        &member("TestNullableInt").eq(constant(request.value_property).convert(ValueKind::Int)),
    )?;
    assert_eq!(from_property.value, FilterValue::Int(5));

    let from_field =
        compile::<Product>(&member("TestNullableInt").eq(constant(request.value_field).convert(ValueKind::Int)))?;
    assert_eq!(from_field.value, FilterValue::Int(5));

    let from_method = compile::<Product>(
        &member("TestNullableInt").eq(constant(request.value_method()).convert_nullable(ValueKind::Int)),
    )?;
    assert_eq!(from_method.property_name, "TestNullableInt");
    assert_eq!(from_method.value, FilterValue::Int(5));

    let missing = TestRequest {
        value_property: None,
        value_field: None,
    };
    let err = compile::<Product>(&member("TestNullableInt").eq(constant(missing.value_property).convert(ValueKind::Int)))
        .unwrap_err();
    assert!(matches!(err, CompileError::InvalidConversion { .. }));
    Ok(())
}

#[test]
fn test_method_calls() -> Result<(), CompileError> {
    let with_args = constant("ignored").method_call("ValueMethodWithArgs", vec![constant("test"), constant(4)], |args| {
        Ok(format!("{}{}", args[1], args[2]).into())
    });
    let filter = compile::<Product>(&member("Name").eq(with_args))?;
    assert_eq!(filter.property_name, "Name");
    assert_eq!(filter.value.to_string(), "test4");

    let call = || {
        static_call("StaticMethod", vec![constant("5")], |args| {
            let arg = args[0].as_str().ok_or_else(|| anyhow::anyhow!("expected a string"))?;
            Ok(static_method(arg).into())
        })
    };
    let filter = compile::<Product>(&member("Name").eq(call()))?;
    assert_eq!(filter.value.to_string(), "test5");

    let filter = compile::<Product>(&member("Name").ne(call()))?;
    assert_eq!(filter.operator, FilterOperator::Ne);
    assert_eq!(filter.value.to_string(), "test5");

    let failing = static_call("Boom", vec![], |_| Err(anyhow::anyhow!("boom")));
    let err = compile::<Product>(&member("Name").eq(failing)).unwrap_err();
    assert!(matches!(err, CompileError::MethodFailed { ref method, .. } if method == "Boom"));
    Ok(())
}

#[test]
fn test_enum_comparison() -> Result<(), CompileError> {
    // Enum members compare through their discriminant.
    let filter = compile::<Product>(&member("TestEnumProperty").convert(ValueKind::Int).eq(1))?;
    assert_eq!(filter.property_name, "TestEnumProperty");
    assert_eq!(filter.value.to_string(), "1");
    Ok(())
}

#[test]
fn test_operators() -> Result<(), CompileError> {
    let cases = [
        (member("Price").eq(1), FilterOperator::Eq),
        (member("Price").ne(1), FilterOperator::Ne),
        (member("Price").gt(1), FilterOperator::Gt),
        (member("Price").ge(1), FilterOperator::Ge),
        (member("Price").lt(1), FilterOperator::Lt),
        (member("Price").le(1), FilterOperator::Le),
    ];
    for (expr, operator) in cases {
        assert_eq!(compile::<Product>(&expr)?.operator, operator);
    }
    Ok(())
}

#[test]
fn test_unsupported_shapes() {
    let err = compile::<Product>(&constant(1).eq(member("Price"))).unwrap_err();
    assert!(matches!(err, CompileError::UnsupportedLeftOperand(_)));

    let err = compile::<Product>(&member("IsActive")).unwrap_err();
    assert!(matches!(err, CompileError::UnsupportedExpression(_)));

    let err = compile::<Product>(&member("Price").eq(member("Stock"))).unwrap_err();
    assert!(matches!(err, CompileError::UnsupportedExpression(_)));
}

#[test]
fn test_schema_errors() {
    let err = compile::<Product>(&member("Missing").eq(1)).unwrap_err();
    assert!(matches!(err, CompileError::Schema(SchemaError::UnknownMember { .. })));

    let err = compile::<Product>(&member("Describe").eq(1)).unwrap_err();
    assert!(matches!(err, CompileError::Schema(SchemaError::NotAccessible { .. })));
}

#[test]
fn test_nested_paths() -> Result<(), CompileError> {
    let filter = compile::<Product>(&member("Items.Count").gt(2))?;
    assert_eq!(filter.property_name, "Items.Count");
    assert_eq!(filter.value, FilterValue::Int(2));
    Ok(())
}

#[test]
fn test_textual_predicates() -> Result<(), CompileError> {
    let predicate = Predicate::<Product>::parse("o => o.IsActive == true && (o.Id == '123' || o.Name == \"456\")")?;
    let filter = predicate.compile()?;
    assert_eq!(filter.property_name, "IsActive");
    assert_eq!(filter.connectors[0].filter.property_name, "Id");
    assert_eq!(filter.connectors[0].filter.connectors[0].filter.property_name, "Name");

    let filter = Predicate::<Product>::parse("Price >= 10.5 && Items.Category != null")?.compile()?;
    assert_eq!(filter.value, FilterValue::Double(10.5));
    assert_eq!(filter.connectors[0].filter.operator, FilterOperator::Ne);

    assert!(Predicate::<Product>::parse("Nope == 1")?.compile().is_err());
    Ok(())
}

//! OData `$filter` rendering.

use crate::error::SchemaError;
use crate::filter::{FilterNode, FilterValue};
use crate::schema::{ModelSchema, ValueKind};

/// Render top-level filters joined with `and`, each parenthesized.
///
/// Returns `None` when no filter renders to a condition.
pub fn render_filters(schema: &ModelSchema, filters: &[FilterNode]) -> Result<Option<String>, SchemaError> {
    let mut parts = Vec::with_capacity(filters.len());
    for filter in filters {
        let condition = render_condition(schema, filter)?;
        if !condition.is_empty() {
            parts.push(format!("({condition})"));
        }
    }

    Ok((!parts.is_empty()).then(|| parts.join(" and ")))
}

/// Render a node and its connector chain.
///
/// A connector whose filter has connectors of its own is parenthesized.
pub fn render_condition(schema: &ModelSchema, node: &FilterNode) -> Result<String, SchemaError> {
    let mut query = render_one(schema, node)?;

    for connector in &node.connectors {
        if !query.is_empty() {
            query.push(' ');
            query.push_str(connector.logic.as_str());
            query.push(' ');
        }

        let inner = render_condition(schema, &connector.filter)?;
        if connector.filter.connectors.is_empty() {
            query.push_str(&inner);
        } else {
            query.push('(');
            query.push_str(&inner);
            query.push(')');
        }
    }

    Ok(query)
}

fn render_one(schema: &ModelSchema, node: &FilterNode) -> Result<String, SchemaError> {
    if node.property_name.is_empty() {
        return Ok(String::new());
    }

    let kind = schema.resolve_value_kind(&node.property_name)?;
    Ok(format!(
        "{} {} {}",
        node.property_name.replace('.', "/"),
        node.operator.as_str(),
        render_value(kind, &node.value)
    ))
}

/// Render a literal for a property of the given kind.
pub fn render_value(kind: ValueKind, value: &FilterValue) -> String {
    if value.is_null() {
        return "null".to_string();
    }

    match kind {
        ValueKind::String | ValueKind::Char => format!("'{}'", value.to_string().replace('\'', "''")),
        ValueKind::Bool => value.to_string().to_lowercase(),
        ValueKind::DateTime => match value {
            FilterValue::DateTime(dt) => format_datetime(dt),
            FilterValue::String(s) => chrono::DateTime::parse_from_rfc3339(s)
                .map(|dt| format_datetime(&dt.with_timezone(&chrono::Utc)))
                .unwrap_or_else(|_| s.clone()),
            other => other.to_string(),
        },
        ValueKind::Int | ValueKind::Long | ValueKind::Double => value.to_string(),
    }
}

fn format_datetime(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterOperator;
    use crate::schema::{MemberDescriptor, TypeDescriptor};
    use chrono::{TimeZone, Utc};

    fn schema() -> ModelSchema {
        ModelSchema::builder("Product")
            .member(MemberDescriptor::property("Name", TypeDescriptor::string()))
            .member(MemberDescriptor::property("Price", TypeDescriptor::double()))
            .member(MemberDescriptor::property("IsActive", TypeDescriptor::bool()))
            .member(MemberDescriptor::property("Created", TypeDescriptor::datetime()))
            .member(MemberDescriptor::property("Grade", TypeDescriptor::char()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_render_values_by_kind() {
        let schema = schema();
        let render = |node: FilterNode| render_condition(&schema, &node).unwrap();

        assert_eq!(render(FilterNode::new("Price", FilterOperator::Gt, 10.0)), "Price gt 10");
        assert_eq!(render(FilterNode::new("Name", FilterOperator::Eq, "O'Brien")), "Name eq 'O''Brien'");
        assert_eq!(render(FilterNode::new("Name", FilterOperator::Ne, FilterValue::Null)), "Name ne null");
        assert_eq!(render(FilterNode::new("IsActive", FilterOperator::Eq, true)), "IsActive eq true");
        assert_eq!(render(FilterNode::new("Grade", FilterOperator::Eq, 'A')), "Grade eq 'A'");

        let created = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            render(FilterNode::new("Created", FilterOperator::Ge, created)),
            "Created ge 2020-01-02T03:04:05.000Z"
        );
    }

    #[test]
    fn test_render_connectors() {
        let schema = schema();
        let inner = FilterNode::new("Name", FilterOperator::Eq, "a").or_where("Name", FilterOperator::Eq, "b");
        let node = FilterNode::new("IsActive", FilterOperator::Eq, true).and(inner);

        assert_eq!(
            render_condition(&schema, &node).unwrap(),
            "IsActive eq true and (Name eq 'a' or Name eq 'b')"
        );
    }

    #[test]
    fn test_render_filters_skips_empty() {
        let schema = schema();
        let filters = vec![
            FilterNode::tagged("placeholder"),
            FilterNode::new("Price", FilterOperator::Le, 5),
            FilterNode::new("IsActive", FilterOperator::Eq, false),
        ];
        assert_eq!(
            render_filters(&schema, &filters).unwrap().as_deref(),
            Some("(Price le 5) and (IsActive eq false)")
        );
        assert_eq!(render_filters(&schema, &[]).unwrap(), None);
    }

    #[test]
    fn test_unknown_property_fails() {
        let schema = schema();
        let err = render_condition(&schema, &FilterNode::new("Nope", FilterOperator::Eq, 1)).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownMember { .. }));
    }
}

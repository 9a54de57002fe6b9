//! Lucene query-string rendering of filters.

use crate::error::SchemaError;
use crate::filter::{FilterNode, FilterOperator, FilterValue};
use crate::schema::{ModelSchema, ValueKind};

/// Query-string clauses for a request's top-level filters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterClauses {
    /// Conditions on root-level properties.
    pub root: Option<String>,
    /// Conditions per nested path, in first-seen order.
    pub nested: Vec<(String, String)>,
}

impl FilterClauses {
    /// Clause for a nested path.
    pub fn nested_clause(&self, path: &str) -> Option<&str> {
        self.nested.iter().find(|(p, _)| p == path).map(|(_, q)| q.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none() && self.nested.is_empty()
    }
}

/// Nested path of a dotted property: every segment but the last.
pub fn nested_path(property: &str) -> Option<&str> {
    property.rsplit_once('.').map(|(path, _)| path)
}

/// Split top-level filters into a root clause and one clause per nested path.
///
/// A filter belongs to the nested path of its first non-empty property. Each
/// clause AND-joins the parenthesized conditions of its filters.
pub fn group_filters(schema: &ModelSchema, filters: &[FilterNode]) -> Result<FilterClauses, SchemaError> {
    let mut root = Vec::new();
    let mut nested: Vec<(String, Vec<String>)> = Vec::new();

    for filter in filters {
        let condition = render_condition(schema, filter)?;
        if condition.is_empty() {
            continue;
        }
        let condition = format!("({condition})");

        let path = filter
            .walk()
            .into_iter()
            .find(|n| !n.is_empty())
            .and_then(|n| nested_path(&n.property_name));

        match path {
            None => root.push(condition),
            Some(path) => match nested.iter_mut().find(|(p, _)| p == path) {
                Some((_, conditions)) => conditions.push(condition),
                None => nested.push((path.to_string(), vec![condition])),
            },
        }
    }

    Ok(FilterClauses {
        root: (!root.is_empty()).then(|| root.join(" AND ")),
        nested: nested
            .into_iter()
            .map(|(path, conditions)| (path, conditions.join(" AND ")))
            .collect(),
    })
}

/// Render a node and its connector chain.
pub fn render_condition(schema: &ModelSchema, node: &FilterNode) -> Result<String, SchemaError> {
    let mut query = render_one(schema, node)?;

    for connector in &node.connectors {
        let grouped = !query.is_empty() && !connector.filter.connectors.is_empty();
        if !query.is_empty() {
            query.push(' ');
            query.push_str(&connector.logic.as_str().to_uppercase());
            query.push(' ');
        }

        let inner = render_condition(schema, &connector.filter)?;
        if grouped {
            query.push('(');
            query.push_str(&inner);
            query.push(')');
        } else {
            query.push_str(&inner);
        }
    }

    Ok(query)
}

fn render_one(schema: &ModelSchema, node: &FilterNode) -> Result<String, SchemaError> {
    if node.property_name.is_empty() {
        return Ok(String::new());
    }

    let field = node.property_name.as_str();
    let kind = schema.resolve_value_kind(field)?;

    let condition = match &node.value {
        FilterValue::Null => format!("({field}:null OR (!(_exists_:{field})))"),
        value if kind == ValueKind::DateTime => {
            let dt = datetime_text(value);
            match node.operator {
                FilterOperator::Eq | FilterOperator::Ne => format!("{field}:\"{dt}\""),
                FilterOperator::Gt => format!("{field}:{{{dt} TO *}}"),
                FilterOperator::Ge => format!("{field}:[{dt} TO *]"),
                FilterOperator::Lt => format!("{field}:{{* TO {dt}}}"),
                FilterOperator::Le => format!("{field}:[* TO {dt}]"),
            }
        }
        value => format!("{field}{}{}", operator_token(node.operator), render_value(kind, value)),
    };

    Ok(match node.operator {
        FilterOperator::Ne => format!("!({condition})"),
        _ => condition,
    })
}

fn operator_token(op: FilterOperator) -> &'static str {
    match op {
        FilterOperator::Eq | FilterOperator::Ne => ":",
        FilterOperator::Gt => ":>",
        FilterOperator::Ge => ":>=",
        FilterOperator::Lt => ":<",
        FilterOperator::Le => ":<=",
    }
}

/// Render a non-null literal for a property of the given kind.
pub fn render_value(kind: ValueKind, value: &FilterValue) -> String {
    if kind.is_textual() {
        quote(&value.to_string())
    } else {
        value.to_string().to_lowercase()
    }
}

fn datetime_text(value: &FilterValue) -> String {
    match value {
        FilterValue::DateTime(dt) => FilterValue::datetime_to_rfc3339(dt),
        other => other.to_string(),
    }
}

/// A Lucene phrase: the text in double quotes with `"` and `\` escaped.
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

//! Filter nodes and the connectors chaining them.

use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::error::FormatError;
use crate::filter::value::FilterValue;

/// Comparison applied between a property and a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterOperator {
    #[default]
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl FilterOperator {
    /// Wire token of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Ne => "ne",
            FilterOperator::Gt => "gt",
            FilterOperator::Ge => "ge",
            FilterOperator::Lt => "lt",
            FilterOperator::Le => "le",
        }
    }
}

impl FromStr for FilterOperator {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(FilterOperator::Eq),
            "ne" => Ok(FilterOperator::Ne),
            "gt" => Ok(FilterOperator::Gt),
            "ge" => Ok(FilterOperator::Ge),
            "lt" => Ok(FilterOperator::Lt),
            "le" => Ok(FilterOperator::Le),
            other => Err(FormatError::shape(format!("unknown filter operator '{other}'"))),
        }
    }
}

/// Logic joining a filter to its connected sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterLogic {
    And,
    Or,
}

impl FilterLogic {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterLogic::And => "and",
            FilterLogic::Or => "or",
        }
    }
}

impl FromStr for FilterLogic {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "and" => Ok(FilterLogic::And),
            "or" => Ok(FilterLogic::Or),
            other => Err(FormatError::shape(format!("unknown filter logic '{other}'"))),
        }
    }
}

/// A condition `property operator value`, chained to siblings through connectors.
///
/// A node with an empty `property_name` carries no condition and is skipped by
/// translators; it may still hold a tag and connectors.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterNode {
    /// Property path; dotted for nested properties.
    pub property_name: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
    /// Optional identity used to find the filter again.
    pub tag: Option<String>,
    /// Whether the filter should be shown to users.
    pub visible: bool,
    pub connectors: Vec<FilterConnector>,
}

/// Links a filter node to the next condition.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConnector {
    pub logic: FilterLogic,
    pub filter: FilterNode,
}

impl Default for FilterNode {
    fn default() -> Self {
        FilterNode {
            property_name: String::new(),
            operator: FilterOperator::Eq,
            value: FilterValue::Null,
            tag: None,
            visible: true,
            connectors: Vec::new(),
        }
    }
}

impl FilterNode {
    /// Create a condition.
    pub fn new<P: Into<String>, V: Into<FilterValue>>(
        property_name: P,
        operator: FilterOperator,
        value: V,
    ) -> Self {
        FilterNode {
            property_name: property_name.into(),
            operator,
            value: value.into(),
            ..Default::default()
        }
    }

    /// Create an empty filter carrying only a tag.
    pub fn tagged<S: Into<String>>(tag: S) -> Self {
        FilterNode {
            tag: Some(tag.into()),
            ..Default::default()
        }
    }

    /// Set the tag.
    pub fn with_tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set the visibility.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Whether the node holds no condition of its own.
    pub fn is_empty(&self) -> bool {
        self.property_name.is_empty()
    }

    /// Append a connector to `filter` with the given logic.
    pub fn connect(mut self, logic: FilterLogic, filter: FilterNode) -> Self {
        self.connectors.push(FilterConnector { logic, filter });
        self
    }

    /// Append `filter` with AND logic.
    pub fn and(self, filter: FilterNode) -> Self {
        self.connect(FilterLogic::And, filter)
    }

    /// Append `filter` with OR logic.
    pub fn or(self, filter: FilterNode) -> Self {
        self.connect(FilterLogic::Or, filter)
    }

    /// Append the condition `property operator value` with AND logic.
    pub fn and_where<P: Into<String>, V: Into<FilterValue>>(
        self,
        property_name: P,
        operator: FilterOperator,
        value: V,
    ) -> Self {
        self.and(FilterNode::new(property_name, operator, value))
    }

    /// Append the condition `property operator value` with OR logic.
    pub fn or_where<P: Into<String>, V: Into<FilterValue>>(
        self,
        property_name: P,
        operator: FilterOperator,
        value: V,
    ) -> Self {
        self.or(FilterNode::new(property_name, operator, value))
    }

    /// This node and every node reachable through its connectors, depth first.
    pub fn walk(&self) -> Vec<&FilterNode> {
        let mut nodes = vec![self];
        for connector in &self.connectors {
            nodes.extend(connector.filter.walk());
        }
        nodes
    }

    /// Convert the node into its wire JSON.
    pub fn to_wire(&self) -> Value {
        // WireNode only holds strings, scalars and vectors.
        serde_json::to_value(WireNode::from(self)).unwrap_or(Value::Null)
    }

    /// Decode a node from its wire JSON.
    pub fn from_wire(value: &Value) -> Result<Self, FormatError> {
        let object = value
            .as_object()
            .ok_or_else(|| FormatError::shape(format!("filter must be an object, found {value}")))?;

        let property_name = match object.get("p") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(p)) => p.clone(),
            Some(other) => return Err(FormatError::shape(format!("'p' must be a string, found {other}"))),
        };

        let operator = match object.get("o") {
            None | Some(Value::Null) => FilterOperator::default(),
            Some(Value::String(o)) => o.parse()?,
            Some(other) => return Err(FormatError::shape(format!("'o' must be a string, found {other}"))),
        };

        let value = match object.get("v") {
            None => FilterValue::Null,
            Some(v) => FilterValue::from_json(v)?,
        };

        let visible = match object.get("vi") {
            None | Some(Value::Null) => true,
            Some(Value::Bool(vi)) => *vi,
            Some(other) => return Err(FormatError::shape(format!("'vi' must be a bool, found {other}"))),
        };

        let tag = match object.get("t") {
            None | Some(Value::Null) => None,
            Some(Value::String(t)) => Some(t.clone()),
            Some(other) => return Err(FormatError::shape(format!("'t' must be a string, found {other}"))),
        };

        let connectors = match object.get("f") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(FilterConnector::from_wire)
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => return Err(FormatError::shape(format!("'f' must be an array, found {other}"))),
        };

        Ok(FilterNode {
            property_name,
            operator,
            value,
            tag,
            visible,
            connectors,
        })
    }
}

impl FilterConnector {
    pub fn new(logic: FilterLogic, filter: FilterNode) -> Self {
        FilterConnector { logic, filter }
    }

    fn from_wire(value: &Value) -> Result<Self, FormatError> {
        let logic = value
            .get("l")
            .and_then(Value::as_str)
            .ok_or_else(|| FormatError::shape(format!("connector needs a logic 'l', found {value}")))?
            .parse()?;
        let filter = value
            .get("f")
            .ok_or_else(|| FormatError::shape("connector needs a filter 'f'"))?;

        Ok(FilterConnector {
            logic,
            filter: FilterNode::from_wire(filter)?,
        })
    }
}

#[derive(Serialize)]
struct WireNode<'a> {
    p: &'a str,
    o: &'static str,
    v: &'a FilterValue,
    vi: bool,
    t: Option<&'a str>,
    f: Vec<WireConnector<'a>>,
}

#[derive(Serialize)]
struct WireConnector<'a> {
    l: &'static str,
    f: WireNode<'a>,
}

impl<'a> From<&'a FilterNode> for WireNode<'a> {
    fn from(node: &'a FilterNode) -> Self {
        WireNode {
            p: &node.property_name,
            o: node.operator.as_str(),
            v: &node.value,
            vi: node.visible,
            t: node.tag.as_deref(),
            f: node
                .connectors
                .iter()
                .map(|c| WireConnector {
                    l: c.logic.as_str(),
                    f: WireNode::from(&c.filter),
                })
                .collect(),
        }
    }
}

/// Serialize a list of filters into their compact wire JSON.
pub(crate) fn filters_to_json(filters: &[FilterNode]) -> Result<String, serde_json::Error> {
    let wire: Vec<WireNode<'_>> = filters.iter().map(WireNode::from).collect();
    serde_json::to_string(&wire)
}

/// Parse a list of filters from their wire JSON.
pub(crate) fn filters_from_json(json: &str) -> Result<Vec<FilterNode>, FormatError> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Array(items) => items.iter().map(FilterNode::from_wire).collect(),
        other => Err(FormatError::shape(format!("expected a filter list, found {other}"))),
    }
}

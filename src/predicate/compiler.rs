//! Lowering of predicate expressions into filter nodes.

use chrono::{DateTime, Utc};
use log::debug;

use crate::error::CompileError;
use crate::filter::{FilterConnector, FilterNode, FilterValue};
use crate::predicate::expr::{ConvertTarget, Expr};
use crate::schema::{ModelSchema, ValueKind};

/// Compile a predicate expression against a model schema.
///
/// Comparisons become filter nodes; `&&`/`||` attach the right side as a
/// connector of the left side's head node.
pub fn compile_expr(schema: &ModelSchema, expr: &Expr) -> Result<FilterNode, CompileError> {
    let node = compile_node(schema, expr)?;
    debug!("compiled predicate on '{}' into {} node(s)", schema.name(), node.walk().len());
    Ok(node)
}

fn compile_node(schema: &ModelSchema, expr: &Expr) -> Result<FilterNode, CompileError> {
    match expr {
        Expr::Compare { op, left, right } => {
            let path = member_path(left)?;
            schema.resolve_value_kind(path)?;
            let value = evaluate(right)?;
            Ok(FilterNode::new(path, (*op).into(), value))
        }
        Expr::Logical { logic, left, right } => {
            let mut head = compile_node(schema, left)?;
            let tail = compile_node(schema, right)?;
            head.connectors.push(FilterConnector::new(*logic, tail));
            Ok(head)
        }
        other => Err(CompileError::unsupported(format!(
            "{} cannot be used as a condition",
            other.describe()
        ))),
    }
}

/// Member path of a comparison's left operand, looking through conversions.
fn member_path(expr: &Expr) -> Result<&str, CompileError> {
    match expr {
        Expr::Member(path) => Ok(path),
        Expr::Convert { operand, .. } => member_path(operand),
        other => Err(CompileError::UnsupportedLeftOperand(other.describe())),
    }
}

/// Evaluate a value operand to a literal.
fn evaluate(expr: &Expr) -> Result<FilterValue, CompileError> {
    match expr {
        Expr::Constant(value) => Ok(value.clone()),
        Expr::Convert { operand, target } => coerce(evaluate(operand)?, *target),
        Expr::Call(call) => {
            let mut args = Vec::with_capacity(call.args.len() + 1);
            if let Some(receiver) = &call.receiver {
                args.push(evaluate(receiver)?);
            }
            for arg in &call.args {
                args.push(evaluate(arg)?);
            }
            (call.func)(&args).map_err(|source| CompileError::MethodFailed {
                method: call.name.clone(),
                source,
            })
        }
        other => Err(CompileError::unsupported(format!(
            "{} cannot be used as a value",
            other.describe()
        ))),
    }
}

/// Coerce a value to a conversion target.
///
/// A nullable target coerces to its inner kind and lets `null` through.
pub fn coerce(value: FilterValue, target: ConvertTarget) -> Result<FilterValue, CompileError> {
    if value.is_null() {
        return if target.nullable || target.kind == ValueKind::String {
            Ok(FilterValue::Null)
        } else {
            Err(invalid(&value, target.kind))
        };
    }

    let converted = match target.kind {
        ValueKind::Int => to_integer(&value).filter(|v| i32::try_from(*v).is_ok()).map(FilterValue::Int),
        ValueKind::Long => to_integer(&value).map(FilterValue::Int),
        ValueKind::Double => match &value {
            FilterValue::Int(v) => Some(FilterValue::Double(*v as f64)),
            FilterValue::Double(v) => Some(FilterValue::Double(*v)),
            FilterValue::Bool(b) => Some(FilterValue::Double(if *b { 1.0 } else { 0.0 })),
            FilterValue::String(s) => s.trim().parse().ok().map(FilterValue::Double),
            _ => None,
        },
        ValueKind::Bool => match &value {
            FilterValue::Bool(b) => Some(FilterValue::Bool(*b)),
            FilterValue::Int(v) => Some(FilterValue::Bool(*v != 0)),
            FilterValue::Double(v) => Some(FilterValue::Bool(*v != 0.0)),
            FilterValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(FilterValue::Bool(true)),
                "false" => Some(FilterValue::Bool(false)),
                _ => None,
            },
            _ => None,
        },
        ValueKind::String => Some(FilterValue::String(value.to_string())),
        ValueKind::DateTime => match &value {
            FilterValue::DateTime(dt) => Some(FilterValue::DateTime(*dt)),
            FilterValue::String(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| FilterValue::DateTime(dt.with_timezone(&Utc))),
            _ => None,
        },
        ValueKind::Char => match &value {
            FilterValue::Char(c) => Some(FilterValue::Char(*c)),
            FilterValue::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(FilterValue::Char(c)),
                    _ => None,
                }
            }
            FilterValue::Int(v) => u32::try_from(*v)
                .ok()
                .and_then(char::from_u32)
                .map(FilterValue::Char),
            _ => None,
        },
    };

    converted.ok_or_else(|| invalid(&value, target.kind))
}

fn to_integer(value: &FilterValue) -> Option<i64> {
    match value {
        FilterValue::Int(v) => Some(*v),
        // Rounds half to even, like a checked numeric cast.
        FilterValue::Double(v) if v.is_finite() => {
            let rounded = v.round_ties_even();
            (rounded >= i64::MIN as f64 && rounded <= i64::MAX as f64).then_some(rounded as i64)
        }
        FilterValue::Bool(b) => Some(i64::from(*b)),
        FilterValue::String(s) => s.trim().parse().ok(),
        FilterValue::Char(c) => Some(u32::from(*c) as i64),
        _ => None,
    }
}

fn invalid(value: &FilterValue, kind: ValueKind) -> CompileError {
    CompileError::InvalidConversion {
        value: format!("{} {}", value.type_name(), value),
        target: kind.to_string(),
    }
}

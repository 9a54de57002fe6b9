//! Expression tree for typed predicates.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::filter::{FilterLogic, FilterOperator, FilterValue};
use crate::schema::ValueKind;

/// Function backing a method call node.
///
/// Instance methods receive the evaluated receiver as their first argument.
pub type MethodFn = Arc<dyn Fn(&[FilterValue]) -> anyhow::Result<FilterValue> + Send + Sync>;

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }
}

impl From<CompareOp> for FilterOperator {
    fn from(op: CompareOp) -> Self {
        match op {
            CompareOp::Eq => FilterOperator::Eq,
            CompareOp::Ne => FilterOperator::Ne,
            CompareOp::Gt => FilterOperator::Gt,
            CompareOp::Ge => FilterOperator::Ge,
            CompareOp::Lt => FilterOperator::Lt,
            CompareOp::Le => FilterOperator::Le,
        }
    }
}

/// Target type of a conversion node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertTarget {
    pub kind: ValueKind,
    /// The target is an optional wrapper around `kind`.
    pub nullable: bool,
}

/// A method invocation whose result becomes a literal.
#[derive(Clone)]
pub struct MethodCall {
    pub name: String,
    pub receiver: Option<Box<Expr>>,
    pub args: Vec<Expr>,
    pub func: MethodFn,
}

impl std::fmt::Debug for MethodCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodCall")
            .field("name", &self.name)
            .field("receiver", &self.receiver)
            .field("args", &self.args)
            .field("func", &"<fn>")
            .finish()
    }
}

/// A node of a predicate expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Access to a (possibly dotted) model member.
    Member(String),
    Constant(FilterValue),
    Convert {
        operand: Box<Expr>,
        target: ConvertTarget,
    },
    Call(MethodCall),
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        logic: FilterLogic,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// Access a model member by its dotted path.
pub fn member<S: Into<String>>(path: S) -> Expr {
    Expr::Member(path.into())
}

/// A literal value.
pub fn constant<V: Into<FilterValue>>(value: V) -> Expr {
    Expr::Constant(value.into())
}

/// Call a free function with the given arguments.
pub fn static_call<S, F>(name: S, args: Vec<Expr>, func: F) -> Expr
where
    S: Into<String>,
    F: Fn(&[FilterValue]) -> anyhow::Result<FilterValue> + Send + Sync + 'static,
{
    Expr::Call(MethodCall {
        name: name.into(),
        receiver: None,
        args,
        func: Arc::new(func),
    })
}

/// Values usable as the right operand of a comparison.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

macro_rules! literal_into_expr {
    ($($ty:ty),*) => {
        $(
            impl IntoExpr for $ty {
                fn into_expr(self) -> Expr {
                    Expr::Constant(self.into())
                }
            }
        )*
    };
}

literal_into_expr!(FilterValue, bool, i32, i64, u32, f64, &str, String, char, DateTime<Utc>);

impl<T: Into<FilterValue>> IntoExpr for Option<T> {
    fn into_expr(self) -> Expr {
        Expr::Constant(self.into())
    }
}

impl Expr {
    fn compare<R: IntoExpr>(self, op: CompareOp, right: R) -> Expr {
        Expr::Compare {
            op,
            left: Box::new(self),
            right: Box::new(right.into_expr()),
        }
    }

    pub fn eq<R: IntoExpr>(self, right: R) -> Expr {
        self.compare(CompareOp::Eq, right)
    }

    pub fn ne<R: IntoExpr>(self, right: R) -> Expr {
        self.compare(CompareOp::Ne, right)
    }

    pub fn gt<R: IntoExpr>(self, right: R) -> Expr {
        self.compare(CompareOp::Gt, right)
    }

    pub fn ge<R: IntoExpr>(self, right: R) -> Expr {
        self.compare(CompareOp::Ge, right)
    }

    pub fn lt<R: IntoExpr>(self, right: R) -> Expr {
        self.compare(CompareOp::Lt, right)
    }

    pub fn le<R: IntoExpr>(self, right: R) -> Expr {
        self.compare(CompareOp::Le, right)
    }

    /// Join with `right` using `&&`.
    pub fn and(self, right: Expr) -> Expr {
        Expr::Logical {
            logic: FilterLogic::And,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    /// Join with `right` using `||`.
    pub fn or(self, right: Expr) -> Expr {
        Expr::Logical {
            logic: FilterLogic::Or,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    /// Convert to `kind`.
    pub fn convert(self, kind: ValueKind) -> Expr {
        Expr::Convert {
            operand: Box::new(self),
            target: ConvertTarget {
                kind,
                nullable: false,
            },
        }
    }

    /// Convert to an optional `kind`.
    pub fn convert_nullable(self, kind: ValueKind) -> Expr {
        Expr::Convert {
            operand: Box::new(self),
            target: ConvertTarget {
                kind,
                nullable: true,
            },
        }
    }

    /// Call a method on this expression's value.
    pub fn method_call<S, F>(self, name: S, args: Vec<Expr>, func: F) -> Expr
    where
        S: Into<String>,
        F: Fn(&[FilterValue]) -> anyhow::Result<FilterValue> + Send + Sync + 'static,
    {
        Expr::Call(MethodCall {
            name: name.into(),
            receiver: Some(Box::new(self)),
            args,
            func: Arc::new(func),
        })
    }

    /// Short description of the node, for error messages.
    pub fn describe(&self) -> String {
        match self {
            Expr::Member(path) => format!("member '{path}'"),
            Expr::Constant(value) => format!("constant {value}"),
            Expr::Convert { target, .. } => format!("conversion to {}", target.kind),
            Expr::Call(call) => format!("call to '{}'", call.name),
            Expr::Compare { op, .. } => format!("comparison '{}'", op.symbol()),
            Expr::Logical { logic, .. } => format!("logical '{}'", logic.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_shapes() {
        let expr = member("Price").gt(10).and(member("Name").eq("x"));
        match expr {
            Expr::Logical { logic, left, right } => {
                assert_eq!(logic, FilterLogic::And);
                assert!(matches!(*left, Expr::Compare { op: CompareOp::Gt, .. }));
                assert!(matches!(*right, Expr::Compare { op: CompareOp::Eq, .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_describe() {
        assert_eq!(member("A").describe(), "member 'A'");
        assert_eq!(constant(3).convert(ValueKind::Long).describe(), "conversion to long");
        assert_eq!(member("A").le(1).describe(), "comparison '<='");

        let call = static_call("Now", vec![], |_| Ok(FilterValue::Null));
        assert_eq!(call.describe(), "call to 'Now'");
        assert!(format!("{call:?}").contains("<fn>"));
    }
}

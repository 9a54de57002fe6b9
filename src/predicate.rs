//! Typed predicates compiled into filters.
//!
//! A predicate is a small expression tree over a model's members, built with
//! the [`member`] builder or parsed from text with [`parse_predicate`], and
//! lowered into a [`FilterNode`] by [`compile`].
//!
//! ```
//! # use lazy_static::lazy_static;
//! # use querybridge::schema::*;
//! use querybridge::filter::{FilterLogic, FilterValue};
//! use querybridge::predicate::{compile, member};
//!
//! # struct Product;
//! # lazy_static! {
//! #     static ref SCHEMA: ModelSchema = ModelSchema::builder("Product")
//! #         .member(MemberDescriptor::property("Id", TypeDescriptor::string()))
//! #         .member(MemberDescriptor::property("IsActive", TypeDescriptor::bool()))
//! #         .build()
//! #         .unwrap();
//! # }
//! # impl SearchableModel for Product {
//! #     fn schema() -> &'static ModelSchema { &SCHEMA }
//! # }
//! let filter = compile::<Product>(&member("IsActive").eq(true).and(member("Id").eq("123")))?;
//!
//! assert_eq!(filter.property_name, "IsActive");
//! assert_eq!(filter.value, FilterValue::Bool(true));
//! assert_eq!(filter.connectors[0].logic, FilterLogic::And);
//! assert_eq!(filter.connectors[0].filter.property_name, "Id");
//! # Ok::<(), querybridge::error::CompileError>(())
//! ```

pub mod compiler;
pub mod expr;
pub mod parser;

use std::marker::PhantomData;

pub use compiler::{coerce, compile_expr};
pub use expr::{CompareOp, ConvertTarget, Expr, IntoExpr, MethodCall, MethodFn, constant, member, static_call};
pub use parser::parse_predicate;

use crate::error::CompileError;
use crate::filter::FilterNode;
use crate::schema::SearchableModel;

/// Compile a predicate over model `T` into a filter.
pub fn compile<T: SearchableModel>(expr: &Expr) -> Result<FilterNode, CompileError> {
    compile_expr(T::schema(), expr)
}

/// A predicate bound to the model type it filters.
pub struct Predicate<T> {
    expr: Expr,
    _model: PhantomData<fn() -> T>,
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Predicate {
            expr: self.expr.clone(),
            _model: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predicate").field("expr", &self.expr).finish()
    }
}

impl<T: SearchableModel> Predicate<T> {
    /// Wrap an expression.
    pub fn new(expr: Expr) -> Self {
        Predicate {
            expr,
            _model: PhantomData,
        }
    }

    /// Parse a textual predicate.
    pub fn parse(text: &str) -> Result<Self, CompileError> {
        parse_predicate(text).map(Self::new)
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Compile into a filter node.
    pub fn compile(&self) -> Result<FilterNode, CompileError> {
        compile::<T>(&self.expr)
    }
}

impl<T: SearchableModel> From<Expr> for Predicate<T> {
    fn from(expr: Expr) -> Self {
        Predicate::new(expr)
    }
}

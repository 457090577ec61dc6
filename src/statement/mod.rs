//! Statement capabilities consumed by the routing decisions.
//!
//! The judgement engine and the decorators only see these narrow traits, so
//! any parser front-end (or a hand-built fake) can drive them.
//! `SqlStatementContext` is the implementation backed by `sqlparser`.

pub mod context;

pub use context::SqlStatementContext;

use crate::core::{Result, RouteError, Value};
use crate::parser::ast::Expr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Insert,
    Select,
    Update,
    Delete,
    Ddl,
    /// Statements with no dedicated handling; routed like writes.
    Other,
}

impl StatementKind {
    /// Only plain queries may be served by a slave.
    pub fn is_query(self) -> bool {
        matches!(self, Self::Select)
    }

    /// Kinds that can carry a WHERE clause.
    pub fn is_where_segment_available(self) -> bool {
        matches!(self, Self::Select | Self::Update | Self::Delete)
    }
}

/// Parsed statement as seen by routing.
pub trait StatementContext: Send + Sync {
    fn kind(&self) -> StatementKind;

    /// True for a locking read (`SELECT ... FOR UPDATE` and friends).
    fn has_lock(&self) -> bool {
        false
    }

    /// INSERT view; `Some` only when `kind()` is `Insert`.
    fn as_insert(&self) -> Option<&dyn InsertStatementContext> {
        None
    }

    /// WHERE predicate, if the statement has one.
    fn where_segment(&self) -> Option<&Expr> {
        None
    }
}

pub trait InsertStatementContext {
    /// Column names in declaration order.
    fn column_names(&self) -> &[String];

    /// Column names, last declared first.
    fn descending_column_names(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.column_names().iter().rev().map(String::as_str))
    }

    /// One entry per inserted row.
    fn insert_value_contexts(&self) -> &[InsertValueContext];
}

/// Values of one inserted row, with the statement's bound parameters.
#[derive(Debug, Clone)]
pub struct InsertValueContext {
    value_expressions: Vec<Expr>,
    parameters: Arc<Vec<Value>>,
}

impl InsertValueContext {
    pub fn new(value_expressions: Vec<Expr>, parameters: Arc<Vec<Value>>) -> Self {
        Self {
            value_expressions,
            parameters,
        }
    }

    /// Row made only of literals.
    pub fn from_values(values: Vec<Value>) -> Self {
        Self::new(
            values.into_iter().map(Expr::Literal).collect(),
            Arc::new(Vec::new()),
        )
    }

    /// Literal or bound value at `index`.
    ///
    /// Expressions that are neither (function calls, arithmetic) have no
    /// value at routing time and are reported as `TypeMismatch`.
    pub fn value(&self, index: usize) -> Result<Value> {
        let expr = self.value_expressions.get(index).ok_or_else(|| {
            RouteError::TypeMismatch(format!(
                "Row has {} values, no value at column index {}",
                self.value_expressions.len(),
                index
            ))
        })?;
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Parameter(parameter_index) => self
                .parameters
                .get(*parameter_index)
                .cloned()
                .ok_or(RouteError::ParameterNotFound(*parameter_index)),
            other => Err(RouteError::TypeMismatch(format!(
                "Expression '{}' is not a literal or parameter",
                other
            ))),
        }
    }
}

// ============================================================================
// src/parser/adapter.rs - sqlparser AST -> routing AST
// ============================================================================

use sqlparser::ast::{self as sql_ast, visit_expressions_mut};
use sqlparser::dialect::{MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;
use crate::core::{Result, RouteError, Value};
use crate::parser::ast::*;
use std::ops::ControlFlow;

/// SQL dialect accepted by the adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SqlDialect {
    #[default]
    PostgreSql,
    MySql,
}

#[derive(Debug, Default)]
pub struct SqlParserAdapter {
    dialect: SqlDialect,
}

impl SqlParserAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialect(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    pub fn parse(&self, sql: &str) -> Result<Vec<Statement>> {
        let external_stmts = match self.dialect {
            SqlDialect::PostgreSql => Parser::parse_sql(&PostgreSqlDialect {}, sql),
            SqlDialect::MySql => Parser::parse_sql(&MySqlDialect {}, sql),
        }
        .map_err(|e| RouteError::ParseError(e.to_string()))?;

        external_stmts
            .into_iter()
            .map(|mut stmt| {
                number_anonymous_placeholders(&mut stmt);
                self.convert_statement(stmt)
            })
            .collect()
    }

    /// Parses exactly one statement.
    pub fn parse_one(&self, sql: &str) -> Result<Statement> {
        let mut statements = self.parse(sql)?;
        if statements.len() != 1 {
            return Err(RouteError::UnsupportedOperation(format!(
                "Expected a single statement, got {}",
                statements.len()
            )));
        }
        Ok(statements.remove(0))
    }

    fn convert_statement(&self, stmt: sql_ast::Statement) -> Result<Statement> {
        match stmt {
            sql_ast::Statement::Insert(insert) => Ok(Statement::Insert(self.convert_insert(insert)?)),
            sql_ast::Statement::Query(query) => Ok(Statement::Query(self.convert_query(*query)?)),
            sql_ast::Statement::Update { selection, .. } => Ok(Statement::Update(UpdateStmt {
                selection: self.convert_selection(selection)?,
            })),
            sql_ast::Statement::Delete(delete) => Ok(Statement::Delete(DeleteStmt {
                selection: self.convert_selection(delete.selection)?,
            })),
            sql_ast::Statement::CreateTable(_)
            | sql_ast::Statement::CreateIndex(_)
            | sql_ast::Statement::AlterTable { .. }
            | sql_ast::Statement::Drop { .. } => Ok(Statement::Ddl),
            _ => Ok(Statement::Other),
        }
    }

    fn convert_insert(&self, insert: sql_ast::Insert) -> Result<InsertStmt> {
        let columns = insert.columns.into_iter().map(|id| id.value).collect();

        let values = match insert.source {
            Some(source) => match *source.body {
                sql_ast::SetExpr::Values(vals) => vals
                    .rows
                    .into_iter()
                    .map(|row| {
                        row.into_iter()
                            .map(|expr| self.convert_expr(expr))
                            .collect::<Result<Vec<_>>>()
                    })
                    .collect::<Result<Vec<_>>>()?,
                // INSERT ... SELECT carries no literal rows to inspect
                _ => Vec::new(),
            },
            None => Vec::new(),
        };

        Ok(InsertStmt { columns, values })
    }

    fn convert_query(&self, query: sql_ast::Query) -> Result<QueryStmt> {
        let locking = !query.locks.is_empty();
        let selection = match *query.body {
            sql_ast::SetExpr::Select(select) => self.convert_selection(select.selection)?,
            _ => None,
        };
        Ok(QueryStmt { selection, locking })
    }

    fn convert_selection(&self, selection: Option<sql_ast::Expr>) -> Result<Option<Expr>> {
        selection.map(|expr| self.convert_expr(expr)).transpose()
    }

    fn convert_expr(&self, expr: sql_ast::Expr) -> Result<Expr> {
        match expr {
            sql_ast::Expr::Identifier(ident) => Ok(Expr::Column(ident.value)),
            sql_ast::Expr::CompoundIdentifier(idents) => Ok(Expr::CompoundIdentifier(
                idents.into_iter().map(|i| i.value).collect(),
            )),
            sql_ast::Expr::Value(val) => convert_value(&val.value),
            sql_ast::Expr::Nested(inner) => self.convert_expr(*inner),
            sql_ast::Expr::BinaryOp { left, op, right } => Ok(Expr::BinaryOp {
                left: Box::new(self.convert_expr(*left)?),
                op: convert_binary_op(&op),
                right: Box::new(self.convert_expr(*right)?),
            }),
            sql_ast::Expr::UnaryOp { op: sql_ast::UnaryOperator::Minus, expr } => {
                match self.convert_expr(*expr)? {
                    Expr::Literal(Value::Integer(i)) => Ok(Expr::Literal(Value::Integer(-i))),
                    Expr::Literal(Value::Float(f)) => Ok(Expr::Literal(Value::Float(-f))),
                    other => Ok(Expr::Opaque(format!("-{}", other))),
                }
            }
            other => Ok(Expr::Opaque(other.to_string())),
        }
    }
}

/// Rewrites every `?` to `$n`, numbered in source order.
///
/// Runs over the whole statement, so a `?` inside a function call, a CAST
/// or a SET assignment still takes its slot even though the converted
/// statement never looks inside those.
fn number_anonymous_placeholders(stmt: &mut sql_ast::Statement) {
    let mut position = 0usize;
    let _ = visit_expressions_mut(stmt, |expr| {
        if let sql_ast::Expr::Value(val) = expr {
            if let sql_ast::Value::Placeholder(marker) = &mut val.value {
                if marker.as_str() == "?" {
                    position += 1;
                    *marker = format!("${}", position);
                }
            }
        }
        ControlFlow::<()>::Continue(())
    });
}

fn convert_value(val: &sql_ast::Value) -> Result<Expr> {
    let value = match val {
        sql_ast::Value::Number(n, _) => {
            if let Ok(i) = n.parse::<i64>() {
                Value::Integer(i)
            } else if let Ok(f) = n.parse::<f64>() {
                Value::Float(f)
            } else {
                return Err(RouteError::TypeMismatch(format!("Invalid number: {}", n)));
            }
        }
        sql_ast::Value::SingleQuotedString(s) | sql_ast::Value::DoubleQuotedString(s) => {
            Value::Text(s.clone())
        }
        sql_ast::Value::Boolean(b) => Value::Boolean(*b),
        sql_ast::Value::Null => Value::Null,
        sql_ast::Value::Placeholder(marker) => return Ok(Expr::Parameter(parameter_index(marker)?)),
        other => return Ok(Expr::Opaque(other.to_string())),
    };
    Ok(Expr::Literal(value))
}

/// Zero-based index of a `$n` placeholder.
fn parameter_index(marker: &str) -> Result<usize> {
    let position = marker
        .strip_prefix('$')
        .and_then(|position| position.parse::<usize>().ok())
        .ok_or_else(|| RouteError::ParseError(format!("Unsupported placeholder: {}", marker)))?;
    if position == 0 {
        return Err(RouteError::ParseError("Placeholder $0 is not valid".into()));
    }
    Ok(position - 1)
}

fn convert_binary_op(op: &sql_ast::BinaryOperator) -> BinaryOp {
    use sql_ast::BinaryOperator as SqlOp;

    match op {
        SqlOp::Eq => BinaryOp::Eq,
        SqlOp::NotEq => BinaryOp::NotEq,
        SqlOp::Lt => BinaryOp::Lt,
        SqlOp::LtEq => BinaryOp::LtEq,
        SqlOp::Gt => BinaryOp::Gt,
        SqlOp::GtEq => BinaryOp::GtEq,
        SqlOp::And => BinaryOp::And,
        SqlOp::Or => BinaryOp::Or,
        _ => BinaryOp::Other,
    }
}

// ============================================================================
// TESTS
// ============================================================================

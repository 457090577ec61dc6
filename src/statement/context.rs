use super::{InsertStatementContext, InsertValueContext, StatementContext, StatementKind};
use crate::core::{Result, Value};
use crate::parser::ast::{Expr, Statement};
use crate::parser::{SqlDialect, SqlParserAdapter};
use std::sync::Arc;

/// Statement context built from SQL text and its bound parameters.
#[derive(Debug, Clone)]
pub struct SqlStatementContext {
    statement: Statement,
    insert: Option<SqlInsertContext>,
}

#[derive(Debug, Clone)]
struct SqlInsertContext {
    column_names: Vec<String>,
    rows: Vec<InsertValueContext>,
}

impl SqlStatementContext {
    pub fn new(statement: Statement, parameters: Vec<Value>) -> Self {
        let parameters = Arc::new(parameters);
        let insert = match &statement {
            Statement::Insert(insert) => Some(SqlInsertContext {
                column_names: insert.columns.clone(),
                rows: insert
                    .values
                    .iter()
                    .map(|row| InsertValueContext::new(row.clone(), Arc::clone(&parameters)))
                    .collect(),
            }),
            _ => None,
        };
        Self { statement, insert }
    }

    /// Parses one PostgreSQL statement.
    pub fn from_sql(sql: &str, parameters: Vec<Value>) -> Result<Self> {
        Self::from_sql_with_dialect(sql, SqlDialect::PostgreSql, parameters)
    }

    pub fn from_sql_with_dialect(
        sql: &str,
        dialect: SqlDialect,
        parameters: Vec<Value>,
    ) -> Result<Self> {
        let statement = SqlParserAdapter::with_dialect(dialect).parse_one(sql)?;
        Ok(Self::new(statement, parameters))
    }
}

impl StatementContext for SqlStatementContext {
    fn kind(&self) -> StatementKind {
        match &self.statement {
            Statement::Insert(_) => StatementKind::Insert,
            Statement::Query(_) => StatementKind::Select,
            Statement::Update(_) => StatementKind::Update,
            Statement::Delete(_) => StatementKind::Delete,
            Statement::Ddl => StatementKind::Ddl,
            Statement::Other => StatementKind::Other,
        }
    }

    fn has_lock(&self) -> bool {
        matches!(&self.statement, Statement::Query(query) if query.locking)
    }

    fn as_insert(&self) -> Option<&dyn InsertStatementContext> {
        self.insert
            .as_ref()
            .map(|insert| insert as &dyn InsertStatementContext)
    }

    fn where_segment(&self) -> Option<&Expr> {
        match &self.statement {
            Statement::Query(query) => query.selection.as_ref(),
            Statement::Update(update) => update.selection.as_ref(),
            Statement::Delete(delete) => delete.selection.as_ref(),
            _ => None,
        }
    }
}

impl InsertStatementContext for SqlInsertContext {
    fn column_names(&self) -> &[String] {
        &self.column_names
    }

    fn insert_value_contexts(&self) -> &[InsertValueContext] {
        &self.rows
    }
}

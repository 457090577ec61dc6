use super::condition::{ShadowConditionEngine, ShadowConditionProvider};
use crate::core::Result;
use crate::rule::ShadowRule;
use crate::statement::{InsertStatementContext, InsertValueContext, StatementContext, StatementKind};
use log::debug;

/// Decides whether a statement is shadow traffic.
pub trait ShadowJudgementEngine {
    fn is_shadow_sql(&self, statement: &dyn StatementContext) -> Result<bool>;
}

/// Judges INSERTs by the shadow column's value in each row and
/// predicate-bearing statements by the shadow condition of their WHERE clause.
///
/// Only the `TRUE` token (any case) marks shadow traffic. A missing column,
/// a missing condition or an empty condition all mean "not shadow"; a value
/// that cannot be read as a string is an error.
pub struct SimpleJudgementEngine<'a> {
    rule: &'a ShadowRule,
    provider: &'a dyn ShadowConditionProvider,
}

impl<'a> SimpleJudgementEngine<'a> {
    pub fn new(rule: &'a ShadowRule, provider: &'a dyn ShadowConditionProvider) -> Self {
        Self { rule, provider }
    }

    fn judge_insert(&self, insert: &dyn InsertStatementContext) -> Result<bool> {
        for row in insert.insert_value_contexts() {
            if self.judge_insert_row(insert, row)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// The shadow column is searched last-declared first, so a column listed
    /// twice is read at its final position.
    fn judge_insert_row(
        &self,
        insert: &dyn InsertStatementContext,
        row: &InsertValueContext,
    ) -> Result<bool> {
        let last_index = insert.column_names().len().saturating_sub(1);
        for (position, column_name) in insert.descending_column_names().enumerate() {
            if column_name == self.rule.column() {
                return row.value(last_index - position)?.is_true_token();
            }
        }
        Ok(false)
    }

    fn judge_predicate(&self, statement: &dyn StatementContext) -> Result<bool> {
        let Some(condition) = self.provider.create_shadow_condition(statement) else {
            return Ok(false);
        };
        match condition.values(&[])?.first() {
            Some(value) => value.is_true_token(),
            None => Ok(false),
        }
    }
}

impl ShadowJudgementEngine for SimpleJudgementEngine<'_> {
    fn is_shadow_sql(&self, statement: &dyn StatementContext) -> Result<bool> {
        let kind = statement.kind();
        let shadow = if kind == StatementKind::Insert {
            match statement.as_insert() {
                Some(insert) => self.judge_insert(insert)?,
                None => false,
            }
        } else if kind.is_where_segment_available() {
            self.judge_predicate(statement)?
        } else {
            false
        };
        debug!("Shadow judgement for {:?} on column '{}': {}", kind, self.rule.column(), shadow);
        Ok(shadow)
    }
}

/// Judges `statement` against `rule` with the built-in condition engine.
pub fn is_shadow_sql(rule: &ShadowRule, statement: &dyn StatementContext) -> Result<bool> {
    let provider = ShadowConditionEngine::new(rule);
    SimpleJudgementEngine::new(rule, &provider).is_shadow_sql(statement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RouteError, Value};
    use crate::statement::SqlStatementContext;

    fn rule() -> ShadowRule {
        ShadowRule::new("shadow", "ds_shadow")
    }

    fn judge(sql: &str, parameters: Vec<Value>) -> Result<bool> {
        let ctx = SqlStatementContext::from_sql(sql, parameters)?;
        is_shadow_sql(&rule(), &ctx)
    }

    #[test]
    fn test_insert_shadow_row() {
        assert!(judge("INSERT INTO t (id, shadow) VALUES (1, 'true')", vec![]).unwrap());
        assert!(judge("INSERT INTO t (id, shadow) VALUES (1, TRUE)", vec![]).unwrap());
        assert!(!judge("INSERT INTO t (id, shadow) VALUES (1, 'false')", vec![]).unwrap());
    }

    #[test]
    fn test_insert_any_row_is_enough() {
        assert!(judge(
            "INSERT INTO t (id, shadow) VALUES (1, 'no'), (2, 'True'), (3, 'x')",
            vec![]
        )
        .unwrap());
    }

    #[test]
    fn test_insert_stops_at_first_shadow_row() {
        // the NULL row would fail coercion if it were evaluated
        assert!(judge(
            "INSERT INTO t (id, shadow) VALUES (1, 'true'), (2, NULL)",
            vec![]
        )
        .unwrap());
    }

    #[test]
    fn test_insert_without_shadow_column() {
        assert!(!judge("INSERT INTO t (id, name) VALUES (1, 'true')", vec![]).unwrap());
        assert!(!judge("INSERT INTO t VALUES (1, 'true')", vec![]).unwrap());
    }

    #[test]
    fn test_insert_redeclared_column_reads_last_declaration() {
        assert!(judge(
            "INSERT INTO t (shadow, id, shadow) VALUES ('false', 1, 'true')",
            vec![]
        )
        .unwrap());
        assert!(!judge(
            "INSERT INTO t (shadow, id, shadow) VALUES ('true', 1, 'false')",
            vec![]
        )
        .unwrap());
    }

    #[test]
    fn test_insert_non_true_tokens() {
        assert!(!judge("INSERT INTO t (id, shadow) VALUES (1, 1)", vec![]).unwrap());
        assert!(!judge("INSERT INTO t (id, shadow) VALUES (1, 'yes')", vec![]).unwrap());
    }

    #[test]
    fn test_insert_bound_parameter() {
        assert!(judge("INSERT INTO t (id, shadow) VALUES ($1, $2)", vec![Value::Integer(1), Value::from("TRUE")]).unwrap());
        assert!(matches!(
            judge("INSERT INTO t (id, shadow) VALUES ($1, $2)", vec![Value::Integer(1)]),
            Err(RouteError::ParameterNotFound(1))
        ));
    }

    #[test]
    fn test_insert_null_is_an_error() {
        assert!(matches!(
            judge("INSERT INTO t (id, shadow) VALUES (1, NULL)", vec![]),
            Err(RouteError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_predicate_statements() {
        assert!(judge("SELECT * FROM t WHERE shadow = 'TRUE'", vec![]).unwrap());
        assert!(judge("UPDATE t SET a = 1 WHERE id = 2 AND shadow = true", vec![]).unwrap());
        assert!(!judge("DELETE FROM t WHERE shadow = 'false'", vec![]).unwrap());
        assert!(!judge("SELECT * FROM t WHERE id = 1", vec![]).unwrap());
        assert!(!judge("SELECT * FROM t", vec![]).unwrap());
    }

    #[test]
    fn test_predicate_placeholder_is_evaluated_without_parameters() {
        assert!(matches!(
            judge("SELECT * FROM t WHERE shadow = $1", vec![Value::from("true")]),
            Err(RouteError::ParameterNotFound(0))
        ));
    }

    #[test]
    fn test_other_statements_are_not_shadow() {
        assert!(!judge("CREATE TABLE t (shadow BOOLEAN)", vec![]).unwrap());
        assert!(!judge("BEGIN", vec![]).unwrap());
    }
}

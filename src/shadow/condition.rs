use crate::core::{Result, RouteError, Value};
use crate::parser::ast::{BinaryOp, Expr};
use crate::rule::ShadowRule;
use crate::statement::StatementContext;

/// A shadow-column predicate taken out of a statement.
pub trait ShadowCondition: Send + Sync {
    /// Values the condition compares the shadow column against, with
    /// placeholders resolved from `parameters`.
    fn values(&self, parameters: &[Value]) -> Result<Vec<Value>>;
}

/// Source of shadow conditions for predicate-bearing statements.
pub trait ShadowConditionProvider: Send + Sync {
    fn create_shadow_condition(
        &self,
        statement: &dyn StatementContext,
    ) -> Option<Box<dyn ShadowCondition>>;
}

/// `shadow_column = <literal | placeholder>`
#[derive(Debug, Clone, PartialEq)]
pub struct EqualShadowCondition {
    column: String,
    value_expression: Expr,
}

impl EqualShadowCondition {
    pub fn new(column: impl Into<String>, value_expression: Expr) -> Self {
        Self {
            column: column.into(),
            value_expression,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

impl ShadowCondition for EqualShadowCondition {
    fn values(&self, parameters: &[Value]) -> Result<Vec<Value>> {
        match &self.value_expression {
            Expr::Literal(value) => Ok(vec![value.clone()]),
            Expr::Parameter(index) => parameters
                .get(*index)
                .cloned()
                .map(|value| vec![value])
                .ok_or(RouteError::ParameterNotFound(*index)),
            other => Err(RouteError::TypeMismatch(format!(
                "Shadow condition on '{}' compares against '{}'",
                self.column, other
            ))),
        }
    }
}

/// Finds the shadow column's equality predicate in a WHERE clause.
///
/// The clause is expanded into OR-separated groups of AND-ed predicates;
/// the first group holding `column = value` (either operand order) yields
/// the condition.
#[derive(Debug, Clone)]
pub struct ShadowConditionEngine {
    column: String,
}

impl ShadowConditionEngine {
    pub fn new(rule: &ShadowRule) -> Self {
        Self {
            column: rule.column().to_string(),
        }
    }

    fn find_condition(&self, predicate: &Expr) -> Option<EqualShadowCondition> {
        and_groups(predicate)
            .into_iter()
            .flatten()
            .find_map(|each| self.match_equality(each))
    }

    fn match_equality(&self, predicate: &Expr) -> Option<EqualShadowCondition> {
        let Expr::BinaryOp { left, op: BinaryOp::Eq, right } = predicate else {
            return None;
        };
        let value = if left.column_name() == Some(self.column.as_str()) {
            right
        } else if right.column_name() == Some(self.column.as_str()) {
            left
        } else {
            return None;
        };
        match value.as_ref() {
            Expr::Literal(_) | Expr::Parameter(_) => {
                Some(EqualShadowCondition::new(self.column.clone(), value.as_ref().clone()))
            }
            _ => None,
        }
    }
}

impl ShadowConditionProvider for ShadowConditionEngine {
    fn create_shadow_condition(
        &self,
        statement: &dyn StatementContext,
    ) -> Option<Box<dyn ShadowCondition>> {
        let predicate = statement.where_segment()?;
        self.find_condition(predicate)
            .map(|condition| Box::new(condition) as Box<dyn ShadowCondition>)
    }
}

/// Expands a predicate into OR-separated groups of AND-ed leaves.
fn and_groups(predicate: &Expr) -> Vec<Vec<&Expr>> {
    match predicate {
        Expr::BinaryOp { left, op: BinaryOp::Or, right } => {
            let mut groups = and_groups(left);
            groups.extend(and_groups(right));
            groups
        }
        Expr::BinaryOp { left, op: BinaryOp::And, right } => {
            let right_groups = and_groups(right);
            let mut groups = Vec::new();
            for left_group in and_groups(left) {
                for right_group in &right_groups {
                    let mut group = left_group.clone();
                    group.extend(right_group.iter().copied());
                    groups.push(group);
                }
            }
            groups
        }
        leaf => vec![vec![leaf]],
    }
}

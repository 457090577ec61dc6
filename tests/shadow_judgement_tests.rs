use shardroute::parser::ast::Expr;
use shardroute::{
    InsertStatementContext, InsertValueContext, Result, RouteError, RoutingResult, RoutingUnit,
    ShadowCondition, ShadowConditionProvider, ShadowJudgementEngine, ShadowRouteDecorator,
    ShadowRule, SimpleJudgementEngine, SqlDialect, SqlStatementContext, StatementContext,
    StatementKind, Value, is_shadow_sql,
};

struct FakeInsert {
    columns: Vec<String>,
    rows: Vec<InsertValueContext>,
}

impl FakeInsert {
    fn new(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows.into_iter().map(InsertValueContext::from_values).collect(),
        }
    }
}

impl StatementContext for FakeInsert {
    fn kind(&self) -> StatementKind {
        StatementKind::Insert
    }

    fn as_insert(&self) -> Option<&dyn InsertStatementContext> {
        Some(self)
    }
}

impl InsertStatementContext for FakeInsert {
    fn column_names(&self) -> &[String] {
        &self.columns
    }

    fn insert_value_contexts(&self) -> &[InsertValueContext] {
        &self.rows
    }
}

struct FakeQuery(StatementKind);

impl StatementContext for FakeQuery {
    fn kind(&self) -> StatementKind {
        self.0
    }
}

struct FixedCondition(Vec<Value>);

impl ShadowCondition for FixedCondition {
    fn values(&self, _parameters: &[Value]) -> Result<Vec<Value>> {
        Ok(self.0.clone())
    }
}

/// Hands out the same condition for every statement.
struct FixedProvider(Option<Vec<Value>>);

impl ShadowConditionProvider for FixedProvider {
    fn create_shadow_condition(
        &self,
        _statement: &dyn StatementContext,
    ) -> Option<Box<dyn ShadowCondition>> {
        self.0
            .clone()
            .map(|values| Box::new(FixedCondition(values)) as Box<dyn ShadowCondition>)
    }
}

fn rule() -> ShadowRule {
    ShadowRule::new("shadow", "ds_shadow")
}

fn judge(statement: &dyn StatementContext, provider: &FixedProvider) -> Result<bool> {
    let rule = rule();
    SimpleJudgementEngine::new(&rule, provider).is_shadow_sql(statement)
}

const NO_CONDITION: FixedProvider = FixedProvider(None);

#[test]
fn test_insert_with_true_token() {
    for token in ["true", "TRUE", "True"] {
        let insert = FakeInsert::new(&["id", "shadow"], vec![vec![Value::Integer(1), Value::from(token)]]);
        assert!(judge(&insert, &NO_CONDITION).unwrap(), "{}", token);
    }
    let insert = FakeInsert::new(&["id", "shadow"], vec![vec![Value::Integer(1), Value::Boolean(true)]]);
    assert!(judge(&insert, &NO_CONDITION).unwrap());
}

#[test]
fn test_insert_with_other_tokens() {
    for value in [Value::from("false"), Value::from("1"), Value::Integer(1), Value::from(" true")] {
        let insert = FakeInsert::new(&["id", "shadow"], vec![vec![Value::Integer(1), value]]);
        assert!(!judge(&insert, &NO_CONDITION).unwrap());
    }
}

#[test]
fn test_insert_any_shadow_row() {
    let insert = FakeInsert::new(
        &["id", "shadow"],
        vec![
            vec![Value::Integer(1), Value::from("false")],
            vec![Value::Integer(2), Value::from("true")],
        ],
    );
    assert!(judge(&insert, &NO_CONDITION).unwrap());
}

#[test]
fn test_insert_column_lookup_is_case_sensitive() {
    let insert = FakeInsert::new(&["id", "SHADOW"], vec![vec![Value::Integer(1), Value::from("true")]]);
    assert!(!judge(&insert, &NO_CONDITION).unwrap());
}

#[test]
fn test_insert_null_shadow_value() {
    let insert = FakeInsert::new(&["id", "shadow"], vec![vec![Value::Integer(1), Value::Null]]);
    assert!(matches!(judge(&insert, &NO_CONDITION), Err(RouteError::TypeMismatch(_))));
}

#[test]
fn test_insert_short_row() {
    let insert = FakeInsert::new(&["id", "shadow"], vec![vec![Value::Integer(1)]]);
    assert!(judge(&insert, &NO_CONDITION).is_err());
}

#[test]
fn test_predicate_condition_values() {
    let shadow = FixedProvider(Some(vec![Value::from("true")]));
    let not_shadow = FixedProvider(Some(vec![Value::from("false"), Value::from("true")]));
    let empty = FixedProvider(Some(Vec::new()));

    for kind in [StatementKind::Select, StatementKind::Update, StatementKind::Delete] {
        assert!(judge(&FakeQuery(kind), &shadow).unwrap());
        assert!(!judge(&FakeQuery(kind), &not_shadow).unwrap());
        assert!(!judge(&FakeQuery(kind), &empty).unwrap());
        assert!(!judge(&FakeQuery(kind), &NO_CONDITION).unwrap());
    }
}

#[test]
fn test_statements_without_where_are_never_shadow() {
    let shadow = FixedProvider(Some(vec![Value::from("true")]));
    assert!(!judge(&FakeQuery(StatementKind::Ddl), &shadow).unwrap());
    assert!(!judge(&FakeQuery(StatementKind::Other), &shadow).unwrap());
}

#[test]
fn test_decorator_redirects_every_unit() {
    let rule = rule();
    let decorator = ShadowRouteDecorator::with_provider(
        &rule,
        Box::new(FixedProvider(Some(vec![Value::from("TRUE")]))),
    );
    let base: RoutingResult = [RoutingUnit::new("ds_0"), RoutingUnit::new("ds_1")]
        .into_iter()
        .collect();

    let (result, shadow) = decorator.decorate(&FakeQuery(StatementKind::Select), base).unwrap();
    assert!(shadow);
    assert_eq!(result.logical_data_source_names(), vec!["ds_0", "ds_1"]);
    assert_eq!(result.data_source_names(), vec!["ds_shadow", "ds_shadow"]);
}

#[test]
fn test_decorator_keeps_regular_traffic() {
    let rule = rule();
    let decorator = ShadowRouteDecorator::with_provider(&rule, Box::new(NO_CONDITION));
    let base: RoutingResult = [RoutingUnit::new("ds_0")].into_iter().collect();

    let (result, shadow) = decorator.decorate(&FakeQuery(StatementKind::Select), base.clone()).unwrap();
    assert!(!shadow);
    assert_eq!(result, base);
}

#[test]
fn test_insert_value_context_parameters() {
    let row = InsertValueContext::new(
        vec![Expr::Literal(Value::Integer(7)), Expr::Parameter(0), Expr::Parameter(3)],
        std::sync::Arc::new(vec![Value::from("true")]),
    );
    assert_eq!(row.value(0).unwrap(), Value::Integer(7));
    assert_eq!(row.value(1).unwrap(), Value::from("true"));
    assert!(matches!(row.value(2), Err(RouteError::ParameterNotFound(3))));
}

fn judge_mysql(sql: &str, parameters: Vec<Value>) -> Result<bool> {
    let ctx = SqlStatementContext::from_sql_with_dialect(sql, SqlDialect::MySql, parameters)?;
    is_shadow_sql(&rule(), &ctx)
}

#[test]
fn test_placeholder_inside_function_keeps_its_slot() {
    let sql = "INSERT INTO t (ts, id, shadow) VALUES (FROM_UNIXTIME(?), ?, ?)";
    let regular = vec![Value::Integer(1_700_000_000), Value::from("true"), Value::from("false")];
    assert!(!judge_mysql(sql, regular).unwrap());

    let shadow = vec![Value::Integer(1_700_000_000), Value::Integer(7), Value::from("true")];
    assert!(judge_mysql(sql, shadow).unwrap());
}

#[test]
fn test_placeholder_inside_cast_keeps_its_slot() {
    let sql = "INSERT INTO t (id, shadow) VALUES (CAST(? AS SIGNED), ?)";
    assert!(judge_mysql(sql, vec![Value::Integer(5), Value::from("true")]).unwrap());
    assert!(!judge_mysql(sql, vec![Value::Integer(5), Value::from("false")]).unwrap());
}

#[test]
fn test_update_assignment_placeholders_are_counted() {
    let ctx = SqlStatementContext::from_sql_with_dialect(
        "UPDATE t SET status = ? WHERE id = ?",
        SqlDialect::MySql,
        vec![Value::from("true"), Value::Integer(3)],
    )
    .unwrap();
    assert_eq!(ctx.where_segment().unwrap().to_string(), "(id = $2)");
}

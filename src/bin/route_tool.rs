use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use shardroute::{
    RouteRules, Router, RoutingResult, RoutingUnit, RuleConfiguration, SessionKey, SqlDialect,
    SqlStatementContext, TableUnit, Value,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "route-tool")]
#[command(about = "Explain shadow and master-slave routing decisions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Route one statement against a base routing result
    Route {
        #[arg(long)]
        config: PathBuf,
        /// Base routing unit: `ds` or `ds:t_order=t_order_0,t_item=t_item_0`
        #[arg(long = "unit", required = true)]
        units: Vec<String>,
        #[arg(long, default_value = "route-tool")]
        session: String,
        #[arg(long, value_enum, default_value_t = DialectArg::Postgres)]
        dialect: DialectArg,
        /// Bound parameter, in placeholder order
        #[arg(long = "param")]
        params: Vec<String>,
        #[arg(long)]
        sql: String,
    },
    /// Validate a rule configuration file
    Check {
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Postgres,
    Mysql,
}

impl From<DialectArg> for SqlDialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => SqlDialect::PostgreSql,
            DialectArg::Mysql => SqlDialect::MySql,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Route {
            config,
            units,
            session,
            dialect,
            params,
            sql,
        } => route(&config, &units, &session, dialect.into(), &params, &sql),
        Command::Check { config } => {
            let rules = load_rules(&config)?;
            print_rules(&rules);
            Ok(())
        }
    }
}

fn load_rules(path: &Path) -> Result<RouteRules> {
    let config = RuleConfiguration::from_path(path)
        .with_context(|| format!("Failed to read rule configuration '{}'", path.display()))?;
    config
        .build()
        .with_context(|| format!("Invalid rule configuration '{}'", path.display()))
}

fn print_rules(rules: &RouteRules) {
    match &rules.shadow {
        Some(shadow) => println!(
            "shadow: column '{}' -> '{}'",
            shadow.column(),
            shadow.shadow_data_source_name()
        ),
        None => println!("shadow: not configured"),
    }
    for rule in &rules.master_slave {
        println!(
            "master-slave '{}': master '{}', slaves {:?}, {}",
            rule.name(),
            rule.master_data_source_name(),
            rule.slave_data_source_names(),
            rule.load_balance_algorithm().type_name()
        );
    }
}

fn route(
    config: &Path,
    units: &[String],
    session: &str,
    dialect: SqlDialect,
    params: &[String],
    sql: &str,
) -> Result<()> {
    let router = Router::new(load_rules(config)?);
    let base = units
        .iter()
        .map(|unit| parse_unit(unit))
        .collect::<Result<RoutingResult>>()?;
    let parameters = params.iter().map(|param| parse_parameter(param)).collect();
    let statement = SqlStatementContext::from_sql_with_dialect(sql, dialect, parameters)
        .with_context(|| format!("Failed to parse '{}'", sql))?;

    let decision = router.route(&statement, &SessionKey::from(session), base)?;
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

fn parse_unit(raw: &str) -> Result<RoutingUnit> {
    let (data_source, tables) = match raw.split_once(':') {
        Some((data_source, tables)) => (data_source.trim(), Some(tables)),
        None => (raw.trim(), None),
    };
    if data_source.is_empty() {
        return Err(anyhow!("Routing unit '{}' has no datasource name", raw));
    }

    let mut unit = RoutingUnit::new(data_source);
    for pair in tables.into_iter().flat_map(|tables| tables.split(',')) {
        let (logical, actual) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected logical=actual, got '{}'", pair))?;
        unit.add_table_unit(TableUnit::new(logical.trim(), actual.trim()));
    }
    Ok(unit)
}

fn parse_parameter(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    match raw.parse::<i64>() {
        Ok(i) => Value::Integer(i),
        Err(_) => Value::Text(raw.to_string()),
    }
}

// ============================================================================
// shardroute Library
// ============================================================================

pub mod core;
pub mod route;
pub mod rule;
pub mod config;
pub mod statement;
pub mod shadow;
pub mod masterslave;
pub mod facade;
pub mod parser;

// Re-export main types for convenience
pub use crate::core::{Result, RouteError, Value};
pub use crate::route::{RoutingResult, RoutingUnit, TableUnit};
pub use crate::rule::{MasterSlaveRule, RouteRules, ShadowRule};
pub use crate::config::{MasterSlaveRuleConfiguration, RuleConfiguration, ShadowRuleConfiguration};
pub use crate::statement::{
    InsertStatementContext, InsertValueContext, SqlStatementContext, StatementContext,
    StatementKind,
};
pub use crate::shadow::{
    ShadowCondition, ShadowConditionEngine, ShadowConditionProvider, ShadowJudgementEngine,
    ShadowRouteDecorator, SimpleJudgementEngine, is_shadow_sql,
};
pub use crate::masterslave::{
    LoadBalanceAlgorithmRegistry, MasterSlaveLoadBalanceAlgorithm, MasterSlaveRouteDecorator,
    MasterVisitTracker, RandomLoadBalanceAlgorithm, RoundRobinLoadBalanceAlgorithm, SessionKey,
};
pub use crate::facade::{RouteDecision, Router};
pub use crate::parser::SqlDialect;

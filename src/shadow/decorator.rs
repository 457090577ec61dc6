use super::judgement::{ShadowJudgementEngine, SimpleJudgementEngine};
use super::condition::{ShadowConditionEngine, ShadowConditionProvider};
use crate::core::Result;
use crate::route::RoutingResult;
use crate::rule::ShadowRule;
use crate::statement::StatementContext;
use log::debug;

/// Redirects shadow statements to the shadow datasource.
pub struct ShadowRouteDecorator<'a> {
    rule: &'a ShadowRule,
    provider: Box<dyn ShadowConditionProvider + 'a>,
}

impl<'a> ShadowRouteDecorator<'a> {
    pub fn new(rule: &'a ShadowRule) -> Self {
        Self {
            rule,
            provider: Box::new(ShadowConditionEngine::new(rule)),
        }
    }

    pub fn with_provider(rule: &'a ShadowRule, provider: Box<dyn ShadowConditionProvider + 'a>) -> Self {
        Self { rule, provider }
    }

    /// Returns `(result, shadow)`. For shadow statements every unit points at
    /// the shadow datasource; otherwise the result is returned as is.
    pub fn decorate(
        &self,
        statement: &dyn StatementContext,
        routing_result: RoutingResult,
    ) -> Result<(RoutingResult, bool)> {
        let engine = SimpleJudgementEngine::new(self.rule, self.provider.as_ref());
        if !engine.is_shadow_sql(statement)? {
            return Ok((routing_result, false));
        }
        debug!(
            "Redirecting {} routing unit(s) to shadow datasource '{}'",
            routing_result.len(),
            self.rule.shadow_data_source_name()
        );
        let redirected = routing_result
            .into_routing_units()
            .into_iter()
            .map(|unit| unit.redirect(self.rule.shadow_data_source_name()))
            .collect();
        Ok((redirected, true))
    }
}

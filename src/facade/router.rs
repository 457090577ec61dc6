use crate::config::RuleConfiguration;
use crate::core::Result;
use crate::masterslave::{MasterSlaveRouteDecorator, MasterVisitTracker, SessionKey};
use crate::route::RoutingResult;
use crate::rule::RouteRules;
use crate::shadow::{ShadowRouteDecorator, is_shadow_sql};
use crate::statement::StatementContext;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of routing one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDecision {
    pub routing_result: RoutingResult,
    pub shadow: bool,
}

/// Applies the configured shadow and master-slave rules to a base routing
/// result.
///
/// Shadow statements are redirected to the shadow datasource and skip
/// master-slave resolution, so they never pin a session to a master.
#[derive(Debug, Clone)]
pub struct Router {
    rules: Arc<RouteRules>,
    master_slave: MasterSlaveRouteDecorator,
}

impl Router {
    pub fn new(rules: RouteRules) -> Self {
        Self::with_tracker(Arc::new(rules), Arc::new(MasterVisitTracker::new()))
    }

    /// Router sharing session state with other routers.
    pub fn with_tracker(rules: Arc<RouteRules>, tracker: Arc<MasterVisitTracker>) -> Self {
        Self {
            rules,
            master_slave: MasterSlaveRouteDecorator::new(tracker),
        }
    }

    pub fn from_configuration(config: &RuleConfiguration) -> Result<Self> {
        Ok(Self::new(config.build()?))
    }

    pub fn rules(&self) -> &RouteRules {
        &self.rules
    }

    pub fn tracker(&self) -> &Arc<MasterVisitTracker> {
        self.master_slave.tracker()
    }

    /// False when no shadow rule is configured.
    pub fn is_shadow_sql(&self, statement: &dyn StatementContext) -> Result<bool> {
        match &self.rules.shadow {
            Some(rule) => is_shadow_sql(rule, statement),
            None => Ok(false),
        }
    }

    /// Decorates `routing_result` for `statement`.
    ///
    /// The shadow condition of a WHERE clause is read without the bound
    /// parameters, so `... WHERE shadow = ?` fails with
    /// `RouteError::ParameterNotFound` instead of routing as regular traffic.
    pub fn route(
        &self,
        statement: &dyn StatementContext,
        session: &SessionKey,
        routing_result: RoutingResult,
    ) -> Result<RouteDecision> {
        let routing_result = match &self.rules.shadow {
            Some(rule) => {
                let (routing_result, shadow) =
                    ShadowRouteDecorator::new(rule).decorate(statement, routing_result)?;
                if shadow {
                    return Ok(RouteDecision {
                        routing_result,
                        shadow,
                    });
                }
                routing_result
            }
            None => routing_result,
        };
        Ok(self.route_master_slave(statement, session, routing_result))
    }

    fn route_master_slave(
        &self,
        statement: &dyn StatementContext,
        session: &SessionKey,
        routing_result: RoutingResult,
    ) -> RouteDecision {
        RouteDecision {
            routing_result: self.master_slave.decorate_all(
                &self.rules.master_slave,
                statement,
                session,
                routing_result,
            ),
            shadow: false,
        }
    }

    /// Forgets the session's master affinity. Call when the session ends.
    pub fn end_session(&self, session: &SessionKey) {
        self.tracker().clear(session);
    }
}

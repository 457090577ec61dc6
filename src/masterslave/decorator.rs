use super::visit::{MasterVisitTracker, SessionKey};
use crate::route::{RoutingResult, RoutingUnit};
use crate::rule::MasterSlaveRule;
use crate::statement::StatementContext;
use log::{debug, warn};
use std::sync::Arc;

/// Rewrites routing units of a master-slave group to one physical member.
///
/// Writes, locking reads and every read of a session that already touched
/// the master go to the master; other reads go to a load-balanced slave.
#[derive(Debug, Clone, Default)]
pub struct MasterSlaveRouteDecorator {
    tracker: Arc<MasterVisitTracker>,
}

impl MasterSlaveRouteDecorator {
    pub fn new(tracker: Arc<MasterVisitTracker>) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> &Arc<MasterVisitTracker> {
        &self.tracker
    }

    /// Returns a result where the unit named after `rule` points at the
    /// chosen member.
    ///
    /// Units of other datasources keep their relative order and come first;
    /// the decorated unit follows them. A result without the group is
    /// returned unchanged.
    pub fn decorate(
        &self,
        rule: &MasterSlaveRule,
        statement: &dyn StatementContext,
        session: &SessionKey,
        routing_result: RoutingResult,
    ) -> RoutingResult {
        let mut pass_through = Vec::new();
        let mut decorated = Vec::new();
        for unit in routing_result.into_routing_units() {
            if unit.logical_data_source_name() == rule.name() {
                decorated.push(unit.redirect(self.route_data_source(rule, statement, session)));
            } else {
                pass_through.push(unit);
            }
        }
        pass_through.into_iter().chain(decorated).collect()
    }

    /// Applies every rule in order.
    pub fn decorate_all(
        &self,
        rules: &[MasterSlaveRule],
        statement: &dyn StatementContext,
        session: &SessionKey,
        routing_result: RoutingResult,
    ) -> RoutingResult {
        rules.iter().fold(routing_result, |result, rule| {
            self.decorate(rule, statement, session, result)
        })
    }

    /// Picks the physical datasource of `rule` for this statement.
    ///
    /// Usable on its own when the group is not behind a sharding router.
    pub fn route_data_source(
        &self,
        rule: &MasterSlaveRule,
        statement: &dyn StatementContext,
        session: &SessionKey,
    ) -> String {
        if self.is_master_route(statement, session) {
            self.tracker.mark_visited(session);
            debug!(
                "Routing {:?} of session {} in group '{}' to master '{}'",
                statement.kind(),
                session,
                rule.name(),
                rule.master_data_source_name()
            );
            return rule.master_data_source_name().to_string();
        }

        match rule
            .load_balance_algorithm()
            .choose(rule.name(), rule.slave_data_source_names())
        {
            Some(slave) => {
                debug!(
                    "Routing read of session {} in group '{}' to slave '{}'",
                    session,
                    rule.name(),
                    slave
                );
                slave.to_string()
            }
            None => {
                warn!(
                    "Load balance algorithm {} found no slave in group '{}', using master '{}'",
                    rule.load_balance_algorithm().type_name(),
                    rule.name(),
                    rule.master_data_source_name()
                );
                rule.master_data_source_name().to_string()
            }
        }
    }

    fn is_master_route(&self, statement: &dyn StatementContext, session: &SessionKey) -> bool {
        !statement.kind().is_query() || statement.has_lock() || self.tracker.has_visited(session)
    }

    /// Single routing unit for a master-slave-only deployment.
    pub fn route_unit(
        &self,
        rule: &MasterSlaveRule,
        statement: &dyn StatementContext,
        session: &SessionKey,
    ) -> RoutingUnit {
        RoutingUnit::with_actual(rule.name(), self.route_data_source(rule, statement, session))
    }
}

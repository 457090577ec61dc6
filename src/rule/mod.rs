//! Validated, immutable routing rules.
//!
//! Rules are built once from `RuleConfiguration` and shared read-only by
//! every routing call.

use crate::masterslave::MasterSlaveLoadBalanceAlgorithm;
use std::fmt;
use std::sync::Arc;

/// Which column flags a shadow row, and where shadow traffic goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowRule {
    column: String,
    shadow_data_source_name: String,
}

impl ShadowRule {
    pub fn new(column: impl Into<String>, shadow_data_source_name: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            shadow_data_source_name: shadow_data_source_name.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn shadow_data_source_name(&self) -> &str {
        &self.shadow_data_source_name
    }
}

/// One logical group replicated as a master and its slaves.
#[derive(Clone)]
pub struct MasterSlaveRule {
    name: String,
    master_data_source_name: String,
    slave_data_source_names: Vec<String>,
    load_balance_algorithm: Arc<dyn MasterSlaveLoadBalanceAlgorithm>,
}

impl MasterSlaveRule {
    pub fn new(
        name: impl Into<String>,
        master_data_source_name: impl Into<String>,
        slave_data_source_names: Vec<String>,
        load_balance_algorithm: Arc<dyn MasterSlaveLoadBalanceAlgorithm>,
    ) -> Self {
        Self {
            name: name.into(),
            master_data_source_name: master_data_source_name.into(),
            slave_data_source_names,
            load_balance_algorithm,
        }
    }

    /// Logical name of the group.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn master_data_source_name(&self) -> &str {
        &self.master_data_source_name
    }

    pub fn slave_data_source_names(&self) -> &[String] {
        &self.slave_data_source_names
    }

    pub fn load_balance_algorithm(&self) -> &dyn MasterSlaveLoadBalanceAlgorithm {
        self.load_balance_algorithm.as_ref()
    }
}

impl fmt::Debug for MasterSlaveRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterSlaveRule")
            .field("name", &self.name)
            .field("master_data_source_name", &self.master_data_source_name)
            .field("slave_data_source_names", &self.slave_data_source_names)
            .field("load_balance_algorithm", &self.load_balance_algorithm.type_name())
            .finish()
    }
}

/// Every rule the router consults.
#[derive(Debug, Clone, Default)]
pub struct RouteRules {
    pub shadow: Option<ShadowRule>,
    pub master_slave: Vec<MasterSlaveRule>,
}

impl RouteRules {
    pub fn find_master_slave_rule(&self, name: &str) -> Option<&MasterSlaveRule> {
        self.master_slave.iter().find(|rule| rule.name() == name)
    }
}

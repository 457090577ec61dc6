use crate::core::{Result, RouteError};
use crate::masterslave::LoadBalanceAlgorithmRegistry;
use crate::rule::{MasterSlaveRule, RouteRules, ShadowRule};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Routing rule configuration
///
/// Loaded from JSON, e.g.
///
/// ```json
/// {
///   "shadow": { "column": "is_shadow", "shadow_data_source_name": "ds_shadow" },
///   "master_slave": [
///     { "name": "ds", "master_data_source_name": "master",
///       "slave_data_source_names": ["slave_0", "slave_1"],
///       "load_balance_algorithm_type": "ROUND_ROBIN" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleConfiguration {
    #[serde(default)]
    pub shadow: Option<ShadowRuleConfiguration>,

    #[serde(default)]
    pub master_slave: Vec<MasterSlaveRuleConfiguration>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShadowRuleConfiguration {
    /// Column whose value marks a shadow row
    pub column: String,

    /// Datasource receiving shadow traffic
    pub shadow_data_source_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MasterSlaveRuleConfiguration {
    /// Logical datasource name of the group
    pub name: String,

    pub master_data_source_name: String,

    pub slave_data_source_names: Vec<String>,

    /// `RANDOM` when absent
    #[serde(default)]
    pub load_balance_algorithm_type: Option<String>,
}

impl MasterSlaveRuleConfiguration {
    pub fn new(name: &str, master_data_source_name: &str, slave_data_source_names: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            master_data_source_name: master_data_source_name.to_string(),
            slave_data_source_names: slave_data_source_names.iter().map(|s| s.to_string()).collect(),
            load_balance_algorithm_type: None,
        }
    }

    /// Set the load balance algorithm type
    pub fn load_balance_algorithm_type(mut self, type_name: &str) -> Self {
        self.load_balance_algorithm_type = Some(type_name.to_string());
        self
    }
}

impl RuleConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shadow rule
    pub fn with_shadow(mut self, column: &str, shadow_data_source_name: &str) -> Self {
        self.shadow = Some(ShadowRuleConfiguration {
            column: column.to_string(),
            shadow_data_source_name: shadow_data_source_name.to_string(),
        });
        self
    }

    /// Add a master-slave group
    pub fn with_master_slave(mut self, rule: MasterSlaveRuleConfiguration) -> Self {
        self.master_slave.push(rule);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates and builds rules using the built-in algorithms.
    pub fn build(&self) -> Result<RouteRules> {
        self.build_with_registry(LoadBalanceAlgorithmRegistry::global())
    }

    pub fn build_with_registry(&self, registry: &LoadBalanceAlgorithmRegistry) -> Result<RouteRules> {
        let shadow = self.shadow.as_ref().map(build_shadow_rule).transpose()?;

        let mut names = HashSet::new();
        let mut master_slave = Vec::with_capacity(self.master_slave.len());
        for config in &self.master_slave {
            if !names.insert(config.name.as_str()) {
                return Err(RouteError::ConfigError(format!(
                    "Duplicate master-slave rule '{}'",
                    config.name
                )));
            }
            master_slave.push(build_master_slave_rule(config, registry)?);
        }

        Ok(RouteRules {
            shadow,
            master_slave,
        })
    }
}

fn build_shadow_rule(config: &ShadowRuleConfiguration) -> Result<ShadowRule> {
    require_non_empty("shadow column", &config.column)?;
    require_non_empty("shadow datasource name", &config.shadow_data_source_name)?;
    Ok(ShadowRule::new(&config.column, &config.shadow_data_source_name))
}

fn build_master_slave_rule(
    config: &MasterSlaveRuleConfiguration,
    registry: &LoadBalanceAlgorithmRegistry,
) -> Result<MasterSlaveRule> {
    require_non_empty("master-slave rule name", &config.name)?;
    require_non_empty("master datasource name", &config.master_data_source_name)?;
    if config.slave_data_source_names.is_empty() {
        return Err(RouteError::ConfigError(format!(
            "Master-slave rule '{}' has no slave datasource",
            config.name
        )));
    }
    for slave in &config.slave_data_source_names {
        require_non_empty("slave datasource name", slave)?;
    }

    let type_name = config
        .load_balance_algorithm_type
        .as_deref()
        .unwrap_or(LoadBalanceAlgorithmRegistry::DEFAULT_TYPE);
    let algorithm = registry.create(type_name).ok_or_else(|| {
        RouteError::ConfigError(format!(
            "Unknown load balance algorithm '{}' for rule '{}', expected one of {:?}",
            type_name,
            config.name,
            registry.type_names()
        ))
    })?;

    Ok(MasterSlaveRule::new(
        &config.name,
        &config.master_data_source_name,
        config.slave_data_source_names.clone(),
        algorithm,
    ))
}

fn require_non_empty(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RouteError::ConfigError(format!("{} must not be empty", what)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_build() {
        let config = RuleConfiguration::from_json_str(
            r#"{
                "shadow": { "column": "is_shadow", "shadow_data_source_name": "ds_shadow" },
                "master_slave": [
                    { "name": "ds", "master_data_source_name": "master",
                      "slave_data_source_names": ["slave_0", "slave_1"],
                      "load_balance_algorithm_type": "round_robin" }
                ]
            }"#,
        )
        .unwrap();

        let rules = config.build().unwrap();
        assert_eq!(rules.shadow.as_ref().unwrap().column(), "is_shadow");
        let rule = rules.find_master_slave_rule("ds").unwrap();
        assert_eq!(rule.slave_data_source_names(), ["slave_0", "slave_1"]);
        assert_eq!(rule.load_balance_algorithm().type_name(), "ROUND_ROBIN");
    }

    #[test]
    fn test_default_algorithm_is_random() {
        let rules = RuleConfiguration::new()
            .with_master_slave(MasterSlaveRuleConfiguration::new("ds", "master", &["slave"]))
            .build()
            .unwrap();
        assert!(rules.shadow.is_none());
        assert_eq!(rules.master_slave[0].load_balance_algorithm().type_name(), "RANDOM");
    }

    #[test]
    fn test_rejects_empty_slaves() {
        let err = RuleConfiguration::new()
            .with_master_slave(MasterSlaveRuleConfiguration::new("ds", "master", &[]))
            .build()
            .unwrap_err();
        assert!(matches!(err, RouteError::ConfigError(_)));
    }

    #[test]
    fn test_rejects_duplicate_groups() {
        let err = RuleConfiguration::new()
            .with_master_slave(MasterSlaveRuleConfiguration::new("ds", "m0", &["s0"]))
            .with_master_slave(MasterSlaveRuleConfiguration::new("ds", "m1", &["s1"]))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_rejects_unknown_algorithm() {
        let err = RuleConfiguration::new()
            .with_master_slave(
                MasterSlaveRuleConfiguration::new("ds", "master", &["slave"])
                    .load_balance_algorithm_type("WEIGHTED"),
            )
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("WEIGHTED"));
    }

    #[test]
    fn test_rejects_blank_shadow_column() {
        let err = RuleConfiguration::new().with_shadow(" ", "ds_shadow").build().unwrap_err();
        assert!(matches!(err, RouteError::ConfigError(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let config = RuleConfiguration::new()
            .with_shadow("is_shadow", "ds_shadow")
            .with_master_slave(MasterSlaveRuleConfiguration::new("ds", "master", &["slave"]));
        let json = config.to_json_string().unwrap();
        assert_eq!(RuleConfiguration::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            RuleConfiguration::from_json_str("{ \"master_slave\": 1 }"),
            Err(RouteError::ConfigError(_))
        ));
    }
}

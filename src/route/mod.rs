//! Routing result model shared by the decorators.
//!
//! A `RoutingResult` is produced once per statement execution by the
//! upstream sharding router. Decorators consume it and hand back a new one;
//! only `RoutingUnit::actual_data_source_name` is ever rewritten.

use serde::{Deserialize, Serialize};

/// A logical table paired with the physical table it resolved to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TableUnit {
    pub logical_table_name: String,
    pub actual_table_name: String,
}

impl TableUnit {
    pub fn new(logical_table_name: impl Into<String>, actual_table_name: impl Into<String>) -> Self {
        Self {
            logical_table_name: logical_table_name.into(),
            actual_table_name: actual_table_name.into(),
        }
    }
}

/// One logical datasource resolved to a physical datasource plus its tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoutingUnit {
    logical_data_source_name: String,
    actual_data_source_name: String,
    #[serde(default)]
    table_units: Vec<TableUnit>,
}

impl RoutingUnit {
    /// Creates an undecorated unit: the actual name equals the logical one.
    pub fn new(data_source_name: impl Into<String>) -> Self {
        let name = data_source_name.into();
        Self {
            actual_data_source_name: name.clone(),
            logical_data_source_name: name,
            table_units: Vec::new(),
        }
    }

    pub fn with_actual(
        logical_data_source_name: impl Into<String>,
        actual_data_source_name: impl Into<String>,
    ) -> Self {
        Self {
            logical_data_source_name: logical_data_source_name.into(),
            actual_data_source_name: actual_data_source_name.into(),
            table_units: Vec::new(),
        }
    }

    pub fn logical_data_source_name(&self) -> &str {
        &self.logical_data_source_name
    }

    pub fn actual_data_source_name(&self) -> &str {
        &self.actual_data_source_name
    }

    /// Points this unit at another physical datasource. The logical name and
    /// table units are kept.
    pub fn redirect(mut self, actual_data_source_name: impl Into<String>) -> Self {
        self.actual_data_source_name = actual_data_source_name.into();
        self
    }

    /// Adds a table unit; duplicates are ignored.
    pub fn add_table_unit(&mut self, table_unit: TableUnit) {
        if !self.table_units.contains(&table_unit) {
            self.table_units.push(table_unit);
        }
    }

    pub fn table_units(&self) -> &[TableUnit] {
        &self.table_units
    }
}

/// Ordered routing units, unique by logical datasource name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoutingResult {
    routing_units: Vec<RoutingUnit>,
}

impl RoutingResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a unit, or merges its table units into the existing unit with
    /// the same logical name. A merge keeps the existing position and actual
    /// datasource.
    pub fn add_unit(&mut self, unit: RoutingUnit) {
        match self
            .routing_units
            .iter_mut()
            .find(|each| each.logical_data_source_name == unit.logical_data_source_name)
        {
            Some(existing) => {
                for table_unit in unit.table_units {
                    existing.add_table_unit(table_unit);
                }
            }
            None => self.routing_units.push(unit),
        }
    }

    pub fn routing_units(&self) -> &[RoutingUnit] {
        &self.routing_units
    }

    pub fn into_routing_units(self) -> Vec<RoutingUnit> {
        self.routing_units
    }

    pub fn len(&self) -> usize {
        self.routing_units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routing_units.is_empty()
    }

    /// Physical datasource names in dispatch order.
    pub fn data_source_names(&self) -> Vec<&str> {
        self.routing_units
            .iter()
            .map(|unit| unit.actual_data_source_name.as_str())
            .collect()
    }

    pub fn logical_data_source_names(&self) -> Vec<&str> {
        self.routing_units
            .iter()
            .map(|unit| unit.logical_data_source_name.as_str())
            .collect()
    }

    pub fn find_by_logical_name(&self, logical_data_source_name: &str) -> Option<&RoutingUnit> {
        self.routing_units
            .iter()
            .find(|unit| unit.logical_data_source_name == logical_data_source_name)
    }
}

impl FromIterator<RoutingUnit> for RoutingResult {
    fn from_iter<I: IntoIterator<Item = RoutingUnit>>(iter: I) -> Self {
        let mut result = RoutingResult::new();
        for unit in iter {
            result.add_unit(unit);
        }
        result
    }
}

use dashmap::DashMap;
use lazy_static::lazy_static;
use log::debug;
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Picks the slave that serves a read.
pub trait MasterSlaveLoadBalanceAlgorithm: Send + Sync {
    /// Type name used in configuration, e.g. `RANDOM`.
    fn type_name(&self) -> &'static str;

    /// Returns one of `candidates`, or `None` when there are none.
    fn choose<'a>(&self, group_name: &str, candidates: &'a [String]) -> Option<&'a str>;
}

/// Uniform random choice, independent across calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomLoadBalanceAlgorithm;

impl MasterSlaveLoadBalanceAlgorithm for RandomLoadBalanceAlgorithm {
    fn type_name(&self) -> &'static str {
        "RANDOM"
    }

    fn choose<'a>(&self, _group_name: &str, candidates: &'a [String]) -> Option<&'a str> {
        if candidates.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..candidates.len());
        Some(candidates[index].as_str())
    }
}

/// Cycles through the candidates, one counter per group.
#[derive(Debug, Default)]
pub struct RoundRobinLoadBalanceAlgorithm {
    counters: DashMap<String, AtomicUsize>,
}

impl RoundRobinLoadBalanceAlgorithm {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_sequence(&self, group_name: &str) -> usize {
        if let Some(counter) = self.counters.get(group_name) {
            return counter.fetch_add(1, Ordering::Relaxed);
        }
        self.counters
            .entry(group_name.to_string())
            .or_insert_with(|| AtomicUsize::new(0))
            .fetch_add(1, Ordering::Relaxed)
    }
}

impl MasterSlaveLoadBalanceAlgorithm for RoundRobinLoadBalanceAlgorithm {
    fn type_name(&self) -> &'static str {
        "ROUND_ROBIN"
    }

    fn choose<'a>(&self, group_name: &str, candidates: &'a [String]) -> Option<&'a str> {
        if candidates.is_empty() {
            return None;
        }
        let index = self.next_sequence(group_name) % candidates.len();
        Some(candidates[index].as_str())
    }
}

pub type LoadBalanceAlgorithmFactory = fn() -> Arc<dyn MasterSlaveLoadBalanceAlgorithm>;

/// Registry of load-balance algorithms by configuration type name.
pub struct LoadBalanceAlgorithmRegistry {
    factories: Vec<(&'static str, LoadBalanceAlgorithmFactory)>,
}

lazy_static! {
    static ref DEFAULT_REGISTRY: LoadBalanceAlgorithmRegistry =
        LoadBalanceAlgorithmRegistry::with_default_algorithms();
}

impl LoadBalanceAlgorithmRegistry {
    pub const DEFAULT_TYPE: &'static str = "RANDOM";

    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Registry holding the built-in algorithms.
    pub fn global() -> &'static LoadBalanceAlgorithmRegistry {
        &DEFAULT_REGISTRY
    }

    /// Registers a factory. A later registration under the same name wins.
    pub fn register(&mut self, type_name: &'static str, factory: LoadBalanceAlgorithmFactory) {
        debug!("Registered load balance algorithm: {}", type_name);
        self.factories.insert(0, (type_name, factory));
    }

    pub fn with_default_algorithms() -> Self {
        let mut registry = Self::new();
        registry.register("RANDOM", create_random);
        registry.register("ROUND_ROBIN", create_round_robin);
        registry
    }

    /// Creates a fresh algorithm instance; type names match case-insensitively.
    pub fn create(&self, type_name: &str) -> Option<Arc<dyn MasterSlaveLoadBalanceAlgorithm>> {
        self.factories
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(type_name))
            .map(|(_, factory)| factory())
    }

    pub fn type_names(&self) -> Vec<&'static str> {
        self.factories.iter().map(|(name, _)| *name).collect()
    }
}

fn create_random() -> Arc<dyn MasterSlaveLoadBalanceAlgorithm> {
    Arc::new(RandomLoadBalanceAlgorithm)
}

fn create_round_robin() -> Arc<dyn MasterSlaveLoadBalanceAlgorithm> {
    Arc::new(RoundRobinLoadBalanceAlgorithm::new())
}

impl Default for LoadBalanceAlgorithmRegistry {
    fn default() -> Self {
        Self::with_default_algorithms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn slaves(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_random_returns_a_candidate() {
        let candidates = slaves(&["slave_0", "slave_1", "slave_2"]);
        let algorithm = RandomLoadBalanceAlgorithm;
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let chosen = algorithm.choose("ds", &candidates).unwrap();
            assert!(candidates.iter().any(|c| c == chosen));
            seen.insert(chosen.to_string());
        }
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_empty_candidates() {
        assert!(RandomLoadBalanceAlgorithm.choose("ds", &[]).is_none());
        assert!(RoundRobinLoadBalanceAlgorithm::new().choose("ds", &[]).is_none());
    }

    #[test]
    fn test_round_robin_cycles_per_group() {
        let candidates = slaves(&["slave_0", "slave_1"]);
        let algorithm = RoundRobinLoadBalanceAlgorithm::new();
        assert_eq!(algorithm.choose("ds_0", &candidates), Some("slave_0"));
        assert_eq!(algorithm.choose("ds_0", &candidates), Some("slave_1"));
        assert_eq!(algorithm.choose("ds_1", &candidates), Some("slave_0"));
        assert_eq!(algorithm.choose("ds_0", &candidates), Some("slave_0"));
    }

    #[test]
    fn test_registry_lookup() {
        let registry = LoadBalanceAlgorithmRegistry::global();
        assert_eq!(registry.create("random").unwrap().type_name(), "RANDOM");
        assert_eq!(registry.create("ROUND_ROBIN").unwrap().type_name(), "ROUND_ROBIN");
        assert!(registry.create("WEIGHT").is_none());
    }

    #[test]
    fn test_registry_override() {
        let mut registry = LoadBalanceAlgorithmRegistry::with_default_algorithms();
        registry.register("RANDOM", create_round_robin);
        assert_eq!(registry.create("RANDOM").unwrap().type_name(), "ROUND_ROBIN");
    }
}

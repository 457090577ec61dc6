//! Master-slave routing: pick the physical member that serves a statement.

pub mod decorator;
pub mod load_balance;
pub mod visit;

pub use decorator::MasterSlaveRouteDecorator;
pub use load_balance::{
    LoadBalanceAlgorithmFactory, LoadBalanceAlgorithmRegistry, MasterSlaveLoadBalanceAlgorithm,
    RandomLoadBalanceAlgorithm, RoundRobinLoadBalanceAlgorithm,
};
pub use visit::{MasterVisitTracker, SessionKey};

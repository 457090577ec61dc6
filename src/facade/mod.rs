pub mod router;

pub use router::{RouteDecision, Router};

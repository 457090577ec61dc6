pub mod error;
pub mod value;

pub use error::{Result, RouteError};
pub use value::Value;

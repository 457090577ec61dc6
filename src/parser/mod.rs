pub mod adapter;
pub mod ast;

pub use adapter::{SqlDialect, SqlParserAdapter};

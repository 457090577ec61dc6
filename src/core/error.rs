use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("No parameter bound at index {0}")]
    ParameterNotFound(usize),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, RouteError>;

impl From<std::io::Error> for RouteError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for RouteError {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}

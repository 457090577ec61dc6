use std::fmt;
use crate::core::{Result, RouteError};

/// A literal or bound value as seen by the routing layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
}

impl Value {
    /// Upper-cased string form used by flag comparisons.
    ///
    /// Numbers and booleans are rendered first (`true` becomes `TRUE`,
    /// `1` stays `1`). NULL has no string form and is rejected.
    pub fn to_upper_string(&self) -> Result<String> {
        match self {
            Self::Null => Err(RouteError::TypeMismatch(
                "NULL cannot be compared as a string".into(),
            )),
            Self::Text(s) => Ok(s.to_uppercase()),
            other => Ok(other.to_string().to_uppercase()),
        }
    }

    /// True when the value reads as the `TRUE` token, ignoring case.
    pub fn is_true_token(&self) -> Result<bool> {
        Ok(self.to_upper_string()? == "TRUE")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(fl) => write!(f, "{}", fl),
            Self::Text(s) => write!(f, "{}", s),
            Self::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

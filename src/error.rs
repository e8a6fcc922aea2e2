//! Error types for sqltree
//!
//! Every error is raised while a tree is being built. Rendering a tree that
//! was built successfully cannot fail.

use thiserror::Error;

/// The result type for sqltree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing SQL trees or loading configuration
#[derive(Debug, Error)]
pub enum Error {
    /// A required argument was absent or empty
    #[error("Missing required argument: {0}")]
    NullArgument(String),

    /// A multi-operand node was built with too few operands
    #[error("Empty operand list: {0}")]
    EmptyOperandList(String),

    /// An operator was applied with the wrong number of operands
    #[error("Operator `{operator}` expects {expected} operand(s), got {found}")]
    InvalidOperatorArity {
        operator: String,
        expected: usize,
        found: usize,
    },

    /// A literal argument has an invalid shape
    #[error("Invalid literal format: {0}")]
    InvalidLiteralFormat(String),

    /// A clause needs a part that was not supplied
    #[error("Missing required clause: {0}")]
    MissingRequiredClause(String),

    /// Render configuration could not be loaded
    #[error("Invalid render configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Create a missing argument error
    pub fn null_argument(name: impl Into<String>) -> Self {
        Error::NullArgument(name.into())
    }

    /// Create an empty operand list error
    pub fn empty_operands(node: impl Into<String>) -> Self {
        Error::EmptyOperandList(node.into())
    }

    /// Create an arity error
    pub fn arity(operator: impl Into<String>, expected: usize, found: usize) -> Self {
        Error::InvalidOperatorArity {
            operator: operator.into(),
            expected,
            found,
        }
    }

    /// Create an invalid literal error
    pub fn invalid_literal(message: impl Into<String>) -> Self {
        Error::InvalidLiteralFormat(message.into())
    }

    /// Create a missing clause error
    pub fn missing_clause(clause: impl Into<String>) -> Self {
        Error::MissingRequiredClause(clause.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::null_argument("table").to_string(),
            "Missing required argument: table"
        );
        assert_eq!(
            Error::arity("exists", 1, 2).to_string(),
            "Operator `exists` expects 1 operand(s), got 2"
        );
    }

    #[test]
    fn test_config_error_from_json() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Config(_)));
    }
}

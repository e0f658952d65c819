use thiserror::Error;

/// Errors raised while reading layout definitions and data-model paths.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A data-model path could not be split into segments.
    #[error("invalid data-model path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A property declared as an expression is malformed.
    #[error("invalid expression: {reason}")]
    InvalidExpression { reason: String },

    /// Two components in one layout share the same id.
    #[error("duplicate component id '{id}' in layout")]
    DuplicateId { id: String },

    /// A layout document did not match any supported shape.
    #[error("invalid layout document: {0}")]
    InvalidLayout(String),
}

impl ModelError {
    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_expression(reason: impl Into<String>) -> Self {
        Self::InvalidExpression {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;

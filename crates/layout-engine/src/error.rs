//! Error types for hierarchy building and expression resolution.

use layout_model::ModelError;
use thiserror::Error;

/// Errors raised by the expression evaluator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    /// An argument could not be converted to the type a function expects.
    #[error("'{function}' expected {expected} for argument {position}, got {found}")]
    ArgumentType {
        function: String,
        position: usize,
        expected: &'static str,
        found: String,
    },

    /// `component` referenced an id that is not reachable from the node.
    #[error("component '{0}' not found")]
    ComponentNotFound(String),

    /// `instanceContext` was asked for a key it does not provide.
    #[error("unknown instance context key '{0}'")]
    UnknownInstanceContextKey(String),

    /// Failure reported by a custom evaluator.
    #[error("{0}")]
    Custom(String),
}

/// Errors raised while building or resolving layout trees.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Model(#[from] ModelError),

    /// An expression on a node failed to evaluate.
    #[error("failed to resolve expressions on '{node}': {source}")]
    Expression {
        node: String,
        #[source]
        source: ExprError,
    },

    /// A state-store operation named a group that does not exist.
    #[error("unknown repeating group '{0}'")]
    UnknownGroup(String),

    /// A row operation targeted a row the group does not have.
    #[error("row {index} is out of range for group '{group}' (last row {last})")]
    RowOutOfRange {
        group: String,
        index: usize,
        last: i32,
    },

    /// Appending would exceed the group's `maxCount`.
    #[error("group '{group}' already has the maximum of {max_count} rows")]
    MaxCountReached { group: String, max_count: u32 },

    /// A `children` entry points at a component that does not exist (strict mode only).
    #[error("component '{parent}' references missing child '{child}'")]
    MissingChild { parent: String, child: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;

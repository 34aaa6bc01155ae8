//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Structural defects in a raw tree document.
///
/// Validation fails fast: the first rule violated in check order wins and
/// no partial tree is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("tree is missing required key: 'title'")]
    MissingTitle,

    #[error("tree is missing required key: 'nodes'")]
    MissingNodes,

    #[error("'nodes' must be a non-empty list")]
    EmptyNodes,

    #[error("node is missing required key: '{key}'. Node: {node}")]
    MissingNodeKey { key: &'static str, node: String },

    #[error("question node '{node_id}' must have an 'options' list with at least 2 entries")]
    TooFewOptions { node_id: String },

    #[error("each option in question node '{node_id}' must have 'label' and 'next' keys")]
    IncompleteOption { node_id: String },

    #[error("option '{label}' in node '{node_id}' references unknown node id: '{target}'")]
    DanglingOption {
        node_id: String,
        label: String,
        target: String,
    },

    #[error("step node '{node_id}' must have a 'next' field")]
    MissingNext { node_id: String },

    #[error("step node '{node_id}' references unknown node id: '{target}'")]
    DanglingNext { node_id: String, target: String },

    #[error("resolution node '{node_id}' must be terminal (no 'next' or 'options' fields)")]
    TerminalWithEdges { node_id: String },

    #[error("node '{node_id}' has unknown type: '{node_type}'. Allowed types: question, step, resolution")]
    UnknownNodeType { node_id: String, node_type: String },

    #[error("tree has no 'start' node")]
    MissingStart,

    #[error("nodes not reachable from 'start': {}", .ids.join(", "))]
    UnreachableNodes { ids: Vec<String> },
}

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Session misuse errors from the navigation engine.
///
/// These indicate a caller fault (the caller should have consulted the
/// current node's variant first); they are reported, not retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("option '{label}' not found in node '{node_id}'")]
    UnknownOption { label: String, node_id: String },
}

/// Result type for navigation operations.
pub type NavigationResult<T> = Result<T, NavigationError>;

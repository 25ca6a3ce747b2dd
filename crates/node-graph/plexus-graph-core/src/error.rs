//! Error types for graph editing and rendering.

use plexus_api_core::{FunctionError, LookupError};
use thiserror::Error;

use crate::types::NodePath;

/// Structural problems, reported when a graph is edited or validated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GraphError {
    #[error("node '{node}' is not a network")]
    NotANetwork { node: String },

    #[error("network '{network}' has no child named '{child}'")]
    ChildNotFound { network: String, child: String },

    #[error("network '{network}' already has a child named '{child}'")]
    DuplicateChild { network: String, child: String },

    #[error("'{name}' is not a valid node name")]
    InvalidName { name: String },

    #[error("replacement for child '{expected}' is named '{found}'")]
    ChildNameMismatch { expected: String, found: String },

    #[error("node '{node}' has no input port '{port}'")]
    PortNotFound { node: String, port: String },

    #[error("node '{node}' already has an input port '{port}'")]
    DuplicatePort { node: String, port: String },

    #[error("port '{child}.{port}' is already published")]
    AlreadyPublished { child: String, port: String },

    #[error("network '{network}' already has an input named '{name}'")]
    PublishedNameTaken { network: String, name: String },

    #[error("network '{network}' has no published port '{name}'")]
    NotPublished { network: String, name: String },

    #[error("port '{child}.{port}' is published and cannot be connected")]
    PortIsPublished { child: String, port: String },

    #[error("nothing is connected to '{child}.{port}'")]
    ConnectionNotFound { child: String, port: String },

    #[error("connections in '{network}' form a cycle through {nodes:?}")]
    CycleDetected { network: String, nodes: Vec<String> },

    #[error("connection '{connection}' in '{network}' references a missing node or port")]
    DanglingConnection { network: String, connection: String },

    #[error("published port '{name}' on '{network}' references missing '{child}.{port}'")]
    DanglingPublication {
        network: String,
        name: String,
        child: String,
        port: String,
    },
}

/// Failures while rendering. Function-related variants name the node path
/// and function identifier they came from.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    #[error("network '{network}' has no rendered child, nothing to render")]
    NothingToRender { network: String },

    #[error("node {path} has no function")]
    MissingFunction { path: NodePath },

    #[error("node {path} cannot resolve function '{function}': {source}")]
    Resolution {
        path: NodePath,
        function: String,
        #[source]
        source: LookupError,
    },

    #[error("node {path} has {found} inputs but function '{function}' takes {expected}")]
    ArityMismatch {
        path: NodePath,
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("node {path} failed in '{function}': {source}")]
    Invocation {
        path: NodePath,
        function: String,
        #[source]
        source: FunctionError,
    },

    #[error("node {path} depends on itself")]
    Cycle { path: NodePath },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl RenderError {
    /// Path of the node the error is attributed to, when there is one.
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            RenderError::MissingFunction { path }
            | RenderError::Resolution { path, .. }
            | RenderError::ArityMismatch { path, .. }
            | RenderError::Invocation { path, .. }
            | RenderError::Cycle { path } => Some(path),
            RenderError::NothingToRender { .. } | RenderError::Graph(_) => None,
        }
    }
}

//! Errors raised by the function layer.

use thiserror::Error;

/// Failure to resolve a `"namespace/name"` identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("malformed function identifier '{0}', expected 'namespace/name'")]
    MalformedIdentifier(String),

    #[error("unknown namespace '{namespace}' while resolving '{identifier}'")]
    UnknownNamespace {
        namespace: String,
        identifier: String,
    },

    #[error("function '{name}' not found in namespace '{namespace}'")]
    UnknownFunction { namespace: String, name: String },
}

/// Failure raised by a function body during a single invocation.
#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("expected {expected} arguments, got {found}")]
    ArgumentCount { expected: usize, found: usize },

    #[error("argument {index} is invalid: {reason}")]
    InvalidArgument { index: usize, reason: String },

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FunctionError {
    pub fn invalid(index: usize, reason: impl Into<String>) -> Self {
        FunctionError::InvalidArgument {
            index,
            reason: reason.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        FunctionError::Failed(message.into())
    }
}

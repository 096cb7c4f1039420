//! Error handling for layerwarp
//!
//! Provides the error type raised at the host boundary: descriptor
//! rejection, result shape, missing document and history scope.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Host error type
///
/// Represents failures reported by, or detected while talking to, the host
/// application: rejected descriptors, unexpected result shapes and history
/// suspension failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    /// The host refused to apply a descriptor
    #[error("Host rejected '{verb}' descriptor: {reason}")]
    Rejected {
        /// The `_obj` verb of the rejected descriptor.
        verb: String,
        /// The reason given by the host.
        reason: String,
    },

    /// A result did not carry a field the caller depends on
    #[error("Unexpected result for '{verb}': missing field '{field}'")]
    UnexpectedResult {
        /// The `_obj` verb of the descriptor that produced the result.
        verb: String,
        /// The field that was expected in the result.
        field: String,
    },

    /// There is no document open in the host
    #[error("No active document")]
    NoActiveDocument,

    /// History suspension or resumption failed
    #[error("History error: {reason}")]
    History {
        /// The reason reported by the host.
        reason: String,
    },
}

impl HostError {
    /// Create a rejection for the given verb
    pub fn rejected(verb: impl Into<String>, reason: impl Into<String>) -> Self {
        HostError::Rejected {
            verb: verb.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing-field error for the given verb
    pub fn missing_field(verb: impl Into<String>, field: impl Into<String>) -> Self {
        HostError::UnexpectedResult {
            verb: verb.into(),
            field: field.into(),
        }
    }
}

/// Result type for host operations
pub type Result<T> = std::result::Result<T, HostError>;

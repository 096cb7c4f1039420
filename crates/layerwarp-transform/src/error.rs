//! Error types for transform runs
//!
//! Host failures are fatal for the whole run and are wrapped unchanged.
//! The remaining variants cover misuse of the state machines, overlapping
//! runs on one document, and unusable UI input.

use layerwarp_core::{DocumentId, HostError};
use thiserror::Error;

/// Errors raised while planning or running a multi-layer transform
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// A host command or history call failed
    #[error(transparent)]
    Host(#[from] HostError),

    /// A state machine was driven out of order
    #[error("Invalid state transition: cannot {requested} while {current}")]
    InvalidStateTransition {
        /// The state the machine was in.
        current: String,
        /// The step that was requested.
        requested: String,
    },

    /// Another run holds the document
    #[error("Document {document} is busy with another transform")]
    Busy {
        /// The contended document.
        document: DocumentId,
    },

    /// A UI parameter could not be used
    #[error("Invalid parameter '{param}': {reason}")]
    InvalidParameter {
        /// The parameter name.
        param: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl TransformError {
    /// Create an invalid-transition error
    pub fn invalid_transition(current: impl ToString, requested: impl Into<String>) -> Self {
        TransformError::InvalidStateTransition {
            current: current.to_string(),
            requested: requested.into(),
        }
    }

    /// Create an invalid-parameter error
    pub fn invalid_parameter(param: impl Into<String>, reason: impl Into<String>) -> Self {
        TransformError::InvalidParameter {
            param: param.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error came from the host
    pub fn is_host_error(&self) -> bool {
        matches!(self, TransformError::Host(_))
    }
}

/// Result type for transform operations
pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_is_transparent() {
        let err: TransformError = HostError::rejected("cut", "no selection").into();
        assert!(err.is_host_error());
        assert_eq!(
            err.to_string(),
            "Host rejected 'cut' descriptor: no selection"
        );
    }

    #[test]
    fn test_busy_display() {
        let err = TransformError::Busy {
            document: DocumentId(7),
        };
        assert_eq!(err.to_string(), "Document doc#7 is busy with another transform");
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = TransformError::invalid_transition("consumed", "reload");
        assert_eq!(
            err.to_string(),
            "Invalid state transition: cannot reload while consumed"
        );
    }
}

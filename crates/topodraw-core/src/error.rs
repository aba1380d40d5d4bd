//! Error types shared by the drawing engine, the project mutators and the
//! command history.

use thiserror::Error;

/// Coarse classification of an [`EditorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed request: missing endpoint, self-connection, unknown type.
    Validation,
    /// Operation invoked outside its valid state.
    State,
    /// A device, connection, anchor or history cap was reached.
    LimitExceeded,
    /// Unknown device, connection or command id.
    NotFound,
}

/// Errors produced by editor operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("A connection cannot start and end on the same device")]
    SelfConnection,
    #[error("Unknown connection type: {0}")]
    InvalidConnectionType(String),
    #[error("Connection is missing its {0} endpoint")]
    MissingEndpoint(&'static str),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("{what} limit of {limit} reached")]
    LimitExceeded { what: &'static str, limit: usize },
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl EditorError {
    /// Build a [`EditorError::NotFound`] from any displayable id.
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Build an [`EditorError::InvalidState`].
    pub fn state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SelfConnection
            | Self::InvalidConnectionType(_)
            | Self::MissingEndpoint(_)
            | Self::InvalidConfig(_) => ErrorKind::Validation,
            Self::InvalidState(_) | Self::CommandFailed(_) => ErrorKind::State,
            Self::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            Self::NotFound { .. } => ErrorKind::NotFound,
        }
    }
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(EditorError::SelfConnection.kind(), ErrorKind::Validation);
        assert_eq!(
            EditorError::InvalidConnectionType("laser".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(EditorError::state("idle").kind(), ErrorKind::State);
        assert_eq!(
            EditorError::LimitExceeded { what: "history", limit: 3 }.kind(),
            ErrorKind::LimitExceeded
        );
        assert_eq!(EditorError::not_found("device", "abc").kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_error_messages() {
        let err = EditorError::LimitExceeded { what: "Connection", limit: 10 };
        assert_eq!(err.to_string(), "Connection limit of 10 reached");

        let err = EditorError::not_found("Device", "r1");
        assert_eq!(err.to_string(), "Device not found: r1");
    }
}

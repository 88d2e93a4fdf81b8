//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid connection URI: {0}")]
    InvalidUri(String),

    #[error("Unsupported database: {0}")]
    UnsupportedDatabase(String),

    #[error("Not connected to a database. Use /connect <uri> first.")]
    NotConnected,

    #[error("Statement rejected by read-only sandbox: {0}")]
    SandboxViolation(String),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),
}

impl DomainError {
    /// Check if this error means there is no active connection
    pub fn is_not_connected(&self) -> bool {
        matches!(self, DomainError::NotConnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_connected_display() {
        let error = DomainError::NotConnected;
        assert!(error.to_string().starts_with("Not connected"));
    }

    #[test]
    fn test_is_not_connected_check() {
        assert!(DomainError::NotConnected.is_not_connected());
        assert!(!DomainError::InvalidUri("x".to_string()).is_not_connected());
        assert!(!DomainError::SandboxViolation("DROP".to_string()).is_not_connected());
    }
}

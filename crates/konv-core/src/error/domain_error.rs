//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::ChannelId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Channel not found: {0}")]
    ChannelNotFound(ChannelId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Channel name already present: {name}")]
    DuplicateChannelName { name: String },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::DuplicateChannelName { .. } => "DUPLICATE_CHANNEL_NAME",
            Self::StorageError(_) => "STORAGE_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ChannelNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::DuplicateChannelName { .. })
    }

    /// Wrap a storage backend failure
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::StorageError(err.to_string())
    }
}

/// Failure to deliver one chunk to one target
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Delivery to {target} failed: {reason}")]
pub struct TransportError {
    pub target: String,
    pub reason: String,
}

impl TransportError {
    #[must_use]
    pub fn new(target: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::ChannelNotFound(ChannelId::new("c1"));
        assert_eq!(err.code(), "UNKNOWN_CHANNEL");

        let err = DomainError::DuplicateChannelName {
            name: "alerts".to_string(),
        };
        assert_eq!(err.code(), "DUPLICATE_CHANNEL_NAME");
    }

    #[test]
    fn test_classification() {
        assert!(DomainError::ChannelNotFound(ChannelId::new("c1")).is_not_found());
        assert!(!DomainError::storage("down").is_not_found());
        assert!(DomainError::DuplicateChannelName {
            name: "x".to_string()
        }
        .is_conflict());
        assert!(DomainError::ValidationError("bad".to_string()).is_validation());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::ChannelNotFound(ChannelId::new("abc"));
        assert_eq!(err.to_string(), "Channel not found: abc");

        let err = DomainError::from(TransportError::new("chat42", "bot was blocked"));
        assert_eq!(err.to_string(), "Delivery to chat42 failed: bot was blocked");
    }
}

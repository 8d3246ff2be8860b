//! Error types for the policy crate.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for policy store operations.
pub type PolicyResult<T> = Result<T, PolicyStoreError>;

/// Errors that can occur while managing policies and groups.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PolicyStoreError {
    /// A subject, resource or action pattern does not compile.
    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        message: String,
    },

    /// A condition is not well formed.
    #[error("invalid condition {key:?}: {message}")]
    InvalidCondition {
        /// Context key the condition applies to.
        key: String,
        /// Explanation.
        message: String,
    },

    /// A policy with the same ID already exists.
    #[error("policy already exists: {0}")]
    DuplicatePolicy(String),

    /// Policy not found.
    #[error("policy not found: {0}")]
    PolicyNotFound(String),

    /// Group not found.
    #[error("group not found: {0}")]
    GroupNotFound(String),

    /// A group with the same ID already exists.
    #[error("group already exists: {0}")]
    DuplicateGroup(String),

    /// Policy document loading failed.
    #[error("failed to load policies from {path}: {message}")]
    DocumentLoad {
        /// Path to the document.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PolicyStoreError {
    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create an invalid condition error.
    pub fn invalid_condition(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCondition {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a document load error.
    pub fn document_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DocumentLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this is a not-found error.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::PolicyNotFound(_) | Self::GroupNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pattern_error() {
        let err = PolicyStoreError::invalid_pattern("<[>", "unclosed class");
        assert!(err.to_string().contains("<[>"));
        assert!(err.to_string().contains("unclosed class"));
    }

    #[test]
    fn test_not_found() {
        assert!(PolicyStoreError::PolicyNotFound("p1".to_string()).is_not_found());
        assert!(PolicyStoreError::GroupNotFound("g".to_string()).is_not_found());
        assert!(!PolicyStoreError::DuplicatePolicy("p1".to_string()).is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = PolicyStoreError::DuplicatePolicy("p1".to_string());
        assert_eq!(err.to_string(), "policy already exists: p1");
    }
}

//! Error types for the warden facade.

use thiserror::Error;
use warden_core::{AuthorizationContext, ErrorKind, WardenError};

/// Errors raised while assembling a [`Warden`](crate::Warden).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A required collaborator was not supplied.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// A setting is out of range.
    #[error("invalid setting {field}: {reason}")]
    InvalidSetting {
        /// The offending setting.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// A rejected [`token_allowed`](crate::Warden::token_allowed) call.
///
/// Carries the partial context alongside the error: on a policy denial only
/// [`subject`](AuthorizationContext::subject) is set, and when the token
/// itself was rejected the context is empty.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}")]
pub struct TokenDenied {
    /// Partial context.
    pub context: AuthorizationContext,
    /// Why the request was rejected.
    #[source]
    pub error: WardenError,
}

impl TokenDenied {
    /// Rejection with an empty context.
    pub fn anonymous(error: WardenError) -> Self {
        Self {
            context: AuthorizationContext::default(),
            error,
        }
    }

    /// Rejection that identifies the subject.
    pub fn for_subject(subject: impl Into<String>, error: WardenError) -> Self {
        Self {
            context: AuthorizationContext::for_subject(subject),
            error,
        }
    }

    /// Subject of the partial context; empty when the token was rejected.
    pub fn subject(&self) -> &str {
        &self.context.subject
    }

    /// Caller-visible class of the error.
    pub const fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    /// Drops the context.
    pub fn into_error(self) -> WardenError {
        self.error
    }
}

impl From<TokenDenied> for WardenError {
    fn from(denied: TokenDenied) -> Self {
        denied.error
    }
}

//! Error taxonomy for the warden.
//!
//! Callers see exactly one of three kinds ([`ErrorKind`]). Finer detail,
//! such as which collaborator failed or which policy matched, stays in the
//! audit trail and is never carried by a [`WardenError`].
//!
//! | Variant | Kind | Status |
//! |---|---|---|
//! | `AuthenticationFailure` | `Authentication` | 401 |
//! | `Forbidden` | `Authorization` | 403 |
//! | `DependencyFailure` | `Dependency` | 503 |

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`WardenError`].
pub type WardenResult<T> = Result<T, WardenError>;

/// Classification of a failed token introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntrospectionErrorKind {
    /// The token is past its expiry.
    TokenExpired,
    /// The token is unknown or not well formed.
    TokenMalformed,
    /// No token was presented.
    TokenMissing,
    /// The token lacks a required scope.
    ScopeInsufficient,
    /// The token backend could not be reached.
    IntrospectionUnavailable,
}

impl IntrospectionErrorKind {
    /// Stable snake_case name, used in logs and metric tags.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TokenExpired => "token_expired",
            Self::TokenMalformed => "token_malformed",
            Self::TokenMissing => "token_missing",
            Self::ScopeInsufficient => "scope_insufficient",
            Self::IntrospectionUnavailable => "introspection_unavailable",
        }
    }
}

impl std::fmt::Display for IntrospectionErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified introspection failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct IntrospectionError {
    /// Failure class.
    pub kind: IntrospectionErrorKind,
    /// Provider detail.
    pub message: String,
}

impl IntrospectionError {
    /// Creates a classified failure.
    pub fn new(kind: IntrospectionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Raw error reported by an OAuth2 provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// The token is past its expiry.
    #[error("token expired")]
    TokenExpired,
    /// The token was not recognised.
    #[error("token not found")]
    NotFound,
    /// The request is unauthorized, e.g. a bad signature.
    #[error("request unauthorized: {0}")]
    RequestUnauthorized(String),
    /// The request itself is invalid, e.g. a token of the wrong shape.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// A required scope was not granted.
    #[error("invalid scope: {0}")]
    InvalidScope(String),
    /// The provider backend failed.
    #[error("server error: {0}")]
    Server(String),
}

/// Error returned by a [`GroupResolver`](crate::GroupResolver) backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("group backend error: {0}")]
pub struct GroupError(pub String);

/// Error returned by a [`PolicyEvaluator`](crate::PolicyEvaluator) backend.
///
/// A request that no policy references is not an error; evaluators return
/// [`Verdict::NoMatch`](crate::Verdict::NoMatch) for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("policy backend error: {0}")]
pub struct PolicyError(pub String);

/// Collaborator that failed while a decision was being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dependency {
    /// Group membership backend.
    GroupResolver,
    /// Policy backend.
    PolicyEvaluator,
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GroupResolver => write!(f, "group_resolver"),
            Self::PolicyEvaluator => write!(f, "policy_evaluator"),
        }
    }
}

/// Caller-visible error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The token could not be authenticated.
    Authentication,
    /// The policy decision point denied the request.
    Authorization,
    /// Policy could not be evaluated.
    Dependency,
}

impl ErrorKind {
    /// Default HTTP status for this kind.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::Dependency => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Error returned by the warden entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WardenError {
    /// Token expired, malformed, missing or under-scoped.
    #[error("authentication failed: {source}")]
    AuthenticationFailure {
        /// Classified introspection failure.
        #[from]
        source: IntrospectionError,
    },

    /// The request is forbidden. Covers both plain and forceful denial.
    #[error("request forbidden: {reason}")]
    Forbidden {
        /// Caller-facing deny reason. Never names a policy or identity.
        reason: String,
    },

    /// A collaborator failed or timed out; the request fails closed.
    ///
    /// Which collaborator failed, and why, is recorded in the audit trail.
    #[error("the policy decision point could not evaluate the request")]
    DependencyFailure,
}

impl WardenError {
    /// Creates a forbidden error.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Caller-visible class.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationFailure { .. } => ErrorKind::Authentication,
            Self::Forbidden { .. } => ErrorKind::Authorization,
            Self::DependencyFailure => ErrorKind::Dependency,
        }
    }

    /// HTTP status for this error.
    pub const fn status_code(&self) -> StatusCode {
        self.kind().default_status_code()
    }

    /// Whether the request was denied by policy.
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    /// Introspection classification, for authentication failures.
    pub const fn introspection_kind(&self) -> Option<IntrospectionErrorKind> {
        match self {
            Self::AuthenticationFailure { source } => Some(source.kind),
            _ => None,
        }
    }
}

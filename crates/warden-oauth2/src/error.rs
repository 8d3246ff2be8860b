//! Error types for the token store.

use thiserror::Error;

/// Result type for token store operations.
pub type OAuth2Result<T> = Result<T, TokenStoreError>;

/// Errors raised when storing tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TokenStoreError {
    /// The token is not of the form `<key>.<signature>`.
    #[error("malformed token: expected <key>.<signature>")]
    MalformedToken,

    /// A token with the same signature is already stored.
    #[error("token signature already stored")]
    DuplicateSignature,
}

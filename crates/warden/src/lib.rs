//! # Warden
//!
//! Policy-based authorization decision point for OAuth2 protected resources.
//!
//! The [`Warden`] answers two questions:
//!
//! - [`Warden::is_allowed`]: may this already-authenticated subject perform
//!   this action on this resource?
//! - [`Warden::token_allowed`]: does this bearer token authenticate, carry the
//!   demanded scopes, and may its subject perform the action?
//!
//! Each decision expands the subject into its groups, evaluates every
//! identity separately and combines the results. A force deny from any
//! identity cannot be outvoted. Every decision produces one metric and one
//! audit event.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use chrono::Utc;
//! use warden::prelude::*;
//! use warden_core::{AccessRequester, Client, TokenKind, TokenSession};
//! use warden_oauth2::MemoryTokenStore;
//! use warden_policy::{Effect, Group, MemoryGroupManager, MemoryPolicyManager, Policy};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let policies = MemoryPolicyManager::new();
//! policies.create(
//!     Policy::new("articles-readers", Effect::Allow)
//!         .with_subjects(["readers"])
//!         .with_resources(["resources:articles:<.*>"])
//!         .with_actions(["read"]),
//! )?;
//!
//! let groups = MemoryGroupManager::new();
//! groups.create_group(Group::new("readers", ["alice"]))?;
//!
//! let tokens = Arc::new(MemoryTokenStore::new(Duration::from_secs(3600)));
//! let token = tokens.issue(
//!     TokenKind::AccessToken,
//!     AccessRequester::new(Client::new("app"), ["core"], Utc::now(), TokenSession::new("alice")),
//! );
//!
//! let warden = Warden::builder()
//!     .provider(tokens)
//!     .groups(Arc::new(groups))
//!     .policies(Arc::new(policies))
//!     .issuer("https://auth.example.com")
//!     .build()?;
//!
//! let request = TokenAccessRequest::new("resources:articles:1", "read");
//! let ctx = warden.token_allowed(&token, &request, &["core"]).await?;
//! println!("{} may read", ctx.subject);
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/warden/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod warden;

pub use context::build_context;
pub use error::{BuildError, TokenDenied};
pub use warden::{
    Warden, WardenBuilder, DEFAULT_ACCESS_TOKEN_LIFESPAN, DEFAULT_COLLABORATOR_TIMEOUT,
    REASON_ALLOWED, REASON_BAD_TOKEN, REASON_DENIED, REASON_EMPTY_SUBJECT, REASON_UNAVAILABLE,
};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{BuildError, TokenDenied, Warden, WardenBuilder};
    pub use warden_core::{
        AccessRequest, AuthorizationContext, ErrorKind, IntrospectionErrorKind,
        TokenAccessRequest, WardenError,
    };
}

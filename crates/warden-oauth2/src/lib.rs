//! # Warden OAuth2
//!
//! OAuth2 plumbing for the Warden:
//!
//! - [`Introspector`] validates access tokens through an
//!   [`OAuth2Provider`](warden_core::OAuth2Provider) and classifies failures
//! - [`scope`] implements hierarchic scope matching
//! - [`MemoryTokenStore`] is an in-memory provider, kept tidy by
//!   [`spawn_cleanup_job`]
//! - [`token_from_request`] pulls the bearer token out of an HTTP request

#![doc(html_root_url = "https://docs.rs/warden-oauth2/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cleanup;
mod error;
mod extract;
mod introspector;
pub mod scope;
mod store;

pub use cleanup::{spawn_cleanup_job, CleanupJob};
pub use error::{OAuth2Result, TokenStoreError};
pub use extract::{token_from_request, ACCESS_TOKEN_PARAM};
pub use introspector::{classify, Introspector};
pub use store::{expiry_of, fallback_expiry, lifespan_delta, signature, MemoryTokenStore};

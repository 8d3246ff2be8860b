//! Authorization context construction.

use std::time::Duration;

use warden_core::{AuthorizationContext, Session};
use warden_oauth2::fallback_expiry;

/// Builds the caller-facing context for an authenticated session.
///
/// The expiry is the session's own when it has one, otherwise
/// `requested_at + access_token_lifespan`, saturating at the latest
/// representable time. A built context always carries an expiry.
///
/// ```
/// use std::collections::BTreeSet;
/// use std::time::Duration;
/// use chrono::{TimeDelta, Utc};
/// use warden::build_context;
/// use warden_core::Session;
///
/// let requested_at = Utc::now();
/// let session = Session {
///     subject: "alice".to_string(),
///     granted_scopes: BTreeSet::from(["core".to_string()]),
///     client_id: "app".to_string(),
///     requested_at,
///     expires_at: None,
///     extra: Default::default(),
/// };
///
/// let ctx = build_context(&session, "https://auth.example.com", Duration::from_secs(3600));
/// assert_eq!(ctx.audience, "app");
/// assert_eq!(ctx.expires_at, Some(requested_at + TimeDelta::hours(1)));
/// ```
pub fn build_context(
    session: &Session,
    issuer: &str,
    access_token_lifespan: Duration,
) -> AuthorizationContext {
    let expires_at = session
        .expires_at
        .unwrap_or_else(|| fallback_expiry(session.requested_at, access_token_lifespan));

    AuthorizationContext {
        subject: session.subject.clone(),
        granted_scopes: session.granted_scopes.clone(),
        issuer: issuer.to_string(),
        audience: session.client_id.clone(),
        issued_at: Some(session.requested_at),
        expires_at: Some(expires_at),
        extra: session.extra.clone(),
    }
}

//! In-memory token store.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;
use warden_core::{AccessRequester, OAuth2Provider, ProviderError, TokenKind};

use crate::error::{OAuth2Result, TokenStoreError};
use crate::scope::missing_scope;

/// Splits a `<key>.<signature>` token and returns the signature.
pub fn signature(token: &str) -> Option<&str> {
    let (key, sig) = token.split_once('.')?;
    if key.is_empty() || sig.is_empty() || sig.contains('.') {
        return None;
    }
    Some(sig)
}

/// Converts a lifespan to a chrono delta, saturating on overflow.
pub fn lifespan_delta(lifespan: Duration) -> TimeDelta {
    TimeDelta::from_std(lifespan).unwrap_or(TimeDelta::MAX)
}

/// `requested_at + lifespan`, saturating at the latest representable time.
pub fn fallback_expiry(requested_at: DateTime<Utc>, lifespan: Duration) -> DateTime<Utc> {
    requested_at
        .checked_add_signed(lifespan_delta(lifespan))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// When a token expires: its explicit expiry, or `requested_at + lifespan`.
pub fn expiry_of(requester: &AccessRequester, kind: TokenKind, lifespan: Duration) -> DateTime<Utc> {
    requester
        .session()
        .expires_at(kind)
        .unwrap_or_else(|| fallback_expiry(requester.requested_at(), lifespan))
}

/// Thread-safe store of issued tokens, keyed by signature.
///
/// Implements [`OAuth2Provider`] so it can back a
/// [`Introspector`](crate::Introspector) directly.
#[derive(Debug)]
pub struct MemoryTokenStore {
    access_token_lifespan: Duration,
    refresh_token_lifespan: Duration,
    tokens: RwLock<HashMap<TokenKind, HashMap<String, AccessRequester>>>,
}

impl MemoryTokenStore {
    /// Creates a store. Refresh tokens live as long as access tokens unless
    /// configured otherwise.
    pub fn new(access_token_lifespan: Duration) -> Self {
        Self {
            access_token_lifespan,
            refresh_token_lifespan: access_token_lifespan,
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Sets the refresh token lifespan.
    pub fn with_refresh_token_lifespan(mut self, lifespan: Duration) -> Self {
        self.refresh_token_lifespan = lifespan;
        self
    }

    /// Lifespan applied to tokens of `kind` without an explicit expiry.
    pub fn lifespan(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::AccessToken => self.access_token_lifespan,
            TokenKind::RefreshToken => self.refresh_token_lifespan,
        }
    }

    /// Generates a fresh token for `requester` and stores it.
    pub fn issue(&self, kind: TokenKind, requester: AccessRequester) -> String {
        let token = format!("{}.{}", Uuid::now_v7().simple(), Uuid::now_v7().simple());
        if let Some(sig) = signature(&token) {
            self.tokens
                .write()
                .entry(kind)
                .or_default()
                .insert(sig.to_string(), requester);
        }
        token
    }

    /// Stores a caller-supplied token.
    pub fn insert(
        &self,
        kind: TokenKind,
        token: &str,
        requester: AccessRequester,
    ) -> OAuth2Result<()> {
        let sig = signature(token).ok_or(TokenStoreError::MalformedToken)?;
        let mut tokens = self.tokens.write();
        let by_sig = tokens.entry(kind).or_default();
        if by_sig.contains_key(sig) {
            return Err(TokenStoreError::DuplicateSignature);
        }
        by_sig.insert(sig.to_string(), requester);
        Ok(())
    }

    /// Removes a token. Returns whether it was stored.
    pub fn revoke(&self, kind: TokenKind, token: &str) -> bool {
        let Some(sig) = signature(token) else {
            return false;
        };
        self.tokens
            .write()
            .get_mut(&kind)
            .and_then(|by_sig| by_sig.remove(sig))
            .is_some()
    }

    /// Deletes access tokens requested more than `lifespan` ago and returns
    /// how many were removed.
    pub fn remove_old_access_tokens(&self, lifespan: Duration) -> usize {
        let cutoff = Utc::now()
            .checked_sub_signed(lifespan_delta(lifespan))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut tokens = self.tokens.write();
        let Some(by_sig) = tokens.get_mut(&TokenKind::AccessToken) else {
            return 0;
        };
        let before = by_sig.len();
        by_sig.retain(|_, requester| requester.requested_at() >= cutoff);
        before - by_sig.len()
    }

    /// Number of stored tokens of `kind`.
    pub fn len(&self, kind: TokenKind) -> usize {
        self.tokens.read().get(&kind).map_or(0, HashMap::len)
    }
}

#[async_trait]
impl OAuth2Provider for MemoryTokenStore {
    async fn introspect_token(
        &self,
        token: &str,
        kind: TokenKind,
        scopes: &[String],
    ) -> Result<AccessRequester, ProviderError> {
        let sig = signature(token).ok_or_else(|| {
            ProviderError::InvalidRequest("token is not of the form <key>.<signature>".to_string())
        })?;

        let requester = self
            .tokens
            .read()
            .get(&kind)
            .and_then(|by_sig| by_sig.get(sig))
            .cloned()
            .ok_or(ProviderError::NotFound)?;

        if Utc::now() > expiry_of(&requester, kind, self.lifespan(kind)) {
            debug!(%kind, "token past expiry");
            return Err(ProviderError::TokenExpired);
        }

        if let Some(scope) = missing_scope(requester.granted_scopes(), scopes) {
            return Err(ProviderError::InvalidScope(format!(
                "the token was not granted scope {scope}"
            )));
        }

        Ok(requester)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::{Client, TokenSession};

    fn requester(requested_at: DateTime<Utc>) -> AccessRequester {
        AccessRequester::new(
            Client::new("app"),
            ["core"],
            requested_at,
            TokenSession::new("alice"),
        )
    }

    fn scopes(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_fallback_expiry_saturates() {
        let now = Utc::now();
        assert_eq!(
            fallback_expiry(now, Duration::from_secs(60)),
            now + TimeDelta::seconds(60)
        );
        assert_eq!(
            fallback_expiry(now, Duration::from_secs(u64::MAX / 4)),
            DateTime::<Utc>::MAX_UTC
        );
    }

    #[test]
    fn test_signature() {
        assert_eq!(signature("key.sig"), Some("sig"));
        assert_eq!(signature("nodot"), None);
        assert_eq!(signature(".sig"), None);
        assert_eq!(signature("key."), None);
        assert_eq!(signature("a.b.c"), None);
    }

    #[tokio::test]
    async fn test_issue_and_introspect() {
        let store = MemoryTokenStore::new(Duration::from_secs(3600));
        let token = store.issue(TokenKind::AccessToken, requester(Utc::now()));

        let found = store
            .introspect_token(&token, TokenKind::AccessToken, &scopes(&["core.read"]))
            .await
            .unwrap();
        assert_eq!(found.session().subject, "alice");
    }

    #[tokio::test]
    async fn test_wrong_kind_not_found() {
        let store = MemoryTokenStore::new(Duration::from_secs(3600));
        let token = store.issue(TokenKind::RefreshToken, requester(Utc::now()));

        let err = store
            .introspect_token(&token, TokenKind::AccessToken, &[])
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::NotFound);
    }

    #[tokio::test]
    async fn test_malformed_token() {
        let store = MemoryTokenStore::new(Duration::from_secs(3600));
        let err = store
            .introspect_token("garbage", TokenKind::AccessToken, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_expired_by_lifespan() {
        let store = MemoryTokenStore::new(Duration::from_secs(60));
        let token = store.issue(
            TokenKind::AccessToken,
            requester(Utc::now() - TimeDelta::seconds(120)),
        );

        let err = store
            .introspect_token(&token, TokenKind::AccessToken, &[])
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::TokenExpired);
    }

    #[tokio::test]
    async fn test_explicit_expiry_wins() {
        let store = MemoryTokenStore::new(Duration::from_secs(60));
        let session = TokenSession::new("alice")
            .with_expiry(TokenKind::AccessToken, Utc::now() + TimeDelta::hours(1));
        let old = AccessRequester::new(
            Client::new("app"),
            ["core"],
            Utc::now() - TimeDelta::seconds(120),
            session,
        );
        let token = store.issue(TokenKind::AccessToken, old);

        assert!(store
            .introspect_token(&token, TokenKind::AccessToken, &[])
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_insufficient_scope() {
        let store = MemoryTokenStore::new(Duration::from_secs(3600));
        let token = store.issue(TokenKind::AccessToken, requester(Utc::now()));

        let err = store
            .introspect_token(&token, TokenKind::AccessToken, &scopes(&["admin"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidScope(_)));
    }

    #[test]
    fn test_insert_and_revoke() {
        let store = MemoryTokenStore::new(Duration::from_secs(3600));
        store
            .insert(TokenKind::AccessToken, "k.s", requester(Utc::now()))
            .unwrap();
        assert_eq!(
            store.insert(TokenKind::AccessToken, "other.s", requester(Utc::now())),
            Err(TokenStoreError::DuplicateSignature)
        );
        assert_eq!(
            store.insert(TokenKind::AccessToken, "bad", requester(Utc::now())),
            Err(TokenStoreError::MalformedToken)
        );

        assert!(store.revoke(TokenKind::AccessToken, "k.s"));
        assert!(!store.revoke(TokenKind::AccessToken, "k.s"));
    }

    #[test]
    fn test_remove_old_access_tokens() {
        let store = MemoryTokenStore::new(Duration::from_secs(60));
        store.issue(TokenKind::AccessToken, requester(Utc::now()));
        store.issue(
            TokenKind::AccessToken,
            requester(Utc::now() - TimeDelta::seconds(300)),
        );
        store.issue(
            TokenKind::RefreshToken,
            requester(Utc::now() - TimeDelta::seconds(300)),
        );

        assert_eq!(store.remove_old_access_tokens(Duration::from_secs(60)), 1);
        assert_eq!(store.len(TokenKind::AccessToken), 1);
        assert_eq!(store.len(TokenKind::RefreshToken), 1);
    }
}

//! Token introspection with failure classification.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};
use warden_core::{
    IntrospectionError, IntrospectionErrorKind, OAuth2Provider, ProviderError, Session, TokenKind,
};

/// Maps a provider failure onto the warden's introspection classes.
pub fn classify(error: &ProviderError) -> IntrospectionErrorKind {
    match error {
        ProviderError::TokenExpired => IntrospectionErrorKind::TokenExpired,
        ProviderError::NotFound
        | ProviderError::RequestUnauthorized(_)
        | ProviderError::InvalidRequest(_) => IntrospectionErrorKind::TokenMalformed,
        ProviderError::InvalidScope(_) => IntrospectionErrorKind::ScopeInsufficient,
        _ => IntrospectionErrorKind::IntrospectionUnavailable,
    }
}

/// Introspects access tokens through an [`OAuth2Provider`].
///
/// Every failure comes back as exactly one [`IntrospectionErrorKind`].
#[derive(Clone)]
pub struct Introspector {
    provider: Arc<dyn OAuth2Provider>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for Introspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Introspector")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Introspector {
    /// Creates an adapter over `provider`.
    pub fn new(provider: Arc<dyn OAuth2Provider>) -> Self {
        Self {
            provider,
            timeout: None,
        }
    }

    /// Bounds every provider call. An elapsed call is
    /// [`IntrospectionErrorKind::IntrospectionUnavailable`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validates an access token carrying every scope in `scopes`.
    #[instrument(skip_all, fields(scopes = ?scopes))]
    pub async fn introspect(
        &self,
        token: &str,
        scopes: &[String],
    ) -> Result<Session, IntrospectionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(IntrospectionError::new(
                IntrospectionErrorKind::TokenMissing,
                "no token was presented",
            ));
        }

        let call = self
            .provider
            .introspect_token(token, TokenKind::AccessToken, scopes);

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                IntrospectionError::new(
                    IntrospectionErrorKind::IntrospectionUnavailable,
                    format!("introspection timed out after {}ms", limit.as_millis()),
                )
            })?,
            None => call.await,
        };

        match result {
            Ok(requester) => Ok(requester.into_session(TokenKind::AccessToken)),
            Err(e) => {
                let kind = classify(&e);
                debug!(%kind, error = %e, "introspection failed");
                Err(IntrospectionError::new(kind, e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use warden_core::{AccessRequester, Client, TokenSession};

    struct Scripted {
        result: Result<(), ProviderError>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(result: Result<(), ProviderError>) -> Self {
            Self {
                result,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl OAuth2Provider for Scripted {
        async fn introspect_token(
            &self,
            _token: &str,
            _kind: TokenKind,
            _scopes: &[String],
        ) -> Result<AccessRequester, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.result.clone().map(|()| {
                AccessRequester::new(
                    Client::new("app"),
                    ["core"],
                    Utc::now(),
                    TokenSession::new("alice"),
                )
            })
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            classify(&ProviderError::TokenExpired),
            IntrospectionErrorKind::TokenExpired
        );
        assert_eq!(
            classify(&ProviderError::NotFound),
            IntrospectionErrorKind::TokenMalformed
        );
        assert_eq!(
            classify(&ProviderError::RequestUnauthorized("sig".to_string())),
            IntrospectionErrorKind::TokenMalformed
        );
        assert_eq!(
            classify(&ProviderError::InvalidRequest("shape".to_string())),
            IntrospectionErrorKind::TokenMalformed
        );
        assert_eq!(
            classify(&ProviderError::InvalidScope("admin".to_string())),
            IntrospectionErrorKind::ScopeInsufficient
        );
        assert_eq!(
            classify(&ProviderError::Server("down".to_string())),
            IntrospectionErrorKind::IntrospectionUnavailable
        );
    }

    #[tokio::test]
    async fn test_success_flattens_session() {
        let introspector = Introspector::new(Arc::new(Scripted::new(Ok(()))));
        let session = introspector.introspect("k.s", &[]).await.unwrap();
        assert_eq!(session.subject, "alice");
        assert_eq!(session.client_id, "app");
    }

    #[tokio::test]
    async fn test_empty_token_skips_provider() {
        let provider = Arc::new(Scripted::new(Ok(())));
        let introspector = Introspector::new(provider.clone());

        let err = introspector.introspect("   ", &[]).await.unwrap_err();
        assert_eq!(err.kind, IntrospectionErrorKind::TokenMissing);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_error_classified() {
        let introspector =
            Introspector::new(Arc::new(Scripted::new(Err(ProviderError::TokenExpired))));
        let err = introspector.introspect("k.s", &[]).await.unwrap_err();
        assert_eq!(err.kind, IntrospectionErrorKind::TokenExpired);
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let mut provider = Scripted::new(Ok(()));
        provider.delay = Duration::from_millis(200);
        let introspector =
            Introspector::new(Arc::new(provider)).with_timeout(Duration::from_millis(10));

        let err = introspector.introspect("k.s", &[]).await.unwrap_err();
        assert_eq!(err.kind, IntrospectionErrorKind::IntrospectionUnavailable);
    }
}

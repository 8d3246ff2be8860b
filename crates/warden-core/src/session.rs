//! Authenticated sessions and the caller-facing authorization context.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of OAuth2 token being introspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Bearer access token.
    AccessToken,
    /// Refresh token.
    RefreshToken,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessToken => write!(f, "access_token"),
            Self::RefreshToken => write!(f, "refresh_token"),
        }
    }
}

/// The OAuth2 client a token was issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Client identifier.
    pub id: String,
}

impl Client {
    /// Creates a client with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Provider-side session attached to a stored token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenSession {
    /// Subject the token was issued for.
    pub subject: String,
    /// Explicit expiry per token kind. Absent kinds fall back to the lifespan.
    #[serde(default)]
    pub expires_at: BTreeMap<TokenKind, DateTime<Utc>>,
    /// Extra claims.
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl TokenSession {
    /// Creates a session for a subject with no explicit expiry.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }

    /// Sets the explicit expiry for one token kind.
    pub fn with_expiry(mut self, kind: TokenKind, at: DateTime<Utc>) -> Self {
        self.expires_at.insert(kind, at);
        self
    }

    /// Adds an extra claim.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Explicit expiry for a token kind, if any.
    pub fn expires_at(&self, kind: TokenKind) -> Option<DateTime<Utc>> {
        self.expires_at.get(&kind).copied()
    }
}

/// Result of a successful provider introspection call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRequester {
    client: Client,
    granted_scopes: BTreeSet<String>,
    requested_at: DateTime<Utc>,
    session: TokenSession,
}

impl AccessRequester {
    /// Creates a requester record.
    pub fn new(
        client: Client,
        granted_scopes: impl IntoIterator<Item = impl Into<String>>,
        requested_at: DateTime<Utc>,
        session: TokenSession,
    ) -> Self {
        Self {
            client,
            granted_scopes: granted_scopes.into_iter().map(Into::into).collect(),
            requested_at,
            session,
        }
    }

    /// The client the token belongs to.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Scopes granted to the token.
    pub fn granted_scopes(&self) -> &BTreeSet<String> {
        &self.granted_scopes
    }

    /// When the token was requested.
    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }

    /// The provider session.
    pub fn session(&self) -> &TokenSession {
        &self.session
    }

    /// Flattens the requester into the warden-facing [`Session`].
    pub fn into_session(self, kind: TokenKind) -> Session {
        Session {
            expires_at: self.session.expires_at(kind),
            subject: self.session.subject,
            granted_scopes: self.granted_scopes,
            client_id: self.client.id,
            requested_at: self.requested_at,
            extra: self.session.extra,
        }
    }
}

/// An authenticated session, as seen by the warden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Authenticated subject.
    pub subject: String,
    /// Scopes granted to the token.
    pub granted_scopes: BTreeSet<String>,
    /// Client the token was issued to.
    pub client_id: String,
    /// When the token was requested.
    pub requested_at: DateTime<Utc>,
    /// Explicit expiry, if the provider recorded one.
    pub expires_at: Option<DateTime<Utc>>,
    /// Extra claims.
    #[serde(default)]
    pub extra: Map<String, Value>,
}

/// Caller-facing record of a successful authorization decision.
///
/// On a failed decision only [`subject`](Self::subject) is meaningful (and
/// it is empty when introspection itself failed).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationContext {
    /// Authenticated subject.
    pub subject: String,
    /// Scopes granted to the token.
    pub granted_scopes: BTreeSet<String>,
    /// Issuer of the token.
    pub issuer: String,
    /// Audience, the client the token was issued to.
    pub audience: String,
    /// When the token was issued.
    pub issued_at: Option<DateTime<Utc>>,
    /// When the token expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Extra claims.
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl AuthorizationContext {
    /// A context carrying only the subject.
    pub fn for_subject(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }
}

//! Collaborator seams consumed by the warden.
//!
//! Every backend the warden talks to sits behind one of these traits, so
//! in-memory, SQL-backed or remote implementations can be swapped in
//! without touching the engine.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::audit::AuditEvent;
use crate::decision::PolicyDecision;
use crate::error::{GroupError, PolicyError, ProviderError};
use crate::request::AccessRequest;
use crate::session::{AccessRequester, TokenKind};

/// Metric tags, keyed by tag name.
pub type Tags = BTreeMap<&'static str, String>;

/// Resolves the groups a subject belongs to.
#[async_trait]
pub trait GroupResolver: Send + Sync {
    /// Returns the group identifiers for `subject`, possibly none.
    async fn find_group_names(&self, subject: &str) -> Result<Vec<String>, GroupError>;
}

/// Evaluates one identity's policies against a request.
///
/// `request.subject` is the identity being evaluated, which is either the
/// original subject or one of its groups. Implementations must be
/// deterministic for a fixed policy set and must return
/// [`Verdict::NoMatch`](crate::Verdict::NoMatch) instead of an error when
/// nothing references the request.
#[async_trait]
pub trait PolicyEvaluator: Send + Sync {
    /// Evaluates the request.
    async fn evaluate(&self, request: &AccessRequest) -> Result<PolicyDecision, PolicyError>;
}

/// OAuth2 provider able to introspect tokens it issued.
#[async_trait]
pub trait OAuth2Provider: Send + Sync {
    /// Validates `token` as a `kind` token carrying every scope in `scopes`.
    async fn introspect_token(
        &self,
        token: &str,
        kind: TokenKind,
        scopes: &[String],
    ) -> Result<AccessRequester, ProviderError>;
}

/// Fire-and-forget counter sink.
///
/// Implementations must not block and must swallow their own failures.
pub trait MetricsSink: Send + Sync {
    /// Increments the counter `event` with the given tags.
    fn increment(&self, event: &str, tags: &Tags);
}

/// Append-only audit trail.
///
/// Implementations must swallow their own failures.
pub trait AuditSink: Send + Sync {
    /// Records one decision.
    fn record(&self, event: &AuditEvent);
}

/// Metrics sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn increment(&self, _event: &str, _tags: &Tags) {}
}

/// Audit sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) {}
}

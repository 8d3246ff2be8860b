//! Structured audit events emitted at every decision boundary.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decision::DecisionOutcome;
use crate::error::{Dependency, IntrospectionErrorKind};
use crate::request::RequestContext;

/// Warden entry point that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditOperation {
    /// Pre-authenticated decision.
    IsAllowed,
    /// Token-based decision.
    TokenAllowed,
}

impl AuditOperation {
    /// Metric prefix for this operation.
    pub const fn metric_prefix(self) -> &'static str {
        match self {
            Self::IsAllowed => "Warden.IsAllowed",
            Self::TokenAllowed => "Warden.TokenAllowed",
        }
    }
}

/// Final result recorded for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditResult {
    /// Access granted.
    Granted,
    /// Access denied, by policy or because authentication failed.
    Denied,
    /// A collaborator failed; the request failed closed.
    Error,
}

/// The request as recorded in the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRequest {
    /// Requested resource.
    pub resource: String,
    /// Requested action.
    pub action: String,
    /// Request context.
    pub context: RequestContext,
}

/// One audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event identifier (UUID v7).
    pub id: Uuid,
    /// When the decision was made.
    pub timestamp: DateTime<Utc>,
    /// Entry point.
    pub operation: AuditOperation,
    /// Acting subject; empty when introspection failed.
    pub subject: String,
    /// The request.
    pub request: AuditRequest,
    /// Result for the caller.
    pub result: AuditResult,
    /// Combined policy outcome, when policy was evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<DecisionOutcome>,
    /// Human-readable reason.
    pub reason: String,
    /// Detail from the underlying error, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Collaborator that failed, for dependency failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency: Option<Dependency>,
    /// Introspection classification, when the token was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introspection_kind: Option<IntrospectionErrorKind>,
    /// Client the token was issued to, for token decisions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    /// Scopes the caller demanded, for token decisions.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub scopes: BTreeSet<String>,
}

impl AuditEvent {
    /// Starts an event for a request.
    pub fn new(
        operation: AuditOperation,
        subject: impl Into<String>,
        request: AuditRequest,
        result: AuditResult,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            operation,
            subject: subject.into(),
            request,
            result,
            outcome: None,
            reason: reason.into(),
            error: None,
            dependency: None,
            introspection_kind: None,
            audience: None,
            scopes: BTreeSet::new(),
        }
    }

    /// Records the combined outcome.
    pub fn with_outcome(mut self, outcome: DecisionOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Records the underlying error.
    pub fn with_error(mut self, error: &impl std::fmt::Display) -> Self {
        self.error = Some(error.to_string());
        self
    }

    /// Records the collaborator that failed.
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependency = Some(dependency);
        self
    }

    /// Records why introspection rejected the token.
    pub fn with_introspection_kind(mut self, kind: IntrospectionErrorKind) -> Self {
        self.introspection_kind = Some(kind);
        self
    }

    /// Records the token audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Records the demanded scopes.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }
}

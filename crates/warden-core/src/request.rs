//! Authorization queries submitted to the warden.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form request context handed to policy conditions.
pub type RequestContext = Map<String, Value>;

/// A pre-authenticated authorization query.
///
/// The caller already knows who the subject is. Use [`TokenAccessRequest`]
/// when the subject has to be discovered from a bearer token.
///
/// # Example
///
/// ```
/// use warden_core::AccessRequest;
///
/// let request = AccessRequest::new("alice", "resources:articles:1", "read")
///     .with_context("owner", "alice");
///
/// assert_eq!(request.subject, "alice");
/// assert_eq!(request.context["owner"], "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// The resource being accessed.
    pub resource: String,
    /// The action being performed.
    pub action: String,
    /// The acting subject.
    pub subject: String,
    /// Additional context for condition evaluation.
    #[serde(default)]
    pub context: RequestContext,
}

impl AccessRequest {
    /// Creates a request with an empty context.
    pub fn new(
        subject: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            subject: subject.into(),
            context: RequestContext::new(),
        }
    }

    /// Adds a context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Returns a copy of this request acting as another identity.
    ///
    /// Used during identity expansion, where every group is evaluated with
    /// the same resource, action and context.
    pub fn acting_as(&self, identity: &str) -> Self {
        Self {
            resource: self.resource.clone(),
            action: self.action.clone(),
            subject: identity.to_string(),
            context: self.context.clone(),
        }
    }
}

/// An authorization query whose subject comes from token introspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAccessRequest {
    /// The resource being accessed.
    pub resource: String,
    /// The action being performed.
    pub action: String,
    /// Additional context for condition evaluation.
    #[serde(default)]
    pub context: RequestContext,
}

impl TokenAccessRequest {
    /// Creates a token request with an empty context.
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            context: RequestContext::new(),
        }
    }

    /// Adds a context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Binds the request to the subject discovered by introspection.
    pub fn for_subject(&self, subject: impl Into<String>) -> AccessRequest {
        AccessRequest {
            resource: self.resource.clone(),
            action: self.action.clone(),
            subject: subject.into(),
            context: self.context.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acting_as_keeps_everything_but_subject() {
        let request = AccessRequest::new("alice", "r", "read").with_context("ip", "10.0.0.1");
        let group = request.acting_as("admins");

        assert_eq!(group.subject, "admins");
        assert_eq!(group.resource, "r");
        assert_eq!(group.action, "read");
        assert_eq!(group.context, request.context);
    }

    #[test]
    fn test_for_subject() {
        let request = TokenAccessRequest::new("r", "write").with_context("k", 1);
        let bound = request.for_subject("bob");

        assert_eq!(bound.subject, "bob");
        assert_eq!(bound.context["k"], 1);
    }

    #[test]
    fn test_context_defaults_when_missing() {
        let request: AccessRequest =
            serde_json::from_str(r#"{"resource":"r","action":"a","subject":"s"}"#).unwrap();
        assert!(request.context.is_empty());
    }
}

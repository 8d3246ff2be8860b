//! Test fixtures for Warden development and testing.
//!
//! Recording sinks and scripted collaborators that can be used in tests
//! across the Warden crates.
//!
//! # Example
//!
//! ```
//! use warden_core::fixtures::RecordingMetricsSink;
//! use warden_core::{MetricsSink, Tags};
//!
//! let sink = RecordingMetricsSink::new();
//! sink.increment("Warden.IsAllowed.Success", &Tags::new());
//! assert_eq!(sink.count("Warden.IsAllowed.Success"), 1);
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::audit::AuditEvent;
use crate::decision::PolicyDecision;
use crate::error::{GroupError, PolicyError};
use crate::request::AccessRequest;
use crate::traits::{AuditSink, GroupResolver, MetricsSink, PolicyEvaluator, Tags};

/// Metrics sink that keeps every increment in memory.
#[derive(Debug, Default)]
pub struct RecordingMetricsSink {
    events: Mutex<Vec<(String, Tags)>>,
}

impl RecordingMetricsSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded increments, in order.
    pub fn events(&self) -> Vec<(String, Tags)> {
        self.events.lock().clone()
    }

    /// Number of increments recorded for `event`.
    pub fn count(&self, event: &str) -> usize {
        self.events.lock().iter().filter(|(e, _)| e == event).count()
    }

    /// Tags of the most recent increment of `event`.
    pub fn last_tags(&self, event: &str) -> Option<Tags> {
        self.events
            .lock()
            .iter()
            .rev()
            .find(|(e, _)| e == event)
            .map(|(_, tags)| tags.clone())
    }
}

impl MetricsSink for RecordingMetricsSink {
    fn increment(&self, event: &str, tags: &Tags) {
        self.events.lock().push((event.to_string(), tags.clone()));
    }
}

/// Audit sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, in order.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    /// The most recent event.
    pub fn last(&self) -> Option<AuditEvent> {
        self.events.lock().last().cloned()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Group resolver answering from a fixed table, or failing every call.
#[derive(Debug, Default)]
pub struct StaticGroups {
    groups: HashMap<String, Vec<String>>,
    failure: Option<String>,
}

impl StaticGroups {
    /// Creates a resolver where nobody belongs to any group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `subject` in `groups`.
    pub fn with_member(mut self, subject: &str, groups: &[&str]) -> Self {
        self.groups.insert(
            subject.to_string(),
            groups.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// A resolver whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            groups: HashMap::new(),
            failure: Some(message.into()),
        }
    }
}

#[async_trait]
impl GroupResolver for StaticGroups {
    async fn find_group_names(&self, subject: &str) -> Result<Vec<String>, GroupError> {
        if let Some(message) = &self.failure {
            return Err(GroupError(message.clone()));
        }
        Ok(self.groups.get(subject).cloned().unwrap_or_default())
    }
}

/// Policy evaluator answering a fixed decision per identity.
///
/// Identities without an entry get [`PolicyDecision::no_match`]. Every
/// evaluated identity is recorded.
#[derive(Debug, Default)]
pub struct ScriptedEvaluator {
    decisions: HashMap<String, Result<PolicyDecision, PolicyError>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedEvaluator {
    /// Creates an evaluator that matches nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `decision` for `identity`.
    pub fn with_decision(mut self, identity: &str, decision: PolicyDecision) -> Self {
        self.decisions.insert(identity.to_string(), Ok(decision));
        self
    }

    /// Fails evaluation for `identity`.
    pub fn with_failure(mut self, identity: &str, message: &str) -> Self {
        self.decisions
            .insert(identity.to_string(), Err(PolicyError(message.to_string())));
        self
    }

    /// Identities evaluated so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl PolicyEvaluator for ScriptedEvaluator {
    async fn evaluate(&self, request: &AccessRequest) -> Result<PolicyDecision, PolicyError> {
        self.calls.lock().push(request.subject.clone());
        self.decisions
            .get(&request.subject)
            .cloned()
            .unwrap_or_else(|| Ok(PolicyDecision::no_match()))
    }
}

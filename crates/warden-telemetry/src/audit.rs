//! Audit trail written to the tracing pipeline.

use tracing::{info, warn};
use warden_core::{AuditEvent, AuditOperation, AuditResult, AuditSink};

/// Tracing target for audit lines.
pub const AUDIT_TARGET: &str = "warden::audit";

/// [`AuditSink`] that logs every decision at `info` (`warn` for failed
/// dependencies) under [`AUDIT_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    /// Creates the sink.
    pub const fn new() -> Self {
        Self
    }
}

/// Log message for an event.
pub fn audit_message(event: &AuditEvent) -> &'static str {
    match (event.result, event.operation) {
        (AuditResult::Granted, AuditOperation::TokenAllowed) => "Access granted",
        (AuditResult::Granted, AuditOperation::IsAllowed) => "Access allowed",
        (AuditResult::Denied | AuditResult::Error, _) => "Access denied",
    }
}

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        let context = serde_json::to_string(&event.request.context).unwrap_or_default();
        let outcome = event.outcome.map(|o| o.to_string());
        let scopes = event.scopes.iter().cloned().collect::<Vec<_>>().join(" ");
        let dependency = event.dependency.map(|d| d.to_string());
        let introspection = event.introspection_kind.map(|k| k.as_str());

        if event.result == AuditResult::Error {
            warn!(
                target: AUDIT_TARGET,
                audit_id = %event.id,
                operation = ?event.operation,
                subject = %event.subject,
                request.resource = %event.request.resource,
                request.action = %event.request.action,
                request.context = %context,
                result = ?event.result,
                reason = %event.reason,
                error = event.error.as_deref(),
                dependency = dependency.as_deref(),
                "{}",
                audit_message(event)
            );
            return;
        }

        info!(
            target: AUDIT_TARGET,
            audit_id = %event.id,
            operation = ?event.operation,
            subject = %event.subject,
            request.resource = %event.request.resource,
            request.action = %event.request.action,
            request.context = %context,
            result = ?event.result,
            outcome = outcome.as_deref(),
            reason = %event.reason,
            error = event.error.as_deref(),
            introspection_kind = introspection,
            audience = event.audience.as_deref(),
            scopes = %scopes,
            "{}",
            audit_message(event)
        );
    }
}

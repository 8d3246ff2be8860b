//! # Warden Core
//!
//! Core types and collaborator traits for the Warden authorization engine.
//!
//! - [`AccessRequest`], [`TokenAccessRequest`] - authorization queries
//! - [`Session`], [`AuthorizationContext`] - authenticated session and the caller-facing result
//! - [`Verdict`], [`PolicyDecision`], [`combine`] - per-identity verdicts and the combination rule
//! - [`WardenError`] - the caller-visible error taxonomy
//! - [`GroupResolver`], [`PolicyEvaluator`], [`OAuth2Provider`], [`MetricsSink`], [`AuditSink`] - collaborator seams

#![doc(html_root_url = "https://docs.rs/warden-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod audit;
mod decision;
mod error;
pub mod fixtures;
mod request;
mod sanitize;
mod session;
mod traits;

pub use audit::{AuditEvent, AuditOperation, AuditRequest, AuditResult};
pub use decision::{
    combine, CombinedDecision, DecisionOutcome, IdentityDecision, PolicyDecision, Verdict,
};
pub use error::{
    Dependency, ErrorKind, GroupError, IntrospectionError, IntrospectionErrorKind, PolicyError,
    ProviderError, WardenError, WardenResult,
};
pub use request::{AccessRequest, RequestContext, TokenAccessRequest};
pub use sanitize::sanitize_for_statsd;
pub use session::{AccessRequester, AuthorizationContext, Client, Session, TokenKind, TokenSession};
pub use traits::{
    AuditSink, GroupResolver, MetricsSink, NoopAuditSink, NoopMetricsSink, OAuth2Provider,
    PolicyEvaluator, Tags,
};

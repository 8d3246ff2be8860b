//! The decision engine.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};
use warden_config::WardenSection;
use warden_core::{
    combine, sanitize_for_statsd, AccessRequest, AuditEvent, AuditOperation, AuditRequest,
    AuditResult, AuditSink, AuthorizationContext, CombinedDecision, DecisionOutcome, Dependency,
    ErrorKind, GroupResolver, IdentityDecision, IntrospectionError, IntrospectionErrorKind,
    MetricsSink, NoopAuditSink, NoopMetricsSink, OAuth2Provider, PolicyEvaluator, RequestContext,
    Tags, TokenAccessRequest, Verdict, WardenError,
};
use warden_oauth2::Introspector;

use crate::context::build_context;
use crate::error::{BuildError, TokenDenied};

/// Reason recorded when the policy decision point allowed a request.
pub const REASON_ALLOWED: &str = "The policy decision point allowed the request";
/// Reason recorded when the policy decision point denied a request.
pub const REASON_DENIED: &str = "The policy decision point denied the request";
/// Reason recorded when policy could not be evaluated.
pub const REASON_UNAVAILABLE: &str = "The policy decision point could not evaluate the request";
/// Reason recorded when introspection rejected the token.
pub const REASON_BAD_TOKEN: &str = "Token is expired, malformed or missing";
/// Deny reason for requests without a subject.
pub const REASON_EMPTY_SUBJECT: &str = "subject must not be empty";

/// Default lifespan of access tokens without an explicit expiry.
pub const DEFAULT_ACCESS_TOKEN_LIFESPAN: Duration = Duration::from_secs(3600);
/// Default bound on each collaborator call.
pub const DEFAULT_COLLABORATOR_TIMEOUT: Duration = Duration::from_secs(5);

/// A collaborator call that failed or timed out. Kept for the audit
/// trail only; callers see [`WardenError::DependencyFailure`].
struct Unavailable {
    dependency: Dependency,
    message: String,
}

/// Outcome of identity expansion and combination for one request.
struct Judgement {
    outcome: Option<DecisionOutcome>,
    /// Audit reason; may cite policies and identities.
    reason: String,
    error: Option<WardenError>,
    unavailable: Option<Unavailable>,
}

impl Judgement {
    fn decided(combined: &CombinedDecision) -> Self {
        let allowed = combined.outcome.is_allowed();
        Self {
            outcome: Some(combined.outcome),
            reason: if allowed {
                REASON_ALLOWED.to_string()
            } else {
                combined.reason()
            },
            error: (!allowed).then(|| WardenError::forbidden(combined.outcome.summary())),
            unavailable: None,
        }
    }

    fn forbidden(reason: &'static str) -> Self {
        Self {
            outcome: None,
            reason: reason.to_string(),
            error: Some(WardenError::forbidden(reason)),
            unavailable: None,
        }
    }

    fn unavailable(failure: Unavailable) -> Self {
        Self {
            outcome: None,
            reason: REASON_UNAVAILABLE.to_string(),
            error: Some(WardenError::DependencyFailure),
            unavailable: Some(failure),
        }
    }

    fn audit_result(&self) -> AuditResult {
        match &self.error {
            None => AuditResult::Granted,
            Some(e) if e.kind() == ErrorKind::Dependency => AuditResult::Error,
            Some(_) => AuditResult::Denied,
        }
    }

    fn metric_reason(&self) -> &'static str {
        match self.audit_result() {
            AuditResult::Error => REASON_UNAVAILABLE,
            _ => REASON_DENIED,
        }
    }

    fn audit_event(
        &self,
        operation: AuditOperation,
        subject: &str,
        request: AuditRequest,
    ) -> AuditEvent {
        let mut event = AuditEvent::new(
            operation,
            subject,
            request,
            self.audit_result(),
            self.reason.clone(),
        );
        if let Some(outcome) = self.outcome {
            event = event.with_outcome(outcome);
        }
        match (&self.unavailable, &self.error) {
            (Some(failure), _) => event
                .with_dependency(failure.dependency)
                .with_error(&failure.message),
            (None, Some(error)) => event.with_error(error),
            (None, None) => event,
        }
    }
}

/// Policy-based authorization decision point.
///
/// For every request the subject is expanded into the identity set
/// `{subject} ∪ groups(subject)`. Each identity is evaluated on its own and
/// the decisions are combined: a force deny from any identity wins, otherwise
/// a single allow grants the request, otherwise it is denied.
///
/// The warden holds no mutable state and can be shared behind an [`Arc`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use warden::Warden;
/// use warden_core::fixtures::{ScriptedEvaluator, StaticGroups};
/// use warden_core::{AccessRequest, PolicyDecision};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let warden = Warden::builder()
///     .groups(Arc::new(StaticGroups::new().with_member("alice", &["admins"])))
///     .policies(Arc::new(
///         ScriptedEvaluator::new().with_decision("admins", PolicyDecision::allow("p2")),
///     ))
///     .build()
///     .unwrap();
///
/// let request = AccessRequest::new("alice", "resources:articles:1", "delete");
/// assert!(warden.is_allowed(&request).await.is_ok());
/// # }
/// ```
#[derive(Clone)]
pub struct Warden {
    introspector: Option<Introspector>,
    groups: Arc<dyn GroupResolver>,
    policies: Arc<dyn PolicyEvaluator>,
    metrics: Arc<dyn MetricsSink>,
    audit: Arc<dyn AuditSink>,
    issuer: String,
    access_token_lifespan: Duration,
    collaborator_timeout: Duration,
}

impl std::fmt::Debug for Warden {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Warden")
            .field("issuer", &self.issuer)
            .field("access_token_lifespan", &self.access_token_lifespan)
            .field("collaborator_timeout", &self.collaborator_timeout)
            .field("introspector", &self.introspector)
            .finish_non_exhaustive()
    }
}

impl Warden {
    /// Creates a builder.
    pub fn builder() -> WardenBuilder {
        WardenBuilder::new()
    }

    /// Configured issuer.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Configured access token lifespan.
    pub const fn access_token_lifespan(&self) -> Duration {
        self.access_token_lifespan
    }

    /// Decides a pre-authenticated request.
    ///
    /// Returns `Ok(())` when allowed, [`WardenError::Forbidden`] when denied
    /// (forcefully or not) and [`WardenError::DependencyFailure`] when a
    /// collaborator failed or timed out.
    #[instrument(skip_all, fields(
        subject = %request.subject,
        resource = %request.resource,
        action = %request.action
    ))]
    pub async fn is_allowed(&self, request: &AccessRequest) -> Result<(), WardenError> {
        let judgement = self.judge(request).await;

        let mut tags = Tags::new();
        tags.insert("client_id", request.subject.clone());
        tags.insert("resource", sanitize_for_statsd(&request.resource, "_"));

        let event = judgement.audit_event(
            AuditOperation::IsAllowed,
            &request.subject,
            audit_request(&request.resource, &request.action, &request.context),
        );
        self.audit.record(&event);

        let metric_reason = judgement.metric_reason();
        match judgement.error {
            None => {
                self.emit(AuditOperation::IsAllowed, true, &tags);
                Ok(())
            }
            Some(error) => {
                tags.insert("reason", metric_reason.to_string());
                self.emit(AuditOperation::IsAllowed, false, &tags);
                Err(error)
            }
        }
    }

    /// Authenticates a bearer token, then decides the request as the token's
    /// subject.
    ///
    /// On success the full [`AuthorizationContext`] is returned. On failure
    /// the [`TokenDenied`] carries the error and a partial context: empty
    /// when the token was rejected, subject-only when policy denied it.
    #[instrument(skip_all, fields(resource = %request.resource, action = %request.action))]
    pub async fn token_allowed(
        &self,
        token: &str,
        request: &TokenAccessRequest,
        scopes: &[&str],
    ) -> Result<AuthorizationContext, TokenDenied> {
        let scopes: Vec<String> = scopes.iter().map(|s| (*s).to_string()).collect();
        let resource = sanitize_for_statsd(&request.resource, "_");
        let action = sanitize_for_statsd(&request.action, "_");

        let mut tags = Tags::new();
        tags.insert("resource", resource);
        tags.insert("action", action);

        let introspected = match &self.introspector {
            Some(introspector) => introspector.introspect(token, &scopes).await,
            None => Err(IntrospectionError::new(
                IntrospectionErrorKind::IntrospectionUnavailable,
                "no OAuth2 provider configured",
            )),
        };

        let session = match introspected {
            Ok(session) => session,
            Err(failure) => {
                debug!(kind = %failure.kind, "token rejected");
                let kind = failure.kind;
                let error = WardenError::from(failure);
                self.audit.record(
                    &AuditEvent::new(
                        AuditOperation::TokenAllowed,
                        "",
                        audit_request(&request.resource, &request.action, &request.context),
                        AuditResult::Denied,
                        REASON_BAD_TOKEN,
                    )
                    .with_error(&error)
                    .with_introspection_kind(kind)
                    .with_scopes(scopes.iter().cloned()),
                );
                tags.insert("client_id", String::new());
                tags.insert("reason", REASON_BAD_TOKEN.to_string());
                self.emit(AuditOperation::TokenAllowed, false, &tags);
                return Err(TokenDenied::anonymous(error));
            }
        };

        let access = request.for_subject(session.subject.clone());
        let judgement = self.judge(&access).await;
        tags.insert("client_id", session.subject.clone());

        let event = judgement
            .audit_event(
                AuditOperation::TokenAllowed,
                &session.subject,
                audit_request(&request.resource, &request.action, &request.context),
            )
            .with_audience(&session.client_id)
            .with_scopes(scopes.iter().cloned());
        self.audit.record(&event);

        let metric_reason = judgement.metric_reason();
        match judgement.error {
            None => {
                self.emit(AuditOperation::TokenAllowed, true, &tags);
                Ok(build_context(
                    &session,
                    &self.issuer,
                    self.access_token_lifespan,
                ))
            }
            Some(error) => {
                tags.insert("reason", metric_reason.to_string());
                self.emit(AuditOperation::TokenAllowed, false, &tags);
                Err(TokenDenied::for_subject(session.subject, error))
            }
        }
    }

    /// Extracts the bearer token from an HTTP request.
    ///
    /// See [`warden_oauth2::token_from_request`].
    pub fn token_from_request<B>(&self, request: &http::Request<B>) -> Option<String> {
        warden_oauth2::token_from_request(request)
    }

    async fn judge(&self, request: &AccessRequest) -> Judgement {
        if request.subject.is_empty() {
            return Judgement::forbidden(REASON_EMPTY_SUBJECT);
        }
        match self.decide(request).await {
            Ok(combined) => Judgement::decided(&combined),
            Err(failure) => Judgement::unavailable(failure),
        }
    }

    /// Expands the identity set, evaluates every identity and combines.
    async fn decide(&self, request: &AccessRequest) -> Result<CombinedDecision, Unavailable> {
        let groups = self
            .bounded(
                Dependency::GroupResolver,
                request,
                self.groups.find_group_names(&request.subject),
            )
            .await?;

        let mut identities = vec![request.subject.clone()];
        for group in groups {
            if !identities.contains(&group) {
                identities.push(group);
            }
        }
        debug!(identities = ?identities, "identity set expanded");

        let mut decisions = Vec::with_capacity(identities.len());
        for identity in identities {
            let decision = self
                .bounded(
                    Dependency::PolicyEvaluator,
                    request,
                    self.policies.evaluate(&request.acting_as(&identity)),
                )
                .await?;
            let forced = decision.verdict == Verdict::ForceDeny;
            decisions.push(IdentityDecision { identity, decision });
            // Nothing can outvote a force deny.
            if forced {
                break;
            }
        }

        Ok(combine(&decisions))
    }

    async fn bounded<T, E, F>(
        &self,
        dependency: Dependency,
        request: &AccessRequest,
        call: F,
    ) -> Result<T, Unavailable>
    where
        E: Display,
        F: Future<Output = Result<T, E>>,
    {
        let message = match tokio::time::timeout(self.collaborator_timeout, call).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!(
                "timed out after {}ms",
                self.collaborator_timeout.as_millis()
            ),
        };

        warn!(
            %dependency,
            subject = %request.subject,
            resource = %request.resource,
            action = %request.action,
            error = %message,
            "collaborator failed, denying request"
        );
        Err(Unavailable {
            dependency,
            message,
        })
    }

    fn emit(&self, operation: AuditOperation, success: bool, tags: &Tags) {
        let outcome = if success { "Success" } else { "Failure" };
        self.metrics
            .increment(&format!("{}.{outcome}", operation.metric_prefix()), tags);
    }
}

fn audit_request(resource: &str, action: &str, context: &RequestContext) -> AuditRequest {
    AuditRequest {
        resource: resource.to_string(),
        action: action.to_string(),
        context: context.clone(),
    }
}

/// Builder for [`Warden`].
///
/// The group resolver and policy evaluator are required. Without an OAuth2
/// provider every [`Warden::token_allowed`] call fails as
/// `IntrospectionUnavailable`. Sinks default to no-ops.
#[derive(Default)]
pub struct WardenBuilder {
    provider: Option<Arc<dyn OAuth2Provider>>,
    groups: Option<Arc<dyn GroupResolver>>,
    policies: Option<Arc<dyn PolicyEvaluator>>,
    metrics: Option<Arc<dyn MetricsSink>>,
    audit: Option<Arc<dyn AuditSink>>,
    issuer: Option<String>,
    access_token_lifespan: Option<Duration>,
    collaborator_timeout: Option<Duration>,
}

impl WardenBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a configuration section.
    pub fn with_config(mut self, config: &WardenSection) -> Self {
        self.issuer = Some(config.issuer.clone());
        self.access_token_lifespan = Some(config.access_token_lifespan());
        self.collaborator_timeout = Some(config.collaborator_timeout());
        self
    }

    /// Sets the OAuth2 provider tokens are introspected with.
    pub fn provider(mut self, provider: Arc<dyn OAuth2Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets the group resolver.
    pub fn groups(mut self, groups: Arc<dyn GroupResolver>) -> Self {
        self.groups = Some(groups);
        self
    }

    /// Sets the policy evaluator.
    pub fn policies(mut self, policies: Arc<dyn PolicyEvaluator>) -> Self {
        self.policies = Some(policies);
        self
    }

    /// Sets the metrics sink.
    pub fn metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Sets the audit sink.
    pub fn audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Sets the issuer written into authorization contexts.
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets the fallback access token lifespan.
    pub fn access_token_lifespan(mut self, lifespan: Duration) -> Self {
        self.access_token_lifespan = Some(lifespan);
        self
    }

    /// Sets the bound on each collaborator call.
    pub fn collaborator_timeout(mut self, timeout: Duration) -> Self {
        self.collaborator_timeout = Some(timeout);
        self
    }

    /// Assembles the warden.
    pub fn build(self) -> Result<Warden, BuildError> {
        let groups = self
            .groups
            .ok_or(BuildError::MissingCollaborator("group resolver"))?;
        let policies = self
            .policies
            .ok_or(BuildError::MissingCollaborator("policy evaluator"))?;

        let collaborator_timeout = self
            .collaborator_timeout
            .unwrap_or(DEFAULT_COLLABORATOR_TIMEOUT);
        if collaborator_timeout.is_zero() {
            return Err(BuildError::InvalidSetting {
                field: "collaborator_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Warden {
            introspector: self
                .provider
                .map(|p| Introspector::new(p).with_timeout(collaborator_timeout)),
            groups,
            policies,
            metrics: self.metrics.unwrap_or_else(|| Arc::new(NoopMetricsSink)),
            audit: self.audit.unwrap_or_else(|| Arc::new(NoopAuditSink)),
            issuer: self.issuer.unwrap_or_default(),
            access_token_lifespan: self
                .access_token_lifespan
                .unwrap_or(DEFAULT_ACCESS_TOKEN_LIFESPAN),
            collaborator_timeout,
        })
    }
}

//! Policy verdicts and the cross-identity combination rule.

use serde::{Deserialize, Serialize};

/// Outcome of evaluating one identity's policies against a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// A policy allows the request.
    Allow,
    /// A policy denies the request. Can be outvoted by another identity's allow.
    Deny,
    /// An override-class denial. Cannot be outvoted.
    ForceDeny,
    /// No policy references the request.
    NoMatch,
}

/// A verdict together with the deciding policy, for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    /// The verdict.
    pub verdict: Verdict,
    /// Identifier of the deciding policy, absent for [`Verdict::NoMatch`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
}

impl PolicyDecision {
    /// Allowed by the given policy.
    pub fn allow(policy_id: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Allow,
            policy_id: Some(policy_id.into()),
        }
    }

    /// Denied by the given policy.
    pub fn deny(policy_id: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Deny,
            policy_id: Some(policy_id.into()),
        }
    }

    /// Forcefully denied by the given policy.
    pub fn force_deny(policy_id: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::ForceDeny,
            policy_id: Some(policy_id.into()),
        }
    }

    /// No policy matched.
    pub const fn no_match() -> Self {
        Self {
            verdict: Verdict::NoMatch,
            policy_id: None,
        }
    }
}

/// A decision attributed to the identity it was evaluated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDecision {
    /// The subject or group the request was evaluated as.
    pub identity: String,
    /// The decision for that identity.
    pub decision: PolicyDecision,
}

/// Combined outcome over the whole identity set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    /// At least one allow and no force deny.
    Allow,
    /// No allow (including only no-match).
    Deny,
    /// At least one force deny.
    ForceDeny,
}

impl DecisionOutcome {
    /// Whether the request is granted.
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Caller-facing summary. Never names a policy or identity.
    pub const fn summary(self) -> &'static str {
        match self {
            Self::Allow => "request allowed",
            Self::Deny => "request denied",
            Self::ForceDeny => "request forcefully denied",
        }
    }
}

impl std::fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny => write!(f, "deny"),
            Self::ForceDeny => write!(f, "force_deny"),
        }
    }
}

/// The combined decision and the identity/policy that settled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedDecision {
    /// Combined outcome.
    pub outcome: DecisionOutcome,
    /// The deciding entry; absent when the outcome is a default deny.
    pub decided_by: Option<IdentityDecision>,
}

impl CombinedDecision {
    /// Audit reason for this decision, citing the deciding policy and
    /// identity. Not for callers; see [`DecisionOutcome::summary`].
    pub fn reason(&self) -> String {
        let cited = self
            .decided_by
            .as_ref()
            .and_then(|d| d.decision.policy_id.as_deref().map(|p| (d.identity.as_str(), p)));

        match (self.outcome, cited) {
            (DecisionOutcome::ForceDeny, Some((identity, policy))) => format!(
                "request forcefully denied by policy {policy} (identity {identity})"
            ),
            (DecisionOutcome::ForceDeny, None) => "request forcefully denied".to_string(),
            (DecisionOutcome::Allow, Some((identity, policy))) => {
                format!("request allowed by policy {policy} (identity {identity})")
            }
            (DecisionOutcome::Allow, None) => "request allowed".to_string(),
            (DecisionOutcome::Deny, _) => "request denied".to_string(),
        }
    }
}

/// Combines per-identity decisions.
///
/// Any force deny wins over every allow, regardless of which identity
/// produced it or in which order decisions arrive. Otherwise a single allow
/// grants the request. Everything else, including an empty set, is a deny.
pub fn combine(decisions: &[IdentityDecision]) -> CombinedDecision {
    if let Some(forced) = decisions
        .iter()
        .find(|d| d.decision.verdict == Verdict::ForceDeny)
    {
        return CombinedDecision {
            outcome: DecisionOutcome::ForceDeny,
            decided_by: Some(forced.clone()),
        };
    }

    if let Some(allowed) = decisions
        .iter()
        .find(|d| d.decision.verdict == Verdict::Allow)
    {
        return CombinedDecision {
            outcome: DecisionOutcome::Allow,
            decided_by: Some(allowed.clone()),
        };
    }

    CombinedDecision {
        outcome: DecisionOutcome::Deny,
        decided_by: decisions
            .iter()
            .find(|d| d.decision.verdict == Verdict::Deny)
            .cloned(),
    }
}

//! In-memory policy store and evaluator.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use regex::Regex;
use tracing::{debug, info, instrument};
use warden_core::{AccessRequest, PolicyDecision, PolicyError, PolicyEvaluator};

use crate::condition::CompiledCondition;
use crate::error::{PolicyResult, PolicyStoreError};
use crate::matcher::{compile_all, matches_any};
use crate::policy::{Effect, Policy};

/// A policy with its patterns and conditions compiled.
#[derive(Debug, Clone)]
struct CompiledPolicy {
    policy: Policy,
    subjects: Vec<Regex>,
    resources: Vec<Regex>,
    actions: Vec<Regex>,
    conditions: Vec<(String, CompiledCondition)>,
}

impl CompiledPolicy {
    fn compile(policy: Policy) -> PolicyResult<Self> {
        let conditions = policy
            .conditions
            .iter()
            .map(|(key, c)| CompiledCondition::compile(key, c).map(|c| (key.clone(), c)))
            .collect::<PolicyResult<Vec<_>>>()?;

        Ok(Self {
            subjects: compile_all(&policy.subjects)?,
            resources: compile_all(&policy.resources)?,
            actions: compile_all(&policy.actions)?,
            conditions,
            policy,
        })
    }

    fn applies_to_subject(&self, subject: &str) -> bool {
        matches_any(&self.subjects, subject)
    }

    fn matches(&self, request: &AccessRequest) -> bool {
        self.applies_to_subject(&request.subject)
            && matches_any(&self.resources, &request.resource)
            && matches_any(&self.actions, &request.action)
            && self
                .conditions
                .iter()
                .all(|(key, c)| c.fulfills(request.context.get(key), &request.subject))
    }
}

/// Thread-safe policy store that also evaluates requests.
///
/// For one identity the strongest matching effect wins:
/// `force_deny`, then `deny`, then `allow`. A request no policy matches is
/// [`Verdict::NoMatch`](warden_core::Verdict::NoMatch).
#[derive(Debug, Default)]
pub struct MemoryPolicyManager {
    policies: RwLock<BTreeMap<String, CompiledPolicy>>,
}

impl MemoryPolicyManager {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given policies.
    pub fn with_policies(policies: impl IntoIterator<Item = Policy>) -> PolicyResult<Self> {
        let manager = Self::new();
        for policy in policies {
            manager.create(policy)?;
        }
        Ok(manager)
    }

    /// Stores a new policy.
    ///
    /// Fails if the ID is taken or a pattern or condition does not compile.
    pub fn create(&self, policy: Policy) -> PolicyResult<()> {
        let compiled = CompiledPolicy::compile(policy)?;
        let mut policies = self.policies.write();
        if policies.contains_key(&compiled.policy.id) {
            return Err(PolicyStoreError::DuplicatePolicy(compiled.policy.id));
        }
        debug!(policy_id = %compiled.policy.id, effect = %compiled.policy.effect, "policy created");
        policies.insert(compiled.policy.id.clone(), compiled);
        Ok(())
    }

    /// Returns a stored policy.
    pub fn get(&self, id: &str) -> PolicyResult<Policy> {
        self.policies
            .read()
            .get(id)
            .map(|c| c.policy.clone())
            .ok_or_else(|| PolicyStoreError::PolicyNotFound(id.to_string()))
    }

    /// Removes a policy.
    pub fn delete(&self, id: &str) -> PolicyResult<()> {
        match self.policies.write().remove(id) {
            Some(_) => {
                info!(policy_id = id, "policy deleted");
                Ok(())
            }
            None => Err(PolicyStoreError::PolicyNotFound(id.to_string())),
        }
    }

    /// Policies whose subject patterns match `subject`, ordered by ID.
    pub fn find_policies_for_subject(&self, subject: &str) -> Vec<Policy> {
        self.policies
            .read()
            .values()
            .filter(|c| c.applies_to_subject(subject))
            .map(|c| c.policy.clone())
            .collect()
    }

    /// All stored policies, ordered by ID.
    pub fn list(&self) -> Vec<Policy> {
        self.policies
            .read()
            .values()
            .map(|c| c.policy.clone())
            .collect()
    }

    /// Number of stored policies.
    pub fn len(&self) -> usize {
        self.policies.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.policies.read().is_empty()
    }

    /// Evaluates `request` as `request.subject` against the stored policies.
    pub fn decide(&self, request: &AccessRequest) -> PolicyDecision {
        let policies = self.policies.read();

        let mut deny = None;
        let mut allow = None;
        for compiled in policies.values().filter(|c| c.matches(request)) {
            match compiled.policy.effect {
                Effect::ForceDeny => return PolicyDecision::force_deny(&compiled.policy.id),
                Effect::Deny => {
                    deny.get_or_insert(&compiled.policy.id);
                }
                Effect::Allow => {
                    allow.get_or_insert(&compiled.policy.id);
                }
            }
        }

        match (deny, allow) {
            (Some(id), _) => PolicyDecision::deny(id),
            (None, Some(id)) => PolicyDecision::allow(id),
            (None, None) => PolicyDecision::no_match(),
        }
    }
}

#[async_trait]
impl PolicyEvaluator for MemoryPolicyManager {
    #[instrument(skip(self, request), fields(
        identity = %request.subject,
        resource = %request.resource,
        action = %request.action
    ))]
    async fn evaluate(&self, request: &AccessRequest) -> Result<PolicyDecision, PolicyError> {
        let decision = self.decide(request);
        debug!(verdict = ?decision.verdict, policy_id = ?decision.policy_id, "identity evaluated");
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use warden_core::Verdict;

    fn articles(id: &str, subject: &str, effect: Effect) -> Policy {
        Policy::new(id, effect)
            .with_subjects([subject])
            .with_resources(["resources:articles:<.*>"])
            .with_actions(["read", "update"])
    }

    #[test]
    fn test_create_and_get() {
        let manager = MemoryPolicyManager::new();
        manager.create(articles("p1", "alice", Effect::Allow)).unwrap();

        assert_eq!(manager.get("p1").unwrap().subjects, vec!["alice"]);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_duplicate_rejected() {
        let manager = MemoryPolicyManager::new();
        manager.create(articles("p1", "alice", Effect::Allow)).unwrap();
        let err = manager
            .create(articles("p1", "bob", Effect::Deny))
            .unwrap_err();
        assert!(matches!(err, PolicyStoreError::DuplicatePolicy(_)));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let manager = MemoryPolicyManager::new();
        let err = manager
            .create(Policy::new("bad", Effect::Allow).with_subjects(["<[>"]))
            .unwrap_err();
        assert!(matches!(err, PolicyStoreError::InvalidPattern { .. }));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_delete() {
        let manager = MemoryPolicyManager::new();
        manager.create(articles("p1", "alice", Effect::Allow)).unwrap();
        manager.delete("p1").unwrap();
        assert!(manager.get("p1").unwrap_err().is_not_found());
        assert!(manager.delete("p1").unwrap_err().is_not_found());
    }

    #[test]
    fn test_find_policies_for_subject() {
        let manager = MemoryPolicyManager::with_policies([
            articles("p1", "alice", Effect::Allow),
            articles("p2", "<alice|bob>", Effect::Deny),
            articles("p3", "bob", Effect::Allow),
        ])
        .unwrap();

        let ids: Vec<_> = manager
            .find_policies_for_subject("alice")
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[test]
    fn test_no_match() {
        let manager =
            MemoryPolicyManager::with_policies([articles("p1", "alice", Effect::Allow)]).unwrap();

        let request = AccessRequest::new("alice", "resources:videos:1", "read");
        assert_eq!(manager.decide(&request), PolicyDecision::no_match());

        let request = AccessRequest::new("alice", "resources:articles:1", "delete");
        assert_eq!(manager.decide(&request).verdict, Verdict::NoMatch);
    }

    #[test]
    fn test_effect_precedence() {
        let manager = MemoryPolicyManager::with_policies([
            articles("a-allow", "alice", Effect::Allow),
            articles("b-deny", "alice", Effect::Deny),
        ])
        .unwrap();
        let request = AccessRequest::new("alice", "resources:articles:1", "read");
        assert_eq!(manager.decide(&request), PolicyDecision::deny("b-deny"));

        manager
            .create(articles("c-force", "alice", Effect::ForceDeny))
            .unwrap();
        assert_eq!(
            manager.decide(&request),
            PolicyDecision::force_deny("c-force")
        );
    }

    #[test]
    fn test_conditions_apply() {
        let manager = MemoryPolicyManager::with_policies([articles("owner", "<.*>", Effect::Allow)
            .with_condition("owner", Condition::SubjectIsOwner)])
        .unwrap();

        let owned = AccessRequest::new("alice", "resources:articles:1", "update")
            .with_context("owner", "alice");
        assert_eq!(manager.decide(&owned).verdict, Verdict::Allow);

        let foreign = AccessRequest::new("bob", "resources:articles:1", "update")
            .with_context("owner", "alice");
        assert_eq!(manager.decide(&foreign).verdict, Verdict::NoMatch);

        let missing = AccessRequest::new("alice", "resources:articles:1", "update");
        assert_eq!(manager.decide(&missing).verdict, Verdict::NoMatch);
    }

    #[tokio::test]
    async fn test_evaluator_trait() {
        let manager =
            MemoryPolicyManager::with_policies([articles("p1", "admins", Effect::Allow)]).unwrap();
        let request = AccessRequest::new("admins", "resources:articles:7", "read");

        let decision = manager.evaluate(&request).await.unwrap();
        assert_eq!(decision, PolicyDecision::allow("p1"));
    }
}

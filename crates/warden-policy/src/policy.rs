//! Policy documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// What a matching policy does to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Grant the request.
    Allow,
    /// Deny the request. Another identity's allow can still grant it.
    Deny,
    /// Deny the request regardless of any allow.
    ForceDeny,
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny => write!(f, "deny"),
            Self::ForceDeny => write!(f, "force_deny"),
        }
    }
}

/// An access control policy.
///
/// Subjects, resources and actions are patterns: text between `<` and `>` is
/// a regular expression, everything else must match literally.
///
/// # Example
///
/// ```
/// use warden_policy::{Condition, Effect, Policy};
///
/// let policy = Policy::new("articles-owner", Effect::Allow)
///     .with_subjects(["<.*>"])
///     .with_resources(["resources:articles:<.*>"])
///     .with_actions(["update", "delete"])
///     .with_condition("owner", Condition::SubjectIsOwner);
///
/// assert_eq!(policy.actions.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Policy {
    /// Unique policy identifier.
    pub id: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Subject patterns.
    #[serde(default)]
    pub subjects: Vec<String>,
    /// Resource patterns.
    #[serde(default)]
    pub resources: Vec<String>,
    /// Action patterns.
    #[serde(default)]
    pub actions: Vec<String>,
    /// Effect when the policy matches.
    pub effect: Effect,
    /// Conditions on the request context, keyed by context key.
    #[serde(default)]
    pub conditions: BTreeMap<String, Condition>,
}

impl Policy {
    /// Creates an empty policy. It matches nothing until patterns are added.
    pub fn new(id: impl Into<String>, effect: Effect) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            subjects: Vec::new(),
            resources: Vec::new(),
            actions: Vec::new(),
            effect,
            conditions: BTreeMap::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds subject patterns.
    pub fn with_subjects<I, S>(mut self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subjects.extend(subjects.into_iter().map(Into::into));
        self
    }

    /// Adds resource patterns.
    pub fn with_resources<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources.extend(resources.into_iter().map(Into::into));
        self
    }

    /// Adds action patterns.
    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    /// Adds a condition on a context key.
    pub fn with_condition(mut self, key: impl Into<String>, condition: Condition) -> Self {
        self.conditions.insert(key.into(), condition);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_deserialize() {
        let json = r#"{
            "id": "p1",
            "subjects": ["alice"],
            "resources": ["resources:articles:<.*>"],
            "actions": ["read"],
            "effect": "force_deny",
            "conditions": {
                "owner": { "type": "subject_is_owner" }
            }
        }"#;

        let policy: Policy = serde_json::from_str(json).unwrap();
        assert_eq!(policy.effect, Effect::ForceDeny);
        assert_eq!(policy.conditions["owner"], Condition::SubjectIsOwner);
        assert!(policy.description.is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = r#"{"id": "p1", "effect": "allow", "priority": 3}"#;
        assert!(serde_json::from_str::<Policy>(json).is_err());
    }

    #[test]
    fn test_effect_display() {
        assert_eq!(Effect::ForceDeny.to_string(), "force_deny");
    }
}

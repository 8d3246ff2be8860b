//! Conditions on the request context.

use std::net::IpAddr;

use ipnet::IpNet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PolicyResult, PolicyStoreError};

/// A condition a policy places on one request context value.
///
/// A condition whose context key is absent never holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// The value is a string equal to `equals`.
    StringEqual {
        /// Expected value.
        equals: String,
    },
    /// The value is a string matched by the regular expression `matches`.
    StringMatch {
        /// Unanchored regular expression.
        matches: String,
    },
    /// The value is a string equal to the identity being evaluated.
    SubjectIsOwner,
    /// The value is an IP address within the network `cidr`.
    Cidr {
        /// Network in CIDR notation, e.g. `192.168.0.0/16`.
        cidr: String,
    },
}

/// A condition ready for evaluation.
#[derive(Debug, Clone)]
pub(crate) enum CompiledCondition {
    StringEqual(String),
    StringMatch(Regex),
    SubjectIsOwner,
    Cidr(IpNet),
}

impl CompiledCondition {
    pub(crate) fn compile(key: &str, condition: &Condition) -> PolicyResult<Self> {
        match condition {
            Condition::StringEqual { equals } => Ok(Self::StringEqual(equals.clone())),
            Condition::StringMatch { matches } => Regex::new(matches)
                .map(Self::StringMatch)
                .map_err(|e| PolicyStoreError::invalid_condition(key, e.to_string())),
            Condition::SubjectIsOwner => Ok(Self::SubjectIsOwner),
            Condition::Cidr { cidr } => cidr
                .parse::<IpNet>()
                .map(Self::Cidr)
                .map_err(|e| PolicyStoreError::invalid_condition(key, e.to_string())),
        }
    }

    /// Whether the condition holds for `value` when evaluating as `subject`.
    pub(crate) fn fulfills(&self, value: Option<&Value>, subject: &str) -> bool {
        let Some(value) = value.and_then(Value::as_str) else {
            return false;
        };

        match self {
            Self::StringEqual(expected) => value == expected,
            Self::StringMatch(re) => re.is_match(value),
            Self::SubjectIsOwner => value == subject,
            Self::Cidr(net) => value
                .parse::<IpAddr>()
                .map(|ip| net.contains(&ip))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compiled(condition: Condition) -> CompiledCondition {
        CompiledCondition::compile("key", &condition).unwrap()
    }

    #[test]
    fn test_string_equal() {
        let c = compiled(Condition::StringEqual {
            equals: "blue".to_string(),
        });
        assert!(c.fulfills(Some(&json!("blue")), "alice"));
        assert!(!c.fulfills(Some(&json!("red")), "alice"));
        assert!(!c.fulfills(Some(&json!(7)), "alice"));
    }

    #[test]
    fn test_string_match() {
        let c = compiled(Condition::StringMatch {
            matches: "^prod-".to_string(),
        });
        assert!(c.fulfills(Some(&json!("prod-eu")), "alice"));
        assert!(!c.fulfills(Some(&json!("dev-eu")), "alice"));
    }

    #[test]
    fn test_subject_is_owner() {
        let c = compiled(Condition::SubjectIsOwner);
        assert!(c.fulfills(Some(&json!("alice")), "alice"));
        assert!(!c.fulfills(Some(&json!("bob")), "alice"));
    }

    #[test]
    fn test_cidr() {
        let c = compiled(Condition::Cidr {
            cidr: "10.0.0.0/8".to_string(),
        });
        assert!(c.fulfills(Some(&json!("10.1.2.3")), "alice"));
        assert!(!c.fulfills(Some(&json!("192.168.1.1")), "alice"));
        assert!(!c.fulfills(Some(&json!("not-an-ip")), "alice"));
    }

    #[test]
    fn test_ipv6_cidr() {
        let c = compiled(Condition::Cidr {
            cidr: "2001:db8::/32".to_string(),
        });
        assert!(c.fulfills(Some(&json!("2001:db8::1")), "alice"));
    }

    #[test]
    fn test_missing_value_fails() {
        let c = compiled(Condition::SubjectIsOwner);
        assert!(!c.fulfills(None, "alice"));
    }

    #[test]
    fn test_invalid_condition() {
        let err = CompiledCondition::compile(
            "ip",
            &Condition::Cidr {
                cidr: "10.0.0.0/99".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, PolicyStoreError::InvalidCondition { .. }));
    }

    #[test]
    fn test_condition_serde_tag() {
        let c: Condition = serde_json::from_value(json!({
            "type": "cidr",
            "cidr": "127.0.0.0/8"
        }))
        .unwrap();
        assert_eq!(
            c,
            Condition::Cidr {
                cidr: "127.0.0.0/8".to_string()
            }
        );
    }
}

//! Policy documents on disk.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PolicyResult, PolicyStoreError};
use crate::groups::{Group, MemoryGroupManager};
use crate::manager::MemoryPolicyManager;
use crate::policy::Policy;

/// A set of policies and groups, as stored in a JSON document.
///
/// ```json
/// {
///   "policies": [
///     { "id": "p1", "subjects": ["admins"], "resources": ["<.*>"],
///       "actions": ["<.*>"], "effect": "allow" }
///   ],
///   "groups": [ { "id": "admins", "members": ["alice"] } ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyDocument {
    /// Policies.
    #[serde(default)]
    pub policies: Vec<Policy>,
    /// Groups.
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl PolicyDocument {
    /// Parses a document from JSON text.
    pub fn from_json(json: &str) -> PolicyResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a document from a file.
    pub async fn from_file(path: impl AsRef<Path>) -> PolicyResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading policy document from file");

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PolicyStoreError::document_load(path, e.to_string()))?;

        serde_json::from_str(&content)
            .map_err(|e| PolicyStoreError::document_load(path, e.to_string()))
    }

    /// Stores every policy and group of the document.
    ///
    /// Stops at the first entry that cannot be stored.
    pub fn apply(
        self,
        policies: &MemoryPolicyManager,
        groups: &MemoryGroupManager,
    ) -> PolicyResult<()> {
        let (policy_count, group_count) = (self.policies.len(), self.groups.len());
        for policy in self.policies {
            policies.create(policy)?;
        }
        for group in self.groups {
            groups.create_group(group)?;
        }
        info!(
            policies = policy_count,
            groups = group_count,
            "policy document applied"
        );
        Ok(())
    }
}

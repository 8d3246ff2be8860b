//! In-memory group membership.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use warden_core::{GroupError, GroupResolver};

use crate::error::{PolicyResult, PolicyStoreError};

/// A named set of subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Group {
    /// Group identifier, used as an identity during policy evaluation.
    pub id: String,
    /// Member subjects.
    #[serde(default)]
    pub members: BTreeSet<String>,
}

impl Group {
    /// Creates a group with the given members.
    pub fn new<I, S>(id: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

/// Thread-safe group store.
#[derive(Debug, Default)]
pub struct MemoryGroupManager {
    groups: RwLock<BTreeMap<String, BTreeSet<String>>>,
}

impl MemoryGroupManager {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new group.
    pub fn create_group(&self, group: Group) -> PolicyResult<()> {
        let mut groups = self.groups.write();
        if groups.contains_key(&group.id) {
            return Err(PolicyStoreError::DuplicateGroup(group.id));
        }
        debug!(group_id = %group.id, members = group.members.len(), "group created");
        groups.insert(group.id, group.members);
        Ok(())
    }

    /// Returns a stored group.
    pub fn get_group(&self, id: &str) -> PolicyResult<Group> {
        self.groups
            .read()
            .get(id)
            .map(|members| Group {
                id: id.to_string(),
                members: members.clone(),
            })
            .ok_or_else(|| PolicyStoreError::GroupNotFound(id.to_string()))
    }

    /// Removes a group.
    pub fn delete_group(&self, id: &str) -> PolicyResult<()> {
        self.groups
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| PolicyStoreError::GroupNotFound(id.to_string()))
    }

    /// Adds subjects to a group.
    pub fn add_members<I, S>(&self, id: &str, subjects: I) -> PolicyResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut groups = self.groups.write();
        let members = groups
            .get_mut(id)
            .ok_or_else(|| PolicyStoreError::GroupNotFound(id.to_string()))?;
        members.extend(subjects.into_iter().map(Into::into));
        Ok(())
    }

    /// Removes subjects from a group. Subjects that are not members are ignored.
    pub fn remove_members<I, S>(&self, id: &str, subjects: I) -> PolicyResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut groups = self.groups.write();
        let members = groups
            .get_mut(id)
            .ok_or_else(|| PolicyStoreError::GroupNotFound(id.to_string()))?;
        for subject in subjects {
            members.remove(subject.as_ref());
        }
        Ok(())
    }

    /// IDs of the groups `subject` belongs to, sorted.
    pub fn groups_of(&self, subject: &str) -> Vec<String> {
        self.groups
            .read()
            .iter()
            .filter(|(_, members)| members.contains(subject))
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[async_trait]
impl GroupResolver for MemoryGroupManager {
    async fn find_group_names(&self, subject: &str) -> Result<Vec<String>, GroupError> {
        Ok(self.groups_of(subject))
    }
}

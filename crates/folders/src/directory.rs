//! crates/folders/src/directory.rs
//! Identity provider seam: group membership and user/group existence.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::{DashMap, DashSet};

use crate::error::{DirectoryError, DirectoryResult};

/// Read-only view of the host's users and groups.
///
/// Implementations apply their own timeouts. A lookup that cannot be answered
/// must return [`DirectoryError::Unavailable`] instead of a partial answer.
pub trait Directory: Send + Sync {
    /// Groups `user` belongs to.
    fn groups_for_user(&self, user: &str) -> DirectoryResult<BTreeSet<String>>;

    /// Returns `true` when the group exists.
    fn group_exists(&self, group: &str) -> DirectoryResult<bool>;

    /// Returns `true` when the user exists.
    fn user_exists(&self, user: &str) -> DirectoryResult<bool>;

    /// Members of `group`.
    fn users_in_group(&self, group: &str) -> DirectoryResult<BTreeSet<String>>;
}

/// In-process directory used by the CLI and tests.
///
/// Availability can be switched off to simulate an unreachable provider.
#[derive(Debug)]
pub struct MemoryDirectory {
    members: DashMap<String, BTreeSet<String>>,
    users: DashSet<String>,
    available: AtomicBool,
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDirectory {
    /// Creates an empty, available directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            members: DashMap::new(),
            users: DashSet::new(),
            available: AtomicBool::new(true),
        }
    }

    /// Registers a user without group memberships.
    pub fn add_user(&self, user: &str) {
        self.users.insert(user.to_owned());
    }

    /// Registers an empty group.
    pub fn add_group(&self, group: &str) {
        self.members.entry(group.to_owned()).or_default();
    }

    /// Adds `user` to `group`, creating both as needed.
    pub fn add_member(&self, group: &str, user: &str) {
        self.add_user(user);
        self.members
            .entry(group.to_owned())
            .or_default()
            .insert(user.to_owned());
    }

    /// Removes `user` from `group`.
    pub fn remove_member(&self, group: &str, user: &str) -> bool {
        self.members
            .get_mut(group)
            .is_some_and(|mut members| members.remove(user))
    }

    /// Deletes a group. Returns `false` when it did not exist.
    pub fn remove_group(&self, group: &str) -> bool {
        self.members.remove(group).is_some()
    }

    /// Toggles availability. While unavailable every lookup fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    fn ensure_available(&self) -> DirectoryResult<()> {
        if self.available.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(DirectoryError::Unavailable(
                "in-memory directory switched off".to_owned(),
            ))
        }
    }
}

impl Directory for MemoryDirectory {
    fn groups_for_user(&self, user: &str) -> DirectoryResult<BTreeSet<String>> {
        self.ensure_available()?;
        Ok(self
            .members
            .iter()
            .filter(|entry| entry.value().contains(user))
            .map(|entry| entry.key().clone())
            .collect())
    }

    fn group_exists(&self, group: &str) -> DirectoryResult<bool> {
        self.ensure_available()?;
        Ok(self.members.contains_key(group))
    }

    fn user_exists(&self, user: &str) -> DirectoryResult<bool> {
        self.ensure_available()?;
        Ok(self.users.contains(user))
    }

    fn users_in_group(&self, group: &str) -> DirectoryResult<BTreeSet<String>> {
        self.ensure_available()?;
        Ok(self
            .members
            .get(group)
            .map(|members| members.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_lookups() {
        let directory = MemoryDirectory::new();
        directory.add_member("staff", "alice");
        directory.add_member("leads", "alice");
        directory.add_member("staff", "bob");
        directory.add_group("empty");

        let groups = directory.groups_for_user("alice").unwrap();
        assert_eq!(
            groups.into_iter().collect::<Vec<_>>(),
            vec!["leads".to_owned(), "staff".to_owned()]
        );
        assert!(directory.group_exists("empty").unwrap());
        assert!(directory.user_exists("bob").unwrap());
        assert!(!directory.user_exists("carol").unwrap());
        assert_eq!(directory.users_in_group("staff").unwrap().len(), 2);
        assert!(directory.users_in_group("missing").unwrap().is_empty());
    }

    #[test]
    fn removing_members_and_groups() {
        let directory = MemoryDirectory::new();
        directory.add_member("staff", "alice");
        assert!(directory.remove_member("staff", "alice"));
        assert!(!directory.remove_member("staff", "alice"));
        assert!(directory.remove_group("staff"));
        assert!(!directory.group_exists("staff").unwrap());
    }

    #[test]
    fn unavailable_directory_fails_every_lookup() {
        let directory = MemoryDirectory::new();
        directory.add_member("staff", "alice");
        directory.set_available(false);
        assert!(directory.groups_for_user("alice").is_err());
        assert!(directory.group_exists("staff").is_err());
        assert!(directory.user_exists("alice").is_err());
        assert!(directory.users_in_group("staff").is_err());
        directory.set_available(true);
        assert!(directory.groups_for_user("alice").is_ok());
    }
}

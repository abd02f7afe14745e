//! crates/acl/src/store.rs
//!
//! Keyed storage for ACL rule rows.
//!
//! [`RuleStore`] is the persistence seam: the engine only ever talks to the
//! trait, so a database-backed store can replace [`MemoryRuleStore`] without
//! touching resolution code. The in-memory store shards rows per folder in a
//! `DashMap`, so upserts on one folder never block reads on another and an
//! upsert replaces its composite key atomically under the shard lock.

use std::collections::{BTreeMap, btree_map};

use dashmap::DashMap;
use permissions::{FolderId, Mapping, PermissionMask};

use crate::debug_acl;
use crate::error::{AclError, AclResult};
use crate::path;
use crate::rule::AclRule;

/// Outcome of an upsert.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RuleChange {
    /// A new row was stored.
    Inserted,
    /// An existing row received new values.
    Updated,
    /// The stored row already had these values.
    Unchanged,
    /// The upsert constrained no bits and the existing row was deleted.
    Removed,
}

/// Durable storage of ACL rules keyed by `(folder, path, mapping)`.
pub trait RuleStore: Send + Sync {
    /// Inserts or replaces the row for the rule's composite key.
    ///
    /// A rule whose `mask_bits` is empty deletes the existing row instead of
    /// being stored. When there is no row to delete the call fails with
    /// [`AclError::EmptyMask`] and nothing changes.
    fn upsert(&self, rule: AclRule) -> AclResult<RuleChange>;

    /// Every rule of `folder`, ordered by path depth, then path, then mapping.
    fn rules_for_folder(&self, folder: FolderId) -> AclResult<Vec<AclRule>>;

    /// Rules of `folder` whose mapping is in `mappings` and whose path is in
    /// `paths`, in the same order as [`rules_for_folder`](Self::rules_for_folder).
    fn rules_for_mappings(
        &self,
        folder: FolderId,
        mappings: &[Mapping],
        paths: &[String],
    ) -> AclResult<Vec<AclRule>>;

    /// Deletes every rule of `folder` and returns how many rows were removed.
    fn delete_folder_rules(&self, folder: FolderId) -> AclResult<usize>;

    /// Every stored rule across all folders, ordered by folder then depth.
    fn all_rules(&self) -> AclResult<Vec<AclRule>>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct RuleValue {
    permissions: PermissionMask,
    mask_bits: PermissionMask,
}

type FolderRules = BTreeMap<(String, Mapping), RuleValue>;

/// Concurrent in-memory [`RuleStore`].
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    folders: DashMap<FolderId, FolderRules>,
}

impl MemoryRuleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows across all folders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.folders.iter().map(|entry| entry.value().len()).sum()
    }

    /// Returns `true` when no rule is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn collect_sorted<'a>(
        folder: FolderId,
        rows: impl Iterator<Item = (&'a (String, Mapping), &'a RuleValue)>,
    ) -> Vec<AclRule> {
        let mut rules: Vec<AclRule> = rows
            .map(|((path, mapping), value)| {
                AclRule::new(
                    folder,
                    path,
                    mapping.clone(),
                    value.permissions,
                    value.mask_bits,
                )
            })
            .collect();
        rules.sort_by(|left, right| {
            left.depth()
                .cmp(&right.depth())
                .then_with(|| left.path().cmp(right.path()))
                .then_with(|| left.mapping().cmp(right.mapping()))
        });
        rules
    }
}

impl RuleStore for MemoryRuleStore {
    fn upsert(&self, rule: AclRule) -> AclResult<RuleChange> {
        let (folder, path, mapping, permissions, mask_bits) = rule.into_parts();
        let value = RuleValue {
            permissions,
            mask_bits,
        };

        let outcome = {
            let mut rows = self.folders.entry(folder).or_default();
            match rows.entry((path, mapping)) {
                btree_map::Entry::Occupied(mut occupied) => {
                    if mask_bits.is_empty() {
                        occupied.remove();
                        Ok(RuleChange::Removed)
                    } else if *occupied.get() == value {
                        Ok(RuleChange::Unchanged)
                    } else {
                        occupied.insert(value);
                        Ok(RuleChange::Updated)
                    }
                }
                btree_map::Entry::Vacant(vacant) => {
                    if mask_bits.is_empty() {
                        let (path, mapping) = vacant.into_key();
                        Err(AclError::EmptyMask {
                            folder,
                            path,
                            mapping,
                        })
                    } else {
                        vacant.insert(value);
                        Ok(RuleChange::Inserted)
                    }
                }
            }
        };

        if mask_bits.is_empty() {
            self.folders.remove_if(&folder, |_, rows| rows.is_empty());
        }
        outcome
    }

    fn rules_for_folder(&self, folder: FolderId) -> AclResult<Vec<AclRule>> {
        Ok(self
            .folders
            .get(&folder)
            .map(|rows| Self::collect_sorted(folder, rows.iter()))
            .unwrap_or_default())
    }

    fn rules_for_mappings(
        &self,
        folder: FolderId,
        mappings: &[Mapping],
        paths: &[String],
    ) -> AclResult<Vec<AclRule>> {
        let Some(rows) = self.folders.get(&folder) else {
            return Ok(Vec::new());
        };

        let mut matching = Vec::new();
        for candidate in paths {
            let candidate = path::normalize(candidate);
            for mapping in mappings {
                let key = (candidate.clone(), mapping.clone());
                if let Some((key, value)) = rows.get_key_value(&key) {
                    matching.push((key, value));
                }
            }
        }
        Ok(Self::collect_sorted(folder, matching.into_iter()))
    }

    fn delete_folder_rules(&self, folder: FolderId) -> AclResult<usize> {
        let removed = self
            .folders
            .remove(&folder)
            .map_or(0, |(_, rows)| rows.len());
        debug_acl::trace_folder_rules_deleted(folder, removed);
        Ok(removed)
    }

    fn all_rules(&self) -> AclResult<Vec<AclRule>> {
        let mut folders: Vec<FolderId> = self.folders.iter().map(|entry| *entry.key()).collect();
        folders.sort();

        let mut rules = Vec::new();
        for folder in folders {
            rules.extend(self.rules_for_folder(folder)?);
        }
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder() -> FolderId {
        FolderId::new(7)
    }

    fn rule(path: &str, mapping: Mapping, allowed: PermissionMask, bits: PermissionMask) -> AclRule {
        AclRule::new(folder(), path, mapping, allowed, bits)
    }

    #[test]
    fn upsert_inserts_then_updates_then_reports_unchanged() {
        let store = MemoryRuleStore::new();
        let first = rule("docs", Mapping::group("staff"), PermissionMask::READ, PermissionMask::READ);
        assert_eq!(store.upsert(first.clone()).unwrap(), RuleChange::Inserted);
        assert_eq!(store.upsert(first).unwrap(), RuleChange::Unchanged);

        let second = rule(
            "/docs/",
            Mapping::group("staff"),
            PermissionMask::NONE,
            PermissionMask::READ,
        );
        assert_eq!(store.upsert(second).unwrap(), RuleChange::Updated);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn empty_mask_removes_existing_row() {
        let store = MemoryRuleStore::new();
        store
            .upsert(rule("a", Mapping::user("bob"), PermissionMask::ALL, PermissionMask::ALL))
            .unwrap();
        let change = store
            .upsert(rule("a", Mapping::user("bob"), PermissionMask::ALL, PermissionMask::NONE))
            .unwrap();
        assert_eq!(change, RuleChange::Removed);
        assert!(store.is_empty());
        assert!(store.rules_for_folder(folder()).unwrap().is_empty());
    }

    #[test]
    fn empty_mask_without_row_is_rejected() {
        let store = MemoryRuleStore::new();
        let error = store
            .upsert(rule("a", Mapping::user("bob"), PermissionMask::ALL, PermissionMask::NONE))
            .expect_err("nothing to remove");
        assert!(matches!(error, AclError::EmptyMask { .. }));
        assert!(error.to_string().contains("user:bob"));
        assert!(store.is_empty());
    }

    #[test]
    fn rules_are_ordered_shallow_to_deep() {
        let store = MemoryRuleStore::new();
        for path in ["b", "a/b/c", "", "a/b", "a"] {
            store
                .upsert(rule(path, Mapping::group("g"), PermissionMask::READ, PermissionMask::READ))
                .unwrap();
        }
        let paths: Vec<String> = store
            .rules_for_folder(folder())
            .unwrap()
            .into_iter()
            .map(|rule| rule.path().to_owned())
            .collect();
        assert_eq!(paths, vec!["", "a", "b", "a/b", "a/b/c"]);
    }

    #[test]
    fn targeted_lookup_filters_by_mapping_and_path() {
        let store = MemoryRuleStore::new();
        store
            .upsert(rule("docs", Mapping::group("staff"), PermissionMask::READ, PermissionMask::READ))
            .unwrap();
        store
            .upsert(rule("docs", Mapping::group("other"), PermissionMask::READ, PermissionMask::READ))
            .unwrap();
        store
            .upsert(rule("misc", Mapping::group("staff"), PermissionMask::READ, PermissionMask::READ))
            .unwrap();

        let found = store
            .rules_for_mappings(
                folder(),
                &[Mapping::group("staff"), Mapping::user("alice")],
                &[String::new(), "docs".to_owned()],
            )
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].mapping(), &Mapping::group("staff"));
        assert_eq!(found[0].path(), "docs");
    }

    #[test]
    fn delete_folder_rules_only_touches_that_folder() {
        let store = MemoryRuleStore::new();
        store
            .upsert(rule("x", Mapping::group("g"), PermissionMask::READ, PermissionMask::READ))
            .unwrap();
        store
            .upsert(AclRule::exact(FolderId::new(8), "x", Mapping::group("g"), PermissionMask::READ))
            .unwrap();

        assert_eq!(store.delete_folder_rules(folder()).unwrap(), 1);
        assert_eq!(store.delete_folder_rules(folder()).unwrap(), 0);
        assert_eq!(store.all_rules().unwrap().len(), 1);
    }
}

use std::sync::Arc;

use permissions::{FolderId, PermissionMask};

use crate::debug_acl;
use crate::error::AclResult;
use crate::path;
use crate::resolve::{self, Resolution};
use crate::rule::{AclRule, Subject};
use crate::store::{RuleChange, RuleStore};

/// Answers per-path permission queries for ACL-enabled folders.
///
/// The manager owns no state of its own beyond a handle to the [`RuleStore`].
/// It fetches only the rows that can influence a query (the subject's mappings
/// on the target's ancestor chain) and hands them to [`resolve::resolve`].
#[derive(Clone)]
pub struct AclManager {
    store: Arc<dyn RuleStore>,
}

impl AclManager {
    /// Creates a manager over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        Self { store }
    }

    /// The underlying rule store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn RuleStore> {
        &self.store
    }

    /// Resolves the effective permission of `subject` at `target`.
    ///
    /// When `acl_enabled` is false the walk is skipped and `base` is returned
    /// unchanged, whatever rows exist for the folder.
    pub fn resolve(
        &self,
        folder: FolderId,
        acl_enabled: bool,
        subject: &Subject,
        target: &str,
        base: PermissionMask,
    ) -> AclResult<Resolution> {
        if !acl_enabled {
            return Ok(Resolution::inherited(base));
        }

        let chain = path::ancestors(target);
        let rules = self
            .store
            .rules_for_mappings(folder, &subject.mappings(), &chain)?;
        let resolution = resolve::resolve(&rules, subject, target, base);
        debug_acl::trace_resolution(folder, subject.user(), target, base, resolution.mask);
        Ok(resolution)
    }

    /// Stores or removes a rule.
    pub fn set_rule(&self, rule: AclRule) -> AclResult<RuleChange> {
        let traced = rule.clone();
        let change = self.store.upsert(rule)?;
        debug_acl::trace_rule_upserted(&traced, change);
        Ok(change)
    }

    /// Every rule of `folder`, shallow paths first.
    pub fn rules_for_folder(&self, folder: FolderId) -> AclResult<Vec<AclRule>> {
        self.store.rules_for_folder(folder)
    }

    /// Rules of `folder` attached exactly to `target`.
    pub fn rules_at(&self, folder: FolderId, target: &str) -> AclResult<Vec<AclRule>> {
        let target = path::normalize(target);
        Ok(self
            .store
            .rules_for_folder(folder)?
            .into_iter()
            .filter(|rule| rule.path() == target)
            .collect())
    }

    /// Removes every rule of `folder`.
    pub fn delete_folder_rules(&self, folder: FolderId) -> AclResult<usize> {
        self.store.delete_folder_rules(folder)
    }
}

impl std::fmt::Debug for AclManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AclManager").finish_non_exhaustive()
    }
}

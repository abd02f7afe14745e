//! ACL delegation and rule editing.

use std::collections::BTreeSet;

use acl::{AclRule, RuleChange};
use permissions::{FolderId, Mapping, PermissionMask};
use serde::Serialize;

use super::GroupFolders;
use crate::error::{EngineError, EngineResult};

/// Candidates offered when an ACL manager picks a mapping for a new rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MappingSearch {
    /// Applicable groups matching the query.
    pub groups: Vec<String>,
    /// Applicable users, and members of applicable groups, matching the
    /// query.
    pub users: Vec<String>,
}

impl GroupFolders {
    /// Returns `true` when `user` belongs to the administrator group.
    pub fn is_admin(&self, user: &str) -> EngineResult<bool> {
        let groups = self.resolver.groups_for(user)?;
        Ok(groups.contains(&self.settings.admin_group))
    }

    /// Returns `true` when `user` may edit ACL rules of `folder`: they are an
    /// administrator, are listed as a manager, or belong to a listed group.
    pub fn can_manage_acl(&self, folder: FolderId, user: &str) -> EngineResult<bool> {
        let folder = self.registry.get(folder)?;
        let groups = self.resolver.groups_for(user)?;
        Ok(groups.contains(&self.settings.admin_group) || folder.lists_acl_manager(user, &groups))
    }

    /// Stores a rule on behalf of `actor`.
    ///
    /// Fails with `NotAuthorized` unless the actor may manage ACLs of the
    /// folder. Empty `mask_bits` removes the existing rule for the mapping at
    /// that path; with no rule to remove the call fails with
    /// `InvalidArgument`. When the folder is removed while the rule is being
    /// written, the folder's rows are swept again and the call fails with
    /// `NotFound`.
    pub fn set_acl_rule(
        &self,
        actor: &str,
        folder: FolderId,
        path: &str,
        mapping: Mapping,
        permissions: PermissionMask,
        mask_bits: PermissionMask,
    ) -> EngineResult<RuleChange> {
        if !self.can_manage_acl(folder, actor)? {
            logging::trace_guard!(actor = %actor, folder = %folder, "acl_edit_denied");
            return Err(EngineError::NotAuthorized(format!(
                "'{actor}' may not manage ACL rules of folder {folder}"
            )));
        }
        let rule = AclRule::new(folder, path, mapping, permissions, mask_bits);
        let change = self.acl.set_rule(rule)?;
        // A removal that ran between the check and the upsert has already
        // swept the store, so the row just written is orphaned.
        if !self.registry.contains(folder) {
            let rules = self.acl.delete_folder_rules(folder)?;
            logging::trace_registry!(folder = %folder, rules = rules, "orphaned_rules_removed");
            return Err(folders::RegistryError::NotFound(folder).into());
        }
        Ok(change)
    }

    /// Every rule of `folder`, shallow paths first. A removed folder has no
    /// rules.
    pub fn rules_for_folder(&self, folder: FolderId) -> EngineResult<Vec<AclRule>> {
        Ok(self.acl.rules_for_folder(folder)?)
    }

    /// Rules attached exactly to `path`.
    pub fn rules_at(&self, folder: FolderId, path: &str) -> EngineResult<Vec<AclRule>> {
        self.ensure_folder(folder)?;
        Ok(self.acl.rules_at(folder, path)?)
    }

    /// Applicable groups and users of `folder` whose id contains `query`,
    /// compared case-insensitively.
    ///
    /// Members of applicable groups are offered as users too. An actor who
    /// may not manage the folder's ACLs gets empty lists.
    pub fn acl_mapping_search(
        &self,
        actor: &str,
        folder: FolderId,
        query: &str,
    ) -> EngineResult<MappingSearch> {
        if !self.can_manage_acl(folder, actor)? {
            return Ok(MappingSearch::default());
        }

        let folder = self.registry.get(folder)?;
        let needle = query.trim().to_lowercase();
        let matches = |id: &str| needle.is_empty() || id.to_lowercase().contains(&needle);

        let directory = self.resolver.directory();
        let mut users: BTreeSet<String> = folder
            .users()
            .keys()
            .filter(|user| matches(user))
            .cloned()
            .collect();
        for group in folder.groups().keys() {
            users.extend(
                directory
                    .users_in_group(group)?
                    .into_iter()
                    .filter(|user| matches(user)),
            );
        }

        Ok(MappingSearch {
            groups: folder
                .groups()
                .keys()
                .filter(|group| matches(group))
                .cloned()
                .collect(),
            users: users.into_iter().collect(),
        })
    }
}

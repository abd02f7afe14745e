//! Folder administration: creation, membership, quota and folder flags.

use std::path::PathBuf;

use folders::{Folder, SweepReport};
use permissions::{FolderId, Mapping, PermissionMask};
use serde::Serialize;

use super::GroupFolders;
use crate::error::{EngineError, EngineResult};

/// A folder together with its current usage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FolderDetails {
    /// Folder snapshot.
    pub folder: Folder,
    /// Bytes currently used.
    pub usage: u64,
    /// Bytes left under the quota; `None` when unlimited.
    pub quota_remaining: Option<u64>,
}

impl GroupFolders {
    /// Creates a folder and returns its id. Fails with `Conflict` when the
    /// mount point is taken.
    pub fn create_folder(&self, mount_point: &str) -> EngineResult<FolderId> {
        Ok(self.registry.create_folder(mount_point)?)
    }

    /// Moves a folder to another mount point. Renaming to the current mount
    /// point does nothing.
    pub fn rename_folder(&self, folder: FolderId, mount_point: &str) -> EngineResult<()> {
        Ok(self.registry.rename_folder(folder, mount_point)?)
    }

    /// Removes a folder with its ACL rules and applicable rows.
    ///
    /// The folder disappears from every user's mounts on their next
    /// resolution. Storage content is left for the caller to delete once
    /// this returns.
    pub fn remove_folder(&self, folder: FolderId) -> EngineResult<Folder> {
        let removed = self.registry.remove_folder(folder)?;
        let rules = self.acl.delete_folder_rules(folder)?;
        logging::trace_registry!(folder = %folder, rules = rules, "folder_rules_removed");
        Ok(removed)
    }

    /// Makes an existing group applicable with full permissions.
    pub fn add_applicable_group(&self, folder: FolderId, group: &str) -> EngineResult<bool> {
        self.ensure_folder(folder)?;
        if !self.resolver.directory().group_exists(group)? {
            return Err(EngineError::NotFound(format!("group '{group}' does not exist")));
        }
        Ok(self.registry.add_applicable_group(folder, group)?)
    }

    /// Removes a group from the applicable groups.
    pub fn remove_applicable_group(&self, folder: FolderId, group: &str) -> EngineResult<bool> {
        Ok(self.registry.remove_applicable_group(folder, group)?)
    }

    /// Makes an existing user applicable with full permissions.
    pub fn add_applicable_user(&self, folder: FolderId, user: &str) -> EngineResult<bool> {
        self.ensure_folder(folder)?;
        if !self.resolver.directory().user_exists(user)? {
            return Err(EngineError::NotFound(format!("user '{user}' does not exist")));
        }
        Ok(self.registry.add_applicable_user(folder, user)?)
    }

    /// Removes the row of a user.
    pub fn remove_applicable_user(&self, folder: FolderId, user: &str) -> EngineResult<bool> {
        Ok(self.registry.remove_applicable_user(folder, user)?)
    }

    /// Sets the mask of a group. `NONE` keeps the group applicable with no
    /// permission.
    pub fn set_group_permissions(
        &self,
        folder: FolderId,
        group: &str,
        mask: PermissionMask,
    ) -> EngineResult<()> {
        Ok(self.registry.set_group_permissions(folder, group, mask)?)
    }

    /// Sets the mask of a user, replacing their group masks on this folder.
    pub fn set_user_permissions(
        &self,
        folder: FolderId,
        user: &str,
        mask: PermissionMask,
    ) -> EngineResult<()> {
        Ok(self.registry.set_user_permissions(folder, user, mask)?)
    }

    /// Sets the quota in bytes; `-3` means unlimited.
    pub fn set_folder_quota(&self, folder: FolderId, bytes: i64) -> EngineResult<()> {
        Ok(self.registry.set_quota(folder, bytes)?)
    }

    /// Enables or disables ACL rules. Rules are kept while disabled.
    pub fn set_folder_acl(&self, folder: FolderId, enabled: bool) -> EngineResult<()> {
        Ok(self.registry.set_acl_enabled(folder, enabled)?)
    }

    /// Adds or removes an ACL manager.
    pub fn set_manage_acl(
        &self,
        folder: FolderId,
        mapping: &Mapping,
        enabled: bool,
    ) -> EngineResult<bool> {
        Ok(self.registry.set_manage_acl(folder, mapping, enabled)?)
    }

    /// Sets or clears the template server endpoint of a folder.
    pub fn set_api_server(&self, folder: FolderId, api_server: Option<&str>) -> EngineResult<()> {
        Ok(self.registry.set_api_server(folder, api_server)?)
    }

    /// Restricts a folder to template documents.
    pub fn set_template_only(&self, folder: FolderId, template_only: bool) -> EngineResult<()> {
        Ok(self.registry.set_template_only(folder, template_only)?)
    }

    /// One folder with its usage.
    pub fn get_folder(&self, folder: FolderId) -> EngineResult<FolderDetails> {
        let folder = self.registry.get(folder)?;
        self.details(folder)
    }

    /// Every folder with its usage, ordered by id.
    pub fn list_folders(&self) -> EngineResult<Vec<FolderDetails>> {
        self.registry
            .folders()
            .into_iter()
            .map(|folder| self.details(folder))
            .collect()
    }

    /// Storage directory of a folder, when a storage root is configured.
    pub fn storage_path(&self, folder: FolderId) -> EngineResult<Option<PathBuf>> {
        self.ensure_folder(folder)?;
        Ok(self
            .resolver
            .storage_root()
            .map(|root| root.folder_path(folder))
            .transpose()?)
    }

    /// Handles the host's group-deleted event.
    ///
    /// Removes the group's applicable rows and ACL manager entries from every
    /// folder. ACL rules naming the group are left in place; with no member
    /// left they match nobody.
    pub fn on_group_deleted(&self, group: &str) -> SweepReport {
        self.registry.delete_group(group)
    }

    pub(super) fn ensure_folder(&self, folder: FolderId) -> EngineResult<()> {
        if self.registry.contains(folder) {
            Ok(())
        } else {
            Err(folders::RegistryError::NotFound(folder).into())
        }
    }

    fn details(&self, folder: Folder) -> EngineResult<FolderDetails> {
        let usage = self.resolver.usage_of(&folder)?;
        Ok(FolderDetails {
            quota_remaining: folder.quota().remaining(usage),
            usage,
            folder,
        })
    }
}

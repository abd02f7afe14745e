//! crates/mounts/src/resolver.rs
//! Per-user mount resolution.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use folders::{Directory, Folder, FolderRegistry};
use permissions::PermissionMask;

use crate::error::{MountError, MountResult};
use crate::root::StorageRoot;
use crate::usage::UsageProvider;

/// One folder as attached to one user's filesystem view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MountDescriptor {
    /// Folder snapshot the mount was built from.
    pub folder: Folder,
    /// Top-level permission before per-path ACL refinement.
    pub effective_permission: PermissionMask,
    /// Bytes currently used.
    pub usage: u64,
    /// Bytes left under the quota; `None` when unlimited.
    pub quota_remaining: Option<u64>,
    /// Storage directory of the folder, when a storage root is configured.
    pub storage_path: Option<PathBuf>,
}

/// Knobs applied to every mount.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MountOptions {
    /// Whether the root of a folder may be reshared.
    pub allow_root_share: bool,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            allow_root_share: true,
        }
    }
}

impl MountOptions {
    /// Permission at the root of a folder given its top-level mask.
    #[must_use]
    pub const fn root_permission(self, mask: PermissionMask) -> PermissionMask {
        if self.allow_root_share {
            mask
        } else {
            mask.difference(PermissionMask::SHARE)
        }
    }
}

/// Top-level permission of `user` on `folder`, or `None` when the folder is
/// not mounted for them.
///
/// The folder is mounted when the user has a row or belongs to an applicable
/// group. A zero mask hides it unless ACLs are enabled, since a rule deeper in
/// the tree may still grant access.
#[must_use]
pub fn visible_permission(
    folder: &Folder,
    user: &str,
    groups: &BTreeSet<String>,
) -> Option<PermissionMask> {
    let mask = folder.base_permissions(user, groups)?;
    (!mask.is_empty() || folder.acl_enabled()).then_some(mask)
}

/// Builds mount descriptors from registry snapshots.
#[derive(Clone)]
pub struct MountResolver {
    directory: Arc<dyn Directory>,
    usage: Arc<dyn UsageProvider>,
    storage: Option<Arc<StorageRoot>>,
    options: MountOptions,
}

impl MountResolver {
    /// Creates a resolver without a storage root.
    #[must_use]
    pub fn new(directory: Arc<dyn Directory>, usage: Arc<dyn UsageProvider>) -> Self {
        Self {
            directory,
            usage,
            storage: None,
            options: MountOptions::default(),
        }
    }

    /// Attaches folder storage paths below `root`.
    #[must_use]
    pub fn with_storage_root(mut self, root: Arc<StorageRoot>) -> Self {
        self.storage = Some(root);
        self
    }

    /// Replaces the mount options.
    #[must_use]
    pub const fn with_options(mut self, options: MountOptions) -> Self {
        self.options = options;
        self
    }

    /// Active options.
    #[must_use]
    pub const fn options(&self) -> MountOptions {
        self.options
    }

    /// Identity provider used for membership lookups.
    #[must_use]
    pub fn directory(&self) -> &Arc<dyn Directory> {
        &self.directory
    }

    /// Storage root, when configured.
    #[must_use]
    pub fn storage_root(&self) -> Option<&Arc<StorageRoot>> {
        self.storage.as_ref()
    }

    /// Groups of `user` according to the identity provider.
    pub fn groups_for(&self, user: &str) -> MountResult<BTreeSet<String>> {
        Ok(self.directory.groups_for_user(user)?)
    }

    /// Every folder mounted for `user`, ordered by mount point.
    ///
    /// Fails as a whole when membership, usage or the storage root cannot be
    /// resolved; a partial list is never returned.
    pub fn mounts_for_user(
        &self,
        registry: &FolderRegistry,
        user: &str,
    ) -> MountResult<Vec<MountDescriptor>> {
        let groups = self.groups_for(user)?;

        let mut mounts = registry
            .folders()
            .into_iter()
            .filter_map(|folder| {
                visible_permission(&folder, user, &groups).map(|mask| (folder, mask))
            })
            .map(|(folder, mask)| self.describe(folder, mask))
            .collect::<MountResult<Vec<_>>>()?;
        mounts.sort_by(|a, b| a.folder.mount_point().cmp(b.folder.mount_point()));

        logging::trace_mount!(
            user = %user,
            groups = groups.len(),
            mounts = mounts.len(),
            "mounts_resolved"
        );
        Ok(mounts)
    }

    /// Mount of one folder for `user`, or `None` when it is not mounted for
    /// them.
    pub fn mount_for_user(
        &self,
        folder: Folder,
        user: &str,
        groups: &BTreeSet<String>,
    ) -> MountResult<Option<MountDescriptor>> {
        visible_permission(&folder, user, groups)
            .map(|mask| self.describe(folder, mask))
            .transpose()
    }

    /// Builds the descriptor of `folder` for a top-level mask.
    pub fn describe(&self, folder: Folder, mask: PermissionMask) -> MountResult<MountDescriptor> {
        let usage = self.usage_of(&folder)?;
        let storage_path = self
            .storage
            .as_ref()
            .map(|root| root.folder_path(folder.id()))
            .transpose()?;
        Ok(MountDescriptor {
            effective_permission: self.options.root_permission(mask),
            usage,
            quota_remaining: folder.quota().remaining(usage),
            storage_path,
            folder,
        })
    }

    /// Current usage of `folder`.
    pub fn usage_of(&self, folder: &Folder) -> MountResult<u64> {
        self.usage
            .usage(folder.id())
            .map_err(|source| MountError::Usage {
                folder: folder.id(),
                source,
            })
    }
}

impl std::fmt::Debug for MountResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountResolver")
            .field("storage", &self.storage)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folders::MemoryDirectory;

    use crate::usage::MemoryUsage;

    fn groups(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    #[test]
    fn zero_mask_hides_folder_without_acl() {
        let registry = FolderRegistry::new();
        let id = registry.create_folder("Hidden").unwrap();
        registry
            .set_group_permissions(id, "staff", PermissionMask::NONE)
            .unwrap();
        let folder = registry.get(id).unwrap();
        assert_eq!(visible_permission(&folder, "u", &groups(&["staff"])), None);

        registry.set_acl_enabled(id, true).unwrap();
        let folder = registry.get(id).unwrap();
        assert_eq!(
            visible_permission(&folder, "u", &groups(&["staff"])),
            Some(PermissionMask::NONE)
        );
    }

    #[test]
    fn root_share_is_stripped_when_disallowed() {
        let options = MountOptions {
            allow_root_share: false,
        };
        assert_eq!(
            options.root_permission(PermissionMask::ALL),
            PermissionMask::ALL.difference(PermissionMask::SHARE)
        );
        assert_eq!(
            MountOptions::default().root_permission(PermissionMask::ALL),
            PermissionMask::ALL
        );
    }

    #[test]
    fn describe_reports_remaining_quota() {
        let registry = FolderRegistry::new();
        let id = registry.create_folder("Capped").unwrap();
        registry.set_quota(id, 1000).unwrap();
        let usage = Arc::new(MemoryUsage::new());
        usage.set(id, 1500);
        let resolver = MountResolver::new(Arc::new(MemoryDirectory::new()), usage);

        let descriptor = resolver
            .describe(registry.get(id).unwrap(), PermissionMask::READ)
            .unwrap();
        assert_eq!(descriptor.usage, 1500);
        assert_eq!(descriptor.quota_remaining, Some(0));
        assert_eq!(descriptor.storage_path, None);
    }
}

//! crates/folders/src/registry.rs
//!
//! Thread-safe registry of group folders.
//!
//! Folders live in a `DashMap` keyed by id, with a second map from mount point
//! to id that enforces uniqueness. Every mutation touches a single folder
//! entry under its shard lock, so concurrent writers to different folders
//! never block each other and writers to the same folder never lose updates.
//! A mount index guard is never held while a folder entry is taken; renames
//! hold the folder entry while they swap index entries.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use permissions::{FolderId, Mapping, PermissionMask};

use crate::error::{RegistryError, RegistryResult};
use crate::folder::{Folder, Quota};

/// The set of configured group folders.
#[derive(Debug)]
pub struct FolderRegistry {
    /// Folders indexed by id.
    pub(crate) folders: DashMap<FolderId, Folder>,
    /// Mount point to folder id.
    mount_points: DashMap<String, FolderId>,
    /// Next id to assign.
    next_id: AtomicU64,
}

impl Default for FolderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FolderRegistry {
    /// Creates an empty registry. The first folder receives id 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            folders: DashMap::new(),
            mount_points: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Creates a folder at `mount_point` and returns its id.
    ///
    /// The new folder has an unlimited quota, ACLs disabled and no applicable
    /// groups or users. Mount points compare case-sensitively after
    /// surrounding whitespace and separators are removed.
    pub fn create_folder(&self, mount_point: &str) -> RegistryResult<FolderId> {
        let mount_point = normalize_mount_point(mount_point)?;

        let id = match self.mount_points.entry(mount_point.clone()) {
            Entry::Occupied(occupied) => {
                return Err(RegistryError::Conflict {
                    mount_point,
                    existing: *occupied.get(),
                });
            }
            Entry::Vacant(vacant) => {
                let id = FolderId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
                vacant.insert(id);
                id
            }
        };

        self.folders
            .insert(id, Folder::new(id, mount_point.clone()));
        logging::trace_registry!(folder = %id, mount_point = %mount_point, "folder_created");
        Ok(id)
    }

    /// Returns a snapshot of one folder.
    pub fn get(&self, id: FolderId) -> RegistryResult<Folder> {
        self.folders
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(RegistryError::NotFound(id))
    }

    /// Returns `true` when a folder with this id exists.
    #[must_use]
    pub fn contains(&self, id: FolderId) -> bool {
        self.folders.contains_key(&id)
    }

    /// Looks a folder up by mount point.
    #[must_use]
    pub fn find_by_mount_point(&self, mount_point: &str) -> Option<Folder> {
        let mount_point = normalize_mount_point(mount_point).ok()?;
        let id = *self.mount_points.get(&mount_point)?;
        self.get(id).ok()
    }

    /// Snapshot of every folder, ordered by id.
    #[must_use]
    pub fn folders(&self) -> Vec<Folder> {
        let mut folders: Vec<Folder> = self
            .folders
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        folders.sort_by_key(Folder::id);
        folders
    }

    /// Number of folders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Returns `true` when no folder exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Moves a folder to a new mount point.
    ///
    /// The folder entry stays locked until the old index entry is released,
    /// so concurrent renames of one folder leave exactly one reservation.
    pub fn rename_folder(&self, id: FolderId, mount_point: &str) -> RegistryResult<()> {
        let mount_point = normalize_mount_point(mount_point)?;
        let mut folder = self
            .folders
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;
        if folder.mount_point == mount_point {
            return Ok(());
        }

        match self.mount_points.entry(mount_point.clone()) {
            Entry::Occupied(occupied) => {
                return Err(RegistryError::Conflict {
                    mount_point,
                    existing: *occupied.get(),
                });
            }
            Entry::Vacant(vacant) => {
                vacant.insert(id);
            }
        }

        let previous = std::mem::replace(&mut folder.mount_point, mount_point.clone());
        self.mount_points.remove_if(&previous, |_, owner| *owner == id);
        drop(folder);

        logging::trace_registry!(
            folder = %id,
            from = %previous,
            to = %mount_point,
            "folder_renamed"
        );
        Ok(())
    }

    /// Removes a folder and returns its last state.
    ///
    /// Only registry state is removed here; ACL rows and storage content are
    /// cleaned up by the caller.
    pub fn remove_folder(&self, id: FolderId) -> RegistryResult<Folder> {
        let (_, folder) = self
            .folders
            .remove(&id)
            .ok_or(RegistryError::NotFound(id))?;
        self.mount_points
            .remove_if(&folder.mount_point, |_, owner| *owner == id);
        logging::trace_registry!(folder = %id, mount_point = %folder.mount_point, "folder_removed");
        Ok(folder)
    }

    /// Makes `group` applicable with full permissions. Returns `false` when
    /// the group was already applicable, in which case its mask is kept.
    pub fn add_applicable_group(&self, id: FolderId, group: &str) -> RegistryResult<bool> {
        self.update(id, |folder| {
            if folder.groups.contains_key(group) {
                return false;
            }
            folder.groups.insert(group.to_owned(), PermissionMask::ALL);
            true
        })
    }

    /// Removes `group` from the applicable groups. Returns `false` when it
    /// was not applicable.
    pub fn remove_applicable_group(&self, id: FolderId, group: &str) -> RegistryResult<bool> {
        self.update(id, |folder| folder.groups.remove(group).is_some())
    }

    /// Makes `user` applicable with full permissions. Returns `false` when
    /// the user already had a row, in which case its mask is kept.
    pub fn add_applicable_user(&self, id: FolderId, user: &str) -> RegistryResult<bool> {
        self.update(id, |folder| {
            if folder.users.contains_key(user) {
                return false;
            }
            folder.users.insert(user.to_owned(), PermissionMask::ALL);
            true
        })
    }

    /// Removes the row of `user`. Returns `false` when there was none.
    pub fn remove_applicable_user(&self, id: FolderId, user: &str) -> RegistryResult<bool> {
        self.update(id, |folder| folder.users.remove(user).is_some())
    }

    /// Sets the mask of `group`, adding the group when needed. `NONE` is kept
    /// as an explicit deny.
    pub fn set_group_permissions(
        &self,
        id: FolderId,
        group: &str,
        mask: PermissionMask,
    ) -> RegistryResult<()> {
        self.update(id, |folder| {
            folder.groups.insert(group.to_owned(), mask);
        })?;
        logging::trace_registry!(folder = %id, group = %group, mask = %mask.to_letters(), "group_permissions_set");
        Ok(())
    }

    /// Sets the mask of `user`, adding the row when needed. The row replaces
    /// the user's group masks on this folder.
    pub fn set_user_permissions(
        &self,
        id: FolderId,
        user: &str,
        mask: PermissionMask,
    ) -> RegistryResult<()> {
        self.update(id, |folder| {
            folder.users.insert(user.to_owned(), mask);
        })?;
        logging::trace_registry!(folder = %id, user = %user, mask = %mask.to_letters(), "user_permissions_set");
        Ok(())
    }

    /// Sets the quota from its raw form (`-3` for unlimited).
    pub fn set_quota(&self, id: FolderId, raw: i64) -> RegistryResult<()> {
        let quota = Quota::from_raw(raw)?;
        self.set_quota_value(id, quota)
    }

    /// Sets the quota.
    pub fn set_quota_value(&self, id: FolderId, quota: Quota) -> RegistryResult<()> {
        self.update(id, |folder| folder.quota = quota)?;
        logging::trace_registry!(folder = %id, quota = %quota, "quota_set");
        Ok(())
    }

    /// Enables or disables ACL rules. Existing rules are never touched.
    pub fn set_acl_enabled(&self, id: FolderId, enabled: bool) -> RegistryResult<()> {
        self.update(id, |folder| folder.acl_enabled = enabled)?;
        logging::trace_registry!(folder = %id, enabled = enabled, "acl_toggled");
        Ok(())
    }

    /// Adds or removes `mapping` from the ACL managers. Returns `true` when
    /// the list changed.
    pub fn set_manage_acl(
        &self,
        id: FolderId,
        mapping: &Mapping,
        enabled: bool,
    ) -> RegistryResult<bool> {
        self.update(id, |folder| {
            if enabled {
                folder.manage_acl.insert(mapping.clone())
            } else {
                folder.manage_acl.remove(mapping)
            }
        })
    }

    /// Sets or clears the remote template server endpoint.
    pub fn set_api_server(&self, id: FolderId, api_server: Option<&str>) -> RegistryResult<()> {
        let api_server = api_server.map(validate_api_server).transpose()?;
        self.update(id, |folder| folder.api_server = api_server)
    }

    /// Restricts the folder to template documents.
    pub fn set_template_only(&self, id: FolderId, template_only: bool) -> RegistryResult<()> {
        self.update(id, |folder| folder.template_only = template_only)
    }

    /// Records the cache entry of the folder's storage root.
    pub fn set_root_cache_id(&self, id: FolderId, root_cache_id: u64) -> RegistryResult<()> {
        self.update(id, |folder| folder.root_cache_id = Some(root_cache_id))
    }

    /// Replaces the registry content with `folders`.
    ///
    /// Both maps are cleared and refilled without a lock spanning them; call
    /// this only while no other thread uses the registry, as snapshot
    /// loading does before the engine is shared.
    ///
    /// Fails with [`RegistryError::Conflict`] when two folders share a mount
    /// point and with the mount point error when one is invalid; the
    /// registry is left empty on failure.
    pub fn restore(&self, folders: impl IntoIterator<Item = Folder>) -> RegistryResult<()> {
        self.folders.clear();
        self.mount_points.clear();

        let mut highest = 0;
        for mut folder in folders {
            folder.mount_point = match normalize_mount_point(&folder.mount_point) {
                Ok(mount_point) => mount_point,
                Err(error) => {
                    self.folders.clear();
                    self.mount_points.clear();
                    return Err(error);
                }
            };
            if let Some(existing) = self.mount_points.get(&folder.mount_point) {
                let error = RegistryError::Conflict {
                    mount_point: folder.mount_point.clone(),
                    existing: *existing,
                };
                drop(existing);
                self.folders.clear();
                self.mount_points.clear();
                return Err(error);
            }
            highest = highest.max(folder.id.get());
            self.mount_points.insert(folder.mount_point.clone(), folder.id);
            self.folders.insert(folder.id, folder);
        }

        self.next_id.store(highest + 1, Ordering::Relaxed);
        Ok(())
    }

    pub(crate) fn update<T>(
        &self,
        id: FolderId,
        apply: impl FnOnce(&mut Folder) -> T,
    ) -> RegistryResult<T> {
        let mut folder = self
            .folders
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;
        Ok(apply(folder.value_mut()))
    }
}

fn normalize_mount_point(mount_point: &str) -> RegistryResult<String> {
    let trimmed = mount_point.trim().trim_matches('/').trim();
    if trimmed.is_empty() {
        return Err(RegistryError::InvalidMountPoint(mount_point.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn validate_api_server(value: &str) -> RegistryResult<String> {
    let invalid = |reason: String| RegistryError::InvalidApiServer {
        value: value.to_owned(),
        reason,
    };
    let parsed = url::Url::parse(value.trim()).map_err(|error| invalid(error.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{other}'"))),
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".to_owned()));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_owned())
}

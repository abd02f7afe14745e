//! Permission queries: effective permission, mounts and operation checks.

use acl::{Subject, path};
use folders::Folder;
use mounts::{MountDescriptor, visible_permission};
use permissions::{FolderId, PermissionMask};

use super::GroupFolders;
use crate::error::{EngineError, EngineResult};
use crate::operation::Operation;

/// A folder as seen by one user: its snapshot, the user's subject and the
/// top-level mask the ACL walk starts from.
struct Access {
    folder: Folder,
    subject: Subject,
    base: PermissionMask,
}

impl GroupFolders {
    /// Effective permission of `user` at `path` inside `folder`.
    ///
    /// Fails with `NotFound` when the folder does not exist, `NotAuthorized`
    /// when it is not mounted for the user and `Unavailable` when membership
    /// cannot be resolved.
    pub fn resolve_effective_permission(
        &self,
        user: &str,
        folder: FolderId,
        path: &str,
    ) -> EngineResult<PermissionMask> {
        let access = self.access(user, folder)?;
        self.permission_at(&access, path)
    }

    /// Every folder mounted for `user`, ordered by mount point.
    pub fn list_mounts_for_user(&self, user: &str) -> EngineResult<Vec<MountDescriptor>> {
        Ok(self.resolver.mounts_for_user(&self.registry, user)?)
    }

    /// Mount of one folder for `user`, or `None` when it is not mounted for
    /// them.
    pub fn mount_for_user(
        &self,
        user: &str,
        folder: FolderId,
    ) -> EngineResult<Option<MountDescriptor>> {
        let folder = self.registry.get(folder)?;
        let groups = self.resolver.groups_for(user)?;
        Ok(self.resolver.mount_for_user(folder, user, &groups)?)
    }

    /// Authorizes `operation` by `user` at `path` inside `folder`.
    ///
    /// Called by the storage layer before every mutation. Each operation
    /// needs one bit: READ to read, UPDATE to write, DELETE to delete, SHARE
    /// to share and CREATE on the parent of the created path to create, copy
    /// or rename. Copying also needs READ on the source and renaming DELETE
    /// on it. Template-only folders additionally reject anything that is not
    /// a template document.
    pub fn check_operation(
        &self,
        user: &str,
        folder: FolderId,
        path: &str,
        operation: &Operation,
    ) -> EngineResult<()> {
        let access = self.access(user, folder)?;

        let source_bit = match operation {
            Operation::Copy { .. } => Some(PermissionMask::READ),
            Operation::Rename { .. } => Some(PermissionMask::DELETE),
            other => other.required_at_target(),
        };
        if let Some(bit) = source_bit {
            self.require(&access, path, bit, operation)?;
        }

        if let Some(created) = operation.created_path(path) {
            let created = path::normalize(created);
            let Some(parent) = path::parent(&created) else {
                return Err(EngineError::InvalidArgument(format!(
                    "{} needs a path below the folder root",
                    operation.name()
                )));
            };
            self.require(&access, parent, PermissionMask::CREATE, operation)?;
        }

        self.guard.check(&access.folder, path, operation)?;
        logging::trace_guard!(
            user = %user,
            folder = %folder,
            path = %path,
            operation = %operation,
            "operation_allowed"
        );
        Ok(())
    }

    fn access(&self, user: &str, folder: FolderId) -> EngineResult<Access> {
        let folder = self.registry.get(folder)?;
        let groups = self.resolver.groups_for(user)?;
        let base = visible_permission(&folder, user, &groups).ok_or_else(|| {
            EngineError::NotAuthorized(format!(
                "folder '{}' is not mounted for '{user}'",
                folder.mount_point()
            ))
        })?;
        Ok(Access {
            subject: Subject::new(user, groups),
            folder,
            base,
        })
    }

    fn permission_at(&self, access: &Access, target: &str) -> EngineResult<PermissionMask> {
        let resolution = self.acl.resolve(
            access.folder.id(),
            access.folder.acl_enabled(),
            &access.subject,
            target,
            access.base,
        )?;
        if path::normalize(target).is_empty() {
            Ok(self.resolver.options().root_permission(resolution.mask))
        } else {
            Ok(resolution.mask)
        }
    }

    fn require(
        &self,
        access: &Access,
        target: &str,
        bit: PermissionMask,
        operation: &Operation,
    ) -> EngineResult<()> {
        let granted = self.permission_at(access, target)?;
        if granted.contains(bit) {
            return Ok(());
        }
        logging::trace_guard!(
            user = %access.subject.user(),
            folder = %access.folder.id(),
            path = %target,
            operation = %operation,
            missing = %bit,
            "operation_denied"
        );
        Err(EngineError::NotAuthorized(format!(
            "{} on '/{}' in '{}' needs {bit} permission",
            operation.name(),
            path::normalize(target),
            access.folder.mount_point()
        )))
    }
}

//! Shared fixtures for integration tests across the workspace.
//!
//! The helpers panic on failure; they are only meant for test code.
#![allow(clippy::missing_panics_doc)]

use std::io::Write;
use std::sync::Arc;

use engine::{GroupFolders, GroupFoldersBuilder};
use folders::MemoryDirectory;
use permissions::{FolderId, PermissionMask};
use tempfile::NamedTempFile;

/// Shorthand masks used throughout the tests.
pub mod masks {
    use super::PermissionMask;

    /// Read.
    pub const R: PermissionMask = PermissionMask::READ;
    /// Update.
    pub const W: PermissionMask = PermissionMask::UPDATE;
    /// Create.
    pub const C: PermissionMask = PermissionMask::CREATE;
    /// Delete.
    pub const D: PermissionMask = PermissionMask::DELETE;
    /// Share.
    pub const S: PermissionMask = PermissionMask::SHARE;
    /// Everything.
    pub const ALL: PermissionMask = PermissionMask::ALL;
    /// Nothing.
    pub const NONE: PermissionMask = PermissionMask::NONE;
}

/// An engine together with the in-memory directory it reads memberships
/// from.
pub struct Fixture {
    /// Membership source; mutate it to simulate identity provider changes.
    pub directory: Arc<MemoryDirectory>,
    /// Engine under test.
    pub engine: GroupFolders,
}

impl Fixture {
    /// Engine with default settings over `groups`, given as
    /// `(group, members)` pairs.
    #[must_use]
    pub fn new(groups: &[(&str, &[&str])]) -> Self {
        Self::with(groups, |builder| builder)
    }

    /// Like [`Fixture::new`] but lets the caller adjust the builder.
    #[must_use]
    pub fn with(
        groups: &[(&str, &[&str])],
        configure: impl FnOnce(GroupFoldersBuilder) -> GroupFoldersBuilder,
    ) -> Self {
        let directory = Arc::new(directory(groups));
        let engine = configure(GroupFolders::builder(directory.clone()))
            .build()
            .expect("engine builds");
        Self { directory, engine }
    }

    /// Creates `mount_point` with each `(group, mask)` applicable.
    pub fn folder(&self, mount_point: &str, groups: &[(&str, PermissionMask)]) -> FolderId {
        let id = self.engine.create_folder(mount_point).expect("create folder");
        for (group, mask) in groups {
            self.engine
                .set_group_permissions(id, group, *mask)
                .expect("set group permissions");
        }
        id
    }

    /// Same as [`Fixture::folder`] with ACLs enabled.
    pub fn acl_folder(&self, mount_point: &str, groups: &[(&str, PermissionMask)]) -> FolderId {
        let id = self.folder(mount_point, groups);
        self.engine.set_folder_acl(id, true).expect("enable acl");
        id
    }

    /// Effective permission, panicking on error.
    pub fn permission(&self, user: &str, folder: FolderId, path: &str) -> PermissionMask {
        self.engine
            .resolve_effective_permission(user, folder, path)
            .expect("resolve permission")
    }
}

/// Directory holding `groups`, given as `(group, members)` pairs.
#[must_use]
pub fn directory(groups: &[(&str, &[&str])]) -> MemoryDirectory {
    let directory = MemoryDirectory::new();
    for (group, members) in groups {
        directory.add_group(group);
        for member in *members {
            directory.add_member(group, member);
        }
    }
    directory
}

/// Writes `content` to a temporary file that lives as long as the handle.
#[must_use]
pub fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file.flush().expect("flush");
    file
}

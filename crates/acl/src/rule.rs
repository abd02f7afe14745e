//! crates/acl/src/rule.rs
//! ACL rule rows and the subject they are evaluated for.

use std::collections::BTreeSet;

use permissions::{FolderId, Mapping, MappingType, PermissionMask};

use crate::path;

/// A path-scoped permission override for one user or group.
///
/// Only the bits in [`mask_bits`](Self::mask_bits) are constrained; every other
/// bit is inherited from the parent path. The permission value is stored
/// pre-masked so two rules with the same effect compare equal.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AclRule {
    folder: FolderId,
    path: String,
    mapping: Mapping,
    permissions: PermissionMask,
    mask_bits: PermissionMask,
}

impl AclRule {
    /// Creates a rule. The path is normalized and `permissions` is clipped to
    /// `mask_bits`.
    #[must_use]
    pub fn new(
        folder: FolderId,
        path: &str,
        mapping: Mapping,
        permissions: PermissionMask,
        mask_bits: PermissionMask,
    ) -> Self {
        Self {
            folder,
            path: path::normalize(path),
            mapping,
            permissions: permissions & mask_bits,
            mask_bits,
        }
    }

    /// Rule that grants `allowed` and denies every other bit.
    #[must_use]
    pub fn exact(folder: FolderId, path: &str, mapping: Mapping, allowed: PermissionMask) -> Self {
        Self::new(folder, path, mapping, allowed, PermissionMask::ALL)
    }

    /// Folder the rule belongs to.
    #[must_use]
    pub const fn folder(&self) -> FolderId {
        self.folder
    }

    /// Normalized folder-relative path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// User or group the rule applies to.
    #[must_use]
    pub const fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// Value of the constrained bits.
    #[must_use]
    pub const fn permissions(&self) -> PermissionMask {
        self.permissions
    }

    /// Bits the rule constrains.
    #[must_use]
    pub const fn mask_bits(&self) -> PermissionMask {
        self.mask_bits
    }

    /// Path depth, zero for the folder root.
    #[must_use]
    pub fn depth(&self) -> usize {
        path::depth(&self.path)
    }

    /// Applies the rule on top of an inherited mask.
    #[must_use]
    pub const fn apply_to(&self, inherited: PermissionMask) -> PermissionMask {
        inherited.overlay(self.permissions, self.mask_bits)
    }

    /// Returns `true` when the rule constrains no bit at all.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.mask_bits.is_empty()
    }

    pub(crate) fn into_parts(self) -> (FolderId, String, Mapping, PermissionMask, PermissionMask) {
        (
            self.folder,
            self.path,
            self.mapping,
            self.permissions,
            self.mask_bits,
        )
    }
}

/// The user a permission query is evaluated for, with the groups they belong to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Subject {
    user: String,
    groups: BTreeSet<String>,
}

impl Subject {
    /// Creates a subject.
    #[must_use]
    pub fn new<I, S>(user: impl Into<String>, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user: user.into(),
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    /// The user id.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Groups the user belongs to.
    #[must_use]
    pub const fn groups(&self) -> &BTreeSet<String> {
        &self.groups
    }

    /// Returns `true` when the user belongs to `group`.
    #[must_use]
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    /// Returns `true` when `mapping` names this user or one of their groups.
    #[must_use]
    pub fn matches(&self, mapping: &Mapping) -> bool {
        match mapping.kind() {
            MappingType::User => mapping.id() == self.user,
            MappingType::Group => self.groups.contains(mapping.id()),
        }
    }

    /// Every mapping relevant to this subject, user mapping first.
    #[must_use]
    pub fn mappings(&self) -> Vec<Mapping> {
        std::iter::once(Mapping::user(self.user.as_str()))
            .chain(self.groups.iter().map(|group| Mapping::group(group.as_str())))
            .collect()
    }
}

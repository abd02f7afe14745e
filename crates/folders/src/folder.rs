//! crates/folders/src/folder.rs
//! The group folder entity and its quota.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use permissions::{FolderId, Mapping, MappingType, PermissionMask};

use crate::error::RegistryError;

/// Storage limit of a folder.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "i64", into = "i64")
)]
pub enum Quota {
    /// No cap.
    #[default]
    Unlimited,
    /// Absolute cap in bytes.
    Limited(u64),
}

impl Quota {
    /// Raw value the host uses to mean "no cap".
    pub const UNLIMITED_SENTINEL: i64 = -3;

    /// Converts a raw quota value: `-3` is unlimited, any value `>= 0` is a
    /// cap in bytes, every other negative value is rejected.
    pub fn from_raw(raw: i64) -> Result<Self, RegistryError> {
        match raw {
            Self::UNLIMITED_SENTINEL => Ok(Self::Unlimited),
            bytes if bytes >= 0 => Ok(Self::Limited(bytes.unsigned_abs())),
            other => Err(RegistryError::InvalidQuota(other)),
        }
    }

    /// Raw value, using the sentinel for unlimited.
    #[must_use]
    pub fn as_raw(self) -> i64 {
        match self {
            Self::Unlimited => Self::UNLIMITED_SENTINEL,
            Self::Limited(bytes) => i64::try_from(bytes).unwrap_or(i64::MAX),
        }
    }

    /// Returns `true` for [`Quota::Unlimited`].
    #[must_use]
    pub const fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// Bytes left once `usage` is accounted for; `None` when unlimited.
    ///
    /// Usage above the cap reports zero, never a negative amount.
    #[must_use]
    pub const fn remaining(self, usage: u64) -> Option<u64> {
        match self {
            Self::Unlimited => None,
            Self::Limited(cap) => Some(cap.saturating_sub(usage)),
        }
    }
}

impl TryFrom<i64> for Quota {
    type Error = RegistryError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl From<Quota> for i64 {
    fn from(quota: Quota) -> Self {
        quota.as_raw()
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => f.write_str("unlimited"),
            Self::Limited(bytes) => write!(f, "{bytes} bytes"),
        }
    }
}

/// A configured group folder.
///
/// Instances handed out by the registry are snapshots; mutating the registry
/// afterwards does not change them.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Folder {
    pub(crate) id: FolderId,
    pub(crate) mount_point: String,
    pub(crate) quota: Quota,
    pub(crate) acl_enabled: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub(crate) root_cache_id: Option<u64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub(crate) groups: BTreeMap<String, PermissionMask>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub(crate) users: BTreeMap<String, PermissionMask>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub(crate) manage_acl: BTreeSet<Mapping>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub(crate) api_server: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub(crate) template_only: bool,
}

impl Folder {
    pub(crate) fn new(id: FolderId, mount_point: String) -> Self {
        Self {
            id,
            mount_point,
            quota: Quota::Unlimited,
            acl_enabled: false,
            root_cache_id: None,
            groups: BTreeMap::new(),
            users: BTreeMap::new(),
            manage_acl: BTreeSet::new(),
            api_server: None,
            template_only: false,
        }
    }

    /// Stable id.
    #[must_use]
    pub const fn id(&self) -> FolderId {
        self.id
    }

    /// Display path the folder is mounted at, unique across the registry.
    #[must_use]
    pub fn mount_point(&self) -> &str {
        &self.mount_point
    }

    /// Storage limit.
    #[must_use]
    pub const fn quota(&self) -> Quota {
        self.quota
    }

    /// Whether path-level ACL rules apply.
    #[must_use]
    pub const fn acl_enabled(&self) -> bool {
        self.acl_enabled
    }

    /// Cache entry of the folder's storage root, once the storage layer has
    /// created it.
    #[must_use]
    pub const fn root_cache_id(&self) -> Option<u64> {
        self.root_cache_id
    }

    /// Applicable groups and their masks.
    #[must_use]
    pub const fn groups(&self) -> &BTreeMap<String, PermissionMask> {
        &self.groups
    }

    /// Applicable users and their masks.
    #[must_use]
    pub const fn users(&self) -> &BTreeMap<String, PermissionMask> {
        &self.users
    }

    /// Mappings allowed to edit ACL rules of this folder.
    #[must_use]
    pub const fn manage_acl(&self) -> &BTreeSet<Mapping> {
        &self.manage_acl
    }

    /// Remote template server endpoint, if configured.
    #[must_use]
    pub fn api_server(&self) -> Option<&str> {
        self.api_server.as_deref()
    }

    /// Whether only template documents may be stored.
    #[must_use]
    pub const fn template_only(&self) -> bool {
        self.template_only
    }

    /// Returns `true` when neither a group nor a user is applicable.
    #[must_use]
    pub fn is_orphaned(&self) -> bool {
        self.groups.is_empty() && self.users.is_empty()
    }

    /// Returns `true` when `user` has a row or belongs to an applicable group.
    #[must_use]
    pub fn is_applicable_to(&self, user: &str, groups: &BTreeSet<String>) -> bool {
        self.users.contains_key(user) || groups.iter().any(|group| self.groups.contains_key(group))
    }

    /// Folder-level mask of `user`, or `None` when the folder does not apply
    /// to them.
    ///
    /// A user row replaces the group masks entirely; otherwise the masks of
    /// every applicable group the user belongs to are unioned.
    #[must_use]
    pub fn base_permissions(&self, user: &str, groups: &BTreeSet<String>) -> Option<PermissionMask> {
        if let Some(mask) = self.users.get(user) {
            return Some(*mask);
        }

        let mut matched = false;
        let mut mask = PermissionMask::NONE;
        for group in groups {
            if let Some(group_mask) = self.groups.get(group) {
                matched = true;
                mask |= *group_mask;
            }
        }
        matched.then_some(mask)
    }

    /// Returns `true` when `user` is listed directly, or through one of
    /// `groups`, as an ACL manager.
    #[must_use]
    pub fn lists_acl_manager(&self, user: &str, groups: &BTreeSet<String>) -> bool {
        self.manage_acl.iter().any(|mapping| match mapping.kind() {
            MappingType::User => mapping.id() == user,
            MappingType::Group => groups.contains(mapping.id()),
        })
    }
}

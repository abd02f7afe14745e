use std::fmt;

use super::mask::PermissionMask;

/// A single permission bit as a strongly-typed value.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum KnownPermission {
    /// [`PermissionMask::READ`].
    Read,
    /// [`PermissionMask::UPDATE`].
    Update,
    /// [`PermissionMask::CREATE`].
    Create,
    /// [`PermissionMask::DELETE`].
    Delete,
    /// [`PermissionMask::SHARE`].
    Share,
}

impl KnownPermission {
    /// Every permission in ascending bit order.
    pub const ALL: [Self; 5] = [
        Self::Read,
        Self::Update,
        Self::Create,
        Self::Delete,
        Self::Share,
    ];

    /// Returns the single-bit mask for this permission.
    #[must_use]
    pub const fn as_mask(self) -> PermissionMask {
        match self {
            Self::Read => PermissionMask::READ,
            Self::Update => PermissionMask::UPDATE,
            Self::Create => PermissionMask::CREATE,
            Self::Delete => PermissionMask::DELETE,
            Self::Share => PermissionMask::SHARE,
        }
    }

    /// Lowercase name used in diagnostics and configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Update => "update",
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Share => "share",
        }
    }

    /// Letter used by the compact mask notation (`rucds`).
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Read => 'r',
            Self::Update => 'u',
            Self::Create => 'c',
            Self::Delete => 'd',
            Self::Share => 's',
        }
    }

    /// Parses a compact-notation letter. `w` is accepted as an alias for update.
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'r' => Some(Self::Read),
            'u' | 'w' => Some(Self::Update),
            'c' => Some(Self::Create),
            'd' => Some(Self::Delete),
            's' => Some(Self::Share),
            _ => None,
        }
    }

    /// Parses a permission name such as `read` or `write`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "read" => Some(Self::Read),
            "update" | "write" => Some(Self::Update),
            "create" => Some(Self::Create),
            "delete" => Some(Self::Delete),
            "share" => Some(Self::Share),
            _ => None,
        }
    }

    pub(super) const fn from_bit(bit: u32) -> Option<Self> {
        match bit {
            _ if bit == PermissionMask::READ.bits() => Some(Self::Read),
            _ if bit == PermissionMask::UPDATE.bits() => Some(Self::Update),
            _ if bit == PermissionMask::CREATE.bits() => Some(Self::Create),
            _ if bit == PermissionMask::DELETE.bits() => Some(Self::Delete),
            _ if bit == PermissionMask::SHARE.bits() => Some(Self::Share),
            _ => None,
        }
    }
}

impl fmt::Display for KnownPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

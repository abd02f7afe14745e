use std::fmt;
use std::iter::{Extend, FromIterator};
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use super::iter::KnownPermissionsIter;
use super::known::KnownPermission;

/// Bitfield describing what a user may do with a node inside a group folder.
///
/// The bit values follow the host's file permission constants so masks can be
/// handed to the storage layer without translation. A mask never carries bits
/// outside [`PermissionMask::ALL`]: the checked constructors reject them and
/// [`Not`] complements within the defined range.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u32", into = "u32")
)]
pub struct PermissionMask {
    bits: u32,
}

impl PermissionMask {
    const fn new(bits: u32) -> Self {
        Self { bits }
    }

    /// No permission at all.
    pub const NONE: Self = Self::new(0);
    /// List and read nodes.
    pub const READ: Self = Self::new(1 << 0);
    /// Modify existing nodes.
    pub const UPDATE: Self = Self::new(1 << 1);
    /// Create new nodes below a directory.
    pub const CREATE: Self = Self::new(1 << 2);
    /// Delete nodes.
    pub const DELETE: Self = Self::new(1 << 3);
    /// Reshare nodes with other users.
    pub const SHARE: Self = Self::new(1 << 4);

    /// Every defined permission bit.
    pub const ALL: Self = Self::new(Self::KNOWN_MASK);

    pub(super) const KNOWN_MASK: u32 = Self::READ.bits
        | Self::UPDATE.bits
        | Self::CREATE.bits
        | Self::DELETE.bits
        | Self::SHARE.bits;

    /// Builds a mask from raw bits, rejecting values outside the defined range.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Option<Self> {
        if bits & !Self::KNOWN_MASK == 0 {
            Some(Self::new(bits))
        } else {
            None
        }
    }

    /// Builds a mask from raw bits, silently dropping undefined bits.
    #[must_use]
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self::new(bits & Self::KNOWN_MASK)
    }

    /// Returns the raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.bits
    }

    /// Returns `true` when no permission bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Returns `true` when every defined bit is set.
    #[must_use]
    pub const fn is_all(self) -> bool {
        self.bits == Self::KNOWN_MASK
    }

    /// Checks whether all bits in `other` are set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.bits & other.bits) == other.bits
    }

    /// Checks whether `self` and `other` share at least one bit.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        (self.bits & other.bits) != 0
    }

    /// Returns the union of both operands.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self::new(self.bits | other.bits)
    }

    /// Returns the bits common to both operands.
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self::new(self.bits & other.bits)
    }

    /// Returns the bits present in `self` but not in `other`.
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self::new(self.bits & !other.bits)
    }

    /// Returns the defined bits that are not set in `self`.
    #[must_use]
    pub const fn complement(self) -> Self {
        Self::new(!self.bits & Self::KNOWN_MASK)
    }

    /// Replaces the bits selected by `selector` with the matching bits of `value`.
    ///
    /// Bits outside `selector` keep their current value. This is the overlay
    /// step used when a rule constrains only part of the mask.
    #[must_use]
    pub const fn overlay(self, value: Self, selector: Self) -> Self {
        Self::new((self.bits & !selector.bits) | (value.bits & selector.bits))
    }

    /// Returns an iterator over the permissions set in the mask, lowest bit first.
    #[must_use]
    pub fn iter(self) -> KnownPermissionsIter {
        KnownPermissionsIter::new(self)
    }
}

impl FromIterator<KnownPermission> for PermissionMask {
    fn from_iter<I: IntoIterator<Item = KnownPermission>>(iter: I) -> Self {
        let mut mask = Self::NONE;
        mask.extend(iter);
        mask
    }
}

impl FromIterator<Self> for PermissionMask {
    fn from_iter<I: IntoIterator<Item = Self>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::union)
    }
}

impl Extend<KnownPermission> for PermissionMask {
    fn extend<I: IntoIterator<Item = KnownPermission>>(&mut self, iter: I) {
        for permission in iter {
            *self |= permission.as_mask();
        }
    }
}

impl IntoIterator for PermissionMask {
    type Item = KnownPermission;
    type IntoIter = KnownPermissionsIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &PermissionMask {
    type Item = KnownPermission;
    type IntoIter = KnownPermissionsIter;

    fn into_iter(self) -> Self::IntoIter {
        (*self).iter()
    }
}

impl fmt::Debug for PermissionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionMask")
            .field("bits", &format_args!("0x{:x}", self.bits))
            .finish()
    }
}

impl fmt::Display for PermissionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }

        let mut first = true;
        for permission in self.iter() {
            if !first {
                f.write_str(" | ")?;
            }
            first = false;
            fmt::Display::fmt(&permission, f)?;
        }
        Ok(())
    }
}

impl Not for PermissionMask {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.complement()
    }
}

impl BitOr for PermissionMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign for PermissionMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits |= rhs.bits;
    }
}

impl BitAnd for PermissionMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersection(rhs)
    }
}

impl BitAndAssign for PermissionMask {
    fn bitand_assign(&mut self, rhs: Self) {
        self.bits &= rhs.bits;
    }
}

impl From<PermissionMask> for u32 {
    fn from(mask: PermissionMask) -> Self {
        mask.bits
    }
}

impl TryFrom<u32> for PermissionMask {
    type Error = super::ParseMaskError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        Self::from_bits(bits).ok_or(super::ParseMaskError::OutOfRange(bits))
    }
}

impl From<KnownPermission> for PermissionMask {
    fn from(permission: KnownPermission) -> Self {
        permission.as_mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_union_of_every_bit() {
        let all = PermissionMask::READ
            | PermissionMask::UPDATE
            | PermissionMask::CREATE
            | PermissionMask::DELETE
            | PermissionMask::SHARE;
        assert_eq!(all, PermissionMask::ALL);
        assert_eq!(PermissionMask::ALL.bits(), 31);
        assert!(PermissionMask::NONE.is_empty());
    }

    #[test]
    fn from_bits_rejects_undefined_bits() {
        assert_eq!(PermissionMask::from_bits(3), Some(PermissionMask::READ | PermissionMask::UPDATE));
        assert_eq!(PermissionMask::from_bits(32), None);
        assert_eq!(PermissionMask::from_bits_truncate(0xff), PermissionMask::ALL);
    }

    #[test]
    fn not_stays_within_defined_range() {
        let negated = !PermissionMask::READ;
        assert_eq!(negated.bits(), 30);
        assert_eq!(!PermissionMask::NONE, PermissionMask::ALL);
    }

    #[test]
    fn overlay_only_replaces_selected_bits() {
        let base = PermissionMask::READ | PermissionMask::UPDATE;
        let value = PermissionMask::CREATE;
        let selector = PermissionMask::UPDATE | PermissionMask::CREATE;
        assert_eq!(
            base.overlay(value, selector),
            PermissionMask::READ | PermissionMask::CREATE
        );
    }

    #[test]
    fn contains_and_intersects() {
        let mask = PermissionMask::READ | PermissionMask::SHARE;
        assert!(mask.contains(PermissionMask::READ));
        assert!(!mask.contains(PermissionMask::READ | PermissionMask::DELETE));
        assert!(mask.intersects(PermissionMask::READ | PermissionMask::DELETE));
        assert!(mask.contains(PermissionMask::NONE));
    }

    #[test]
    fn display_lists_permission_names() {
        let mask = PermissionMask::READ | PermissionMask::DELETE;
        assert_eq!(mask.to_string(), "read | delete");
        assert_eq!(PermissionMask::NONE.to_string(), "none");
    }

    #[test]
    fn debug_renders_hex_bits() {
        let rendered = format!("{:?}", PermissionMask::ALL);
        assert!(rendered.contains("0x1f"));
    }

    #[test]
    fn collects_from_masks_by_union() {
        let mask: PermissionMask = [PermissionMask::READ, PermissionMask::UPDATE]
            .into_iter()
            .collect();
        assert_eq!(mask.bits(), 3);
    }

    #[test]
    fn try_from_reports_out_of_range_value() {
        let error = PermissionMask::try_from(64).expect_err("64 is outside the mask");
        assert!(error.to_string().contains("64"));
    }
}

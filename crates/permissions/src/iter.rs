use std::iter::FusedIterator;

use super::known::KnownPermission;
use super::mask::PermissionMask;

/// Iterator over the permissions set within a [`PermissionMask`].
///
/// Yields values in ascending bit order, which is also the order used by the
/// compact letter form (`rucds`).
#[derive(Clone, Debug)]
pub struct KnownPermissionsIter {
    remaining: u32,
}

impl KnownPermissionsIter {
    pub(super) const fn new(mask: PermissionMask) -> Self {
        Self {
            remaining: mask.bits() & PermissionMask::KNOWN_MASK,
        }
    }
}

impl Iterator for KnownPermissionsIter {
    type Item = KnownPermission;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let bit_index = self.remaining.trailing_zeros();
        let bit_mask = 1u32 << bit_index;
        self.remaining &= !bit_mask;
        KnownPermission::from_bit(bit_mask)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining.count_ones() as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for KnownPermissionsIter {}

impl FusedIterator for KnownPermissionsIter {}

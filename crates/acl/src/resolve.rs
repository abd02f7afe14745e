//! Effective permission resolution over a folder's path ancestry.
//!
//! Resolution starts from the folder-level mask and walks the ancestors of the
//! target path from the root down. At each level the rules matching the
//! subject are merged into one [`Layer`]:
//!
//! - group rules merge per bit with deny-wins: a bit is granted only when
//!   every group rule constraining it grants it;
//! - a user rule then overrides the merged group value for the bits it
//!   constrains.
//!
//! The merged layer overwrites the inherited mask for its constrained bits, so
//! a deeper level always beats a shallower one. Bits never constrained keep
//! the folder-level value.

use permissions::PermissionMask;

use crate::debug_acl;
use crate::path;
use crate::rule::{AclRule, Subject};

/// The merged effect of every matching rule at one path level.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Layer {
    /// Value of the constrained bits.
    pub permissions: PermissionMask,
    /// Bits constrained at this level.
    pub mask_bits: PermissionMask,
}

impl Layer {
    fn from_rule(rule: &AclRule) -> Self {
        Self {
            permissions: rule.permissions(),
            mask_bits: rule.mask_bits(),
        }
    }

    /// Merges group rules at one level. Any rule denying a bit it constrains
    /// denies that bit for the whole level.
    #[must_use]
    pub fn merge_groups<'a>(rules: impl IntoIterator<Item = &'a AclRule>) -> Option<Self> {
        let mut covered = PermissionMask::NONE;
        let mut denied = PermissionMask::NONE;
        let mut seen = false;
        for rule in rules {
            seen = true;
            covered |= rule.mask_bits();
            denied |= rule.mask_bits() & !rule.permissions();
        }
        seen.then(|| Self {
            permissions: covered & !denied,
            mask_bits: covered,
        })
    }

    /// Puts `user` on top of `self`: the user's constrained bits replace the
    /// group value.
    #[must_use]
    pub const fn overridden_by(self, user: Self) -> Self {
        Self {
            permissions: self.permissions.overlay(user.permissions, user.mask_bits),
            mask_bits: self.mask_bits.union(user.mask_bits),
        }
    }

    /// Applies the layer on top of an inherited mask.
    #[must_use]
    pub const fn apply_to(self, inherited: PermissionMask) -> PermissionMask {
        inherited.overlay(self.permissions, self.mask_bits)
    }
}

/// Result of a resolution walk.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Resolution {
    /// Effective permission at the target path.
    pub mask: PermissionMask,
    /// Bits that were set by some rule rather than inherited from the
    /// folder-level mask.
    pub explicit: PermissionMask,
}

impl Resolution {
    /// A resolution where nothing was overridden.
    #[must_use]
    pub const fn inherited(base: PermissionMask) -> Self {
        Self {
            mask: base,
            explicit: PermissionMask::NONE,
        }
    }
}

/// Resolves the effective permission of `subject` at `target`.
///
/// `rules` may contain rules for any path and mapping of the folder; rules
/// that do not match the subject or do not lie on the ancestor chain are
/// ignored.
#[must_use]
pub fn resolve(
    rules: &[AclRule],
    subject: &Subject,
    target: &str,
    base: PermissionMask,
) -> Resolution {
    let mut resolution = Resolution::inherited(base);

    for ancestor in path::ancestors(target) {
        let mut user_layer = None;
        let mut group_rules = Vec::new();
        for rule in rules
            .iter()
            .filter(|rule| rule.path() == ancestor && subject.matches(rule.mapping()))
        {
            if rule.mapping().is_user() {
                user_layer = Some(Layer::from_rule(rule));
            } else {
                group_rules.push(rule);
            }
        }

        let group_count = group_rules.len();
        let layer = match (Layer::merge_groups(group_rules), user_layer) {
            (Some(groups), Some(user)) => groups.overridden_by(user),
            (Some(groups), None) => groups,
            (None, Some(user)) => user,
            (None, None) => continue,
        };

        resolution.mask = layer.apply_to(resolution.mask);
        resolution.explicit |= layer.mask_bits;
        debug_acl::trace_level_applied(
            &ancestor,
            user_layer.is_some(),
            group_count,
            layer.mask_bits,
            resolution.mask,
        );
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use permissions::{FolderId, Mapping};

    const R: PermissionMask = PermissionMask::READ;
    const W: PermissionMask = PermissionMask::UPDATE;
    const C: PermissionMask = PermissionMask::CREATE;

    fn rule(path: &str, mapping: Mapping, allowed: PermissionMask, bits: PermissionMask) -> AclRule {
        AclRule::new(FolderId::new(1), path, mapping, allowed, bits)
    }

    #[test]
    fn no_rules_inherits_base() {
        let subject = Subject::new("alice", ["staff"]);
        let resolution = resolve(&[], &subject, "a/b/c", R | W);
        assert_eq!(resolution, Resolution::inherited(R | W));
    }

    #[test]
    fn deeper_rule_overrides_shallower_rule() {
        let subject = Subject::new("alice", ["staff"]);
        let rules = [
            rule("a", Mapping::group("staff"), PermissionMask::NONE, W),
            rule("a/b", Mapping::group("staff"), W, W),
        ];
        assert_eq!(resolve(&rules, &subject, "a", R | W).mask, R);
        assert_eq!(resolve(&rules, &subject, "a/b/c", R | W).mask, R | W);
    }

    #[test]
    fn unconstrained_bits_keep_inherited_value() {
        let subject = Subject::new("alice", ["staff"]);
        let rules = [rule("a", Mapping::group("staff"), C, C)];
        let resolution = resolve(&rules, &subject, "/a/", R);
        assert_eq!(resolution.mask, R | C);
        assert_eq!(resolution.explicit, C);
    }

    #[test]
    fn group_deny_beats_group_allow_at_same_level() {
        let subject = Subject::new("alice", ["g1", "g2"]);
        let rules = [
            rule("docs", Mapping::group("g1"), R | W, R | W),
            rule("docs", Mapping::group("g2"), R, R | W),
        ];
        assert_eq!(resolve(&rules, &subject, "/docs", PermissionMask::ALL).mask & (R | W), R);
    }

    #[test]
    fn user_rule_beats_group_rule_at_same_level() {
        let subject = Subject::new("alice", ["staff"]);
        let rules = [
            rule("docs", Mapping::group("staff"), PermissionMask::NONE, R | W),
            rule("docs", Mapping::user("alice"), W, W),
        ];
        assert_eq!(resolve(&rules, &subject, "docs", R | W).mask, W);
    }

    #[test]
    fn rules_for_other_subjects_are_ignored() {
        let subject = Subject::new("alice", ["staff"]);
        let rules = [
            rule("docs", Mapping::group("others"), PermissionMask::NONE, PermissionMask::ALL),
            rule("docs", Mapping::user("bob"), PermissionMask::NONE, PermissionMask::ALL),
        ];
        assert_eq!(resolve(&rules, &subject, "docs", R).mask, R);
    }

    #[test]
    fn rule_can_grant_beyond_base() {
        let subject = Subject::new("alice", ["staff"]);
        let rules = [rule("public", Mapping::group("staff"), R, R)];
        assert_eq!(resolve(&rules, &subject, "public/x", PermissionMask::NONE).mask, R);
        assert_eq!(resolve(&rules, &subject, "", PermissionMask::NONE).mask, PermissionMask::NONE);
    }

    #[test]
    fn merge_groups_of_nothing_is_none() {
        assert_eq!(Layer::merge_groups(std::iter::empty()), None);
    }
}

//! Property tests for ACL resolution layering.
//!
//! - A rule at a deeper path decides every bit it constrains, whatever the
//!   shallower rules say.
//! - At one depth a user rule decides the bits it constrains over group rules.
//! - At one depth a group deny on a bit beats a group allow on that bit.
//! - Disabling ACLs yields the folder-level mask at every path.

use acl::{AclRule, Subject, resolve};
use permissions::{FolderId, Mapping, PermissionMask};
use proptest::prelude::*;

fn any_mask() -> impl Strategy<Value = PermissionMask> {
    (0u32..=31).prop_map(PermissionMask::from_bits_truncate)
}

fn folder() -> FolderId {
    FolderId::new(1)
}

proptest! {
    #[test]
    fn deeper_rule_decides_its_bits(
        base in any_mask(),
        shallow_value in any_mask(),
        shallow_bits in any_mask(),
        deep_value in any_mask(),
        deep_bits in any_mask(),
        deep_is_user in any::<bool>(),
    ) {
        let subject = Subject::new("alice", ["staff"]);
        let deep_mapping = if deep_is_user { Mapping::user("alice") } else { Mapping::group("staff") };
        let rules = [
            AclRule::new(folder(), "a", Mapping::user("alice"), shallow_value, shallow_bits),
            AclRule::new(folder(), "a/b", deep_mapping, deep_value, deep_bits),
        ];
        let resolved = resolve(&rules, &subject, "a/b/c", base).mask;
        prop_assert_eq!(resolved & deep_bits, deep_value & deep_bits);
    }

    #[test]
    fn user_rule_decides_its_bits_at_same_depth(
        base in any_mask(),
        group_value in any_mask(),
        group_bits in any_mask(),
        user_value in any_mask(),
        user_bits in any_mask(),
    ) {
        let subject = Subject::new("alice", ["staff"]);
        let rules = [
            AclRule::new(folder(), "docs", Mapping::group("staff"), group_value, group_bits),
            AclRule::new(folder(), "docs", Mapping::user("alice"), user_value, user_bits),
        ];
        let resolved = resolve(&rules, &subject, "docs", base).mask;
        prop_assert_eq!(resolved & user_bits, user_value & user_bits);
        let group_only = group_bits & !user_bits;
        prop_assert_eq!(resolved & group_only, group_value & group_only);
    }

    #[test]
    fn group_deny_beats_group_allow(
        base in any_mask(),
        allow in any_mask(),
        deny in any_mask(),
    ) {
        let subject = Subject::new("alice", ["g1", "g2"]);
        let rules = [
            AclRule::new(folder(), "docs", Mapping::group("g1"), allow, allow | deny),
            AclRule::new(folder(), "docs", Mapping::group("g2"), PermissionMask::NONE, deny),
        ];
        let resolved = resolve(&rules, &subject, "docs", base).mask;
        prop_assert!((resolved & deny).is_empty());
        let allowed_only = allow & !deny;
        prop_assert!(resolved.contains(allowed_only));
    }

    #[test]
    fn disabled_acl_returns_base(
        base in any_mask(),
        value in any_mask(),
        bits in any_mask(),
        depth in 0usize..4,
    ) {
        let store = std::sync::Arc::new(acl::MemoryRuleStore::new());
        let manager = acl::AclManager::new(store);
        let path = ["", "a", "a/b", "a/b/c"][depth];
        let rule = AclRule::new(folder(), path, Mapping::group("staff"), value, bits);
        if !rule.is_noop() {
            manager.set_rule(rule).unwrap();
        }
        let subject = Subject::new("alice", ["staff"]);
        let resolved = manager.resolve(folder(), false, &subject, "a/b/c", base).unwrap();
        prop_assert_eq!(resolved.mask, base);
    }
}

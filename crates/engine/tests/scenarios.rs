//! End-to-end scenarios over the engine's contract surface.

use std::sync::Arc;

use engine::{ErrorKind, Snapshot};
use mounts::MemoryUsage;
use permissions::{Mapping, PermissionMask};
use test_support::Fixture;
use test_support::masks::{ALL, C, D, NONE, R, S, W};

#[test]
fn user_row_overrides_group_union() {
    let fixture = Fixture::new(&[("g1", &["u"]), ("g2", &["u"])]);
    let folder = fixture.folder("F", &[("g1", R), ("g2", R | W)]);

    assert_eq!(fixture.permission("u", folder, ""), R | W);

    fixture
        .engine
        .set_user_permissions(folder, "u", R)
        .unwrap();
    assert_eq!(fixture.permission("u", folder, ""), R);
    assert_eq!(fixture.permission("u", folder, "any/depth"), R);
}

#[test]
fn deny_wins_between_groups_at_same_depth() {
    let fixture = Fixture::new(&[("g1", &["u"]), ("g2", &["u"]), ("admin", &["root"])]);
    let folder = fixture.acl_folder("F", &[("g1", ALL), ("g2", ALL)]);

    fixture
        .engine
        .set_acl_rule("root", folder, "/docs", Mapping::group("g1"), R | W, R | W)
        .unwrap();
    fixture
        .engine
        .set_acl_rule("root", folder, "/docs", Mapping::group("g2"), R, R | W)
        .unwrap();

    let docs = fixture.permission("u", folder, "/docs");
    assert!(docs.contains(R));
    assert!(!docs.contains(W));
    assert_eq!(docs, ALL & !W);
}

#[test]
fn user_rule_beats_group_rule_at_same_depth() {
    let fixture = Fixture::new(&[("g1", &["u"]), ("admin", &["root"])]);
    let folder = fixture.acl_folder("F", &[("g1", ALL)]);

    fixture
        .engine
        .set_acl_rule("root", folder, "docs", Mapping::group("g1"), NONE, W)
        .unwrap();
    fixture
        .engine
        .set_acl_rule("root", folder, "docs", Mapping::user("u"), W, W)
        .unwrap();

    assert!(fixture.permission("u", folder, "docs").contains(W));
}

#[test]
fn deeper_rule_overrides_shallower_for_covered_bits() {
    let fixture = Fixture::new(&[("g1", &["u"]), ("admin", &["root"])]);
    let folder = fixture.acl_folder("F", &[("g1", ALL)]);
    let engine = &fixture.engine;

    engine
        .set_acl_rule("root", folder, "a", Mapping::user("u"), NONE, W | D)
        .unwrap();
    engine
        .set_acl_rule("root", folder, "a/b", Mapping::group("g1"), W, W)
        .unwrap();

    assert_eq!(fixture.permission("u", folder, "a"), ALL & !(W | D));
    assert_eq!(fixture.permission("u", folder, "a/b/c"), ALL & !D);
}

#[test]
fn disabled_acl_keeps_rules_dormant() {
    let fixture = Fixture::new(&[("g1", &["u"]), ("admin", &["root"])]);
    let folder = fixture.acl_folder("F", &[("g1", R | W)]);

    fixture
        .engine
        .set_acl_rule("root", folder, "docs", Mapping::group("g1"), NONE, W)
        .unwrap();
    assert_eq!(fixture.permission("u", folder, "docs"), R);

    fixture.engine.set_folder_acl(folder, false).unwrap();
    assert_eq!(fixture.permission("u", folder, "docs"), R | W);
    assert_eq!(fixture.engine.rules_for_folder(folder).unwrap().len(), 1);

    fixture.engine.set_folder_acl(folder, true).unwrap();
    assert_eq!(fixture.permission("u", folder, "docs"), R);
}

#[test]
fn repeated_rule_upsert_is_idempotent() {
    let fixture = Fixture::new(&[("g1", &["u"]), ("admin", &["root"])]);
    let folder = fixture.acl_folder("F", &[("g1", ALL)]);

    for _ in 0..2 {
        fixture
            .engine
            .set_acl_rule("root", folder, "x", Mapping::group("g1"), R, R | W)
            .unwrap();
    }
    assert_eq!(fixture.engine.rules_for_folder(folder).unwrap().len(), 1);
    assert_eq!(fixture.permission("u", folder, "x"), ALL & !W);
}

#[test]
fn empty_mask_bits_remove_rule_or_fail() {
    let fixture = Fixture::new(&[("g1", &["u"]), ("admin", &["root"])]);
    let folder = fixture.acl_folder("F", &[("g1", ALL)]);
    let engine = &fixture.engine;

    let error = engine
        .set_acl_rule("root", folder, "x", Mapping::group("g1"), R, NONE)
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidArgument);

    engine
        .set_acl_rule("root", folder, "x", Mapping::group("g1"), NONE, W)
        .unwrap();
    engine
        .set_acl_rule("root", folder, "x", Mapping::group("g1"), NONE, NONE)
        .unwrap();
    assert!(engine.rules_for_folder(folder).unwrap().is_empty());
}

#[test]
fn quota_round_trip_through_mounts() {
    let usage = Arc::new(MemoryUsage::new());
    let fixture = Fixture::with(&[("g1", &["u"])], |builder| builder.usage(usage.clone()));
    let folder = fixture.folder("F", &[("g1", R)]);
    let engine = &fixture.engine;

    engine.set_folder_quota(folder, -3).unwrap();
    assert!(engine.get_folder(folder).unwrap().folder.quota().is_unlimited());
    assert_eq!(engine.list_mounts_for_user("u").unwrap()[0].quota_remaining, None);

    engine.set_folder_quota(folder, 1_073_741_824).unwrap();
    usage.set(folder, 1_000);
    let mount = engine.mount_for_user("u", folder).unwrap().unwrap();
    assert_eq!(mount.quota_remaining, Some(1_073_741_824 - 1_000));

    usage.set(folder, 2_000_000_000);
    let details = engine.get_folder(folder).unwrap();
    assert_eq!(details.usage, 2_000_000_000);
    assert_eq!(details.quota_remaining, Some(0));

    let error = engine.set_folder_quota(folder, -7).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn remove_folder_cascades() {
    let fixture = Fixture::new(&[("g1", &["u", "v"]), ("admin", &["root"])]);
    let folder = fixture.acl_folder("F", &[("g1", ALL)]);
    let other = fixture.folder("Other", &[("g1", R)]);
    fixture
        .engine
        .set_acl_rule("root", folder, "x", Mapping::group("g1"), NONE, W)
        .unwrap();

    fixture.engine.remove_folder(folder).unwrap();

    assert!(fixture.engine.rules_for_folder(folder).unwrap().is_empty());
    for user in ["u", "v"] {
        let mounts = fixture.engine.list_mounts_for_user(user).unwrap();
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].folder.id(), other);
    }
    let error = fixture
        .engine
        .resolve_effective_permission("u", folder, "")
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotFound);
}

#[test]
fn group_deletion_sweep_is_idempotent() {
    let fixture = Fixture::new(&[("g1", &["u"]), ("g2", &["u"])]);
    let a = fixture.folder("A", &[("g1", R), ("g2", W)]);
    let b = fixture.folder("B", &[("g1", R)]);
    fixture
        .engine
        .set_user_permissions(b, "u", R | W)
        .unwrap();
    fixture
        .engine
        .set_manage_acl(a, &Mapping::group("g1"), true)
        .unwrap();

    let first = fixture.engine.on_group_deleted("g1");
    assert_eq!(first.applicable_removed, vec![a, b]);
    assert_eq!(first.managers_removed, vec![a]);
    assert!(fixture.engine.on_group_deleted("g1").is_noop());

    let a_folder = fixture.engine.get_folder(a).unwrap().folder;
    assert!(a_folder.groups().contains_key("g2"));
    let b_folder = fixture.engine.get_folder(b).unwrap().folder;
    assert!(b_folder.groups().is_empty());
    assert_eq!(b_folder.users().get("u"), Some(&(R | W)));
}

#[test]
fn orphaned_folder_remains_but_is_not_mounted() {
    let fixture = Fixture::new(&[("g1", &["u"])]);
    let folder = fixture.folder("F", &[("g1", R)]);

    let report = fixture.engine.on_group_deleted("g1");
    assert_eq!(report.orphaned, vec![folder]);
    assert!(fixture.engine.list_mounts_for_user("u").unwrap().is_empty());
    assert_eq!(fixture.engine.list_folders().unwrap().len(), 1);
}

#[test]
fn zero_mask_folder_mounts_only_with_acl() {
    let fixture = Fixture::new(&[("g1", &["u"]), ("admin", &["root"])]);
    let folder = fixture.folder("F", &[("g1", NONE)]);
    assert!(fixture.engine.list_mounts_for_user("u").unwrap().is_empty());
    let error = fixture
        .engine
        .resolve_effective_permission("u", folder, "")
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotAuthorized);

    fixture.engine.set_folder_acl(folder, true).unwrap();
    fixture
        .engine
        .set_acl_rule("root", folder, "shared", Mapping::group("g1"), R, R)
        .unwrap();
    let mounts = fixture.engine.list_mounts_for_user("u").unwrap();
    assert_eq!(mounts[0].effective_permission, NONE);
    assert_eq!(fixture.permission("u", folder, ""), NONE);
    assert_eq!(fixture.permission("u", folder, "shared/doc"), R);
}

#[test]
fn unavailable_directory_fails_closed() {
    let fixture = Fixture::new(&[("g1", &["u"])]);
    let folder = fixture.folder("F", &[("g1", R)]);
    fixture.directory.set_available(false);

    let error = fixture.engine.list_mounts_for_user("u").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Unavailable);
    let error = fixture
        .engine
        .resolve_effective_permission("u", folder, "")
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Unavailable);
}

#[test]
fn root_share_can_be_disabled() {
    let fixture = Fixture::with(&[("g1", &["u"])], |builder| builder.allow_root_share(false));
    let folder = fixture.folder("F", &[("g1", R | S)]);

    assert_eq!(fixture.permission("u", folder, ""), R);
    assert_eq!(fixture.permission("u", folder, "sub"), R | S);
    let mounts = fixture.engine.list_mounts_for_user("u").unwrap();
    assert_eq!(mounts[0].effective_permission, R);
}

#[test]
fn membership_changes_apply_on_next_resolution() {
    let fixture = Fixture::new(&[("g1", &["u"]), ("g2", &[])]);
    let folder = fixture.folder("F", &[("g1", R), ("g2", R | C)]);
    assert_eq!(fixture.permission("u", folder, ""), R);

    fixture.directory.add_member("g2", "u");
    assert_eq!(fixture.permission("u", folder, ""), R | C);

    fixture.engine.remove_applicable_group(folder, "g1").unwrap();
    fixture.directory.remove_member("g2", "u");
    assert!(fixture.engine.list_mounts_for_user("u").unwrap().is_empty());
}

#[test]
fn applicable_rows_require_existing_principals() {
    let fixture = Fixture::new(&[("g1", &["u"])]);
    let folder = fixture.folder("F", &[]);

    assert!(fixture.engine.add_applicable_group(folder, "g1").unwrap());
    assert!(!fixture.engine.add_applicable_group(folder, "g1").unwrap());
    assert_eq!(
        fixture
            .engine
            .add_applicable_group(folder, "ghosts")
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
    assert!(fixture.engine.add_applicable_user(folder, "u").unwrap());
    assert_eq!(
        fixture
            .engine
            .add_applicable_user(folder, "nobody")
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );

    let details = fixture.engine.get_folder(folder).unwrap();
    assert_eq!(details.folder.groups().get("g1"), Some(&ALL));
    assert_eq!(details.folder.users().get("u"), Some(&ALL));
}

#[test]
fn duplicate_mount_point_conflicts() {
    let fixture = Fixture::new(&[]);
    let first = fixture.folder("Shared", &[]);
    let second = fixture.folder("Other", &[]);

    assert_eq!(
        fixture.engine.create_folder("/Shared/").unwrap_err().kind(),
        ErrorKind::Conflict
    );
    assert_eq!(
        fixture
            .engine
            .rename_folder(second, "Shared")
            .unwrap_err()
            .kind(),
        ErrorKind::Conflict
    );
    fixture.engine.rename_folder(first, "Shared").unwrap();
    fixture.engine.rename_folder(first, "Renamed").unwrap();
    fixture.engine.create_folder("Shared").unwrap();
}

#[test]
fn snapshot_restores_permissions() {
    let fixture = Fixture::new(&[("g1", &["u"]), ("admin", &["root"])]);
    let folder = fixture.acl_folder("F", &[("g1", R | W)]);
    fixture
        .engine
        .set_acl_rule("root", folder, "docs", Mapping::group("g1"), NONE, W)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    Snapshot::capture(&fixture.engine).unwrap().save(&path).unwrap();

    let restored = Fixture::new(&[("g1", &["u"])]);
    Snapshot::load(&path)
        .unwrap()
        .restore_into(&restored.engine)
        .unwrap();
    assert_eq!(restored.permission("u", folder, "docs"), R);
    assert_eq!(restored.permission("u", folder, ""), R | W);
}

#[test]
fn storage_root_is_created_lazily() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("data");
    let fixture = Fixture::with(&[("g1", &["u"])], |builder| builder.storage_root(&root));
    let folder = fixture.folder("F", &[("g1", R)]);
    assert!(!root.exists());

    let mount = fixture.engine.mount_for_user("u", folder).unwrap().unwrap();
    assert!(root.is_dir());
    assert_eq!(mount.storage_path, Some(root.join(folder.to_string())));
    assert_eq!(
        fixture.engine.storage_path(folder).unwrap(),
        Some(root.join(folder.to_string()))
    );
    assert_eq!(mount.usage, 0);
}

#[test]
fn permissions_outside_folder_are_clamped() {
    let fixture = Fixture::new(&[("g1", &["u"]), ("admin", &["root"])]);
    let folder = fixture.acl_folder("F", &[("g1", ALL)]);
    fixture
        .engine
        .set_acl_rule("root", folder, "", Mapping::group("g1"), R, PermissionMask::ALL)
        .unwrap();
    assert_eq!(fixture.permission("u", folder, "../../etc"), R);
    assert_eq!(fixture.permission("u", folder, "//a/./b/"), R);
}

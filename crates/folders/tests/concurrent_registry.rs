//! Concurrent registry mutations.
//!
//! Writers on different folders must not lose updates, and racing creators
//! of one mount point must see exactly one winner.

use std::sync::Arc;
use std::thread;

use folders::{FolderRegistry, RegistryError};
use permissions::PermissionMask;

#[test]
fn racing_creates_of_one_mount_point_have_single_winner() {
    let registry = Arc::new(FolderRegistry::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.create_folder("Contested"))
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread panicked"))
        .collect();

    let winners = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(
        results
            .iter()
            .filter_map(|result| result.as_ref().err())
            .all(|error| matches!(error, RegistryError::Conflict { .. }))
    );
    assert_eq!(registry.len(), 1);
}

#[test]
fn parallel_group_updates_are_all_kept() {
    let registry = Arc::new(FolderRegistry::new());
    let id = registry.create_folder("Busy").unwrap();

    let handles: Vec<_> = (0..16)
        .map(|n| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry
                    .set_group_permissions(id, &format!("group-{n}"), PermissionMask::READ)
                    .expect("folder exists");
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(registry.get(id).unwrap().groups().len(), 16);
}

#[test]
fn renames_and_sweeps_interleave_safely() {
    let registry = Arc::new(FolderRegistry::new());
    let ids: Vec<_> = (0..8)
        .map(|n| {
            let id = registry.create_folder(&format!("Folder {n}")).unwrap();
            registry.add_applicable_group(id, "staff").unwrap();
            id
        })
        .collect();

    let renamer = {
        let registry = Arc::clone(&registry);
        let ids = ids.clone();
        thread::spawn(move || {
            for (n, id) in ids.into_iter().enumerate() {
                registry
                    .rename_folder(id, &format!("Renamed {n}"))
                    .expect("rename succeeds");
            }
        })
    };
    let sweeper = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || registry.delete_group("staff"))
    };

    renamer.join().expect("thread panicked");
    sweeper.join().expect("thread panicked");

    for (n, id) in ids.into_iter().enumerate() {
        let folder = registry.get(id).unwrap();
        assert_eq!(folder.mount_point(), format!("Renamed {n}"));
        assert!(folder.groups().is_empty());
        assert!(registry.find_by_mount_point(&format!("Folder {n}")).is_none());
    }
}

#[test]
fn racing_renames_of_one_folder_keep_a_single_reservation() {
    const NAMES: [&str; 4] = ["North", "South", "East", "West"];

    for _ in 0..64 {
        let registry = Arc::new(FolderRegistry::new());
        let id = registry.create_folder("Start").unwrap();

        let handles: Vec<_> = NAMES
            .iter()
            .map(|name| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.rename_folder(id, name))
            })
            .collect();
        for handle in handles {
            handle
                .join()
                .expect("thread panicked")
                .expect("rename succeeds");
        }

        let current = registry.get(id).unwrap().mount_point().to_owned();
        assert!(NAMES.contains(&current.as_str()));
        assert_eq!(registry.find_by_mount_point(&current).unwrap().id(), id);
        for name in NAMES.iter().chain(&["Start"]) {
            if *name != current {
                assert!(registry.find_by_mount_point(name).is_none(), "{name} still reserved");
                registry.create_folder(name).expect("stale name is free");
            }
        }
    }
}

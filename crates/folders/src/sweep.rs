//! crates/folders/src/sweep.rs
//! Pruning of registry rows that reference a deleted group.

use permissions::{FolderId, Mapping};

use crate::registry::FolderRegistry;

/// Outcome of a group-deletion sweep.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SweepReport {
    /// Folders whose applicable-group row was removed.
    pub applicable_removed: Vec<FolderId>,
    /// Folders whose ACL manager list no longer names the group.
    pub managers_removed: Vec<FolderId>,
    /// Folders left with neither applicable groups nor users.
    pub orphaned: Vec<FolderId>,
}

impl SweepReport {
    /// Returns `true` when the sweep changed nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.applicable_removed.is_empty() && self.managers_removed.is_empty()
    }
}

impl FolderRegistry {
    /// Removes every row referencing `group` across all folders.
    ///
    /// Only rows naming exactly this group are touched. User rows and the
    /// folders themselves are kept; a folder left without groups or users
    /// stays registered but is no longer mounted for anyone. Running the
    /// sweep again for the same group changes nothing.
    pub fn delete_group(&self, group: &str) -> SweepReport {
        let mapping = Mapping::group(group);
        let mut report = SweepReport::default();

        for mut entry in self.folders.iter_mut() {
            let folder = entry.value_mut();
            let applicable = folder.groups.remove(group).is_some();
            let manager = folder.manage_acl.remove(&mapping);
            if applicable {
                report.applicable_removed.push(folder.id);
                if folder.is_orphaned() {
                    report.orphaned.push(folder.id);
                }
            }
            if manager {
                report.managers_removed.push(folder.id);
            }
        }

        report.applicable_removed.sort_unstable();
        report.managers_removed.sort_unstable();
        report.orphaned.sort_unstable();

        logging::trace_sweep!(
            group = %group,
            applicable = report.applicable_removed.len(),
            managers = report.managers_removed.len(),
            orphaned = report.orphaned.len(),
            "group_swept"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permissions::PermissionMask;

    #[test]
    fn sweep_removes_only_matching_group_rows() {
        let registry = FolderRegistry::new();
        let shared = registry.create_folder("Shared").unwrap();
        let solo = registry.create_folder("Solo").unwrap();
        registry.add_applicable_group(shared, "staff").unwrap();
        registry.add_applicable_group(shared, "staff-old").unwrap();
        registry
            .set_user_permissions(shared, "staff", PermissionMask::READ)
            .unwrap();
        registry.add_applicable_group(solo, "staff").unwrap();

        let report = registry.delete_group("staff");
        assert_eq!(report.applicable_removed, vec![shared, solo]);
        assert_eq!(report.orphaned, vec![solo]);

        let folder = registry.get(shared).unwrap();
        assert!(folder.groups().contains_key("staff-old"));
        assert!(!folder.groups().contains_key("staff"));
        assert!(folder.users().contains_key("staff"));
        assert!(registry.get(solo).unwrap().is_orphaned());
    }

    #[test]
    fn sweep_is_idempotent() {
        let registry = FolderRegistry::new();
        let id = registry.create_folder("Shared").unwrap();
        registry.add_applicable_group(id, "staff").unwrap();
        registry
            .set_manage_acl(id, &Mapping::group("staff"), true)
            .unwrap();

        let first = registry.delete_group("staff");
        assert_eq!(first.managers_removed, vec![id]);
        let before = registry.folders();
        let second = registry.delete_group("staff");
        assert!(second.is_noop());
        assert_eq!(registry.folders(), before);
    }

    #[test]
    fn sweep_keeps_user_manager_with_same_name() {
        let registry = FolderRegistry::new();
        let id = registry.create_folder("Shared").unwrap();
        registry
            .set_manage_acl(id, &Mapping::user("staff"), true)
            .unwrap();
        assert!(registry.delete_group("staff").is_noop());
        assert!(
            registry
                .get(id)
                .unwrap()
                .manage_acl()
                .contains(&Mapping::user("staff"))
        );
    }
}

//! Plain-text output of the subcommands.

use std::io::{self, Write};
use std::path::Path;

use acl::AclRule;
use engine::{EngineConfig, FolderDetails};
use folders::{Folder, Quota, SweepReport};
use mounts::MountDescriptor;
use permissions::{FolderId, PermissionMask};

pub(crate) fn config_summary<W: Write>(
    out: &mut W,
    path: &Path,
    config: &EngineConfig,
) -> io::Result<()> {
    let global = config.global();
    writeln!(out, "{}: ok", path.display())?;
    writeln!(out, "admin group: {}", global.admin_group())?;
    writeln!(
        out,
        "allow root share: {}",
        yes_no(global.allow_root_share())
    )?;
    writeln!(out, "groups declared: {}", global.members().len())?;
    writeln!(out, "folders: {}", config.folders().len())?;
    for folder in config.folders() {
        writeln!(
            out,
            "  {} groups={} users={} quota={} acl={} rules={}",
            folder.mount_point(),
            folder.groups().len(),
            folder.users().len(),
            folder.quota(),
            yes_no(folder.acl()),
            folder.rules().len(),
        )?;
    }
    Ok(())
}

pub(crate) fn folders<W: Write>(out: &mut W, folders: &[FolderDetails]) -> io::Result<()> {
    for details in folders {
        let folder = &details.folder;
        writeln!(
            out,
            "{}\t{}\tquota={}\tused={}\tacl={}{}",
            folder.id(),
            folder.mount_point(),
            quota(folder.quota()),
            details.usage,
            yes_no(folder.acl_enabled()),
            flags(folder),
        )?;
        for (group, mask) in folder.groups() {
            writeln!(out, "\tgroup:{group}\t{}", mask.to_letters())?;
        }
        for (user, mask) in folder.users() {
            writeln!(out, "\tuser:{user}\t{}", mask.to_letters())?;
        }
        for manager in folder.manage_acl() {
            writeln!(out, "\tmanager\t{manager}")?;
        }
    }
    Ok(())
}

pub(crate) fn mounts<W: Write>(
    out: &mut W,
    mounts: &[MountDescriptor],
) -> io::Result<()> {
    for mount in mounts {
        write!(
            out,
            "{}\t{}\t{}\tused={}",
            mount.folder.id(),
            mount.folder.mount_point(),
            mount.effective_permission.to_letters(),
            mount.usage,
        )?;
        if let Some(remaining) = mount.quota_remaining {
            write!(out, "\tfree={remaining}")?;
        }
        if let Some(path) = &mount.storage_path {
            write!(out, "\t{}", path.display())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub(crate) fn permission<W: Write>(out: &mut W, mask: PermissionMask) -> io::Result<()> {
    writeln!(out, "{} ({mask})", mask.to_letters())
}

pub(crate) fn rules<W: Write>(out: &mut W, rules: &[AclRule]) -> io::Result<()> {
    for rule in rules {
        let path = if rule.path().is_empty() {
            "/"
        } else {
            rule.path()
        };
        writeln!(
            out,
            "{path}\t{}\t{}",
            rule.mapping(),
            overlay(rule.permissions(), rule.mask_bits()),
        )?;
    }
    Ok(())
}

pub(crate) fn sweep<W: Write>(out: &mut W, group: &str, report: &SweepReport) -> io::Result<()> {
    if report.is_noop() {
        return writeln!(out, "group '{group}' is not referenced by any folder");
    }
    writeln!(
        out,
        "applicable rows removed: {}",
        ids(&report.applicable_removed)
    )?;
    writeln!(out, "acl managers removed: {}", ids(&report.managers_removed))?;
    if !report.orphaned.is_empty() {
        writeln!(out, "folders left unmounted: {}", ids(&report.orphaned))?;
    }
    Ok(())
}

/// `+ru -d` form: granted bits, then revoked bits.
fn overlay(permissions: PermissionMask, mask_bits: PermissionMask) -> String {
    let granted = letters(permissions & mask_bits);
    let revoked = letters(mask_bits.difference(permissions));
    match (granted.is_empty(), revoked.is_empty()) {
        (false, false) => format!("+{granted} -{revoked}"),
        (false, true) => format!("+{granted}"),
        (true, false) => format!("-{revoked}"),
        (true, true) => "none".to_owned(),
    }
}

fn letters(mask: PermissionMask) -> String {
    mask.to_letters().chars().filter(|c| *c != '-').collect()
}

fn quota(quota: Quota) -> String {
    match quota {
        Quota::Unlimited => "unlimited".to_owned(),
        Quota::Limited(bytes) => bytes.to_string(),
    }
}

fn flags(folder: &Folder) -> String {
    let mut flags = String::new();
    if folder.template_only() {
        flags.push_str("\ttemplate-only");
    }
    if let Some(server) = folder.api_server() {
        flags.push_str("\tapi=");
        flags.push_str(server);
    }
    flags
}

fn ids(ids: &[FolderId]) -> String {
    if ids.is_empty() {
        return "none".to_owned();
    }
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

const fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_lists_granted_then_revoked() {
        let read = PermissionMask::READ;
        let delete = PermissionMask::DELETE;
        assert_eq!(overlay(read, read | delete), "+r -d");
        assert_eq!(overlay(read, read), "+r");
        assert_eq!(overlay(PermissionMask::NONE, delete), "-d");
        assert_eq!(overlay(read, PermissionMask::NONE), "none");
    }

    #[test]
    fn sweep_without_changes_says_so() {
        let mut out = Vec::new();
        sweep(&mut out, "ghost", &SweepReport::default()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "group 'ghost' is not referenced by any folder\n"
        );
    }

    #[test]
    fn sweep_lists_folder_ids() {
        let report = SweepReport {
            applicable_removed: vec![FolderId::new(1), FolderId::new(3)],
            managers_removed: Vec::new(),
            orphaned: vec![FolderId::new(3)],
        };
        let mut out = Vec::new();
        sweep(&mut out, "staff", &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("applicable rows removed: 1, 3"));
        assert!(text.contains("acl managers removed: none"));
        assert!(text.contains("folders left unmounted: 3"));
    }
}

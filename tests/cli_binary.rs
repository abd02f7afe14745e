//! End-to-end checks of the `groupfolders` binary.
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! |  0   | Success                                   |
//! |  1   | Usage error                               |
//! |  2   | Configuration or state file error         |
//! |  3   | Not authorized                            |
//! |  4   | Folder, user or group not found           |
//! |  5   | Mount point conflict                      |
//! |  6   | Invalid argument                          |
//! |  7   | Collaborator unavailable                  |

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const CONFIG: &str = "\
members = staff: alice
members = guests: gus

[Handbook]
groups = staff:rucds, guests:r
acl = yes
manage acl = alice
";

fn groupfolders(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_groupfolders"))
        .args(args)
        .output()
        .unwrap_or_else(|error| panic!("failed to run groupfolders: {error}"))
}

fn with_config(dir: &Path, args: &[&str]) -> Output {
    let config = dir.join("groupfolders.conf");
    if !config.exists() {
        fs::write(&config, CONFIG).expect("write config");
    }
    let config = config.to_str().expect("utf-8 path");
    let state = dir.join("state.json");
    let state = state.to_str().expect("utf-8 path");

    let mut full = vec!["--config", config, "--state", state];
    full.extend_from_slice(args);
    groupfolders(&full)
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout is UTF-8")
}

#[test]
fn help_lists_subcommands() {
    let output = groupfolders(&["--help"]);
    assert!(output.status.success(), "--help should succeed");
    assert!(output.stderr.is_empty(), "help output should not write to stderr");
    let text = stdout(&output);
    assert!(text.contains("Usage:"));
    assert!(text.contains("set-rule"));
}

#[test]
fn unknown_flag_exits_with_usage_status() {
    let output = groupfolders(&["--definitely-not-a-flag"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
}

#[test]
fn missing_config_exits_with_config_status() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("nope.conf");
    let output = groupfolders(&["--config", missing.to_str().expect("utf-8"), "folders"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn rule_changes_survive_between_runs() {
    let dir = TempDir::new().expect("tempdir");

    let before = with_config(dir.path(), &["check", "gus", "Handbook", "notes/a.txt", "write"]);
    assert_eq!(before.status.code(), Some(3));

    let set = with_config(
        dir.path(),
        &["set-rule", "alice", "Handbook", "notes", "gus", "--allow", "u"],
    );
    assert!(set.status.success(), "{}", String::from_utf8_lossy(&set.stderr));
    assert_eq!(stdout(&set), "inserted\n");

    let after = with_config(dir.path(), &["check", "gus", "Handbook", "notes/a.txt", "write"]);
    assert!(after.status.success(), "{}", String::from_utf8_lossy(&after.stderr));

    let elsewhere = with_config(dir.path(), &["check", "gus", "Handbook", "a.txt", "write"]);
    assert_eq!(elsewhere.status.code(), Some(3));

    let rules = with_config(dir.path(), &["rules", "Handbook"]);
    assert_eq!(stdout(&rules), "notes\tuser:gus\t+u\n");
}

#[test]
fn unknown_folder_exits_with_not_found_status() {
    let dir = TempDir::new().expect("tempdir");
    let output = with_config(dir.path(), &["rules", "Archive"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn removing_a_missing_rule_is_an_invalid_argument() {
    let dir = TempDir::new().expect("tempdir");
    let output = with_config(dir.path(), &["set-rule", "alice", "Handbook", "x", "@guests"]);
    assert_eq!(output.status.code(), Some(6));
}

#[test]
fn deleting_a_group_unmounts_its_members() {
    let dir = TempDir::new().expect("tempdir");

    let mounts = with_config(dir.path(), &["mounts", "gus"]);
    assert!(stdout(&mounts).contains("Handbook"));

    let sweep = with_config(dir.path(), &["delete-group", "guests"]);
    assert!(sweep.status.success());

    let mounts = with_config(dir.path(), &["mounts", "gus"]);
    assert!(mounts.status.success());
    assert!(stdout(&mounts).is_empty());
}

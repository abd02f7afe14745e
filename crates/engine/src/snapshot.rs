//! JSON state files: folders plus ACL rules.
//!
//! A snapshot is written to a temporary file in the destination directory
//! and renamed over the target once fully synced, so an interrupted save
//! leaves the previous state in place.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use acl::AclRule;
use folders::Folder;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::error::EngineError;
use crate::service::GroupFolders;

/// Format version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors raised while reading, writing or applying a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The file could not be read or written.
    #[error("{action} '{}': {source}", .path.display())]
    Io {
        /// What was being done.
        action: &'static str,
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The file is not a valid snapshot.
    #[error("malformed snapshot '{}': {source}", .path.display())]
    Format {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The file was written by an incompatible version.
    #[error("unsupported snapshot version {found} (expected {SNAPSHOT_VERSION})")]
    Version {
        /// Version found in the file.
        found: u32,
    },
    /// The engine rejected the content.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Serialized engine state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version.
    pub version: u32,
    /// Every folder, ordered by id.
    pub folders: Vec<Folder>,
    /// Every ACL rule, ordered by folder then path depth.
    #[serde(default)]
    pub rules: Vec<AclRule>,
}

impl Snapshot {
    /// Captures the current state of `engine`.
    pub fn capture(engine: &GroupFolders) -> Result<Self, SnapshotError> {
        let rules = engine
            .acl()
            .store()
            .all_rules()
            .map_err(EngineError::from)?;
        Ok(Self {
            version: SNAPSHOT_VERSION,
            folders: engine.registry().folders(),
            rules,
        })
    }

    /// Replaces the folders and rules of `engine` with this snapshot.
    ///
    /// Rules of folders missing from the snapshot are skipped.
    pub fn restore_into(self, engine: &GroupFolders) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version {
                found: self.version,
            });
        }

        let acl = engine.acl();
        let stale: BTreeSet<_> = acl
            .store()
            .all_rules()
            .map_err(EngineError::from)?
            .iter()
            .map(AclRule::folder)
            .collect();
        for folder in stale {
            acl.delete_folder_rules(folder).map_err(EngineError::from)?;
        }

        let folders = self.folders.len();
        engine
            .registry()
            .restore(self.folders)
            .map_err(EngineError::from)?;

        let mut restored = 0_usize;
        for rule in self.rules {
            if !engine.registry().contains(rule.folder()) || rule.is_noop() {
                continue;
            }
            acl.set_rule(rule).map_err(EngineError::from)?;
            restored += 1;
        }

        logging::trace_registry!(folders = folders, rules = restored, "snapshot_restored");
        Ok(())
    }

    /// Reads a snapshot from `path`.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let file = fs::File::open(path).map_err(|source| SnapshotError::Io {
            action: "failed to open",
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| SnapshotError::Format {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Atomically writes the snapshot to `path`.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let io_error = |action, source| SnapshotError::Io {
            action,
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp =
            NamedTempFile::new_in(dir).map_err(|e| io_error("failed to create temp file for", e))?;

        let json = serde_json::to_vec_pretty(self).map_err(|source| SnapshotError::Format {
            path: path.to_path_buf(),
            source,
        })?;
        temp.write_all(&json)
            .and_then(|()| temp.write_all(b"\n"))
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| io_error("failed to write", e))?;

        temp.persist(path)
            .map_err(|e| io_error("failed to replace", e.error))?;
        Ok(())
    }
}

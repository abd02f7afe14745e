//! crates/mounts/src/root.rs
//! Lazily prepared storage root shared by every folder mount.
//!
//! The directory is created on first use, not at construction, so building an
//! engine never touches the filesystem. Initialization runs at most once:
//! concurrent first callers serialize on an init lock and later callers read
//! the [`OnceLock`] without locking.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

use permissions::FolderId;

use crate::error::{MountError, MountResult};

/// Storage root holding one subdirectory per folder.
#[derive(Debug)]
pub struct StorageRoot {
    configured: PathBuf,
    ready: OnceLock<PathBuf>,
    init: Mutex<()>,
}

impl StorageRoot {
    /// Creates a root at `path` without touching the filesystem.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            configured: path.into(),
            ready: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Path the root was configured with.
    #[must_use]
    pub fn configured_path(&self) -> &Path {
        &self.configured
    }

    /// Returns `true` once the root directory has been prepared.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.ready.get().is_some()
    }

    /// Prepares the root on first call and returns its path.
    ///
    /// A failed attempt leaves the root uninitialized so a later call can
    /// retry.
    pub fn get_or_init(&self) -> MountResult<&Path> {
        if let Some(path) = self.ready.get() {
            return Ok(path);
        }

        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(path) = self.ready.get() {
            return Ok(path);
        }

        fs::create_dir_all(&self.configured).map_err(|source| MountError::StorageRoot {
            path: self.configured.clone(),
            source,
        })?;
        logging::trace_mount!(root = %self.configured.display(), "storage_root_ready");
        Ok(self.ready.get_or_init(|| self.configured.clone()))
    }

    /// Storage directory of `folder`, preparing the root when needed.
    pub fn folder_path(&self, folder: FolderId) -> MountResult<PathBuf> {
        Ok(self.get_or_init()?.join(folder.to_string()))
    }
}

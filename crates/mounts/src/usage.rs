//! crates/mounts/src/usage.rs
//! Folder usage accounting supplied by the storage layer.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use permissions::FolderId;
use walkdir::WalkDir;

use crate::root::StorageRoot;

/// Reports how many bytes a folder currently uses.
pub trait UsageProvider: Send + Sync {
    /// Current usage of `folder` in bytes.
    fn usage(&self, folder: FolderId) -> io::Result<u64>;
}

/// Usage table kept in memory, for hosts that track usage themselves.
#[derive(Debug, Default)]
pub struct MemoryUsage {
    bytes: DashMap<FolderId, u64>,
}

impl MemoryUsage {
    /// Creates an empty table; unknown folders report zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the usage of `folder`.
    pub fn set(&self, folder: FolderId, bytes: u64) {
        self.bytes.insert(folder, bytes);
    }

    /// Forgets `folder`.
    pub fn remove(&self, folder: FolderId) {
        self.bytes.remove(&folder);
    }
}

impl UsageProvider for MemoryUsage {
    fn usage(&self, folder: FolderId) -> io::Result<u64> {
        Ok(self.bytes.get(&folder).map_or(0, |bytes| *bytes))
    }
}

/// Usage measured by summing regular file sizes under the storage root.
///
/// Symlinks are not followed. A folder without a directory yet uses zero
/// bytes.
#[derive(Debug, Clone)]
pub struct DiskUsage {
    root: Arc<StorageRoot>,
}

impl DiskUsage {
    /// Measures folders below `root`.
    #[must_use]
    pub const fn new(root: Arc<StorageRoot>) -> Self {
        Self { root }
    }
}

impl UsageProvider for DiskUsage {
    fn usage(&self, folder: FolderId) -> io::Result<u64> {
        let base = self
            .root
            .folder_path(folder)
            .map_err(|error| io::Error::other(error.to_string()))?;
        match fs::symlink_metadata(&base) {
            Ok(_) => tree_size(base),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(error) => Err(error),
        }
    }
}

fn tree_size(base: PathBuf) -> io::Result<u64> {
    let mut total = 0u64;
    for entry in WalkDir::new(base).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() {
            total = total.saturating_add(entry.metadata()?.len());
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_usage_defaults_to_zero() {
        let usage = MemoryUsage::new();
        let folder = FolderId::new(1);
        assert_eq!(usage.usage(folder).unwrap(), 0);
        usage.set(folder, 42);
        assert_eq!(usage.usage(folder).unwrap(), 42);
        usage.remove(folder);
        assert_eq!(usage.usage(folder).unwrap(), 0);
    }

    #[test]
    fn disk_usage_sums_nested_files() {
        let temp = tempfile::tempdir().unwrap();
        let root = Arc::new(StorageRoot::new(temp.path()));
        let folder_dir = temp.path().join("3");
        fs::create_dir_all(folder_dir.join("nested/deeper")).unwrap();
        fs::write(folder_dir.join("a.ott"), vec![0u8; 100]).unwrap();
        fs::write(folder_dir.join("nested/b.ott"), vec![0u8; 20]).unwrap();
        fs::write(folder_dir.join("nested/deeper/c.ott"), vec![0u8; 3]).unwrap();

        let usage = DiskUsage::new(root);
        assert_eq!(usage.usage(FolderId::new(3)).unwrap(), 123);
        assert_eq!(usage.usage(FolderId::new(4)).unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn disk_usage_does_not_follow_symlinks() {
        let temp = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("big.bin"), vec![0u8; 4096]).unwrap();

        let folder_dir = temp.path().join("5");
        fs::create_dir_all(&folder_dir).unwrap();
        fs::write(folder_dir.join("small.txt"), vec![0u8; 7]).unwrap();
        std::os::unix::fs::symlink(outside.path(), folder_dir.join("link")).unwrap();

        let usage = DiskUsage::new(Arc::new(StorageRoot::new(temp.path())));
        assert_eq!(usage.usage(FolderId::new(5)).unwrap(), 7);
    }
}

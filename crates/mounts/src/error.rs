use std::io;
use std::path::PathBuf;

use folders::DirectoryError;
use permissions::FolderId;
use thiserror::Error;

/// Errors raised while resolving mounts.
///
/// Every variant means a collaborator could not answer. Resolution never
/// returns a partial list in that case.
#[derive(Debug, Error)]
pub enum MountError {
    /// Group membership could not be resolved.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Current usage of a folder could not be read.
    #[error("failed to read usage of folder {folder}: {source}")]
    Usage {
        /// Folder whose usage was requested.
        folder: FolderId,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },

    /// The storage root could not be prepared.
    #[error("failed to prepare storage root {}: {source}", .path.display())]
    StorageRoot {
        /// Configured root directory.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
}

/// Result type for mount resolution.
pub type MountResult<T> = Result<T, MountError>;

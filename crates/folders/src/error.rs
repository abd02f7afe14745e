//! Error types for the folder registry and the identity provider seam.

use permissions::FolderId;
use thiserror::Error;

/// Errors raised by [`FolderRegistry`](crate::FolderRegistry) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No folder has this id.
    #[error("group folder {0} does not exist")]
    NotFound(FolderId),

    /// Another folder already uses the mount point.
    #[error("mount point '{mount_point}' is already used by folder {existing}")]
    Conflict {
        /// The requested mount point.
        mount_point: String,
        /// Folder currently holding it.
        existing: FolderId,
    },

    /// The mount point is empty once surrounding separators are removed.
    #[error("mount point '{0}' is empty")]
    InvalidMountPoint(String),

    /// A negative quota other than the unlimited sentinel.
    #[error("quota {0} is invalid: use -3 for unlimited or a byte count >= 0")]
    InvalidQuota(i64),

    /// The API server value is not an absolute http(s) URL.
    #[error("API server '{value}' is invalid: {reason}")]
    InvalidApiServer {
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Failure of the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The provider could not be reached or did not answer in time.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Result type for identity provider lookups.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

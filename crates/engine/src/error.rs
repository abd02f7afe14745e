//! Error taxonomy of the engine's contract surface.

use std::fmt;

use acl::AclError;
use folders::{DirectoryError, RegistryError};
use mounts::MountError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Failure category, stable across versions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Folder, rule, user or group absent.
    NotFound,
    /// Duplicate mount point.
    Conflict,
    /// Caller lacks the rights for the operation.
    NotAuthorized,
    /// Malformed argument.
    InvalidArgument,
    /// A collaborator could not be reached.
    Unavailable,
}

impl ErrorKind {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not-found",
            Self::Conflict => "conflict",
            Self::NotAuthorized => "not-authorized",
            Self::InvalidArgument => "invalid-argument",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`GroupFolders`](crate::GroupFolders) operations.
///
/// A failed operation never leaves a partial change behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Folder, rule, user or group absent.
    #[error("{0}")]
    NotFound(String),
    /// Duplicate mount point.
    #[error("{0}")]
    Conflict(String),
    /// Caller lacks the rights for the operation.
    #[error("{0}")]
    NotAuthorized(String),
    /// Malformed argument.
    #[error("{0}")]
    InvalidArgument(String),
    /// A collaborator could not be reached.
    #[error("{0}")]
    Unavailable(String),
}

impl EngineError {
    /// Category of the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::NotAuthorized(_) => ErrorKind::NotAuthorized,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    /// Human readable message without the category.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(message)
            | Self::Conflict(message)
            | Self::NotAuthorized(message)
            | Self::InvalidArgument(message)
            | Self::Unavailable(message) => message,
        }
    }
}

impl From<RegistryError> for EngineError {
    fn from(error: RegistryError) -> Self {
        let message = error.to_string();
        match error {
            RegistryError::NotFound(_) => Self::NotFound(message),
            RegistryError::Conflict { .. } => Self::Conflict(message),
            RegistryError::InvalidMountPoint(_)
            | RegistryError::InvalidQuota(_)
            | RegistryError::InvalidApiServer { .. } => Self::InvalidArgument(message),
        }
    }
}

impl From<DirectoryError> for EngineError {
    fn from(error: DirectoryError) -> Self {
        Self::Unavailable(error.to_string())
    }
}

impl From<MountError> for EngineError {
    fn from(error: MountError) -> Self {
        Self::Unavailable(error.to_string())
    }
}

impl From<AclError> for EngineError {
    fn from(error: AclError) -> Self {
        let message = error.to_string();
        match error {
            AclError::EmptyMask { .. } => Self::InvalidArgument(message),
            AclError::Backend(_) => Self::Unavailable(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permissions::{FolderId, Mapping};

    #[test]
    fn registry_errors_keep_their_category() {
        let id = FolderId::new(4);
        assert_eq!(
            EngineError::from(RegistryError::NotFound(id)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            EngineError::from(RegistryError::Conflict {
                mount_point: "A".to_owned(),
                existing: id
            })
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            EngineError::from(RegistryError::InvalidQuota(-7)).kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn collaborator_failures_are_unavailable() {
        let error = EngineError::from(DirectoryError::Unavailable("ldap down".to_owned()));
        assert_eq!(error.kind(), ErrorKind::Unavailable);
        assert!(error.message().contains("ldap down"));
        assert_eq!(
            EngineError::from(AclError::Backend("db".to_owned())).kind(),
            ErrorKind::Unavailable
        );
    }

    #[test]
    fn empty_mask_is_invalid_argument() {
        let error = EngineError::from(AclError::EmptyMask {
            folder: FolderId::new(1),
            path: "docs".to_owned(),
            mapping: Mapping::group("staff"),
        });
        assert_eq!(error.kind(), ErrorKind::InvalidArgument);
        assert_eq!(ErrorKind::InvalidArgument.to_string(), "invalid-argument");
    }
}

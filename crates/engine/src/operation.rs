//! Storage operations checked by [`GroupFolders::check_operation`](crate::GroupFolders::check_operation).

use std::fmt;
use std::str::FromStr;

use permissions::PermissionMask;

/// A filesystem operation inside one folder, as announced by the storage
/// layer before it runs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Operation {
    /// Read a file or list a directory.
    Read,
    /// Overwrite an existing file.
    Write,
    /// Create a file at the path.
    CreateFile,
    /// Create a directory at the path.
    CreateDirectory,
    /// Delete the node at the path.
    Delete,
    /// Share the node at the path.
    Share,
    /// Copy the node to another path of the same folder.
    Copy {
        /// Destination path.
        to: String,
    },
    /// Move the node to another path of the same folder.
    Rename {
        /// Destination path.
        to: String,
    },
}

impl Operation {
    /// Short name used in logs and on the command line.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::CreateFile => "create",
            Self::CreateDirectory => "mkdir",
            Self::Delete => "delete",
            Self::Share => "share",
            Self::Copy { .. } => "copy",
            Self::Rename { .. } => "rename",
        }
    }

    /// Permission bit checked at the path itself, if any.
    #[must_use]
    pub const fn required_at_target(&self) -> Option<PermissionMask> {
        match self {
            Self::Read => Some(PermissionMask::READ),
            Self::Write => Some(PermissionMask::UPDATE),
            Self::Delete => Some(PermissionMask::DELETE),
            Self::Share => Some(PermissionMask::SHARE),
            Self::CreateFile | Self::CreateDirectory | Self::Copy { .. } | Self::Rename { .. } => {
                None
            }
        }
    }

    /// Path whose parent must grant CREATE, if any.
    #[must_use]
    pub fn created_path<'a>(&'a self, target: &'a str) -> Option<&'a str> {
        match self {
            Self::CreateFile | Self::CreateDirectory => Some(target),
            Self::Copy { to } | Self::Rename { to } => Some(to),
            Self::Read | Self::Write | Self::Delete | Self::Share => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy { to } | Self::Rename { to } => write!(f, "{} -> {to}", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

/// Error returned when an operation name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation '{0}' (expected read, write, create, mkdir, delete, share, copy:<to> or rename:<to>)")]
pub struct ParseOperationError(String);

impl FromStr for Operation {
    type Err = ParseOperationError;

    /// Parses `read`, `write`, `create`, `mkdir`, `delete`, `share`,
    /// `copy:<to>` or `rename:<to>`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let (name, destination) = match trimmed.split_once(':') {
            Some((name, to)) => (name, Some(to.trim())),
            None => (trimmed, None),
        };

        let operation = match (name.to_ascii_lowercase().as_str(), destination) {
            ("read", None) => Self::Read,
            ("write" | "update", None) => Self::Write,
            ("create", None) => Self::CreateFile,
            ("mkdir", None) => Self::CreateDirectory,
            ("delete", None) => Self::Delete,
            ("share", None) => Self::Share,
            ("copy", Some(to)) if !to.is_empty() => Self::Copy { to: to.to_owned() },
            ("rename" | "move", Some(to)) if !to.is_empty() => Self::Rename { to: to.to_owned() },
            _ => return Err(ParseOperationError(input.to_owned())),
        };
        Ok(operation)
    }
}

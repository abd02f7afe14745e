//! Error types for ACL rule storage.

use permissions::{FolderId, Mapping};
use thiserror::Error;

/// Errors raised by a [`RuleStore`](crate::RuleStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AclError {
    /// An upsert constrained no bit and there was no existing row to remove.
    #[error("ACL rule for {mapping} at '/{path}' in folder {folder} constrains no permission bits")]
    EmptyMask {
        /// Folder the rule targeted.
        folder: FolderId,
        /// Normalized path of the rule.
        path: String,
        /// Mapping of the rule.
        mapping: Mapping,
    },

    /// The backing store could not complete the operation.
    #[error("ACL rule store unavailable: {0}")]
    Backend(String),
}

/// Result type for ACL store operations.
pub type AclResult<T> = Result<T, AclError>;

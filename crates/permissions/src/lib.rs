#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `permissions` holds the value types shared by every layer of the group
//! folder engine: the [`PermissionMask`] bitfield, the [`Mapping`] that names
//! the user or group a rule applies to, and the [`FolderId`] handle.
//!
//! # Design
//!
//! [`PermissionMask`] wraps a `u32` and exposes one associated constant per
//! permission bit. The bit values match the host's file permission constants
//! (`READ = 1`, `UPDATE = 2`, `CREATE = 4`, `DELETE = 8`, `SHARE = 16`), so a
//! mask can cross the storage boundary unchanged. [`KnownPermission`] offers a
//! strongly typed view of single bits for iteration and parsing.
//!
//! # Invariants
//!
//! - A [`PermissionMask`] never holds bits outside [`PermissionMask::ALL`].
//! - Equality is bit equality; composition is plain union and intersection.
//!
//! # Examples
//!
//! ```
//! use permissions::{Mapping, PermissionMask};
//!
//! let mask: PermissionMask = "rw".parse().unwrap();
//! assert!(mask.contains(PermissionMask::READ));
//! assert_eq!(mask | PermissionMask::SHARE, "read|update|share".parse().unwrap());
//!
//! let staff: Mapping = "@staff".parse().unwrap();
//! assert_eq!(staff.to_string(), "group:staff");
//! ```

mod id;
mod iter;
mod known;
mod mapping;
mod mask;
mod parse;

pub use id::FolderId;
pub use iter::KnownPermissionsIter;
pub use known::KnownPermission;
pub use mapping::{Mapping, MappingType};
pub use mask::PermissionMask;

/// Error returned when a permission mask cannot be parsed or converted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseMaskError {
    /// The input was empty.
    #[error("permission mask is empty")]
    Empty,
    /// The numeric value carries bits outside the defined range.
    #[error("permission bits {0} are outside the defined range 0..=31")]
    OutOfRange(u32),
    /// A compact-notation letter is not recognised.
    #[error("unknown permission letter '{0}'")]
    UnknownLetter(char),
    /// A permission name or token is not recognised.
    #[error("unknown permission '{0}'")]
    Invalid(String),
}

/// Error returned when a [`Mapping`] cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseMappingError {
    /// The input has no `type:` prefix.
    #[error("mapping '{0}' must be written as user:<id>, group:<id> or @<group>")]
    MissingSeparator(String),
    /// The prefix is neither `user` nor `group`.
    #[error("unknown mapping type '{0}'")]
    UnknownType(String),
    /// The id part is empty.
    #[error("mapping '{0}' has an empty id")]
    EmptyId(String),
}

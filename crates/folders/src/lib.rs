#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `folders` is the source of truth for group folder configuration. It owns
//! the [`Folder`] entity with its [`Quota`], the concurrent
//! [`FolderRegistry`], the [`Directory`] seam through which the host's
//! identity provider answers membership questions, and the sweep that prunes
//! rows of deleted groups.
//!
//! # Design
//!
//! The registry keeps one `DashMap` entry per folder plus a mount point
//! index. Every mutation is applied to a single entry under its shard lock and
//! either commits completely or returns a [`RegistryError`] without touching
//! state. Readers receive cloned [`Folder`] snapshots, so a resolution always
//! works on a consistent view of one folder.
//!
//! # Invariants
//!
//! - Mount points are unique across the registry.
//! - A user row replaces the group masks of that user on the folder; it is
//!   never unioned with them.
//! - Folders without applicable groups or users remain registered.
//! - The group sweep removes only rows naming the deleted group and is
//!   idempotent.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeSet;
//!
//! use folders::FolderRegistry;
//! use permissions::PermissionMask;
//!
//! let registry = FolderRegistry::new();
//! let id = registry.create_folder("Marketing").unwrap();
//! registry
//!     .set_group_permissions(id, "g1", PermissionMask::READ)
//!     .unwrap();
//! registry
//!     .set_group_permissions(id, "g2", PermissionMask::READ | PermissionMask::UPDATE)
//!     .unwrap();
//!
//! let groups: BTreeSet<String> = ["g1", "g2"].into_iter().map(String::from).collect();
//! let folder = registry.get(id).unwrap();
//! assert_eq!(
//!     folder.base_permissions("u", &groups),
//!     Some(PermissionMask::READ | PermissionMask::UPDATE)
//! );
//! ```

mod directory;
mod error;
mod folder;
mod registry;
mod sweep;

pub use directory::{Directory, MemoryDirectory};
pub use error::{DirectoryError, DirectoryResult, RegistryError, RegistryResult};
pub use folder::{Folder, Quota};
pub use registry::FolderRegistry;
pub use sweep::SweepReport;

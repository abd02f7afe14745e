#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `mounts` decides which group folders a user sees and with which top-level
//! permission and remaining quota. The result is a list of
//! [`MountDescriptor`]s the host attaches to the user's filesystem view.
//!
//! # Design
//!
//! - [`MountResolver`] combines a registry snapshot with the user's groups
//!   from the [`Directory`](folders::Directory) and usage from a
//!   [`UsageProvider`].
//! - [`StorageRoot`] is prepared lazily on first use, exactly once, and gives
//!   each folder a storage directory named after its id.
//!
//! # Invariants
//!
//! - A user row replaces group masks; without one, masks of every applicable
//!   group the user belongs to are unioned.
//! - A zero top-level mask hides a folder unless ACLs are enabled on it.
//! - Remaining quota is never negative; unlimited folders report no cap.
//! - A membership, usage or storage failure fails the whole resolution.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use folders::{FolderRegistry, MemoryDirectory};
//! use mounts::{MemoryUsage, MountResolver};
//! use permissions::PermissionMask;
//!
//! let registry = FolderRegistry::new();
//! let id = registry.create_folder("Marketing").unwrap();
//! registry.set_group_permissions(id, "staff", PermissionMask::READ).unwrap();
//! registry.set_quota(id, 1_000).unwrap();
//!
//! let directory = Arc::new(MemoryDirectory::new());
//! directory.add_member("staff", "alice");
//! let usage = Arc::new(MemoryUsage::new());
//! usage.set(id, 400);
//!
//! let resolver = MountResolver::new(directory, usage);
//! let mounts = resolver.mounts_for_user(&registry, "alice").unwrap();
//! assert_eq!(mounts.len(), 1);
//! assert_eq!(mounts[0].effective_permission, PermissionMask::READ);
//! assert_eq!(mounts[0].quota_remaining, Some(600));
//! ```

mod error;
mod resolver;
mod root;
mod usage;

pub use error::{MountError, MountResult};
pub use resolver::{MountDescriptor, MountOptions, MountResolver, visible_permission};
pub use root::StorageRoot;
pub use usage::{DiskUsage, MemoryUsage, UsageProvider};

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `engine` is the contract surface of group folders. [`GroupFolders`] ties
//! the folder registry, the ACL manager and the mount resolver together and
//! answers the questions a host storage layer asks: which folders does a
//! user see, what may they do at a path, and may this particular operation
//! proceed.
//!
//! # Design
//!
//! - Collaborators are trait objects supplied by the host: the
//!   [`Directory`](folders::Directory) for memberships, the
//!   [`UsageProvider`](mounts::UsageProvider) for quota accounting and the
//!   [`RuleStore`](acl::RuleStore) for ACL rows. In-memory implementations
//!   are used when nothing else is configured.
//! - Every failure is an [`EngineError`] whose [`ErrorKind`] is stable.
//!   Lower layers convert into it without losing their category.
//! - [`EngineConfig`] reads `groupfolders.conf` and seeds an engine;
//!   [`Snapshot`] saves and restores the full state as JSON.
//!
//! # Invariants
//!
//! - A folder that is not mounted for a user grants that user nothing.
//! - When membership cannot be resolved the engine fails with
//!   `Unavailable` instead of returning partial results.
//! - Template-only folders accept nothing but template documents.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use engine::{GroupFolders, Operation};
//! use folders::MemoryDirectory;
//! use permissions::PermissionMask;
//!
//! let directory = Arc::new(MemoryDirectory::new());
//! directory.add_member("staff", "alice");
//!
//! let engine = GroupFolders::new(directory);
//! let id = engine.create_folder("Marketing").unwrap();
//! engine.add_applicable_group(id, "staff").unwrap();
//! engine
//!     .set_group_permissions(id, "staff", PermissionMask::READ | PermissionMask::CREATE)
//!     .unwrap();
//!
//! let mounts = engine.list_mounts_for_user("alice").unwrap();
//! assert_eq!(mounts[0].folder.mount_point(), "Marketing");
//!
//! assert!(engine.check_operation("alice", id, "notes.txt", &Operation::CreateFile).is_ok());
//! assert!(engine.check_operation("alice", id, "notes.txt", &Operation::Delete).is_err());
//! ```

pub mod config;
mod error;
pub mod guard;
mod operation;
mod service;
pub mod snapshot;

pub use config::{ConfigError, ConfigErrorKind, EngineConfig, FolderConfig, GlobalConfig};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use guard::{DEFAULT_TEMPLATE_EXTENSIONS, TemplateGuard};
pub use operation::{Operation, ParseOperationError};
pub use service::{
    DEFAULT_ADMIN_GROUP, FolderDetails, GroupFolders, GroupFoldersBuilder, MappingSearch, Settings,
};
pub use snapshot::{SNAPSHOT_VERSION, Snapshot, SnapshotError};

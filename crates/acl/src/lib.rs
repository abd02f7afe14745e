#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `acl` implements the advanced permission layer of group folders: path
//! scoped [`AclRule`]s stored per folder and the walk that turns them into an
//! effective [`PermissionMask`](permissions::PermissionMask) for one user at
//! one path.
//!
//! # Design
//!
//! - [`RuleStore`] is the storage seam; [`MemoryRuleStore`] keeps rows in a
//!   per-folder `DashMap` shard.
//! - [`resolve()`] is a pure function over a slice of rules. It never touches
//!   storage, which keeps the algorithm testable in isolation.
//! - [`AclManager`] glues the two: it fetches the rows that can matter for a
//!   query and runs the walk.
//!
//! # Invariants
//!
//! - A stored rule always constrains at least one bit; an upsert with empty
//!   `mask_bits` deletes the row.
//! - At one path level a user rule beats group rules, and among group rules a
//!   deny on a bit beats an allow.
//! - A deeper level always beats a shallower one for the bits it constrains.
//! - When ACLs are disabled for a folder the folder-level mask is returned for
//!   every path. Rows are kept and apply again once ACLs are re-enabled.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use acl::{AclManager, AclRule, MemoryRuleStore, Subject};
//! use permissions::{FolderId, Mapping, PermissionMask};
//!
//! let manager = AclManager::new(Arc::new(MemoryRuleStore::new()));
//! let folder = FolderId::new(1);
//! manager
//!     .set_rule(AclRule::new(
//!         folder,
//!         "/drafts",
//!         Mapping::group("interns"),
//!         PermissionMask::NONE,
//!         PermissionMask::UPDATE,
//!     ))
//!     .unwrap();
//!
//! let intern = Subject::new("jo", ["interns"]);
//! let base = PermissionMask::READ | PermissionMask::UPDATE;
//! let drafts = manager.resolve(folder, true, &intern, "drafts/a.ott", base).unwrap();
//! assert_eq!(drafts.mask, PermissionMask::READ);
//!
//! let disabled = manager.resolve(folder, false, &intern, "drafts/a.ott", base).unwrap();
//! assert_eq!(disabled.mask, base);
//! ```

pub mod debug_acl;
mod error;
mod manager;
pub mod path;
mod resolve;
mod rule;
mod store;

pub use error::{AclError, AclResult};
pub use manager::AclManager;
pub use resolve::{Layer, Resolution, resolve};
pub use rule::{AclRule, Subject};
pub use store::{MemoryRuleStore, RuleChange, RuleStore};

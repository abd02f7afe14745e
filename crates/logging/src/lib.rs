#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` controls diagnostic output of the group folder engine. Output is
//! split into [`Subsystem`]s (ACL, mount resolution, registry, sweep,
//! configuration and authorization guard), each with its own tracing target
//! and verbosity level.
//!
//! # Design
//!
//! [`VerbosityConfig`] holds one level per subsystem. It is built from a `-v`
//! count with [`VerbosityConfig::from_verbose_level`] and refined with
//! `--debug` style tokens such as `acl2` through
//! [`VerbosityConfig::apply_debug_flag`]. With the `tracing` feature the
//! configuration becomes an `EnvFilter` and is installed as the global
//! subscriber by `init_tracing`; the `trace_*!` macros emit under the matching
//! targets.
//!
//! # Invariants
//!
//! - Warnings and errors are always emitted, whatever the levels.
//! - A subsystem at level 0 produces no informational output.
//!
//! # Examples
//!
//! ```
//! use logging::{Subsystem, VerbosityConfig};
//!
//! let mut config = VerbosityConfig::from_verbose_level(1);
//! config.apply_debug_flag("acl2").unwrap();
//!
//! assert_eq!(config.level(Subsystem::Acl), 2);
//! assert_eq!(config.level(Subsystem::Registry), 1);
//! assert!(config.filter_directives().contains("groupfolders::acl=debug"));
//! ```

mod config;
mod levels;

#[cfg(feature = "tracing")]
mod tracing_bridge;
#[cfg(feature = "tracing")]
mod tracing_macros;

pub use config::VerbosityConfig;
pub use levels::{Subsystem, SubsystemLevels};

#[cfg(feature = "tracing")]
pub use tracing_bridge::{env_filter, init_tracing, init_tracing_with_filter};

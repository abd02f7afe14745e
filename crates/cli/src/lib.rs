#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` implements the `groupfolders` administrative front-end. It loads a
//! `groupfolders.conf` file, optionally overlays a JSON state file written by
//! earlier runs, and answers the questions an administrator asks of the
//! engine: which folders exist, which ones a user sees, what a user may do
//! at a path and whether a given operation would be allowed.
//!
//! # Design
//!
//! The crate exposes [`run`] as the primary entry point. The function accepts
//! an iterator of arguments together with handles for standard output and
//! error, so tests drive the front-end without spawning a process. A
//! [`clap`](https://docs.rs/clap/) builder command performs the parse;
//! execution then builds a [`GroupFolders`](engine::GroupFolders) engine
//! from the configuration and dispatches the subcommand.
//!
//! # Invariants
//!
//! - `run` never panics; failures surface as non-zero exit codes with a
//!   diagnostic on the error stream.
//! - Commands that change state require `--state` and write it atomically.
//! - Exit codes are stable: see [`ExitStatus`].
//!
//! # Examples
//!
//! ```
//! use cli::run;
//!
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let exit_code = run(["groupfolders", "--version"], &mut stdout, &mut stderr);
//!
//! assert_eq!(exit_code, 0);
//! assert!(String::from_utf8_lossy(&stdout).starts_with("groupfolders "));
//! assert!(stderr.is_empty());
//! ```
//!
//! # See also
//!
//! - `src/bin/groupfolders.rs` for the binary that wires [`run`] into `main`.

mod frontend;

pub use frontend::{ExitStatus, exit_code_from, run};

//! crates/logging/src/tracing_macros.rs
//! Convenience macros for engine tracing.
//!
//! Each macro wraps a standard tracing macro with the target of one
//! [`Subsystem`](crate::Subsystem). Callers need `tracing` as a dependency.

/// Emit an ACL trace.
///
/// # Example
/// ```ignore
/// trace_acl!(folder = %id, path = %path, "rule_upserted");
/// ```
#[macro_export]
macro_rules! trace_acl {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "groupfolders::acl", $($arg)*);
    };
}

/// Emit a mount resolution trace.
///
/// # Example
/// ```ignore
/// trace_mount!(user = %user, mounts = count, "mounts_resolved");
/// ```
#[macro_export]
macro_rules! trace_mount {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "groupfolders::mount", $($arg)*);
    };
}

/// Emit a registry mutation trace.
///
/// # Example
/// ```ignore
/// trace_registry!(folder = %id, "folder_created");
/// ```
#[macro_export]
macro_rules! trace_registry {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "groupfolders::registry", $($arg)*);
    };
}

/// Emit a group sweep trace.
///
/// # Example
/// ```ignore
/// trace_sweep!(group = %group, "group_swept");
/// ```
#[macro_export]
macro_rules! trace_sweep {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "groupfolders::sweep", $($arg)*);
    };
}

/// Emit a configuration trace.
///
/// # Example
/// ```ignore
/// trace_config!(path = %path.display(), folders = count, "config_loaded");
/// ```
#[macro_export]
macro_rules! trace_config {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "groupfolders::config", $($arg)*);
    };
}

/// Emit an authorization trace.
///
/// # Example
/// ```ignore
/// trace_guard!(user = %user, operation = %op, "operation_denied");
/// ```
#[macro_export]
macro_rules! trace_guard {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "groupfolders::guard", $($arg)*);
    };
}

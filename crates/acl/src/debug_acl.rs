//! Structured tracing for ACL rule changes and permission resolution.
//!
//! All functions compile to no-ops unless the `tracing` feature is enabled,
//! keeping the resolution hot path free of instrumentation by default.
//!
//! # Examples
//!
//! ```rust,ignore
//! use acl::debug_acl::trace_resolution;
//!
//! trace_resolution(folder, "alice", "docs/report.ott", base, resolved);
//! ```

#[cfg(feature = "tracing")]
const ACL_TARGET: &str = "groupfolders::acl";

use permissions::{FolderId, PermissionMask};

use crate::rule::AclRule;
use crate::store::RuleChange;

/// Traces an upsert against the rule store.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_rule_upserted(rule: &AclRule, change: RuleChange) {
    tracing::debug!(
        target: ACL_TARGET,
        folder = %rule.folder(),
        path = %rule.path(),
        mapping = %rule.mapping(),
        permissions = %rule.permissions().to_letters(),
        mask_bits = %rule.mask_bits().to_letters(),
        change = ?change,
        "acl_rule_upserted"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_rule_upserted(_rule: &AclRule, _change: RuleChange) {}

/// Traces the cascade removal of a folder's rules.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_folder_rules_deleted(folder: FolderId, removed: usize) {
    tracing::debug!(
        target: ACL_TARGET,
        folder = %folder,
        removed = removed,
        "acl_folder_rules_deleted"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_folder_rules_deleted(_folder: FolderId, _removed: usize) {}

/// Traces one ancestor level being applied during resolution.
///
/// `user_rule` reports whether a user-mapping rule took part at this level;
/// `group_rules` counts the group-mapping rules merged with deny-wins.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_level_applied(
    path: &str,
    user_rule: bool,
    group_rules: usize,
    mask_bits: PermissionMask,
    resolved: PermissionMask,
) {
    tracing::trace!(
        target: ACL_TARGET,
        path = %path,
        user_rule = user_rule,
        group_rules = group_rules,
        mask_bits = %mask_bits.to_letters(),
        resolved = %resolved.to_letters(),
        "acl_level_applied"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_level_applied(
    _path: &str,
    _user_rule: bool,
    _group_rules: usize,
    _mask_bits: PermissionMask,
    _resolved: PermissionMask,
) {
}

/// Traces the final result of a resolution.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_resolution(
    folder: FolderId,
    user: &str,
    path: &str,
    base: PermissionMask,
    resolved: PermissionMask,
) {
    tracing::debug!(
        target: ACL_TARGET,
        folder = %folder,
        user = %user,
        path = %path,
        base = %base.to_letters(),
        resolved = %resolved.to_letters(),
        "acl_resolution"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_resolution(
    _folder: FolderId,
    _user: &str,
    _path: &str,
    _base: PermissionMask,
    _resolved: PermissionMask,
) {
}

//! Folder-relative path handling.
//!
//! Rules are keyed by the normalized form of a path: no leading or trailing
//! separator, no empty or `.` segments. The folder root is the empty string.
//! `..` removes the previous segment and never climbs above the root.

/// Returns the normalized form of `path`.
#[must_use]
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Number of segments in a normalized path. The root has depth zero.
#[must_use]
pub fn depth(normalized: &str) -> usize {
    if normalized.is_empty() {
        0
    } else {
        normalized.split('/').count()
    }
}

/// Parent of a normalized path, or `None` for the root.
#[must_use]
pub fn parent(normalized: &str) -> Option<&str> {
    if normalized.is_empty() {
        return None;
    }
    Some(normalized.rsplit_once('/').map_or("", |(parent, _)| parent))
}

/// Final segment of a normalized path; empty for the root.
#[must_use]
pub fn file_name(normalized: &str) -> &str {
    normalized
        .rsplit_once('/')
        .map_or(normalized, |(_, name)| name)
}

/// Every ancestor of `path` from the folder root down to the path itself.
///
/// `a/b/c` yields `["", "a", "a/b", "a/b/c"]`.
#[must_use]
pub fn ancestors(path: &str) -> Vec<String> {
    let normalized = normalize(path);
    let mut chain = Vec::with_capacity(depth(&normalized) + 1);
    chain.push(String::new());
    let mut end = 0;
    for segment in normalized.split('/').filter(|segment| !segment.is_empty()) {
        end += segment.len();
        chain.push(normalized[..end].to_owned());
        end += 1;
    }
    chain
}

//! File-type guard for template-only folders.
//!
//! A folder flagged `template only` may hold nothing but template documents:
//! directories cannot be created and every file written, created, copied or
//! moved into it must carry one of the configured extensions. Extensions
//! compare case-insensitively.

use acl::path;
use folders::Folder;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::{EngineError, EngineResult};
use crate::operation::Operation;

/// Extensions accepted when none are configured.
pub const DEFAULT_TEMPLATE_EXTENSIONS: [&str; 3] = ["ott", "ots", "otp"];

/// Compiled extension matcher.
#[derive(Clone, Debug)]
pub struct TemplateGuard {
    extensions: Vec<String>,
    matcher: GlobSet,
}

impl Default for TemplateGuard {
    fn default() -> Self {
        let extensions = DEFAULT_TEMPLATE_EXTENSIONS.map(str::to_owned).to_vec();
        let matcher = compile(&extensions).unwrap_or_else(|_| GlobSet::empty());
        Self {
            extensions,
            matcher,
        }
    }
}

impl TemplateGuard {
    /// Compiles a guard for `extensions`, given with or without a leading dot.
    pub fn new<I, S>(extensions: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized = Vec::new();
        for extension in extensions {
            let raw = extension.as_ref();
            let extension = raw.trim().trim_start_matches('.').to_ascii_lowercase();
            if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(EngineError::InvalidArgument(format!(
                    "template extension '{raw}' must be alphanumeric"
                )));
            }
            if !normalized.contains(&extension) {
                normalized.push(extension);
            }
        }

        let matcher = compile(&normalized)?;
        Ok(Self {
            extensions: normalized,
            matcher,
        })
    }

    /// Accepted extensions, lowercase and without dots.
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Returns `true` when the file name at `target` has an accepted
    /// extension.
    #[must_use]
    pub fn allows_file(&self, target: &str) -> bool {
        let normalized = path::normalize(target);
        let name = path::file_name(&normalized);
        self.matcher.is_match(name)
    }

    /// Rejects `operation` at `target` when `folder` is template-only and the
    /// result would not be a template document.
    pub fn check(&self, folder: &Folder, target: &str, operation: &Operation) -> EngineResult<()> {
        if !folder.template_only() {
            return Ok(());
        }

        let created = match operation {
            Operation::CreateDirectory => {
                return Err(self.reject(folder, target, "directories cannot be created"));
            }
            Operation::CreateFile | Operation::Write => target,
            Operation::Copy { to } | Operation::Rename { to } => to.as_str(),
            Operation::Read | Operation::Delete | Operation::Share => return Ok(()),
        };

        if self.allows_file(created) {
            Ok(())
        } else {
            Err(self.reject(
                folder,
                created,
                &format!("only {} files are allowed", self.extensions.join(", ")),
            ))
        }
    }

    fn reject(&self, folder: &Folder, target: &str, reason: &str) -> EngineError {
        logging::trace_guard!(
            folder = %folder.id(),
            path = %target,
            reason = %reason,
            "template_guard_rejected"
        );
        EngineError::NotAuthorized(format!(
            "'{}' is a template folder: {reason} (path '/{}')",
            folder.mount_point(),
            path::normalize(target)
        ))
    }
}

fn compile(extensions: &[String]) -> EngineResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for extension in extensions {
        let glob = GlobBuilder::new(&format!("*.{extension}"))
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|error| {
                EngineError::InvalidArgument(format!(
                    "template extension '{extension}' is invalid: {error}"
                ))
            })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|error| EngineError::InvalidArgument(error.to_string()))
}

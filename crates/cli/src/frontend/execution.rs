use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use acl::RuleChange;
use engine::{EngineConfig, EngineError, GroupFolders, Operation, Snapshot, SnapshotError};
use folders::MemoryDirectory;
use logging::VerbosityConfig;
use permissions::{FolderId, Mapping, PermissionMask};

use super::arguments::{Invocation, Subcommand};
use super::{ExitStatus, render, report};

/// Configuration file read when `--config` is absent.
pub(crate) const DEFAULT_CONFIG: &str = "groupfolders.conf";

/// Why a command stopped early.
#[derive(Debug)]
enum Failure {
    Usage(String),
    Engine(EngineError),
    Snapshot(SnapshotError),
    Output(io::Error),
}

impl Failure {
    fn category(&self) -> &'static str {
        match self {
            Self::Usage(_) => "usage",
            Self::Engine(error) | Self::Snapshot(SnapshotError::Engine(error)) => {
                error.kind().as_str()
            }
            Self::Snapshot(_) => "state",
            Self::Output(_) => "output",
        }
    }

    fn status(&self) -> ExitStatus {
        match self {
            Self::Usage(_) => ExitStatus::Usage,
            Self::Engine(error) | Self::Snapshot(SnapshotError::Engine(error)) => {
                ExitStatus::from(error.kind())
            }
            Self::Snapshot(_) => ExitStatus::Config,
            Self::Output(_) => ExitStatus::Unavailable,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(message) => f.write_str(message),
            Self::Engine(error) => fmt::Display::fmt(error, f),
            Self::Snapshot(error) => fmt::Display::fmt(error, f),
            Self::Output(error) => write!(f, "failed to write output: {error}"),
        }
    }
}

impl From<EngineError> for Failure {
    fn from(error: EngineError) -> Self {
        Self::Engine(error)
    }
}

impl From<SnapshotError> for Failure {
    fn from(error: SnapshotError) -> Self {
        Self::Snapshot(error)
    }
}

impl From<io::Error> for Failure {
    fn from(error: io::Error) -> Self {
        Self::Output(error)
    }
}

type CommandResult = Result<(), Failure>;

pub(crate) fn execute<Out, Err>(
    invocation: &Invocation,
    stdout: &mut Out,
    stderr: &mut Err,
) -> ExitStatus
where
    Out: Write,
    Err: Write,
{
    if let Err(message) = init_logging(invocation) {
        report(stderr, "usage", message);
        return ExitStatus::Usage;
    }

    let config_path = invocation
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = match EngineConfig::from_file(&config_path) {
        Ok(config) => config,
        Err(error) => {
            report(stderr, "config", &error);
            return ExitStatus::Config;
        }
    };

    match dispatch(invocation, &config, &config_path, stdout) {
        Ok(()) => ExitStatus::Success,
        Err(failure) => {
            tracing::debug!(category = failure.category(), "command_failed");
            report(stderr, failure.category(), &failure);
            failure.status()
        }
    }
}

fn init_logging(invocation: &Invocation) -> Result<(), String> {
    let mut config = VerbosityConfig::from_verbose_level(invocation.verbosity);
    for flags in &invocation.debug {
        config.apply_debug_flags(flags)?;
    }
    // A subscriber installed by an earlier run in the same process stays.
    let _ = logging::init_tracing(config);
    Ok(())
}

fn dispatch<Out: Write>(
    invocation: &Invocation,
    config: &EngineConfig,
    config_path: &Path,
    stdout: &mut Out,
) -> CommandResult {
    let state = invocation.state.as_deref();
    let engine = build_engine(config, state)?;

    match &invocation.command {
        Subcommand::CheckConfig => {
            render::config_summary(stdout, config_path, config)?;
        }
        Subcommand::Folders => {
            render::folders(stdout, &engine.list_folders()?)?;
        }
        Subcommand::Mounts { user } => {
            render::mounts(stdout, &engine.list_mounts_for_user(user)?)?;
        }
        Subcommand::Permission { user, folder, path } => {
            let folder = resolve_folder(&engine, folder)?;
            let mask = engine.resolve_effective_permission(user, folder, path)?;
            render::permission(stdout, mask)?;
        }
        Subcommand::Check {
            user,
            folder,
            path,
            operation,
        } => {
            let operation: Operation = operation
                .parse()
                .map_err(|error| EngineError::InvalidArgument(format!("{error}")))?;
            let folder = resolve_folder(&engine, folder)?;
            engine.check_operation(user, folder, path, &operation)?;
            writeln!(stdout, "allowed")?;
        }
        Subcommand::Rules { folder, path } => {
            let folder = resolve_folder(&engine, folder)?;
            let rules = match path {
                Some(path) => engine.rules_at(folder, path)?,
                None => engine.rules_for_folder(folder)?,
            };
            render::rules(stdout, &rules)?;
        }
        Subcommand::SetRule {
            actor,
            folder,
            path,
            mapping,
            allow,
            deny,
        } => {
            let state = require_state(state, "set-rule")?;
            let folder = resolve_folder(&engine, folder)?;
            let mapping = parse_mapping(mapping)?;
            let allow = parse_mask(allow.as_deref())?;
            let deny = parse_mask(deny.as_deref())?;
            let overlap = allow & deny;
            if !overlap.is_empty() {
                return Err(EngineError::InvalidArgument(format!(
                    "--allow and --deny both name '{}'",
                    overlap.to_letters()
                ))
                .into());
            }
            let change = engine.set_acl_rule(
                actor,
                folder,
                path,
                mapping,
                allow.difference(deny),
                allow | deny,
            )?;
            Snapshot::capture(&engine)?.save(state)?;
            writeln!(stdout, "{}", change_name(change))?;
        }
        Subcommand::DeleteGroup { group } => {
            let report = engine.on_group_deleted(group);
            if let Some(state) = state {
                Snapshot::capture(&engine)?.save(state)?;
            }
            render::sweep(stdout, group, &report)?;
        }
    }

    Ok(())
}

/// Builds the engine from `config`, then overlays the state file when it
/// exists; otherwise the configured folders are seeded.
fn build_engine(config: &EngineConfig, state: Option<&Path>) -> Result<GroupFolders, Failure> {
    let directory = MemoryDirectory::new();
    config.populate_directory(&directory);
    let engine = GroupFolders::builder(Arc::new(directory))
        .settings(config.settings())
        .build()?;

    match state {
        Some(path) if path.exists() => Snapshot::load(path)?.restore_into(&engine)?,
        _ => {
            config.seed(&engine)?;
        }
    }
    Ok(engine)
}

/// Accepts a numeric folder id or a mount point; ids take precedence.
fn resolve_folder(engine: &GroupFolders, argument: &str) -> Result<FolderId, Failure> {
    if let Ok(id) = argument.parse::<FolderId>()
        && engine.registry().contains(id)
    {
        return Ok(id);
    }
    engine
        .registry()
        .find_by_mount_point(argument.trim())
        .map(|folder| folder.id())
        .ok_or_else(|| {
            EngineError::NotFound(format!("no folder with id or mount point '{argument}'")).into()
        })
}

fn require_state<'a>(state: Option<&'a Path>, command: &str) -> Result<&'a Path, Failure> {
    state.ok_or_else(|| Failure::Usage(format!("{command} requires --state to record the change")))
}

/// Bare names are users; `@group`, `group:<id>` and `user:<id>` are parsed.
fn parse_mapping(input: &str) -> Result<Mapping, Failure> {
    let trimmed = input.trim();
    if trimmed.starts_with('@') || trimmed.contains(':') {
        return trimmed
            .parse()
            .map_err(|error| EngineError::InvalidArgument(format!("{error}")).into());
    }
    if trimmed.is_empty() {
        return Err(EngineError::InvalidArgument("mapping is empty".to_owned()).into());
    }
    Ok(Mapping::user(trimmed))
}

fn parse_mask(input: Option<&str>) -> Result<PermissionMask, Failure> {
    input.map_or(Ok(PermissionMask::NONE), |text| {
        text.parse()
            .map_err(|error| EngineError::InvalidArgument(format!("'{text}': {error}")).into())
    })
}

const fn change_name(change: RuleChange) -> &'static str {
    match change {
        RuleChange::Inserted => "inserted",
        RuleChange::Updated => "updated",
        RuleChange::Unchanged => "unchanged",
        RuleChange::Removed => "removed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_mapping_is_a_user() {
        assert_eq!(parse_mapping("carol").unwrap(), Mapping::user("carol"));
        assert_eq!(parse_mapping("@staff").unwrap(), Mapping::group("staff"));
        assert_eq!(parse_mapping("group:x").unwrap(), Mapping::group("x"));
        assert!(parse_mapping("   ").is_err());
        assert!(parse_mapping("team:x").is_err());
    }

    #[test]
    fn missing_mask_is_none() {
        assert_eq!(parse_mask(None).unwrap(), PermissionMask::NONE);
        assert_eq!(
            parse_mask(Some("ru")).unwrap(),
            PermissionMask::READ | PermissionMask::UPDATE
        );
        let failure = parse_mask(Some("rz")).unwrap_err();
        assert_eq!(failure.status(), ExitStatus::InvalidArgument);
    }

    #[test]
    fn snapshot_failures_map_to_config() {
        let failure = Failure::from(SnapshotError::Version { found: 9 });
        assert_eq!(failure.status(), ExitStatus::Config);
        assert_eq!(failure.category(), "state");

        let failure = Failure::from(SnapshotError::Engine(EngineError::Conflict("x".into())));
        assert_eq!(failure.status(), ExitStatus::Conflict);
    }
}

use std::ffi::OsString;
use std::path::PathBuf;

use clap::ArgMatches;
use clap::error::ErrorKind as ClapErrorKind;

use super::command::clap_command;

/// Parsed command produced by [`parse_args`].
#[derive(Debug)]
pub(crate) enum ParsedArgs {
    /// Rendered help text.
    Help(String),
    /// `--version` was requested.
    Version,
    /// A subcommand to execute.
    Run(Invocation),
}

/// Global options plus the selected subcommand.
#[derive(Debug)]
pub(crate) struct Invocation {
    pub(crate) config: Option<PathBuf>,
    pub(crate) state: Option<PathBuf>,
    pub(crate) verbosity: u8,
    pub(crate) debug: Vec<String>,
    pub(crate) command: Subcommand,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Subcommand {
    CheckConfig,
    Folders,
    Mounts {
        user: String,
    },
    Permission {
        user: String,
        folder: String,
        path: String,
    },
    Check {
        user: String,
        folder: String,
        path: String,
        operation: String,
    },
    Rules {
        folder: String,
        path: Option<String>,
    },
    SetRule {
        actor: String,
        folder: String,
        path: String,
        mapping: String,
        allow: Option<String>,
        deny: Option<String>,
    },
    DeleteGroup {
        group: String,
    },
}

pub(crate) fn parse_args(args: Vec<OsString>) -> Result<ParsedArgs, clap::Error> {
    let mut clap = clap_command();
    let matches = match clap.try_get_matches_from_mut(args) {
        Ok(matches) => matches,
        Err(error) if error.kind() == ClapErrorKind::DisplayHelp => {
            return Ok(ParsedArgs::Help(error.render().to_string()));
        }
        Err(error) => return Err(error),
    };

    if matches.get_flag("version") {
        return Ok(ParsedArgs::Version);
    }

    let Some((name, sub)) = matches.subcommand() else {
        return Ok(ParsedArgs::Help(clap.render_help().to_string()));
    };

    let command = match name {
        "check-config" => Subcommand::CheckConfig,
        "folders" => Subcommand::Folders,
        "mounts" => Subcommand::Mounts {
            user: string(sub, "user"),
        },
        "permission" => Subcommand::Permission {
            user: string(sub, "user"),
            folder: string(sub, "folder"),
            path: optional(sub, "path").unwrap_or_default(),
        },
        "check" => Subcommand::Check {
            user: string(sub, "user"),
            folder: string(sub, "folder"),
            path: string(sub, "path"),
            operation: string(sub, "operation"),
        },
        "rules" => Subcommand::Rules {
            folder: string(sub, "folder"),
            path: optional(sub, "path"),
        },
        "set-rule" => Subcommand::SetRule {
            actor: string(sub, "actor"),
            folder: string(sub, "folder"),
            path: string(sub, "path"),
            mapping: string(sub, "mapping"),
            allow: optional(sub, "allow"),
            deny: optional(sub, "deny"),
        },
        "delete-group" => Subcommand::DeleteGroup {
            group: string(sub, "group"),
        },
        other => {
            return Err(clap.error(
                ClapErrorKind::InvalidSubcommand,
                format!("unrecognised subcommand '{other}'"),
            ));
        }
    };

    Ok(ParsedArgs::Run(Invocation {
        config: matches.get_one::<PathBuf>("config").cloned(),
        state: matches.get_one::<PathBuf>("state").cloned(),
        verbosity: matches.get_count("verbose"),
        debug: matches
            .get_many::<String>("debug")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        command,
    }))
}

fn string(matches: &ArgMatches, name: &str) -> String {
    optional(matches, name).unwrap_or_default()
}

fn optional(matches: &ArgMatches, name: &str) -> Option<String> {
    matches.get_one::<String>(name).cloned()
}

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command as ClapCommand, value_parser};

use super::PROGRAM_NAME;

pub(crate) fn clap_command() -> ClapCommand {
    ClapCommand::new(PROGRAM_NAME)
        .about("Inspect and administer group folders, their ACL rules and mounts")
        .arg(
            Arg::new("version")
                .short('V')
                .long("version")
                .action(ArgAction::SetTrue)
                .help("Print version information and exit."),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("Configuration file (default: groupfolders.conf)."),
        )
        .arg(
            Arg::new("state")
                .short('s')
                .long("state")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("JSON state file; read when present, written by mutating commands."),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase diagnostic verbosity (repeatable)."),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .value_name("FLAGS")
                .value_parser(value_parser!(String))
                .action(ArgAction::Append)
                .global(true)
                .help("Per-subsystem levels such as acl2,mount1 or all3."),
        )
        .subcommand(
            ClapCommand::new("check-config").about("Validate the configuration file and summarize it"),
        )
        .subcommand(ClapCommand::new("folders").about("List every folder with quota and usage"))
        .subcommand(
            ClapCommand::new("mounts")
                .about("List the folders mounted for a user")
                .arg(string_arg("user", "User id.")),
        )
        .subcommand(
            ClapCommand::new("permission")
                .about("Print the effective permission of a user at a path")
                .arg(string_arg("user", "User id."))
                .arg(string_arg("folder", "Folder id or mount point."))
                .arg(optional_path_arg()),
        )
        .subcommand(
            ClapCommand::new("check")
                .about("Check whether an operation would be allowed")
                .arg(string_arg("user", "User id."))
                .arg(string_arg("folder", "Folder id or mount point."))
                .arg(string_arg("path", "Path inside the folder."))
                .arg(string_arg(
                    "operation",
                    "read, write, create, mkdir, delete, share, copy:<to> or rename:<to>.",
                )),
        )
        .subcommand(
            ClapCommand::new("rules")
                .about("List the ACL rules of a folder")
                .arg(string_arg("folder", "Folder id or mount point."))
                .arg(
                    Arg::new("path")
                        .value_parser(value_parser!(String))
                        .help("Only rules attached to this path."),
                ),
        )
        .subcommand(
            ClapCommand::new("set-rule")
                .about("Create, change or remove an ACL rule on behalf of an actor")
                .arg(string_arg("actor", "User performing the change."))
                .arg(string_arg("folder", "Folder id or mount point."))
                .arg(string_arg("path", "Path inside the folder."))
                .arg(string_arg("mapping", "@group, group:<id> or user:<id>."))
                .arg(
                    Arg::new("allow")
                        .long("allow")
                        .value_name("PERMS")
                        .value_parser(value_parser!(String))
                        .help("Permissions to grant, e.g. ru."),
                )
                .arg(
                    Arg::new("deny")
                        .long("deny")
                        .value_name("PERMS")
                        .value_parser(value_parser!(String))
                        .help("Permissions to revoke, e.g. d."),
                ),
        )
        .subcommand(
            ClapCommand::new("delete-group")
                .about("Remove every reference to a deleted group")
                .arg(string_arg("group", "Group id.")),
        )
}

fn string_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .required(true)
        .value_parser(value_parser!(String))
        .help(help)
}

fn optional_path_arg() -> Arg {
    Arg::new("path")
        .value_parser(value_parser!(String))
        .help("Path inside the folder (default: the folder root).")
}

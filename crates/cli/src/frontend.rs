//! Argument handling and dispatch for the `groupfolders` binary.

use std::ffi::OsString;
use std::fmt::Display;
use std::io::Write;
use std::process::ExitCode;

use engine::ErrorKind;

mod arguments;
mod command;
mod execution;
mod render;


use arguments::{ParsedArgs, parse_args};

/// Program name used in diagnostics and the version banner.
pub(crate) const PROGRAM_NAME: &str = "groupfolders";

/// Maximum exit code representable by a Unix process.
const MAX_EXIT_CODE: i32 = u8::MAX as i32;

/// Process exit statuses reported by [`run`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(i32)]
pub enum ExitStatus {
    /// The command succeeded.
    Success = 0,
    /// The command line could not be parsed.
    Usage = 1,
    /// The configuration or state file could not be read or written.
    Config = 2,
    /// The engine denied the request.
    NotAuthorized = 3,
    /// A folder, user or group does not exist.
    NotFound = 4,
    /// A mount point is already taken.
    Conflict = 5,
    /// An argument was rejected by the engine.
    InvalidArgument = 6,
    /// A collaborator could not be reached.
    Unavailable = 7,
}

impl ExitStatus {
    /// Numeric exit code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl From<ErrorKind> for ExitStatus {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotAuthorized => Self::NotAuthorized,
            ErrorKind::NotFound => Self::NotFound,
            ErrorKind::Conflict => Self::Conflict,
            ErrorKind::InvalidArgument => Self::InvalidArgument,
            ErrorKind::Unavailable => Self::Unavailable,
        }
    }
}

/// Converts a status returned by [`run`] into a process [`ExitCode`],
/// clamping values outside the representable range.
#[must_use]
pub fn exit_code_from(status: i32) -> ExitCode {
    let clamped = status.clamp(0, MAX_EXIT_CODE);
    ExitCode::from(u8::try_from(clamped).unwrap_or(u8::MAX))
}

/// Runs the CLI using the provided argument iterator and output handles.
///
/// The function returns the process exit code that should be used by the
/// caller. On success, `0` is returned.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    if args.is_empty() {
        args.push(OsString::from(PROGRAM_NAME));
    }

    match parse_args(args) {
        Ok(ParsedArgs::Help(text)) => write_or_fail(stdout, &text),
        Ok(ParsedArgs::Version) => write_or_fail(
            stdout,
            &format!("{PROGRAM_NAME} {}\n", env!("CARGO_PKG_VERSION")),
        ),
        Ok(ParsedArgs::Run(invocation)) => {
            execution::execute(&invocation, stdout, stderr).code()
        }
        Err(error) => {
            let _ = write!(stderr, "{error}");
            ExitStatus::Usage.code()
        }
    }
}

fn write_or_fail<W: Write>(out: &mut W, text: &str) -> i32 {
    match out.write_all(text.as_bytes()) {
        Ok(()) => ExitStatus::Success.code(),
        Err(_) => ExitStatus::Unavailable.code(),
    }
}

/// Writes `groupfolders: <category>: <message>` to `stderr`.
pub(crate) fn report<Err: Write>(stderr: &mut Err, category: &str, message: impl Display) {
    let _ = writeln!(stderr, "{PROGRAM_NAME}: {category}: {message}");
}

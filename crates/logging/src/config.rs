//! crates/logging/src/config.rs
//! Verbosity configuration for the engine's subsystems.

use super::levels::{Subsystem, SubsystemLevels};

/// Per-subsystem verbosity derived from `-v` counts and `--debug` flags.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerbosityConfig {
    /// Subsystem levels.
    pub levels: SubsystemLevels,
}

impl VerbosityConfig {
    /// Create a configuration from a verbose level (0-4).
    ///
    /// Level 0 leaves only warnings and errors. Level 1 reports registry
    /// changes, sweeps and configuration loading. Level 2 adds mount
    /// resolution and authorization decisions, level 3 ACL resolution, and
    /// level 4 or more enables trace output everywhere.
    pub fn from_verbose_level(level: u8) -> Self {
        let mut config = Self::default();
        let levels = &mut config.levels;

        match level {
            0 => {}
            1 => {
                levels.registry = 1;
                levels.sweep = 1;
                levels.config = 1;
            }
            2 => {
                levels.registry = 2;
                levels.sweep = 1;
                levels.config = 2;
                levels.mount = 1;
                levels.guard = 1;
            }
            3 => {
                levels.registry = 2;
                levels.sweep = 2;
                levels.config = 2;
                levels.mount = 2;
                levels.guard = 2;
                levels.acl = 2;
            }
            _ => levels.set_all(3),
        }

        config
    }

    /// Level of one subsystem.
    pub const fn level(&self, subsystem: Subsystem) -> u8 {
        self.levels.get(subsystem)
    }

    /// Apply a single debug flag token (e.g. "acl2", "mount", "all3").
    pub fn apply_debug_flag(&mut self, token: &str) -> Result<(), String> {
        let (name, level) = parse_flag_token(token)?;

        if name == "all" {
            self.levels.set_all(level);
            return Ok(());
        }

        let subsystem =
            Subsystem::from_name(name).ok_or_else(|| format!("unknown debug flag: {name}"))?;
        self.levels.set(subsystem, level);
        Ok(())
    }

    /// Apply a comma separated list of debug flag tokens.
    pub fn apply_debug_flags(&mut self, tokens: &str) -> Result<(), String> {
        tokens
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .try_for_each(|token| self.apply_debug_flag(token))
    }

    /// `EnvFilter` directive string for this configuration.
    ///
    /// Everything defaults to `warn`; each subsystem with a non-zero level
    /// gets its own target directive.
    pub fn filter_directives(&self) -> String {
        let mut directives = String::from("warn");
        for subsystem in Subsystem::ALL {
            let level = match self.level(subsystem) {
                0 => continue,
                1 => "info",
                2 => "debug",
                _ => "trace",
            };
            directives.push(',');
            directives.push_str(subsystem.target());
            directives.push('=');
            directives.push_str(level);
        }
        directives
    }
}

/// Parse a flag token like "acl2" into ("acl", 2) or "mount" into ("mount", 1).
fn parse_flag_token(token: &str) -> Result<(&str, u8), String> {
    let token = token.trim();
    if token.is_empty() {
        return Err("empty flag token".to_string());
    }

    match token.find(|c: char| c.is_ascii_digit()) {
        Some(0) => Err(format!("flag is missing a name: {token}")),
        Some(pos) => {
            let level = token[pos..]
                .parse::<u8>()
                .map_err(|_| format!("invalid level in flag: {token}"))?;
            Ok((&token[..pos], level))
        }
        None => Ok((token, 1)),
    }
}

//! crates/logging/src/levels.rs
//! Subsystem enum and the per-subsystem level table.

use std::fmt;

/// Diagnostic categories of the engine, one per tracing target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Subsystem {
    /// ACL rule changes and resolution walks.
    Acl,
    /// Mount resolution for users.
    Mount,
    /// Folder registry mutations.
    Registry,
    /// Group-deletion sweeps.
    Sweep,
    /// Configuration loading.
    Config,
    /// Authorization checks on storage operations.
    Guard,
}

impl Subsystem {
    /// Every subsystem in flag order.
    pub const ALL: [Self; 6] = [
        Self::Acl,
        Self::Mount,
        Self::Registry,
        Self::Sweep,
        Self::Config,
        Self::Guard,
    ];

    /// Flag name used by `--debug`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Acl => "acl",
            Self::Mount => "mount",
            Self::Registry => "registry",
            Self::Sweep => "sweep",
            Self::Config => "config",
            Self::Guard => "guard",
        }
    }

    /// Tracing target the subsystem's events are emitted under.
    #[must_use]
    pub const fn target(self) -> &'static str {
        match self {
            Self::Acl => "groupfolders::acl",
            Self::Mount => "groupfolders::mount",
            Self::Registry => "groupfolders::registry",
            Self::Sweep => "groupfolders::sweep",
            Self::Config => "groupfolders::config",
            Self::Guard => "groupfolders::guard",
        }
    }

    /// Looks a subsystem up by flag name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|subsystem| subsystem.name() == name)
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Verbosity level of each subsystem.
///
/// `0` silences informational output, `1` enables info events, `2` debug
/// events and `3` or more trace events.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubsystemLevels {
    /// ACL level.
    pub acl: u8,
    /// Mount resolution level.
    pub mount: u8,
    /// Registry level.
    pub registry: u8,
    /// Sweep level.
    pub sweep: u8,
    /// Configuration level.
    pub config: u8,
    /// Guard level.
    pub guard: u8,
}

impl SubsystemLevels {
    /// Get the level for a subsystem.
    pub const fn get(&self, subsystem: Subsystem) -> u8 {
        match subsystem {
            Subsystem::Acl => self.acl,
            Subsystem::Mount => self.mount,
            Subsystem::Registry => self.registry,
            Subsystem::Sweep => self.sweep,
            Subsystem::Config => self.config,
            Subsystem::Guard => self.guard,
        }
    }

    /// Set the level for a subsystem.
    pub fn set(&mut self, subsystem: Subsystem, level: u8) {
        match subsystem {
            Subsystem::Acl => self.acl = level,
            Subsystem::Mount => self.mount = level,
            Subsystem::Registry => self.registry = level,
            Subsystem::Sweep => self.sweep = level,
            Subsystem::Config => self.config = level,
            Subsystem::Guard => self.guard = level,
        }
    }

    /// Set every subsystem to `level`.
    pub fn set_all(&mut self, level: u8) {
        for subsystem in Subsystem::ALL {
            self.set(subsystem, level);
        }
    }
}

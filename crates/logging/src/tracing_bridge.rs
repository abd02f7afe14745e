//! crates/logging/src/tracing_bridge.rs
//! Subscriber setup mapping a [`VerbosityConfig`] onto tracing targets.
//!
//! Each engine subsystem emits under its own target (see
//! [`Subsystem::target`](crate::Subsystem::target)). The configuration is
//! turned into an [`EnvFilter`] with one directive per enabled subsystem and
//! installed together with a stderr formatting layer.
//!
//! # Usage
//!
//! ```rust,ignore
//! use logging::{VerbosityConfig, init_tracing};
//!
//! let mut config = VerbosityConfig::from_verbose_level(1);
//! config.apply_debug_flag("acl2").unwrap();
//! init_tracing(config).ok();
//!
//! logging::trace_acl!(folder = 3, "rule_upserted");
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use super::config::VerbosityConfig;

/// Builds the filter for `config`.
///
/// The directive string is generated from known targets and levels, so it
/// always parses; the `warn` fallback only guards against that changing.
#[must_use]
pub fn env_filter(config: &VerbosityConfig) -> EnvFilter {
    EnvFilter::try_new(config.filter_directives()).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Installs the global subscriber for `config`.
///
/// Output goes to stderr. Fails when a global subscriber is already set.
pub fn init_tracing(config: VerbosityConfig) -> Result<(), TryInitError> {
    init_tracing_with_filter(env_filter(&config))
}

/// Installs the global subscriber with an explicit filter, for example one
/// read from `RUST_LOG` with [`EnvFilter::from_default_env`].
pub fn init_tracing_with_filter(filter: EnvFilter) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .try_init()
}

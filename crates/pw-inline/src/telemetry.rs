//! Tracing subscriber setup for embedding applications
//!
//! Library code only emits events; the embedding application calls
//! [`init_subscriber`] once.
//!
//! Filter priority: `PW_INLINE_LOG`, then `RUST_LOG`, then the verbosity default.

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::EnvFilter;

/// Project-specific filter variable
pub const LOG_ENV: &str = "PW_INLINE_LOG";

/// Verbosity requested by the embedding application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Warnings and above
    #[default]
    Normal,
    /// Debug output, including every field transition
    Verbose,
}

impl Verbosity {
    /// Default level for this verbosity
    #[must_use]
    pub const fn default_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
        }
    }
}

/// Install the global subscriber writing to stderr
///
/// # Errors
/// Returns `TryInitError` if a global subscriber is already installed.
pub fn init_subscriber(verbosity: Verbosity) -> Result<(), TryInitError> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    tracing_subscriber::registry()
        .with(build_env_filter(verbosity))
        .with(fmt_layer)
        .try_init()
}

fn build_env_filter(verbosity: Verbosity) -> EnvFilter {
    if let Ok(directives) = std::env::var(LOG_ENV) {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return filter;
        }
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(verbosity.default_level().as_str().to_ascii_lowercase())
}

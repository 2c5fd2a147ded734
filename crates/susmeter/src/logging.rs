//! Diagnostics for `susctl`.
//!
//! Everything is written to stderr; stdout carries scores, reports and
//! exports only.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much diagnostic output `susctl` prints, from `-q` to `-vv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Warnings and errors.
    #[default]
    Normal,
    /// Adds debug events.
    Verbose,
    /// Everything.
    Trace,
}

impl Verbosity {
    /// Most verbose level shown.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directive used when `RUST_LOG` is unset. Dependencies stay
    /// silent; only this crate's events pass.
    #[must_use]
    pub fn directive(self) -> String {
        format!("susmeter={}", self.level().as_str().to_ascii_lowercase())
    }
}

/// Install the stderr subscriber. `RUST_LOG` overrides `verbosity`.
///
/// Later calls are no-ops, so tests and embedders may call it freely.
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_per_verbosity() {
        assert_eq!(Verbosity::Quiet.directive(), "susmeter=error");
        assert_eq!(Verbosity::default().directive(), "susmeter=warn");
        assert_eq!(Verbosity::Verbose.directive(), "susmeter=debug");
        assert_eq!(Verbosity::Trace.directive(), "susmeter=trace");
    }

    #[test]
    fn test_levels_increase_with_verbosity() {
        let levels: Vec<_> = [
            Verbosity::Quiet,
            Verbosity::Normal,
            Verbosity::Verbose,
            Verbosity::Trace,
        ]
        .into_iter()
        .map(Verbosity::level)
        .collect();
        // More verbose levels compare greater.
        assert!(levels.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_directive_parses_as_filter() {
        for verbosity in [Verbosity::Quiet, Verbosity::Trace] {
            assert!(EnvFilter::try_new(verbosity.directive()).is_ok());
        }
    }

    #[test]
    fn test_repeated_init_is_harmless() {
        init_logging(Verbosity::Verbose);
        init_logging(Verbosity::Quiet);
        tracing::debug!("subscriber installed once");
    }
}

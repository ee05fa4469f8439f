//! crates/logging/src/config.rs
//! Verbosity configuration mapping `-v` counts onto per-target levels.

use std::fmt;

use crate::{CLASSIFY_TARGET, LEDGER_TARGET, PROGRESS_TARGET, RUNNER_TARGET};

/// Level assigned to one tracing target.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LogLevel {
    /// Nothing is recorded.
    Off,
    /// Errors only.
    Error,
    /// Warnings and errors.
    #[default]
    Warn,
    /// Informational events.
    Info,
    /// Debug events.
    Debug,
    /// Everything.
    Trace,
}

impl LogLevel {
    /// Returns the directive spelling understood by `EnvFilter`.
    #[must_use]
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

/// Per-target verbosity for the progress workspace.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VerbosityConfig {
    /// Line classification events.
    pub classify: LogLevel,
    /// Byte accounting events.
    pub progress: LogLevel,
    /// Completed-path ledger events.
    pub ledger: LogLevel,
    /// Process runner events.
    pub runner: LogLevel,
}

impl VerbosityConfig {
    /// Create a configuration from a verbose level (0-4).
    ///
    /// Level 0 keeps warnings only, 1 reports spawned processes and finished
    /// paths, 2 adds classification, 3 turns everything up to debug and 4 or
    /// more records every reading.
    #[must_use]
    pub fn from_verbose_level(level: u8) -> Self {
        let mut config = Self::default();

        match level {
            0 => {}
            1 => {
                config.runner = LogLevel::Info;
                config.ledger = LogLevel::Info;
            }
            2 => {
                config.runner = LogLevel::Info;
                config.ledger = LogLevel::Info;
                config.classify = LogLevel::Info;
            }
            3 => {
                config.runner = LogLevel::Debug;
                config.ledger = LogLevel::Debug;
                config.classify = LogLevel::Debug;
                config.progress = LogLevel::Debug;
            }
            _ => {
                config.runner = LogLevel::Trace;
                config.ledger = LogLevel::Trace;
                config.classify = LogLevel::Trace;
                config.progress = LogLevel::Trace;
            }
        }

        config
    }

    /// Silences every target.
    #[must_use]
    pub const fn quiet() -> Self {
        Self {
            classify: LogLevel::Off,
            progress: LogLevel::Off,
            ledger: LogLevel::Off,
            runner: LogLevel::Off,
        }
    }

    /// Renders the configuration as comma-separated `EnvFilter` directives.
    #[must_use]
    pub fn directives(&self) -> String {
        [
            (CLASSIFY_TARGET, self.classify),
            (PROGRESS_TARGET, self.progress),
            (LEDGER_TARGET, self.ledger),
            (RUNNER_TARGET, self.runner),
        ]
        .iter()
        .map(|(target, level)| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
    }
}

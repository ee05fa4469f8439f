#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` carries the ambient diagnostics for the rsync progress workspace.
//! Library crates emit [`tracing`] events through the subsystem macros exported
//! here so every event lands on a stable target:
//!
//! | macro               | target                       | level |
//! |---------------------|------------------------------|-------|
//! | [`trace_classify!`] | `rsync_progress::classify`   | debug |
//! | [`trace_progress!`] | `rsync_progress::progress`   | trace |
//! | [`trace_ledger!`]   | `rsync_progress::ledger`     | info  |
//! | [`trace_runner!`]   | `rsync_progress::runner`     | info  |
//!
//! Installing a subscriber is left to the embedding application.
//! [`init_tracing`] offers the default: a `fmt` layer on stderr filtered by
//! the [`VerbosityConfig`] mapping, or by `RUST_LOG` when it is set.
//!
//! # Examples
//!
//! ```
//! use logging::{LogLevel, VerbosityConfig};
//!
//! let config = VerbosityConfig::from_verbose_level(2);
//! assert_eq!(config.ledger, LogLevel::Info);
//! assert!(config.directives().contains("rsync_progress::ledger=info"));
//! ```

mod config;
mod tracing_bridge;
mod tracing_macros;

pub use config::{LogLevel, VerbosityConfig};
pub use tracing_bridge::{env_filter, init_tracing};

/// Target used for line classification events.
pub const CLASSIFY_TARGET: &str = "rsync_progress::classify";
/// Target used for per-reading byte accounting events.
pub const PROGRESS_TARGET: &str = "rsync_progress::progress";
/// Target used when a path is added to the completed ledger.
pub const LEDGER_TARGET: &str = "rsync_progress::ledger";
/// Target used by the process runner.
pub const RUNNER_TARGET: &str = "rsync_progress::runner";

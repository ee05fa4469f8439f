//! crates/logging/src/tracing_macros.rs
//! Subsystem macros that pin each event to its target.
//!
//! Every macro forwards its arguments untouched, so fields use the usual
//! `tracing` syntax (`name = value`, `%display`, `?debug`) followed by a
//! message. Calling crates must depend on `tracing`.

/// Records how a fragment was classified, at `debug`.
///
/// # Example
/// ```ignore
/// trace_classify!(kind = kind.as_str(), fragment = ?fragment, "classified fragment");
/// ```
#[macro_export]
macro_rules! trace_classify {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "rsync_progress::classify", $($arg)*);
    };
}

/// Records one reconciled reading, at `trace`.
///
/// # Example
/// ```ignore
/// trace_progress!(bytes = reading.bytes, completed = reading.completed, total, "reconciled reading");
/// ```
#[macro_export]
macro_rules! trace_progress {
    ($($arg:tt)*) => {
        ::tracing::trace!(target: "rsync_progress::progress", $($arg)*);
    };
}

/// Records a path entering the completed ledger, at `info`.
///
/// # Example
/// ```ignore
/// trace_ledger!(path = %path.display(), bytes = stats.transferred_bytes(), "path completed");
/// ```
#[macro_export]
macro_rules! trace_ledger {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "rsync_progress::ledger", $($arg)*);
    };
}

/// Records process lifecycle events, at `info`.
///
/// # Example
/// ```ignore
/// trace_runner!(pid = child.id(), source = %source, "spawned rsync");
/// trace_runner!(code, "rsync exited");
/// ```
#[macro_export]
macro_rules! trace_runner {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "rsync_progress::runner", $($arg)*);
    };
}

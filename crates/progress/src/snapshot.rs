//! Immutable session snapshots and the transition between them.

use std::path::{Path, PathBuf};

use imbl::{OrdMap, Vector};
use logging::{trace_ledger, trace_progress};

use crate::config::SessionConfig;
use crate::error::{ProgressResult, ProtocolViolation};
use crate::line::{ClassifiedLine, LineKind};
use crate::reconcile::{ByteReconciler, Reading};
use crate::stats::TransferStats;

/// Completed paths mapped to their final reading, ordered by path.
pub type Ledger = OrdMap<PathBuf, TransferStats>;

/// Fragments received so far, oldest first.
pub type RawOutput = Vector<String>;

/// Messages rsync printed about files it could not handle, oldest first.
pub type Diagnostics = Vector<String>;

/// Session state after one fragment.
///
/// Snapshots are never mutated once emitted. The ledger and raw output
/// history are persistent collections: a later snapshot that adds an entry
/// copies only the nodes on the path to it and shares the rest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    in_progress_stats: Option<TransferStats>,
    transferring_path: Option<PathBuf>,
    last_completed_path: Option<PathBuf>,
    last_completed_path_stats: Option<TransferStats>,
    completed_paths: Ledger,
    raw_output: RawOutput,
    diagnostics: Diagnostics,
    reconciler: ByteReconciler,
}

impl Snapshot {
    /// The in-progress reading carried by this fragment, if it was one.
    #[must_use]
    pub const fn in_progress_stats(&self) -> Option<&TransferStats> {
        self.in_progress_stats.as_ref()
    }

    /// Path rsync most recently announced.
    #[must_use]
    pub fn transferring_path(&self) -> Option<&Path> {
        self.transferring_path.as_deref()
    }

    /// Path that most recently finished.
    #[must_use]
    pub fn last_completed_path(&self) -> Option<&Path> {
        self.last_completed_path.as_deref()
    }

    /// Final reading of [`last_completed_path`](Self::last_completed_path).
    #[must_use]
    pub const fn last_completed_path_stats(&self) -> Option<&TransferStats> {
        self.last_completed_path_stats.as_ref()
    }

    /// Every path completed so far.
    #[must_use]
    pub const fn completed_paths(&self) -> &Ledger {
        &self.completed_paths
    }

    /// Bytes transferred in the whole session.
    #[must_use]
    pub const fn total_transferred(&self) -> u64 {
        self.reconciler.total()
    }

    /// Fragments received so far, oldest first. Empty unless retention is on.
    #[must_use]
    pub const fn raw_output(&self) -> &RawOutput {
        &self.raw_output
    }

    /// rsync's own warnings and errors seen so far, without line terminators.
    ///
    /// These do not stop the session; rsync's exit code tells whether the
    /// transfer as a whole succeeded.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Whether this snapshot and `other` hold the very same ledger, not
    /// merely equal ones.
    #[must_use]
    pub fn shares_ledger_with(&self, other: &Self) -> bool {
        self.completed_paths.ptr_eq(&other.completed_paths)
    }
}

/// Computes the next [`Snapshot`] from the previous one and a classified line.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionAggregator {
    config: SessionConfig,
}

impl SessionAggregator {
    /// Creates an aggregator with the given options.
    #[must_use]
    pub const fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// The options in effect.
    #[must_use]
    pub const fn config(&self) -> SessionConfig {
        self.config
    }

    /// Folds `line` into `previous`, returning the next snapshot.
    ///
    /// `previous` is `None` for the first fragment of a session. Neither
    /// argument is modified.
    ///
    /// # Errors
    ///
    /// - [`ProtocolViolation::UnclassifiableLine`] for unclassifiable lines.
    /// - [`ProtocolViolation::StatsBeforePath`] when a reading arrives before
    ///   any path was announced.
    /// - [`StatsFormatError`](crate::StatsFormatError) when a stats line fails
    ///   to parse.
    pub fn advance(
        &self,
        previous: Option<&Snapshot>,
        line: &ClassifiedLine,
    ) -> ProgressResult<Snapshot> {
        if line.is_unclassifiable() {
            return Err(ProtocolViolation::UnclassifiableLine {
                fragment: line.raw().to_owned(),
            }
            .into());
        }

        let mut next = previous.cloned().unwrap_or_default();
        next.in_progress_stats = None;

        match line.kind() {
            LineKind::SourceRoot | LineKind::Path => {
                next.transferring_path = line.path().map(Path::to_path_buf);
            }
            LineKind::ProgressStats | LineKind::CompletedStats => {
                let Some(path) = next.transferring_path.clone() else {
                    return Err(ProtocolViolation::StatsBeforePath {
                        fragment: line.raw().to_owned(),
                    }
                    .into());
                };
                if let Some(stats) = line.stats()? {
                    record_reading(&mut next, path, stats.clone());
                }
            }
            LineKind::Diagnostic => {
                let message = line.raw().trim_end();
                tracing::warn!(
                    target: logging::PROGRESS_TARGET,
                    diagnostic = message,
                    "rsync reported a problem"
                );
                next.diagnostics.push_back(message.to_owned());
            }
            LineKind::Irrelevant | LineKind::Unclassifiable => {}
        }

        if self.config.include_raw_output() {
            next.raw_output.push_back(line.raw().to_owned());
        }

        Ok(next)
    }
}

fn record_reading(next: &mut Snapshot, path: PathBuf, stats: TransferStats) {
    next.reconciler.observe(Reading::from(&stats));

    if !stats.is_completed() {
        trace_progress!(path = %path.display(), percent = stats.percent(), "in-progress reading");
        next.in_progress_stats = Some(stats);
        return;
    }

    trace_ledger!(
        path = %path.display(),
        bytes = stats.transferred_bytes(),
        total = next.reconciler.total(),
        "path completed"
    );
    next.completed_paths.insert(path.clone(), stats.clone());
    next.last_completed_path = Some(path);
    next.last_completed_path_stats = Some(stats);
}

#[cfg(test)]
mod tests;

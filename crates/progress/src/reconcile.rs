//! Folding per-file byte counters into one session total.
//!
//! rsync reports bytes per file, not per transfer. An in-progress reading
//! supersedes the previous reading for the same file, while the first reading
//! after a completed one starts a new file from zero.

use logging::trace_progress;

use crate::stats::TransferStats;

/// The byte counter of one reading and whether it finished its file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Reading {
    /// Bytes reported for the file.
    pub bytes: u64,
    /// Whether the reading was the file's completed summary.
    pub completed: bool,
}

impl Reading {
    /// Creates a reading.
    #[must_use]
    pub const fn new(bytes: u64, completed: bool) -> Self {
        Self { bytes, completed }
    }
}

impl From<&TransferStats> for Reading {
    fn from(stats: &TransferStats) -> Self {
        Self::new(stats.transferred_bytes(), stats.is_completed())
    }
}

/// Computes the new session total from the current and previous readings.
///
/// # Example
///
/// ```
/// use progress::reconcile;
///
/// // First reading of the session.
/// assert_eq!(reconcile(0, 100, 0, false), 100);
/// // Same file, later reading: replaces the previous one.
/// assert_eq!(reconcile(100, 250, 100, false), 250);
/// // Previous file finished: the new file adds on top.
/// assert_eq!(reconcile(250, 50, 250, true), 300);
/// ```
#[must_use]
pub const fn reconcile(
    total_so_far: u64,
    current: u64,
    previous: u64,
    previous_was_completed: bool,
) -> u64 {
    if total_so_far == 0 && previous == 0 {
        current
    } else if previous_was_completed {
        total_so_far.saturating_add(current)
    } else {
        total_so_far.saturating_add(current).saturating_sub(previous)
    }
}

/// Running total plus the reading it was last reconciled against.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ByteReconciler {
    total: u64,
    last: Option<Reading>,
}

impl ByteReconciler {
    /// Starts a session with nothing transferred.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total: 0,
            last: None,
        }
    }

    /// Cumulative bytes transferred in the session.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// The most recent reading observed.
    #[must_use]
    pub const fn last_reading(&self) -> Option<Reading> {
        self.last
    }

    /// Folds `reading` into the total and returns the new total.
    pub fn observe(&mut self, reading: Reading) -> u64 {
        let previous = self.last.unwrap_or_default();
        let total = reconcile(self.total, reading.bytes, previous.bytes, previous.completed);

        if total < self.total {
            tracing::warn!(
                target: logging::PROGRESS_TARGET,
                previous_total = self.total,
                total,
                bytes = reading.bytes,
                "reading moved the transferred total backwards"
            );
        }
        trace_progress!(
            bytes = reading.bytes,
            completed = reading.completed,
            total,
            "reconciled reading"
        );

        self.total = total;
        self.last = Some(reading);
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(readings: &[Reading]) -> Vec<u64> {
        let mut reconciler = ByteReconciler::new();
        readings
            .iter()
            .map(|reading| reconciler.observe(*reading))
            .collect()
    }

    #[test]
    fn first_reading_is_taken_as_is() {
        assert_eq!(reconcile(0, 42, 0, false), 42);
        assert_eq!(reconcile(0, 42, 0, true), 42);
    }

    #[test]
    fn completed_to_progress_boundary() {
        let readings = [
            Reading::new(100, false),
            Reading::new(250, false),
            Reading::new(250, true),
            Reading::new(50, false),
            Reading::new(120, false),
        ];
        assert_eq!(totals(&readings), vec![100, 250, 250, 300, 370]);
    }

    #[test]
    fn back_to_back_completed_readings_add_up() {
        let readings = [
            Reading::new(10, true),
            Reading::new(20, true),
            Reading::new(30, true),
        ];
        assert_eq!(totals(&readings), vec![10, 30, 60]);
    }

    #[test]
    fn zero_byte_file_then_real_file() {
        let readings = [
            Reading::new(0, true),
            Reading::new(100, false),
            Reading::new(200, true),
        ];
        assert_eq!(totals(&readings), vec![0, 100, 200]);
    }

    #[test]
    fn arithmetic_saturates() {
        assert_eq!(reconcile(u64::MAX, 10, 5, true), u64::MAX);
        assert_eq!(reconcile(3, 1, 10, false), 0);
    }

    #[test]
    fn reconciler_remembers_last_reading() {
        let mut reconciler = ByteReconciler::new();
        assert_eq!(reconciler.last_reading(), None);
        reconciler.observe(Reading::new(7, true));
        assert_eq!(reconciler.last_reading(), Some(Reading::new(7, true)));
        assert_eq!(reconciler.total(), 7);
    }

    #[test]
    fn reading_from_stats() {
        let stats = TransferStats::new(9, 100, "0:00:01", 1.0, "kB/s", true);
        assert_eq!(Reading::from(&stats), Reading::new(9, true));
    }
}

//! crates/progress/src/error.rs
//!
//! Error types for progress parsing.

use thiserror::Error;

/// Result type for session processing.
pub type ProgressResult<T> = Result<T, ProgressError>;

/// Errors that abort a progress session.
///
/// None of these are transient: each one means the fragment stream did not
/// have the shape rsync is expected to produce.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ProgressError {
    /// A fragment reached the classifier without a `\r` or `\n` terminator.
    #[error("fragment {fragment:?} does not end in a line terminator")]
    MalformedLine {
        /// The offending fragment.
        fragment: String,
    },
    /// The output stream broke the expected line protocol.
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),
    /// A line passed the shape check but a field failed to parse.
    #[error("stats parsing failed: {0}")]
    StatsFormat(#[from] StatsFormatError),
}

/// Lines that cannot occur in well-formed rsync output.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ProtocolViolation {
    /// The line matched none of the known categories.
    #[error("unexpected line in rsync output: {fragment:?}")]
    UnclassifiableLine {
        /// The offending fragment.
        fragment: String,
    },
    /// A stats reading arrived before any path was announced.
    #[error("stats line {fragment:?} arrived before any transferring path was announced")]
    StatsBeforePath {
        /// The offending fragment.
        fragment: String,
    },
}

/// Field-level failures while parsing a stats line.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StatsFormatError {
    /// The line does not split into exactly four fields.
    #[error("expected four stats fields in {line:?}")]
    Shape {
        /// The stats portion of the line.
        line: String,
    },
    /// The byte counter is not a thousands-separated integer.
    #[error("invalid byte count {token:?}")]
    Bytes {
        /// The offending token.
        token: String,
    },
    /// The percentage is not an integer between 0 and 100 followed by `%`.
    #[error("invalid percentage {token:?}")]
    Percent {
        /// The offending token.
        token: String,
    },
    /// The rate is not a decimal number followed by a unit.
    #[error("invalid transfer rate {token:?}")]
    Rate {
        /// The offending token.
        token: String,
    },
    /// The elapsed time is not `H:MM:SS`.
    #[error("invalid elapsed time {token:?}")]
    Elapsed {
        /// The offending token.
        token: String,
    },
}

/// A transfer rate unit that has no known byte scale.
///
/// Only the derived byte-rate computation fails with this; the
/// [`TransferStats`](crate::TransferStats) carrying the unit stays valid.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("transfer rate unit {unit:?} is not supported")]
pub struct UnsupportedUnitError {
    /// The unit label as printed by rsync.
    pub unit: String,
}

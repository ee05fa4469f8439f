#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![doc = include_str!("../README.md")]

mod config;
mod error;
mod line;
mod reconcile;
mod session;
mod shape;
mod snapshot;
mod stats;

pub use config::SessionConfig;
pub use error::{
    ProgressError, ProgressResult, ProtocolViolation, StatsFormatError, UnsupportedUnitError,
};
pub use line::{ClassifiedLine, LineClassifier, LineKind, LineTerminator, classify};
pub use reconcile::{ByteReconciler, Reading, reconcile};
pub use session::{Events, RunnerOutput, Session, SessionEvent};
pub use shape::{ShapeCache, is_stats_shape};
pub use snapshot::{Diagnostics, Ledger, RawOutput, SessionAggregator, Snapshot};
pub use stats::{RateUnit, TransferStats, parse_stats};

//! Driving a whole rsync run through the classifier and aggregator.

use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use crate::config::SessionConfig;
use crate::error::ProgressResult;
use crate::line::LineClassifier;
use crate::snapshot::{SessionAggregator, Snapshot};

/// One item produced by a running rsync process.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RunnerOutput {
    /// A fragment of output, terminator included.
    Fragment(String),
    /// The process exited with this status code.
    Exit(i32),
}

/// One item produced by a [`Session`].
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// State after one fragment.
    Snapshot(Snapshot),
    /// The process exited with this status code.
    Exit(i32),
}

impl SessionEvent {
    /// The snapshot, if this event carries one.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::Snapshot(snapshot) => Some(snapshot),
            Self::Exit(_) => None,
        }
    }

    /// The exit code, if this event carries one.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Snapshot(_) => None,
            Self::Exit(code) => Some(*code),
        }
    }
}

/// State of one transfer: a classifier, an aggregator and the latest snapshot.
///
/// Sessions are independent; running two at once never mixes their state.
#[derive(Clone, Debug)]
pub struct Session {
    classifier: LineClassifier,
    aggregator: SessionAggregator,
    last: Option<Snapshot>,
}

impl Session {
    /// Starts a session for a transfer rooted at `source_root`.
    pub fn new(source_root: impl Into<PathBuf>, config: SessionConfig) -> Self {
        Self {
            classifier: LineClassifier::new(source_root),
            aggregator: SessionAggregator::new(config),
            last: None,
        }
    }

    /// The source root paths are resolved against.
    #[must_use]
    pub fn source_root(&self) -> &Path {
        self.classifier.source_root()
    }

    /// The classifier, for inspecting its shape cache.
    #[must_use]
    pub const fn classifier(&self) -> &LineClassifier {
        &self.classifier
    }

    /// The most recent snapshot, `None` before the first fragment.
    #[must_use]
    pub const fn last_snapshot(&self) -> Option<&Snapshot> {
        self.last.as_ref()
    }

    /// Classifies `fragment` and folds it into the session.
    ///
    /// # Errors
    ///
    /// Any classification or aggregation failure. The session keeps the last
    /// good snapshot, but callers are expected to abandon it.
    pub fn process(&mut self, fragment: &str) -> ProgressResult<Snapshot> {
        let line = self.classifier.classify(fragment)?;
        let next = self.aggregator.advance(self.last.as_ref(), &line)?;
        self.last = Some(next.clone());
        Ok(next)
    }

    /// Handles one item of runner output.
    ///
    /// # Errors
    ///
    /// As [`process`](Self::process) for fragments. Exit codes never fail.
    pub fn feed(&mut self, output: RunnerOutput) -> ProgressResult<SessionEvent> {
        match output {
            RunnerOutput::Fragment(fragment) => self.process(&fragment).map(SessionEvent::Snapshot),
            RunnerOutput::Exit(code) => Ok(SessionEvent::Exit(code)),
        }
    }

    /// Lazily turns runner output into session events.
    ///
    /// The iterator stops for good after the first error.
    pub fn events<I>(self, outputs: I) -> Events<I::IntoIter>
    where
        I: IntoIterator<Item = RunnerOutput>,
    {
        Events {
            session: self,
            outputs: outputs.into_iter(),
            failed: false,
        }
    }
}

/// Iterator returned by [`Session::events`].
#[derive(Debug)]
pub struct Events<I> {
    session: Session,
    outputs: I,
    failed: bool,
}

impl<I> Events<I> {
    /// The session being driven.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }
}

impl<I> Iterator for Events<I>
where
    I: Iterator<Item = RunnerOutput>,
{
    type Item = ProgressResult<SessionEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let event = self.session.feed(self.outputs.next()?);
        if event.is_err() {
            self.failed = true;
        }
        Some(event)
    }
}

impl<I> FusedIterator for Events<I> where I: FusedIterator<Item = RunnerOutput> {}

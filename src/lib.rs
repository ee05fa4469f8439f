#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `rsync_progress` runs `rsync --archive --progress` and reports the
//! transfer as a sequence of immutable [`Snapshot`]s followed by rsync's exit
//! code.
//!
//! The heavy lifting lives in the workspace crates:
//!
//! - [`progress`] classifies output fragments and aggregates snapshots,
//! - [`runner`] spawns rsync and splits its output,
//! - [`logging`] provides the tracing targets and subscriber setup.
//!
//! # Examples
//!
//! ```no_run
//! use rsync_progress::{SessionEvent, SyncOptions, sync};
//!
//! for event in sync("/home/me/photos", "/mnt/backup", SyncOptions::default())? {
//!     match event? {
//!         SessionEvent::Snapshot(snapshot) => {
//!             println!("{} bytes so far", snapshot.total_transferred());
//!         }
//!         SessionEvent::Exit(code) => println!("rsync exited with {code}"),
//!     }
//! }
//! # Ok::<(), rsync_progress::SyncError>(())
//! ```

use std::ffi::OsString;
use std::iter::FusedIterator;

use thiserror::Error;

pub use logging::{LogLevel, VerbosityConfig, init_tracing};
pub use progress::{
    ProgressError, ProtocolViolation, RunnerOutput, Session, SessionConfig, SessionEvent,
    Snapshot, TransferStats,
};
pub use runner::{Location, RsyncCommand, RunnerError, rsync_available, rsync_version};

/// Errors from [`sync`] and the [`Transfer`] it returns.
#[derive(Debug, Error)]
pub enum SyncError {
    /// rsync could not be prepared, started or read from.
    #[error(transparent)]
    Runner(#[from] RunnerError),
    /// rsync printed output that does not fit the progress protocol.
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Options for [`sync`].
#[derive(Clone, Debug, Default)]
pub struct SyncOptions {
    session: SessionConfig,
    ssh_options: Vec<(String, String)>,
    program: Option<OsString>,
}

impl SyncOptions {
    /// Default options: `rsync` from `PATH`, no ssh options, no raw output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the raw output history in every snapshot.
    #[must_use]
    pub fn with_raw_output(mut self, include: bool) -> Self {
        self.session.set_raw_output(include);
        self
    }

    /// Adds an ssh option such as `("-i", "/home/me/.ssh/backup")`.
    #[must_use]
    pub fn with_ssh_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ssh_options.push((key.into(), value.into()));
        self
    }

    /// Runs `program` instead of the `rsync` on `PATH`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// The session options in effect.
    #[must_use]
    pub const fn session(&self) -> SessionConfig {
        self.session
    }

    fn command(&self, source: Location, destination: Location) -> Result<RsyncCommand, SyncError> {
        let mut command = RsyncCommand::new(source, destination)?;
        if let Some(program) = &self.program {
            command.set_program(program.clone());
        }
        for (key, value) in &self.ssh_options {
            command.push_ssh_option(key.clone(), value.clone());
        }
        Ok(command)
    }
}

/// Copies `source` into the directory `destination`, reporting progress.
///
/// Both arguments accept a local absolute path or `user@host:/path`; at most
/// one may be remote.
///
/// # Errors
///
/// Fails before rsync starts when a location is invalid, both are remote, a
/// local source is missing, a local destination is not a directory, or rsync
/// cannot be spawned.
pub fn sync(source: &str, destination: &str, options: SyncOptions) -> Result<Transfer, SyncError> {
    let source = Location::parse(source)?;
    let destination = Location::parse(destination)?;
    let session = Session::new(source.path(), options.session());
    let process = options.command(source, destination)?.spawn()?;

    Ok(Transfer {
        process,
        session,
        failed: false,
    })
}

/// A running transfer, yielding one [`SessionEvent`] per rsync output item.
///
/// After the first error nothing more is yielded and rsync is stopped.
#[derive(Debug)]
pub struct Transfer {
    process: runner::RsyncProcess,
    session: Session,
    failed: bool,
}

impl Transfer {
    /// The latest snapshot, `None` before any output.
    #[must_use]
    pub const fn last_snapshot(&self) -> Option<&Snapshot> {
        self.session.last_snapshot()
    }

    fn fail(&mut self, error: SyncError) -> Option<Result<SessionEvent, SyncError>> {
        self.failed = true;
        if let Err(kill_error) = self.process.kill() {
            tracing::debug!(target: logging::RUNNER_TARGET, %kill_error, "rsync already gone");
        }
        Some(Err(error))
    }
}

impl Iterator for Transfer {
    type Item = Result<SessionEvent, SyncError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let output = match self.process.next()? {
            Ok(output) => output,
            Err(err) => return self.fail(RunnerError::from(err).into()),
        };

        match self.session.feed(output) {
            Ok(event) => Some(Ok(event)),
            Err(err) => self.fail(err.into()),
        }
    }
}

impl FusedIterator for Transfer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_build_up() {
        let options = SyncOptions::new()
            .with_raw_output(true)
            .with_ssh_option("-p", "2222")
            .with_program("/usr/local/bin/rsync");
        assert!(options.session().include_raw_output());

        let source = Location::parse("me@host:/srv").expect("remote");
        let destination = Location::parse("/tmp").expect("local");
        let command = options.command(source, destination).expect("one remote end");
        let (program, args) = command.command_parts_for_testing();
        assert_eq!(program, OsString::from("/usr/local/bin/rsync"));
        assert!(args.contains(&OsString::from("ssh -p 2222")));
    }

    #[test]
    fn invalid_locations_fail_before_spawning() {
        let err = sync("relative", "/tmp", SyncOptions::default()).expect_err("relative");
        assert!(matches!(
            err,
            SyncError::Runner(RunnerError::RelativePath { .. })
        ));

        let err = sync("a@one:/x", "b@two:/y", SyncOptions::default()).expect_err("remote");
        assert!(matches!(
            err,
            SyncError::Runner(RunnerError::RemoteToRemote { .. })
        ));
    }

    #[test]
    fn errors_display_their_cause() {
        let err: SyncError = ProgressError::MalformedLine {
            fragment: "tail".to_owned(),
        }
        .into();
        assert!(err.to_string().contains("\"tail\""));
    }
}

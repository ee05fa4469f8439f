//! Errors raised while preparing or running rsync.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Failures before or while rsync runs.
///
/// A failure aborts only the transfer it belongs to; nothing is retried.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The location string was empty once sanitised.
    #[error("location is empty")]
    EmptyLocation,

    /// The path of a location is not absolute.
    #[error("'{}' is not an absolute path", path.display())]
    RelativePath {
        /// The offending path.
        path: PathBuf,
    },

    /// rsync cannot copy between two remote hosts.
    #[error("source {from} and destination {to} are both remote")]
    RemoteToRemote {
        /// Source location as given.
        from: String,
        /// Destination location as given.
        to: String,
    },

    /// A local source does not exist.
    #[error("local source '{}' does not exist", path.display())]
    MissingSource {
        /// The missing path.
        path: PathBuf,
    },

    /// A local destination is not a directory.
    #[error("'{}' is not a directory", path.display())]
    DestinationNotDirectory {
        /// The destination path.
        path: PathBuf,
    },

    /// The rsync program could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// `rsync --version` failed or printed something unexpected.
    #[error("could not determine rsync version: {reason}")]
    Version {
        /// What went wrong.
        reason: String,
    },

    /// Reading rsync's output or waiting for it failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl RunnerError {
    /// Whether the error was raised before rsync started.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyLocation
                | Self::RelativePath { .. }
                | Self::RemoteToRemote { .. }
                | Self::MissingSource { .. }
                | Self::DestinationNotDirectory { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_message() {
        let err = RunnerError::RelativePath {
            path: PathBuf::from("relative/dir"),
        };
        assert_eq!(err.to_string(), "'relative/dir' is not an absolute path");
        assert!(err.is_validation());
    }

    #[test]
    fn spawn_keeps_source() {
        let err = RunnerError::Spawn {
            program: "rsync".to_owned(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_validation());
        assert!(err.to_string().starts_with("failed to spawn rsync"));
    }

    #[test]
    fn io_converts() {
        let err: RunnerError = io::Error::other("broken pipe").into();
        assert!(matches!(err, RunnerError::Io(_)));
    }
}

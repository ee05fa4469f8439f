//! Detecting the installed rsync.

use std::ffi::OsStr;
use std::fmt;
use std::process::{Command, Stdio};
use std::str::FromStr;

use logging::trace_runner;

use crate::error::{RunnerError, RunnerResult};

/// Program name used when no explicit path is configured.
pub const DEFAULT_PROGRAM: &str = "rsync";

/// A `major.minor.patch` rsync release.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RsyncVersion {
    /// Major release.
    pub major: u32,
    /// Minor release.
    pub minor: u32,
    /// Patch release.
    pub patch: u32,
}

impl RsyncVersion {
    /// Finds `version X.Y.Z` in the banner printed by `rsync --version`.
    ///
    /// ```
    /// use runner::RsyncVersion;
    ///
    /// let banner = "rsync  version 3.2.7  protocol version 31\nCopyright ...";
    /// let version = RsyncVersion::from_banner(banner).unwrap();
    /// assert_eq!(version.to_string(), "3.2.7");
    /// ```
    #[must_use]
    pub fn from_banner(banner: &str) -> Option<Self> {
        banner
            .split_whitespace()
            .zip(banner.split_whitespace().skip(1))
            .find_map(|(word, next)| (word == "version").then(|| next.parse().ok()).flatten())
    }
}

impl FromStr for RsyncVersion {
    type Err = RunnerError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || RunnerError::Version {
            reason: format!("'{text}' is not a major.minor.patch version"),
        };

        let mut parts = text.split('.');
        let mut number = || -> RunnerResult<u32> {
            parts
                .next()
                .filter(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|part| part.parse().ok())
                .ok_or_else(invalid)
        };
        let version = Self {
            major: number()?,
            minor: number()?,
            patch: number()?,
        };

        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

impl fmt::Display for RsyncVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Version of the `rsync` found on `PATH`.
pub fn rsync_version() -> RunnerResult<RsyncVersion> {
    rsync_version_of(DEFAULT_PROGRAM)
}

/// Version of the rsync binary at `program`.
///
/// Fails when the program cannot be run, exits unsuccessfully, writes to
/// stderr, or prints no recognisable version.
pub fn rsync_version_of(program: impl AsRef<OsStr>) -> RunnerResult<RsyncVersion> {
    let program = program.as_ref();
    let output = Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .map_err(|source| RunnerError::Spawn {
            program: program.to_string_lossy().into_owned(),
            source,
        })?;

    if !output.status.success() || !output.stderr.is_empty() {
        return Err(RunnerError::Version {
            reason: format!(
                "{} --version exited with {}",
                program.to_string_lossy(),
                output.status
            ),
        });
    }

    let banner = String::from_utf8_lossy(&output.stdout);
    let version = RsyncVersion::from_banner(&banner).ok_or_else(|| RunnerError::Version {
        reason: "no version number in banner".to_owned(),
    })?;
    trace_runner!(%version, "detected rsync");
    Ok(version)
}

/// Whether a usable `rsync` is on `PATH`.
#[must_use]
pub fn rsync_available() -> bool {
    rsync_version().is_ok()
}

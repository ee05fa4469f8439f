//! Source and destination locations.
//!
//! A location is either a plain absolute path or `user@host:/absolute/path`.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{RunnerError, RunnerResult};

/// Characters stripped from every location before parsing.
const FORBIDDEN: char = ';';

/// A parsed transfer endpoint.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Location {
    user: Option<String>,
    host: Option<String>,
    path: PathBuf,
}

impl Location {
    /// Parses `text` into a location.
    ///
    /// Every `;` is removed first. Trailing separators are dropped from the
    /// path so rsync names the directory itself rather than its contents.
    ///
    /// # Example
    ///
    /// ```
    /// use runner::Location;
    /// use std::path::Path;
    ///
    /// let remote = Location::parse("backup@nas:/srv/photos/").unwrap();
    /// assert!(remote.is_remote());
    /// assert_eq!(remote.host(), Some("nas"));
    /// assert_eq!(remote.path(), Path::new("/srv/photos"));
    ///
    /// assert!(Location::parse("relative/dir").is_err());
    /// ```
    pub fn parse(text: &str) -> RunnerResult<Self> {
        let sanitised: String = text.chars().filter(|ch| *ch != FORBIDDEN).collect();
        if sanitised.is_empty() {
            return Err(RunnerError::EmptyLocation);
        }

        let (user, host, path) = match split_remote(&sanitised) {
            Some((user, host, path)) => (Some(user.to_owned()), Some(host.to_owned()), path),
            None => (None, None, sanitised.as_str()),
        };

        let path = Path::new(path);
        if !path.is_absolute() {
            return Err(RunnerError::RelativePath {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            user,
            host,
            path: path.components().collect(),
        })
    }

    /// Creates a local location from an absolute path.
    pub fn local(path: impl AsRef<Path>) -> RunnerResult<Self> {
        let path = path.as_ref();
        if !path.is_absolute() {
            return Err(RunnerError::RelativePath {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            user: None,
            host: None,
            path: path.components().collect(),
        })
    }

    /// Whether the location names another host.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.host.is_some()
    }

    /// Login user on the remote host.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Remote host name.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Absolute path on the host.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The location as an rsync command-line operand.
    #[must_use]
    pub fn to_argument(&self) -> OsString {
        match (&self.user, &self.host) {
            (Some(user), Some(host)) => {
                let mut argument = OsString::from(format!("{user}@{host}:"));
                argument.push(self.path.as_os_str());
                argument
            }
            _ => self.path.clone().into_os_string(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_argument().to_string_lossy())
    }
}

/// Splits `user@host:path`, all three parts non-empty.
///
/// The user part extends to the last `@` that still leaves a valid
/// `host:path` remainder, and the host to the last such `:`.
fn split_remote(text: &str) -> Option<(&str, &str, &str)> {
    text.match_indices('@').rev().find_map(|(at, _)| {
        let (user, rest) = (&text[..at], &text[at + 1..]);
        if user.is_empty() {
            return None;
        }
        rest.match_indices(':').rev().find_map(|(colon, _)| {
            let (host, path) = (&rest[..colon], &rest[colon + 1..]);
            (!host.is_empty() && !path.is_empty()).then_some((user, host, path))
        })
    })
}

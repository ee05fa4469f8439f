//! crates/test-support/src/lib.rs
//!
//! Shared fixtures for the workspace's tests: rsync-formatted progress
//! transcripts and self-cleaning temporary directories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// The marker rsync prints before the file list of a local push.
pub const SENDING_MARKER: &str = "sending incremental file list\n";

/// Formats a number with thousands separators, as rsync does.
///
/// ```
/// use test_support::format_number;
///
/// assert_eq!(format_number(0), "0");
/// assert_eq!(format_number(600_417_190), "600,417,190");
/// ```
#[must_use]
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats a byte rate the way rsync's progress printer does.
///
/// ```
/// use test_support::format_rate;
///
/// assert_eq!(format_rate(512.0), "0.50kB/s");
/// assert_eq!(format_rate(105_444_803.0), "100.56MB/s");
/// ```
#[must_use]
pub fn format_rate(bytes_per_sec: f64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    if bytes_per_sec >= GIB {
        format!("{:.2}GB/s", bytes_per_sec / GIB)
    } else if bytes_per_sec >= MIB {
        format!("{:.2}MB/s", bytes_per_sec / MIB)
    } else {
        format!("{:.2}kB/s", bytes_per_sec / KIB)
    }
}

/// Formats seconds as `H:MM:SS`.
#[must_use]
pub fn format_elapsed(total_seconds: u64) -> String {
    let hours = total_seconds / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

/// Renders one reading without terminator.
#[must_use]
pub fn format_reading(bytes: u64, percent: u8, bytes_per_sec: f64, seconds: u64) -> String {
    let bytes_str = format_number(bytes);
    let percent = format!("{percent}%");
    let rate_str = format_rate(bytes_per_sec);
    let elapsed_str = format_elapsed(seconds);
    format!("{bytes_str:>15} {percent:>4}   {rate_str:>12}    {elapsed_str}")
}

/// Builds the fragment stream of an rsync `--progress` run.
///
/// ```
/// use test_support::Transcript;
///
/// let fragments = Transcript::new()
///     .marker()
///     .root("the_source")
///     .progress(32_768, 0, 0.0, 0)
///     .completed(600_417_190, 105_444_803.0, 5, 0, 2)
///     .into_fragments();
///
/// assert_eq!(fragments[1], "the_source/\n");
/// assert!(fragments[2].ends_with('\r'));
/// assert!(fragments[3].ends_with("(xfr#1, to-chk=0/2)\n"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    fragments: Vec<String>,
    transfers: usize,
}

impl Transcript {
    /// Starts an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the incremental file list marker.
    #[must_use]
    pub fn marker(self) -> Self {
        self.raw(SENDING_MARKER)
    }

    /// Appends the announcement of the source root directory.
    #[must_use]
    pub fn root(self, name: &str) -> Self {
        self.raw(format!("{name}/\n"))
    }

    /// Appends a path announcement exactly as given.
    #[must_use]
    pub fn path(self, name: &str) -> Self {
        self.raw(format!("{name}\n"))
    }

    /// Appends a `\r`-terminated in-progress reading.
    #[must_use]
    pub fn progress(self, bytes: u64, percent: u8, bytes_per_sec: f64, seconds: u64) -> Self {
        let line = format_reading(bytes, percent, bytes_per_sec, seconds);
        self.raw(format!("{line}\r"))
    }

    /// Appends the completed reading of the next transfer.
    #[must_use]
    pub fn completed(
        mut self,
        bytes: u64,
        bytes_per_sec: f64,
        seconds: u64,
        to_check: usize,
        total_files: usize,
    ) -> Self {
        self.transfers += 1;
        let line = format_reading(bytes, 100, bytes_per_sec, seconds);
        let transfers = self.transfers;
        self.raw(format!(
            "{line} (xfr#{transfers}, to-chk={to_check}/{total_files})\n"
        ))
    }

    /// Appends an arbitrary fragment.
    #[must_use]
    pub fn raw(mut self, fragment: impl Into<String>) -> Self {
        self.fragments.push(fragment.into());
        self
    }

    /// The fragments so far.
    #[must_use]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Consumes the transcript, returning its fragments.
    #[must_use]
    pub fn into_fragments(self) -> Vec<String> {
        self.fragments
    }

    /// The fragments joined into the byte stream rsync would have written.
    #[must_use]
    pub fn render(&self) -> String {
        self.fragments.concat()
    }
}

/// A temporary directory removed on drop.
#[derive(Debug)]
pub struct TestDir {
    inner: TempDir,
}

impl TestDir {
    /// Creates a fresh directory.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            inner: tempfile::tempdir()?,
        })
    }

    /// Absolute path of the directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Path of `relative` inside the directory.
    #[must_use]
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.path().join(relative)
    }

    /// Creates `relative` and any missing parents.
    pub fn create_dir(&self, relative: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = self.join(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Writes `contents` to `relative`, creating parent directories.
    pub fn write_file(&self, relative: impl AsRef<Path>, contents: &[u8]) -> io::Result<PathBuf> {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Reads `relative` back.
    pub fn read_file(&self, relative: impl AsRef<Path>) -> io::Result<Vec<u8>> {
        fs::read(self.join(relative))
    }

    /// Whether `relative` exists.
    #[must_use]
    pub fn exists(&self, relative: impl AsRef<Path>) -> bool {
        self.join(relative).exists()
    }
}

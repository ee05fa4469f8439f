//! Classification of raw rsync output fragments.
//!
//! rsync interleaves three kinds of output on one stream: `\r`-terminated
//! readings that overwrite each other in place, `\n`-terminated file names,
//! and `\n`-terminated final readings carrying an `(xfr#.., to-chk=..)`
//! summary. Nothing frames these messages, so each fragment is classified on
//! its own text plus the source root of the transfer.

use std::cell::OnceCell;
use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

use logging::trace_classify;

use crate::error::{ProgressError, ProgressResult, StatsFormatError};
use crate::shape::{SUMMARY_SEPARATOR, ShapeCache};
use crate::stats::{TransferStats, parse_stats};

/// Marker lines rsync prints before the file list; they carry no transfer data.
const INCREMENTAL_MARKERS: [&str; 2] = [
    "sending incremental file list",
    "receiving incremental file list",
];

/// Tokens rsync prints in front of the per-transfer counter. rsync 3.0
/// spelled it `xfer#`.
const TRANSFER_COUNTERS: [&str; 2] = ["xfr#", "xfer#"];

/// Tokens of which a completed reading carries at least one.
const CHECK_COUNTERS: [&str; 3] = ["ir-chk=", "to-chk=", "to-check="];

/// Separator rsync uses when naming a symlink and its target.
const SYMLINK_ARROW: &str = " -> ";

/// Prefixes of the messages rsync prints about files it could not handle.
/// The transfer carries on after them and the exit code reports the outcome.
const DIAGNOSTIC_PREFIXES: [&str; 4] = [
    "rsync: ",
    "rsync error: ",
    "rsync warning: ",
    "file has vanished: ",
];

/// How a fragment was terminated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineTerminator {
    /// `\r`: an in-place update that the next fragment overwrites.
    CarriageReturn,
    /// `\n`: a finished line.
    Newline,
}

impl LineTerminator {
    /// Returns the terminator of `fragment`, if it has one.
    #[must_use]
    pub fn of(fragment: &str) -> Option<Self> {
        match fragment.as_bytes().last() {
            Some(b'\r') => Some(Self::CarriageReturn),
            Some(b'\n') => Some(Self::Newline),
            _ => None,
        }
    }
}

/// The category a fragment falls into. Exactly one applies to every fragment.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LineKind {
    /// Blank, or an incremental file list marker.
    Irrelevant,
    /// The final, `\n`-terminated reading for a file.
    CompletedStats,
    /// A `\r`-terminated in-progress reading.
    ProgressStats,
    /// The source root itself is about to transfer.
    SourceRoot,
    /// A path under the source root is about to transfer.
    Path,
    /// rsync reported a problem with a file, such as one that vanished or
    /// could not be opened.
    Diagnostic,
    /// Nothing rsync is expected to print.
    Unclassifiable,
}

impl LineKind {
    /// Short name used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Irrelevant => "irrelevant",
            Self::CompletedStats => "completed-stats",
            Self::ProgressStats => "progress-stats",
            Self::SourceRoot => "source-root",
            Self::Path => "path",
            Self::Diagnostic => "diagnostic",
            Self::Unclassifiable => "unclassifiable",
        }
    }
}

/// A fragment together with its category.
///
/// Stats are parsed at most once, on first access, and kept for later calls.
#[derive(Clone, Debug)]
pub struct ClassifiedLine {
    raw: String,
    kind: LineKind,
    terminator: LineTerminator,
    path: Option<PathBuf>,
    stats: OnceCell<Result<TransferStats, StatsFormatError>>,
}

impl ClassifiedLine {
    /// The fragment as received, terminator included.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The category of the fragment.
    #[must_use]
    pub const fn kind(&self) -> LineKind {
        self.kind
    }

    /// The terminator the fragment ended with.
    #[must_use]
    pub const fn terminator(&self) -> LineTerminator {
        self.terminator
    }

    /// Absolute path for [`LineKind::SourceRoot`] and [`LineKind::Path`] lines.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Blank or marker line.
    #[must_use]
    pub fn is_irrelevant(&self) -> bool {
        self.kind == LineKind::Irrelevant
    }

    /// Final reading for a file.
    #[must_use]
    pub fn is_completed_stats(&self) -> bool {
        self.kind == LineKind::CompletedStats
    }

    /// In-progress reading.
    #[must_use]
    pub fn is_progress_stats(&self) -> bool {
        self.kind == LineKind::ProgressStats
    }

    /// Either kind of reading.
    #[must_use]
    pub fn is_stats_line(&self) -> bool {
        matches!(self.kind, LineKind::CompletedStats | LineKind::ProgressStats)
    }

    /// Announcement of the source root.
    #[must_use]
    pub fn is_source_root(&self) -> bool {
        self.kind == LineKind::SourceRoot
    }

    /// Announcement of a path below the source root.
    #[must_use]
    pub fn is_path(&self) -> bool {
        self.kind == LineKind::Path
    }

    /// A warning or error message from rsync itself.
    #[must_use]
    pub fn is_diagnostic(&self) -> bool {
        self.kind == LineKind::Diagnostic
    }

    /// Not a line rsync should have printed.
    #[must_use]
    pub fn is_unclassifiable(&self) -> bool {
        self.kind == LineKind::Unclassifiable
    }

    /// The parsed reading for stats lines, `None` for every other kind.
    pub fn stats(&self) -> Result<Option<&TransferStats>, StatsFormatError> {
        let is_completed = match self.kind {
            LineKind::CompletedStats => true,
            LineKind::ProgressStats => false,
            _ => return Ok(None),
        };

        self.stats
            .get_or_init(|| parse_stats(&self.raw, is_completed))
            .as_ref()
            .map(Some)
            .map_err(Clone::clone)
    }
}

/// Classifies fragments of one transfer.
///
/// Owns the [`ShapeCache`] used while classifying, so repeated readings are
/// only shape-tested once.
#[derive(Clone, Debug)]
pub struct LineClassifier {
    source_root: PathBuf,
    root_name: Option<OsString>,
    cache: ShapeCache,
}

impl LineClassifier {
    /// Creates a classifier for a transfer rooted at `source_root`.
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        let source_root = source_root.into();
        let root_name = source_root.file_name().map(OsStr::to_os_string);
        Self {
            source_root,
            root_name,
            cache: ShapeCache::new(),
        }
    }

    /// The absolute source root paths are resolved against.
    #[must_use]
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// The memoisation table, for inspection.
    #[must_use]
    pub const fn cache(&self) -> &ShapeCache {
        &self.cache
    }

    /// Classifies one fragment.
    ///
    /// Categories are tried in a fixed order: irrelevant, completed stats,
    /// progress stats, source root, path. The path check only runs after
    /// both stats checks and the root check have failed. A `\n` line that
    /// does not resolve to a path is a diagnostic when it starts like one of
    /// rsync's own messages, and unclassifiable otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// use progress::{LineClassifier, LineKind};
    /// use std::path::Path;
    ///
    /// let mut classifier = LineClassifier::new("/home/x");
    /// let line = classifier.classify("/has/dirs/file.iso\n").unwrap();
    /// assert_eq!(line.kind(), LineKind::Path);
    /// assert_eq!(line.path(), Some(Path::new("/home/x/has/dirs/file.iso")));
    /// ```
    pub fn classify(&mut self, fragment: &str) -> ProgressResult<ClassifiedLine> {
        let terminator =
            LineTerminator::of(fragment).ok_or_else(|| ProgressError::MalformedLine {
                fragment: fragment.to_owned(),
            })?;
        let body = fragment
            .strip_suffix(['\r', '\n'].as_slice())
            .unwrap_or(fragment);
        let trimmed = body.trim();

        let (kind, path) = if is_irrelevant(trimmed) {
            (LineKind::Irrelevant, None)
        } else if terminator == LineTerminator::Newline && self.is_completed_stats(fragment) {
            (LineKind::CompletedStats, None)
        } else if terminator == LineTerminator::CarriageReturn
            && !fragment.contains(SUMMARY_SEPARATOR)
            && self.cache.is_stats_shape(fragment)
        {
            (LineKind::ProgressStats, None)
        } else if terminator == LineTerminator::Newline && self.is_source_root(trimmed) {
            (LineKind::SourceRoot, Some(self.source_root.clone()))
        } else if terminator == LineTerminator::Newline && !self.cache.is_stats_shape(fragment) {
            match self.resolve(body) {
                Some(path) => (LineKind::Path, Some(path)),
                None if is_diagnostic(body) => (LineKind::Diagnostic, None),
                None => (LineKind::Unclassifiable, None),
            }
        } else {
            (LineKind::Unclassifiable, None)
        };

        trace_classify!(kind = kind.as_str(), fragment = ?fragment, "classified fragment");

        Ok(ClassifiedLine {
            raw: fragment.to_owned(),
            kind,
            terminator,
            path,
            stats: OnceCell::new(),
        })
    }

    fn is_completed_stats(&mut self, fragment: &str) -> bool {
        TRANSFER_COUNTERS.iter().any(|counter| fragment.contains(counter))
            && CHECK_COUNTERS.iter().any(|counter| fragment.contains(counter))
            && fragment.matches(SUMMARY_SEPARATOR).count() == 1
            && self.cache.is_stats_shape(fragment)
    }

    fn is_source_root(&self, trimmed: &str) -> bool {
        let name = trimmed.trim_end_matches('/');
        self.root_name
            .as_deref()
            .is_some_and(|root| !name.is_empty() && OsStr::new(name) == root)
    }

    /// Resolves a name printed by rsync to an absolute path.
    ///
    /// rsync prefixes every name with either a path separator or the source
    /// root's own name; that first component is dropped and the rest joined
    /// onto the source root. Spaces are part of the name. Symlinks are
    /// printed as `name -> target`, of which only the name is kept; the
    /// last arrow is taken so names containing one survive.
    fn resolve(&self, line: &str) -> Option<PathBuf> {
        let name = line
            .rsplit_once(SYMLINK_ARROW)
            .map_or(line, |(name, _)| name);
        let mut components = Path::new(name).components();

        match components.next()? {
            Component::RootDir => {}
            Component::Normal(first) if Some(first) == self.root_name.as_deref() => {}
            _ => return None,
        }

        let relative = components.as_path();
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)))
        {
            return None;
        }

        if relative.as_os_str().is_empty() {
            Some(self.source_root.clone())
        } else {
            Some(self.source_root.join(relative))
        }
    }
}

/// Classifies `fragment` against `source_root` using a caller-owned cache.
///
/// Convenience for callers that do not keep a [`LineClassifier`] around.
pub fn classify(
    fragment: &str,
    source_root: &Path,
    cache: &mut ShapeCache,
) -> ProgressResult<ClassifiedLine> {
    let mut classifier = LineClassifier {
        source_root: source_root.to_path_buf(),
        root_name: source_root.file_name().map(OsStr::to_os_string),
        cache: std::mem::take(cache),
    };
    let result = classifier.classify(fragment);
    *cache = classifier.cache;
    result
}

fn is_diagnostic(line: &str) -> bool {
    DIAGNOSTIC_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

fn is_irrelevant(trimmed: &str) -> bool {
    trimmed.is_empty()
        || INCREMENTAL_MARKERS
            .iter()
            .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}

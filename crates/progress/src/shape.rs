//! Stats-line shape detection.
//!
//! rsync prints a reading as four whitespace separated fields, optionally
//! followed by a parenthesised summary on the final reading of a file:
//!
//! ```text
//!     600,417,190  11%  100.56MB/s    0:00:05
//!     600,417,190 100%  100.56MB/s    0:00:05 (xfr#1, to-chk=0/2)
//! ```
//!
//! The shape test only looks at the form of each field. Extracting values is
//! left to [`parse_stats`](crate::parse_stats).

use rustc_hash::FxHashMap;

/// Separator in front of the trailing `(xfr#.., to-chk=..)` summary group.
pub(crate) const SUMMARY_SEPARATOR: &str = " (";

/// Returns the stats portion of a line with any trailing summary group removed.
pub(crate) fn strip_summary(line: &str) -> &str {
    line.split_once(SUMMARY_SEPARATOR)
        .map_or(line, |(head, _)| head)
        .trim()
}

/// Reports whether `text` has the shape of a progress reading.
///
/// Works for both in-progress and completed lines; the summary group is
/// ignored.
///
/// # Example
///
/// ```
/// use progress::is_stats_shape;
///
/// assert!(is_stats_shape("    600,417,190 100%  100.56MB/s    0:00:05\r"));
/// assert!(is_stats_shape("600,417,190 100%  100.56MB/s    0:00:05 (xfr#1, to-chk=0/2)\n"));
/// assert!(!is_stats_shape("600,417,190 100%  100.56MB    0:00:05\r"));
/// assert!(!is_stats_shape("/some/path/from/rsync\n"));
/// ```
#[must_use]
pub fn is_stats_shape(text: &str) -> bool {
    let mut fields = strip_summary(text).split_whitespace();
    let (Some(bytes), Some(percent), Some(rate), Some(elapsed), None) = (
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
    ) else {
        return false;
    };

    is_byte_count(bytes) && percent.ends_with('%') && rate.ends_with("/s") && is_elapsed(elapsed)
}

/// Digits and thousands separators, at least one digit.
pub(crate) fn is_byte_count(token: &str) -> bool {
    token.bytes().any(|byte| byte.is_ascii_digit())
        && token.bytes().all(|byte| byte.is_ascii_digit() || byte == b',')
}

/// `digits:two-digits:two-digits`.
pub(crate) fn is_elapsed(token: &str) -> bool {
    let mut parts = token.split(':');
    let (Some(hours), Some(minutes), Some(seconds), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
    !hours.is_empty()
        && all_digits(hours)
        && minutes.len() == 2
        && all_digits(minutes)
        && seconds.len() == 2
        && all_digits(seconds)
}

/// Memoised shape results keyed by exact fragment text.
///
/// Fast transfers frequently repeat the same in-progress reading several
/// times, so the classifier consults this table before re-running the shape
/// test. The table is bounded: once it holds [`ShapeCache::CAPACITY`] entries
/// it is cleared before the next insert. Not thread-safe; wrap the owning
/// classifier in a lock to share it.
#[derive(Clone, Debug, Default)]
pub struct ShapeCache {
    entries: FxHashMap<String, bool>,
    hits: u64,
    misses: u64,
}

impl ShapeCache {
    /// Maximum number of memoised fragments.
    pub const CAPACITY: usize = 4096;

    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoised [`is_stats_shape`] result for `fragment`.
    pub fn is_stats_shape(&mut self, fragment: &str) -> bool {
        if let Some(&cached) = self.entries.get(fragment) {
            self.hits += 1;
            return cached;
        }

        self.misses += 1;
        let result = is_stats_shape(fragment);
        if self.entries.len() >= Self::CAPACITY {
            self.entries.clear();
        }
        self.entries.insert(fragment.to_owned(), result);
        result
    }

    /// Number of memoised fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been memoised yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the table.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that ran the shape test.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }
}

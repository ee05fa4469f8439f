//! Transfer readings parsed from rsync's progress fields.

use std::fmt;
use std::str::FromStr;

use crate::error::{StatsFormatError, UnsupportedUnitError};
use crate::shape::{is_byte_count, is_elapsed, strip_summary};

/// One transfer-progress reading reported by rsync.
///
/// Displayed in the format:
/// ```text
///     600,417,190 100%  100.56MB/s    0:00:05
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferStats {
    transferred_bytes: u64,
    percent: u8,
    elapsed: String,
    rate: f64,
    rate_unit: String,
    is_completed: bool,
}

impl TransferStats {
    /// Creates a reading from already-parsed fields.
    #[must_use]
    pub fn new(
        transferred_bytes: u64,
        percent: u8,
        elapsed: impl Into<String>,
        rate: f64,
        rate_unit: impl Into<String>,
        is_completed: bool,
    ) -> Self {
        Self {
            transferred_bytes,
            percent,
            elapsed: elapsed.into(),
            rate,
            rate_unit: rate_unit.into(),
            is_completed,
        }
    }

    /// Bytes of the current file transferred so far.
    #[must_use]
    pub const fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes
    }

    /// Percentage of the current file transferred.
    #[must_use]
    pub const fn percent(&self) -> u8 {
        self.percent
    }

    /// Elapsed (or remaining, for in-progress readings) time as printed.
    #[must_use]
    pub fn elapsed(&self) -> &str {
        &self.elapsed
    }

    /// Numeric part of the transfer rate.
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    /// Unit label of the transfer rate, e.g. `MB/s`.
    #[must_use]
    pub fn rate_unit(&self) -> &str {
        &self.rate_unit
    }

    /// Whether this is the final summary reading for a file.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Transfer rate in bytes per second, rounded half-up.
    ///
    /// # Example
    ///
    /// ```
    /// use progress::TransferStats;
    ///
    /// let stats = TransferStats::new(600_417_190, 100, "0:00:05", 100.56, "MB/s", true);
    /// assert_eq!(stats.rate_bytes_per_second(), Ok(105_444_803));
    ///
    /// let odd = TransferStats::new(1, 1, "0:00:01", 1.0, "XB/s", false);
    /// assert!(odd.rate_bytes_per_second().is_err());
    /// ```
    pub fn rate_bytes_per_second(&self) -> Result<u64, UnsupportedUnitError> {
        let unit: RateUnit = self.rate_unit.parse()?;
        Ok((self.rate * unit.scale() as f64).round() as u64)
    }
}

/// Rate units rsync's progress printer emits.
///
/// rsync scales rates by 1024 and always shows at least `kB/s`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum RateUnit {
    /// `kB/s`, 1024 bytes per second.
    KiloBytes,
    /// `MB/s`, 1024² bytes per second.
    MegaBytes,
    /// `GB/s`, 1024³ bytes per second.
    GigaBytes,
    /// `TB/s`, 1024⁴ bytes per second.
    TeraBytes,
}

impl RateUnit {
    /// The label as printed by rsync.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::KiloBytes => "kB/s",
            Self::MegaBytes => "MB/s",
            Self::GigaBytes => "GB/s",
            Self::TeraBytes => "TB/s",
        }
    }

    /// Bytes per second represented by one unit.
    #[must_use]
    pub const fn scale(self) -> u64 {
        match self {
            Self::KiloBytes => 1 << 10,
            Self::MegaBytes => 1 << 20,
            Self::GigaBytes => 1 << 30,
            Self::TeraBytes => 1 << 40,
        }
    }
}

impl FromStr for RateUnit {
    type Err = UnsupportedUnitError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label {
            "kB/s" => Ok(Self::KiloBytes),
            "MB/s" => Ok(Self::MegaBytes),
            "GB/s" => Ok(Self::GigaBytes),
            "TB/s" => Ok(Self::TeraBytes),
            _ => Err(UnsupportedUnitError {
                unit: label.to_owned(),
            }),
        }
    }
}

impl fmt::Display for RateUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parses a stats line into a [`TransferStats`].
///
/// The line is expected to have passed [`is_stats_shape`](crate::is_stats_shape).
/// For completed lines the trailing `(xfr#.., to-chk=..)` group is dropped
/// first. A failure here means the shape test and the parser disagree.
///
/// # Example
///
/// ```
/// use progress::parse_stats;
///
/// let stats = parse_stats(
///     "    600,417,190 100%  100.56MB/s    0:00:05 (xfr#1, to-chk=0/2)\n",
///     true,
/// )
/// .unwrap();
/// assert_eq!(stats.transferred_bytes(), 600_417_190);
/// assert_eq!(stats.rate_unit(), "MB/s");
/// assert!(stats.is_completed());
/// ```
pub fn parse_stats(fragment: &str, is_completed: bool) -> Result<TransferStats, StatsFormatError> {
    let body = if is_completed {
        strip_summary(fragment)
    } else {
        fragment.trim()
    };

    let fields: Vec<&str> = body.split_whitespace().collect();
    let [bytes, percent, rate, elapsed] = fields.as_slice() else {
        return Err(StatsFormatError::Shape {
            line: body.to_owned(),
        });
    };

    let transferred_bytes = parse_byte_count(bytes)?;
    let percent = parse_percent(percent)?;
    let (rate, rate_unit) = parse_rate(rate)?;
    if !is_elapsed(elapsed) {
        return Err(StatsFormatError::Elapsed {
            token: (*elapsed).to_owned(),
        });
    }

    Ok(TransferStats {
        transferred_bytes,
        percent,
        elapsed: (*elapsed).to_owned(),
        rate,
        rate_unit: rate_unit.to_owned(),
        is_completed,
    })
}

fn parse_byte_count(token: &str) -> Result<u64, StatsFormatError> {
    let invalid = || StatsFormatError::Bytes {
        token: token.to_owned(),
    };

    if !is_byte_count(token) {
        return Err(invalid());
    }

    let mut value = 0u64;
    for byte in token.bytes().filter(u8::is_ascii_digit) {
        value = value
            .checked_mul(10)
            .and_then(|value| value.checked_add(u64::from(byte - b'0')))
            .ok_or_else(invalid)?;
    }
    Ok(value)
}

fn parse_percent(token: &str) -> Result<u8, StatsFormatError> {
    token
        .strip_suffix('%')
        .and_then(|digits| digits.parse::<u8>().ok())
        .filter(|percent| *percent <= 100)
        .ok_or_else(|| StatsFormatError::Percent {
            token: token.to_owned(),
        })
}

/// Splits `100.56MB/s` into `100.56` and `MB/s`.
fn parse_rate(token: &str) -> Result<(f64, &str), StatsFormatError> {
    let invalid = || StatsFormatError::Rate {
        token: token.to_owned(),
    };

    let numeric_end = token
        .find(|ch: char| !(ch.is_ascii_digit() || ch == ',' || ch == '.'))
        .ok_or_else(invalid)?;
    let (number, unit) = token.split_at(numeric_end);

    if unit.chars().any(|ch| ch.is_ascii_digit()) {
        return Err(invalid());
    }

    let (integer, fraction) = number.split_once('.').unwrap_or((number, ""));
    let integer_valid = is_byte_count(integer);
    let fraction_valid = fraction.bytes().all(|byte| byte.is_ascii_digit())
        && (fraction.is_empty() == !number.contains('.'));
    if !integer_valid || !fraction_valid {
        return Err(invalid());
    }

    let mut normalised: String = integer.chars().filter(|ch| *ch != ',').collect();
    if !fraction.is_empty() {
        normalised.push('.');
        normalised.push_str(fraction);
    }
    let value = normalised.parse::<f64>().map_err(|_| invalid())?;

    Ok((value, unit))
}

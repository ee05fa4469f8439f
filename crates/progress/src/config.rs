//! Per-session options.

/// Options controlling what a [`Session`](crate::Session) records.
///
/// # Example
///
/// ```
/// use progress::SessionConfig;
///
/// let config = SessionConfig::default().with_raw_output(true);
/// assert!(config.include_raw_output());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    include_raw_output: bool,
}

impl SessionConfig {
    /// Creates the default configuration: no raw output retained.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            include_raw_output: false,
        }
    }

    /// Whether snapshots carry the full history of raw fragments.
    #[must_use]
    pub const fn include_raw_output(&self) -> bool {
        self.include_raw_output
    }

    /// Enables or disables raw output retention.
    #[must_use]
    pub const fn with_raw_output(mut self, include: bool) -> Self {
        self.include_raw_output = include;
        self
    }

    /// Sets raw output retention in place.
    pub const fn set_raw_output(&mut self, include: bool) {
        self.include_raw_output = include;
    }
}

//! Date ranges and sampling resolutions.

use core::fmt;

use crate::Timestamp;

/// A query window over which a metric series is fetched.
///
/// The resolution is the width, in seconds, of each sub-range the window is
/// split into when fetching. A `DateRange` always satisfies `from < to` and
/// `resolution_seconds > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateRange {
    from: Timestamp,
    to: Timestamp,
    resolution_seconds: u64,
}

/// Why a [`DateRange`] could not be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    /// `from` is not strictly before `to`.
    NotIncreasing,
    /// The resolution was zero.
    ZeroResolution,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::NotIncreasing => write!(f, "range start must be before range end"),
            RangeError::ZeroResolution => write!(f, "resolution must be at least one second"),
        }
    }
}

impl std::error::Error for RangeError {}

impl DateRange {
    /// Create a range sampled every `resolution_seconds`.
    pub fn new(
        from: Timestamp,
        to: Timestamp,
        resolution_seconds: u64,
    ) -> Result<Self, RangeError> {
        if from >= to {
            return Err(RangeError::NotIncreasing);
        }
        if resolution_seconds == 0 {
            return Err(RangeError::ZeroResolution);
        }
        Ok(Self {
            from,
            to,
            resolution_seconds,
        })
    }

    /// Create a range whose resolution covers the whole window, so it is
    /// fetched with a single request.
    pub fn unbatched(from: Timestamp, to: Timestamp) -> Result<Self, RangeError> {
        if from >= to {
            return Err(RangeError::NotIncreasing);
        }
        let seconds = (to - from).num_milliseconds().unsigned_abs().div_ceil(1000);
        Self::new(from, to, seconds.max(1))
    }

    pub fn from(&self) -> Timestamp {
        self.from
    }

    pub fn to(&self) -> Timestamp {
        self.to
    }

    pub fn resolution_seconds(&self) -> u64 {
        self.resolution_seconds
    }

    /// Width of the window in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        (self.to - self.from).num_milliseconds()
    }
}

/// Resolution presets offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// One sample per 90 days.
    Weeks,
    /// One sample per 7 days.
    Days,
    /// One sample per day.
    #[default]
    Hours,
    /// One sample per 10 minutes.
    Minutes,
}

impl Resolution {
    /// All presets, coarsest first.
    pub const ALL: [Resolution; 4] = [
        Resolution::Weeks,
        Resolution::Days,
        Resolution::Hours,
        Resolution::Minutes,
    ];

    /// Width of one sample in seconds.
    pub const fn seconds(&self) -> u64 {
        match self {
            Resolution::Weeks => 60 * 60 * 24 * 90,
            Resolution::Days => 60 * 60 * 24 * 7,
            Resolution::Hours => 60 * 60 * 24,
            Resolution::Minutes => 60 * 10,
        }
    }

    /// Returns the display label for this preset.
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Weeks => "Weeks",
            Resolution::Days => "Days",
            Resolution::Hours => "Hours",
            Resolution::Minutes => "Minutes",
        }
    }

    /// Find the preset with the given width, if any.
    pub fn from_seconds(seconds: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.seconds() == seconds)
    }

    /// Cycle to the next (finer) preset.
    pub fn next(self) -> Self {
        match self {
            Resolution::Weeks => Resolution::Days,
            Resolution::Days => Resolution::Hours,
            Resolution::Hours => Resolution::Minutes,
            Resolution::Minutes => Resolution::Weeks,
        }
    }

    /// Cycle to the previous (coarser) preset.
    pub fn prev(self) -> Self {
        match self {
            Resolution::Weeks => Resolution::Minutes,
            Resolution::Days => Resolution::Weeks,
            Resolution::Hours => Resolution::Days,
            Resolution::Minutes => Resolution::Hours,
        }
    }
}

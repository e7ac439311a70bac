//! The configured save interval as whole minutes and seconds.
//!
//! [`SaveInterval`] is the single value the whole crate revolves around:
//! operators set it, the store persists it, and the scheduler sleeps on it.
//! The seconds component is always normalized to `0..60` — constructors fold
//! overflow into minutes, so `0:125` and `2:05` are the same value.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::SaveTickError;

/// A non-negative save interval, normalized so `seconds < 60`.
///
/// An interval of exactly `0:00` is legal and means automatic saves are
/// disabled; the scheduler parks instead of spinning on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaveInterval {
    minutes: u64,
    seconds: u64,
}

impl SaveInterval {
    /// Fallback interval used when no valid value is stored: ten minutes.
    pub const DEFAULT: Self = Self {
        minutes: 10,
        seconds: 0,
    };

    /// Build an interval from minutes and seconds, folding seconds overflow
    /// into minutes (`new(0, 125)` == `new(2, 5)`).
    #[must_use]
    pub fn new(minutes: u64, seconds: u64) -> Self {
        Self {
            minutes: minutes.saturating_add(seconds / 60),
            seconds: seconds % 60,
        }
    }

    /// Build an interval from a total number of seconds.
    #[must_use]
    pub fn from_secs(total_seconds: u64) -> Self {
        Self::new(0, total_seconds)
    }

    /// Whole-minutes component.
    #[must_use]
    pub const fn minutes(&self) -> u64 {
        self.minutes
    }

    /// Seconds component, always in `0..60`.
    #[must_use]
    pub const fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Total length in seconds.
    #[must_use]
    pub const fn total_secs(&self) -> u64 {
        self.minutes * 60 + self.seconds
    }

    /// The interval as a [`Duration`] for sleeping.
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        Duration::from_secs(self.total_secs())
    }

    /// `true` for the `0:00` interval (automatic saves disabled).
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.minutes == 0 && self.seconds == 0
    }
}

impl Default for SaveInterval {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Canonical form: `M:SS` with the seconds zero-padded, e.g. `2:05`.
impl fmt::Display for SaveInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minutes, self.seconds)
    }
}

/// Parse the operator/stored forms: `"S"` (seconds only) or `"M:S"`.
///
/// Components must be non-negative integers; seconds ≥ 60 are normalized by
/// carrying whole minutes out of the seconds field.
impl FromStr for SaveInterval {
    type Err = SaveTickError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim().split(':').collect();
        match fields.as_slice() {
            [seconds] => {
                let seconds = parse_component(seconds)?;
                Ok(Self::from_secs(seconds))
            }
            [minutes, seconds] => {
                let minutes = parse_component(minutes)?;
                let seconds = parse_component(seconds)?;
                Ok(Self::new(minutes, seconds))
            }
            _ => Err(SaveTickError::Interval(format!(
                "expected 'S' or 'M:S', got '{s}'"
            ))),
        }
    }
}

fn parse_component(field: &str) -> Result<u64, SaveTickError> {
    field
        .parse::<u64>()
        .map_err(|_| SaveTickError::Interval(format!("'{field}' is not a non-negative integer")))
}

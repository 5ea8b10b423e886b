//! Defines the [`Ymd`] date triple that addresses a day bucket, and the
//! [`Clock`] that supplies "today".

use std::fmt;
use std::path::{Path, PathBuf};

/// The format for every date the index stores.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A `YYYY-MM-DD` date split into its three labels. The labels are kept
/// exactly as written: `2020-5-1` yields labels `"2020"`, `"5"` and `"1"`,
/// which are distinct from `"05"` and `"01"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ymd {
    pub year: String,
    pub month: String,
    pub day: String,
}

impl Ymd {
    /// Builds a [`Ymd`] from already-split labels.
    pub fn new(year: &str, month: &str, day: &str) -> Ymd {
        Ymd {
            year: year.to_owned(),
            month: month.to_owned(),
            day: day.to_owned(),
        }
    }

    /// The directory for this date under `prefix`, i.e.
    /// `{prefix}/{year}/{month}/{day}`.
    pub fn dir(&self, prefix: &Path) -> PathBuf {
        prefix.join(&self.year).join(&self.month).join(&self.day)
    }
}

impl std::str::FromStr for Ymd {
    type Err = Error;

    /// Splits on `-`. There must be exactly three non-empty parts; the parts
    /// themselves are not checked for being numbers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split('-').collect::<Vec<&str>>().as_slice() {
            [year, month, day]
                if !year.is_empty() && !month.is_empty() && !day.is_empty() =>
            {
                Ok(Ymd::new(year, month, day))
            }
            _ => Err(Error::Malformed(s.to_owned())),
        }
    }
}

impl fmt::Display for Ymd {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}-{}", self.year, self.month, self.day)
    }
}

/// Supplies today's date as `YYYY-MM-DD`.
pub trait Clock {
    fn today(&self) -> String;
}

/// The local system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> String {
        chrono::Local::now().format(DATE_FORMAT).to_string()
    }
}

/// A clock that is stuck on one day. Used to make filings reproducible.
#[derive(Clone, Debug)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn today(&self) -> String {
        self.0.clone()
    }
}

/// Checks that `s` is a real calendar date in `YYYY-MM-DD` form. The index
/// itself accepts any three-part date; this is for callers that want to
/// refuse typos before filing.
pub fn validate(s: &str) -> std::result::Result<(), chrono::ParseError> {
    chrono::NaiveDate::parse_from_str(s, DATE_FORMAT).map(|_| ())
}

/// Represents an unusable date string.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// Returned when a date doesn't split into exactly three `-`-separated
    /// parts.
    Malformed(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Malformed(s) => {
                write!(f, "malformed date `{}`, expected YYYY-MM-DD", s)
            }
        }
    }
}

impl std::error::Error for Error {}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a wall-clock string does not match `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid time format: '{input}' (expected HH:MM)")]
pub struct TimeParseError {
    pub input: String,
}

/// Wall-clock time of day, stored as minutes since midnight.
///
/// Timetable slots are recurring weekly occupancies, so only the wall-clock
/// component matters; dates never enter the comparison. The canonical wire
/// form is the zero-padded `HH:MM` string.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Create from raw minutes since midnight. Values are clamped to one day.
    pub fn from_minutes(minutes: u16) -> Self {
        Self(minutes.min(24 * 60))
    }

    /// Parse a `HH:MM` wall-clock string.
    ///
    /// The pattern is strict: two colon-separated numeric fields with hour in
    /// 0–23 and minute in 0–59. Anything else fails with [`TimeParseError`].
    pub fn parse(input: &str) -> Result<Self, TimeParseError> {
        let err = || TimeParseError {
            input: input.to_string(),
        };

        let (hh, mm) = input.split_once(':').ok_or_else(err)?;
        if hh.len() != 2 || mm.len() != 2 {
            return Err(err());
        }

        let hour: u16 = hh.parse().map_err(|_| err())?;
        let minute: u16 = mm.parse().map_err(|_| err())?;
        if hour > 23 || minute > 59 {
            return Err(err());
        }

        Ok(Self(hour * 60 + minute))
    }

    /// Minutes since midnight.
    pub fn minutes(&self) -> u16 {
        self.0
    }

    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    pub fn minute(&self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Half-open interval overlap test over minute offsets.
///
/// Touching endpoints (`a_end == b_start`) are NOT an overlap: a slot ending
/// at 10:00 and one starting at 10:00 may share a room.
pub fn overlaps(a_start: TimeOfDay, a_end: TimeOfDay, b_start: TimeOfDay, b_end: TimeOfDay) -> bool {
    a_start < b_end && b_start < a_end
}

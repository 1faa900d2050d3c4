//! Service-day time handling.
//!
//! Timetables express arrival times as seconds since the start of the
//! service day. Overnight trips run past hour 24 ("25:10:00"), so this is
//! deliberately not a wall-clock time of day. The label store needs an
//! "unreached" value that compares greater than every real time; that is
//! the explicit [`Time::NEVER`] sentinel rather than a fake far-future
//! timestamp.

use std::fmt;
use std::ops::{Add, Sub};

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Seconds since the start of the service day.
///
/// # Examples
///
/// ```
/// use transfer_patterns::network::Time;
///
/// let depart = Time::parse("08:30:00").unwrap();
/// let arrive = Time::parse("25:10:00").unwrap(); // overnight trip
/// assert!(depart < arrive);
/// assert!(arrive < Time::NEVER);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Time(u32);

impl Time {
    /// Sentinel for "not reached": later than every real time.
    pub const NEVER: Time = Time(u32::MAX);

    /// Create a time from raw seconds since the start of the service day.
    pub fn from_seconds(seconds: u32) -> Self {
        Time(seconds)
    }

    /// Parse a time from "HH:MM:SS" format.
    ///
    /// Hours may exceed 23 for trips that run past midnight.
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let mut parts = s.split(':');
        let hour = parse_field(parts.next(), "missing hours")?;
        let minute = parse_field(parts.next(), "missing minutes")?;
        let second = parse_field(parts.next(), "missing seconds")?;
        if parts.next().is_some() {
            return Err(TimeError::new("expected HH:MM:SS format"));
        }
        Self::from_hms(hour, minute, second)
    }

    /// Create a time from hour/minute/second components.
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Result<Self, TimeError> {
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        if second > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }
        if hour > 99 {
            return Err(TimeError::new("hour must be 0-99"));
        }
        Ok(Time(hour * 3600 + minute * 60 + second))
    }

    /// Raw seconds since the start of the service day.
    pub fn seconds(self) -> u32 {
        self.0
    }

    /// Returns true for the "not reached" sentinel.
    pub fn is_never(self) -> bool {
        self == Time::NEVER
    }
}

fn parse_field(part: Option<&str>, missing: &'static str) -> Result<u32, TimeError> {
    let part = part.ok_or(TimeError::new(missing))?;
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeError::new("expected decimal digits"));
    }
    part.parse()
        .map_err(|_| TimeError::new("component out of range"))
}

impl Add<Duration> for Time {
    type Output = Time;

    /// Adds a walk duration. `NEVER` is absorbing; the result saturates
    /// below `NEVER`.
    fn add(self, rhs: Duration) -> Time {
        if self.is_never() {
            return Time::NEVER;
        }
        let seconds = i64::from(self.0) + rhs.num_seconds();
        Time(seconds.clamp(0, i64::from(u32::MAX - 1)) as u32)
    }
}

impl Sub<Duration> for Time {
    type Output = Time;

    /// Subtracts a walk duration, saturating at the start of the day.
    fn sub(self, rhs: Duration) -> Time {
        if self.is_never() {
            return Time::NEVER;
        }
        let seconds = i64::from(self.0) - rhs.num_seconds();
        Time(seconds.clamp(0, i64::from(u32::MAX - 1)) as u32)
    }
}

impl fmt::Debug for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Time({self})")
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_never() {
            return f.write_str("never");
        }
        let h = self.0 / 3600;
        let m = (self.0 / 60) % 60;
        let s = self.0 % 60;
        write!(f, "{h:02}:{m:02}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let t = Time::parse("08:30:05").unwrap();
        assert_eq!(t.seconds(), 8 * 3600 + 30 * 60 + 5);
        assert_eq!(t.to_string(), "08:30:05");
    }

    #[test]
    fn parse_overnight_hours() {
        let t = Time::parse("25:10:00").unwrap();
        assert_eq!(t.to_string(), "25:10:00");
        assert!(t > Time::parse("23:59:59").unwrap());
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(Time::parse("0830").is_err());
        assert!(Time::parse("08:30").is_err());
        assert!(Time::parse("08:61:00").is_err());
        assert!(Time::parse("08:30:60").is_err());
        assert!(Time::parse("08:30:00:00").is_err());
        assert!(Time::parse("ab:cd:ef").is_err());
    }

    #[test]
    fn never_is_maximal() {
        assert!(Time::parse("99:59:59").unwrap() < Time::NEVER);
        assert!(Time::NEVER.is_never());
        assert_eq!(Time::NEVER.to_string(), "never");
    }

    #[test]
    fn duration_arithmetic() {
        let t = Time::parse("08:00:00").unwrap();
        assert_eq!((t + Duration::seconds(90)).to_string(), "08:01:30");
        assert_eq!((t - Duration::seconds(3600)).to_string(), "07:00:00");
        // Saturates rather than wrapping.
        assert_eq!(
            (Time::from_seconds(10) - Duration::seconds(60)).seconds(),
            0
        );
        assert_eq!(Time::NEVER + Duration::seconds(1), Time::NEVER);
    }
}

use std::{fmt, str::FromStr, sync::Mutex};

use chrono::Local;
use lazy_static::lazy_static;
use regex::Regex;

use crate::Error;

lazy_static! {
    static ref DATE_RE: Regex =
        Regex::new(r"^[0-9]{4}-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01])$").unwrap();
    static ref TIMESTAMP_RE: Regex = Regex::new(
        r"^[0-9]{4}-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01]) ([01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]$"
    )
    .unwrap();
}

/// A calendar date in `YYYY-MM-DD` form.
///
/// Ordering is plain string ordering, which is only meaningful because the
/// format is fixed width and zero padded.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(String);

impl Date {
    pub fn today() -> Self {
        Self(Local::now().format("%Y-%m-%d").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Date {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if DATE_RE.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(Error::InvalidDate(s.to_string()))
        }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A local wall-clock instant in `YYYY-MM-DD HH:MM:SS` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn now() -> Self {
        Self(Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn date(&self) -> Date {
        Date(self.0[..10].to_string())
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if TIMESTAMP_RE.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(Error::InvalidDate(s.to_string()))
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stay or search window. `start` is strictly before `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSpan {
    pub start: Date,
    pub end: Date,
}

impl DateSpan {
    pub fn new(start: Date, end: Date) -> Result<Self, Error> {
        if start >= end {
            return Err(Error::InvalidTimespan);
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, Error> {
        Self::new(start.parse()?, end.parse()?)
    }
}

impl fmt::Display for DateSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// Source of "now" for everything date-sensitive (reservations, sweeps,
/// check-in, audit events).
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    fn today(&self) -> Date {
        self.now().date()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn today(&self) -> Date {
        Date::today()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock(Mutex<Timestamp>);

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self(Mutex::new(now))
    }

    /// Midnight of the given date.
    pub fn on(date: &str) -> Result<Self, Error> {
        Ok(Self::new(format!("{} 00:00:00", date.trim()).parse()?))
    }

    pub fn set(&self, now: Timestamp) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_should_follow_fixed_format() {
        assert!("2025-06-01".parse::<Date>().is_ok());
        assert!("2025-12-31".parse::<Date>().is_ok());
        assert_eq!(
            "2025-6-1".parse::<Date>().unwrap_err(),
            Error::InvalidDate("2025-6-1".into())
        );
        assert!("2025-13-01".parse::<Date>().is_err());
        assert!("2025-01-32".parse::<Date>().is_err());
        assert!("01-01-2025".parse::<Date>().is_err());
    }

    #[test]
    fn date_ordering_is_lexicographic() {
        let a: Date = "2025-01-09".parse().unwrap();
        let b: Date = "2025-01-10".parse().unwrap();
        assert!(a < b);
        assert_eq!(a.as_str().cmp(b.as_str()), a.cmp(&b));
    }

    #[test]
    fn date_span_requires_strict_order() {
        assert!(DateSpan::parse("2025-06-01", "2025-06-02").is_ok());
        assert_eq!(
            DateSpan::parse("2025-06-02", "2025-06-02").unwrap_err(),
            Error::InvalidTimespan
        );
        assert_eq!(
            DateSpan::parse("2025-06-03", "2025-06-02").unwrap_err(),
            Error::InvalidTimespan
        );
    }

    #[test]
    fn timestamp_should_expose_its_date() {
        let ts: Timestamp = "2025-01-10 09:30:00".parse().unwrap();
        assert_eq!(ts.date().as_str(), "2025-01-10");
        assert!("2025-01-10 24:00:00".parse::<Timestamp>().is_err());
    }

    #[test]
    fn fixed_clock_should_move_only_when_set() {
        let clock = FixedClock::on("2025-01-10").unwrap();
        assert_eq!(clock.today().as_str(), "2025-01-10");
        clock.set("2025-01-11 08:00:00".parse().unwrap());
        assert_eq!(clock.today().as_str(), "2025-01-11");
        assert_eq!(clock.now().as_str(), "2025-01-11 08:00:00");
    }

    #[test]
    fn system_clock_today_should_parse() {
        let today = SystemClock.today();
        assert!(today.as_str().parse::<Date>().is_ok());
    }
}

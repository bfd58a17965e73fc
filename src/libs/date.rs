//! Dates that compare against each other and against human phrases.
//!
//! A [`ComparableDate`] holds either a calendar date or a date-time. When a
//! date meets a date-time, the date-time is tied down to its date before
//! comparing, so `2026-03-14` equals `2026-03-14, Sat, 09:30`. Comparing with
//! a raw string parses the string first, which is what lets a filter such as
//! `t.due_date < "next friday"` work.

use crate::libs::error::Result;
use crate::libs::human::{self, DateValue};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, Copy)]
pub struct ComparableDate {
    value: DateValue,
}

impl ComparableDate {
    /// Resolves a phrase (`today`, `next wednesday`, `2026-03-14, Sat`).
    pub fn parse(phrase: &str) -> Result<Self> {
        Ok(Self {
            value: human::parse_date(phrase)?,
        })
    }

    /// Resolves a phrase relative to a fixed instant.
    pub fn parse_at(phrase: &str, now: NaiveDateTime) -> Result<Self> {
        Ok(Self {
            value: human::parse_date_at(phrase, now)?,
        })
    }

    pub fn today() -> Self {
        Self {
            value: DateValue::Date(chrono::Local::now().date_naive()),
        }
    }

    pub fn value(&self) -> DateValue {
        self.value
    }

    pub fn date(&self) -> NaiveDate {
        self.value.date()
    }

    pub fn time(&self) -> Option<NaiveTime> {
        self.value.time()
    }

    pub fn has_time(&self) -> bool {
        self.time().is_some()
    }

    /// The instant this value stands for; dates start at midnight.
    pub fn to_datetime(&self) -> NaiveDateTime {
        match self.value {
            DateValue::Date(d) => d.and_time(NaiveTime::MIN),
            DateValue::DateTime(dt) => dt,
        }
    }

    /// Compares with a phrase, or returns `None` if the phrase is not a date.
    pub fn compare_str(&self, other: &str) -> Option<Ordering> {
        ComparableDate::parse(other).ok().and_then(|o| self.partial_cmp(&o))
    }
}

impl From<NaiveDate> for ComparableDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            value: DateValue::Date(date),
        }
    }
}

impl From<NaiveDateTime> for ComparableDate {
    fn from(datetime: NaiveDateTime) -> Self {
        Self {
            value: DateValue::DateTime(human::truncate(datetime)),
        }
    }
}

impl FromStr for ComparableDate {
    type Err = crate::libs::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        ComparableDate::parse(s)
    }
}

impl fmt::Display for ComparableDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use chrono::{Datelike, Timelike};

        let d = self.date();
        let weekday = WEEKDAYS[d.weekday().num_days_from_monday() as usize];
        write!(f, "{}-{:02}-{:02}, {}", d.year(), d.month(), d.day(), weekday)?;
        if let Some(t) = self.time() {
            write!(f, ", {:02}:{:02}", t.hour(), t.minute())?;
        }
        Ok(())
    }
}

/// Not an `Ord`: a date equals every date-time on that day, while those
/// date-times differ from each other. Sort by [`ComparableDate::to_datetime`].
impl PartialOrd for ComparableDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(match (self.value, other.value) {
            (DateValue::DateTime(a), DateValue::DateTime(b)) => a.cmp(&b),
            (a, b) => a.date().cmp(&b.date()),
        })
    }
}

impl PartialEq for ComparableDate {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialEq<str> for ComparableDate {
    fn eq(&self, other: &str) -> bool {
        self.compare_str(other) == Some(Ordering::Equal)
    }
}

impl PartialEq<&str> for ComparableDate {
    fn eq(&self, other: &&str) -> bool {
        self.compare_str(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd<str> for ComparableDate {
    fn partial_cmp(&self, other: &str) -> Option<Ordering> {
        self.compare_str(other)
    }
}

impl PartialOrd<&str> for ComparableDate {
    fn partial_cmp(&self, other: &&str) -> Option<Ordering> {
        self.compare_str(other)
    }
}

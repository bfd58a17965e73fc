//! Recurrence rules for calendar projections.
//!
//! Tasks describe repetition in a `recurring` attribute using the iCalendar
//! RRULE convention (`FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE`), or one of the
//! shorthands `daily`, `weekly`, `monthly` and `yearly`. Only parsing and
//! rendering live here; expanding a rule into occurrences is left to the
//! calendar consumer.

use crate::libs::date::ComparableDate;
use crate::libs::error::{Error, Result};
use chrono::Weekday;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    fn as_str(&self) -> &'static str {
        match self {
            Frequency::Minutely => "MINUTELY",
            Frequency::Hourly => "HOURLY",
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        let freq = match s.to_uppercase().as_str() {
            "MINUTELY" => Frequency::Minutely,
            "HOURLY" => Frequency::Hourly,
            "DAILY" => Frequency::Daily,
            "WEEKLY" => Frequency::Weekly,
            "MONTHLY" => Frequency::Monthly,
            "YEARLY" => Frequency::Yearly,
            _ => return None,
        };
        Some(freq)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceRule {
    pub freq: Frequency,
    pub interval: u32,
    pub count: Option<u32>,
    pub until: Option<ComparableDate>,
    pub by_day: Vec<Weekday>,
}

impl RecurrenceRule {
    pub fn new(freq: Frequency) -> Self {
        Self {
            freq,
            interval: 1,
            count: None,
            until: None,
            by_day: Vec::new(),
        }
    }

    pub fn with_until(mut self, until: ComparableDate) -> Self {
        self.until = Some(until);
        self
    }

    pub fn parse(text: &str) -> Result<Self> {
        let source = text.trim();
        let fail = |reason: &str| Error::RecurrenceParse {
            rule: source.to_string(),
            reason: reason.to_string(),
        };

        if let Some(freq) = Frequency::parse(&shorthand(source)) {
            return Ok(RecurrenceRule::new(freq));
        }

        let body = source
            .strip_prefix("RRULE:")
            .or_else(|| source.strip_prefix("rrule:"))
            .unwrap_or(source);

        let mut freq = None;
        let mut rule = RecurrenceRule::new(Frequency::Daily);
        for part in body.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| fail("expected KEY=VALUE pairs"))?;
            match key.trim().to_uppercase().as_str() {
                "FREQ" => freq = Some(Frequency::parse(value.trim()).ok_or_else(|| fail("unknown FREQ"))?),
                "INTERVAL" => {
                    rule.interval = value.trim().parse().map_err(|_| fail("INTERVAL must be a positive number"))?;
                    if rule.interval == 0 {
                        return Err(fail("INTERVAL must be a positive number"));
                    }
                }
                "COUNT" => rule.count = Some(value.trim().parse().map_err(|_| fail("COUNT must be a number"))?),
                "UNTIL" => rule.until = Some(parse_until(value.trim()).ok_or_else(|| fail("UNTIL is not a date"))?),
                "BYDAY" => {
                    rule.by_day = value
                        .split(',')
                        .map(|d| parse_day(d.trim()).ok_or_else(|| fail("BYDAY holds an unknown day")))
                        .collect::<Result<_>>()?;
                }
                _ => return Err(fail("unsupported rule part")),
            }
        }

        rule.freq = freq.ok_or_else(|| fail("FREQ is required"))?;
        Ok(rule)
    }
}

fn shorthand(s: &str) -> String {
    match s.to_lowercase().as_str() {
        "daily" | "every day" => "DAILY".to_string(),
        "weekly" | "every week" => "WEEKLY".to_string(),
        "monthly" | "every month" => "MONTHLY".to_string(),
        "yearly" | "annually" | "every year" => "YEARLY".to_string(),
        "hourly" | "every hour" => "HOURLY".to_string(),
        _ => String::new(),
    }
}

fn parse_until(value: &str) -> Option<ComparableDate> {
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(value.trim_end_matches('Z'), "%Y%m%dT%H%M%S") {
        return Some(dt.into());
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(value, "%Y%m%d") {
        return Some(d.into());
    }
    ComparableDate::parse(value).ok()
}

fn parse_day(code: &str) -> Option<Weekday> {
    let day = match code.to_uppercase().as_str() {
        "MO" => Weekday::Mon,
        "TU" => Weekday::Tue,
        "WE" => Weekday::Wed,
        "TH" => Weekday::Thu,
        "FR" => Weekday::Fri,
        "SA" => Weekday::Sat,
        "SU" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

fn day_code(day: &Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

impl FromStr for RecurrenceRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RecurrenceRule::parse(s)
    }
}

/// Renders the rule in RRULE form, e.g. `FREQ=WEEKLY;INTERVAL=2;BYDAY=MO`.
impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FREQ={}", self.freq.as_str())?;
        if self.interval != 1 {
            write!(f, ";INTERVAL={}", self.interval)?;
        }
        if let Some(count) = self.count {
            write!(f, ";COUNT={}", count)?;
        }
        if let Some(until) = &self.until {
            match until.time() {
                Some(_) => write!(f, ";UNTIL={}", until.to_datetime().format("%Y%m%dT%H%M%S"))?,
                None => write!(f, ";UNTIL={}", until.date().format("%Y%m%d"))?,
            }
        }
        if !self.by_day.is_empty() {
            let days: Vec<&str> = self.by_day.iter().map(day_code).collect();
            write!(f, ";BYDAY={}", days.join(","))?;
        }
        Ok(())
    }
}

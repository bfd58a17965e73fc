//! Human-readable date and duration parsing.
//!
//! Task attributes carry dates typed by people: `today`, `next wednesday`,
//! `in 3 days`, `friday 4pm`, or a plain `2026-03-14`. This module resolves
//! those phrases against a reference instant. Durations such as `4h 30m`
//! are parsed here too.
//!
//! Date-times are always truncated to the minute so a value rendered with
//! `HH:MM` parses back to an equal value.

use crate::libs::error::{Error, Result};
use chrono::{Datelike, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

/// A resolved date, with or without a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateValue {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl DateValue {
    pub fn date(&self) -> NaiveDate {
        match self {
            DateValue::Date(d) => *d,
            DateValue::DateTime(dt) => dt.date(),
        }
    }

    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            DateValue::Date(_) => None,
            DateValue::DateTime(dt) => Some(dt.time()),
        }
    }
}

/// Parses a date phrase relative to the local clock.
pub fn parse_date(phrase: &str) -> Result<DateValue> {
    parse_date_at(phrase, Local::now().naive_local())
}

/// Parses a date phrase relative to `now`.
pub fn parse_date_at(phrase: &str, now: NaiveDateTime) -> Result<DateValue> {
    let input = phrase.trim().to_lowercase();
    let fail = || Error::DateParse(phrase.trim().to_string());
    if input.is_empty() {
        return Err(fail());
    }

    let now = truncate(now);
    if let Some(value) = parse_machine(&input) {
        return Ok(value);
    }

    let mut tokens: Vec<&str> = input.split_whitespace().collect();
    let time = take_time(&mut tokens);
    if time.is_some() && tokens.last() == Some(&"at") {
        tokens.pop();
    }

    let base = if tokens.is_empty() {
        time.map(|_| DateValue::Date(now.date()))
    } else {
        parse_phrase(&tokens, now)
    };

    match (base.ok_or_else(fail)?, time) {
        (base, Some(t)) => Ok(DateValue::DateTime(base.date().and_time(t))),
        (base, None) => Ok(base),
    }
}

pub(crate) fn truncate(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_second(0).and_then(|d| d.with_nanosecond(0)).unwrap_or(dt)
}

/// Machine formats, including the canonical `YYYY-MM-DD, Ddd[, HH:MM]`.
fn parse_machine(input: &str) -> Option<DateValue> {
    if !input.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let mut parts = input.split(',').map(str::trim);
    let head = parts.next()?;
    if let Ok(date) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
        let mut time = None;
        for part in parts {
            if parse_weekday(part).is_some() {
                continue;
            }
            time = Some(parse_clock(part)?);
        }
        return Some(match time {
            Some(t) => DateValue::DateTime(date.and_time(t)),
            None => DateValue::Date(date),
        });
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dt%H:%M:%S", "%Y-%m-%dt%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(DateValue::DateTime(truncate(dt)));
        }
    }

    NaiveDate::parse_from_str(input, "%m/%d/%Y").ok().map(DateValue::Date)
}

/// Pops a trailing time of day (`4pm`, `4 pm`, `16:30`) off the tokens.
fn take_time(tokens: &mut Vec<&str>) -> Option<NaiveTime> {
    let last = *tokens.last()?;
    if (last == "am" || last == "pm") && tokens.len() >= 2 {
        let joined = format!("{}{}", tokens[tokens.len() - 2], last);
        let time = parse_clock(&joined)?;
        tokens.truncate(tokens.len() - 2);
        return Some(time);
    }

    let time = parse_clock(last)?;
    tokens.pop();
    Some(time)
}

fn parse_clock(token: &str) -> Option<NaiveTime> {
    let (body, pm) = match (token.strip_suffix("am"), token.strip_suffix("pm")) {
        (Some(b), _) => (b, Some(false)),
        (_, Some(b)) => (b, Some(true)),
        _ => (token, None),
    };

    let (hour, minute) = match body.split_once(':') {
        Some((h, m)) if m.len() == 2 => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?),
        Some(_) => return None,
        None if pm.is_some() => (body.parse::<u32>().ok()?, 0),
        None => return None,
    };

    let hour = match pm {
        Some(is_pm) if (1..=12).contains(&hour) => hour % 12 + if is_pm { 12 } else { 0 },
        Some(_) => return None,
        None => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn parse_phrase(tokens: &[&str], now: NaiveDateTime) -> Option<DateValue> {
    let today = now.date();
    match tokens {
        ["now"] => Some(DateValue::DateTime(now)),
        ["today"] => Some(DateValue::Date(today)),
        ["tomorrow"] => shift_days(today, 1),
        ["yesterday"] => shift_days(today, -1),
        [day] | ["this", day] => {
            let target = parse_weekday(day)?;
            shift_days(today, days_until(today, target, false))
        }
        ["next", word] => match parse_weekday(word) {
            Some(target) => shift_days(today, days_until(today, target, true)),
            None => offset(now, 1, word),
        },
        ["last", word] => match parse_weekday(word) {
            Some(target) => {
                let back = (today.weekday().num_days_from_monday() as i64 - target.num_days_from_monday() as i64)
                    .rem_euclid(7);
                let back = if back == 0 { 7 } else { back };
                shift_days(today, -back)
            }
            None => offset(now, -1, word),
        },
        ["in", count, unit] => offset(now, parse_count(count)?, unit),
        [count, unit, "ago"] => offset(now, parse_count(count)?.checked_neg()?, unit),
        [count, unit] | [count, unit, "from", "now"] => offset(now, parse_count(count)?, unit),
        _ => None,
    }
}

fn days_until(today: NaiveDate, target: Weekday, strictly_after: bool) -> i64 {
    let ahead = (target.num_days_from_monday() as i64 - today.weekday().num_days_from_monday() as i64).rem_euclid(7);
    if ahead == 0 && strictly_after {
        7
    } else {
        ahead
    }
}

fn parse_count(token: &str) -> Option<i64> {
    match token {
        "a" | "an" | "one" => Some(1),
        _ => token.parse().ok(),
    }
}

fn offset(now: NaiveDateTime, count: i64, unit: &str) -> Option<DateValue> {
    let today = now.date();
    let unit = unit.strip_suffix('s').unwrap_or(unit);
    match unit {
        "minute" | "min" => now.checked_add_signed(Duration::try_minutes(count)?).map(DateValue::DateTime),
        "hour" | "hr" => now.checked_add_signed(Duration::try_hours(count)?).map(DateValue::DateTime),
        "day" => shift_days(today, count),
        "week" => today.checked_add_signed(Duration::try_weeks(count)?).map(DateValue::Date),
        "month" => shift_months(today, count).map(DateValue::Date),
        "year" => shift_months(today, count.checked_mul(12)?).map(DateValue::Date),
        _ => None,
    }
}

fn shift_days(date: NaiveDate, days: i64) -> Option<DateValue> {
    date.checked_add_signed(Duration::try_days(days)?).map(DateValue::Date)
}

fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}

fn parse_weekday(token: &str) -> Option<Weekday> {
    let weekday = match token.to_lowercase().as_str() {
        "mon" | "monday" => Weekday::Mon,
        "tue" | "tues" | "tuesday" => Weekday::Tue,
        "wed" | "wednesday" => Weekday::Wed,
        "thu" | "thur" | "thurs" | "thursday" => Weekday::Thu,
        "fri" | "friday" => Weekday::Fri,
        "sat" | "saturday" => Weekday::Sat,
        "sun" | "sunday" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

/// Parses durations like `4h 30m`, `1h30m`, `2 days` or `90 minutes`.
pub fn parse_duration(phrase: &str) -> Result<Duration> {
    let fail = || Error::DurationParse(phrase.trim().to_string());
    let input = phrase.trim().to_lowercase();
    let mut chars = input.chars().peekable();
    let mut total = Duration::zero();
    let mut components = 0;

    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace() || *c == ',') {
            chars.next();
        }
        let Some(&next) = chars.peek() else { break };

        if next.is_alphabetic() {
            let word: String = std::iter::from_fn(|| chars.next_if(|c| c.is_alphabetic())).collect();
            if word == "and" {
                continue;
            }
            return Err(fail());
        }

        let digits: String = std::iter::from_fn(|| chars.next_if(|c| c.is_ascii_digit())).collect();
        let amount: i64 = digits.parse().map_err(|_| fail())?;
        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }
        let unit: String = std::iter::from_fn(|| chars.next_if(|c| c.is_alphabetic())).collect();

        let part = match unit.as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Duration::try_seconds(amount),
            "m" | "min" | "mins" | "minute" | "minutes" => Duration::try_minutes(amount),
            "h" | "hr" | "hrs" | "hour" | "hours" => Duration::try_hours(amount),
            "d" | "day" | "days" => Duration::try_days(amount),
            "w" | "wk" | "wks" | "week" | "weeks" => Duration::try_weeks(amount),
            _ => return Err(fail()),
        };
        total = part.and_then(|part| total.checked_add(&part)).ok_or_else(fail)?;
        components += 1;
    }

    if components == 0 {
        return Err(fail());
    }
    Ok(total)
}

/// Renders a duration as `1d 4h 30m`.
pub fn format_duration(duration: &Duration) -> String {
    let total = duration.num_seconds().max(0);
    let parts: Vec<String> = [(total / 86_400, "d"), (total % 86_400 / 3600, "h"), (total % 3600 / 60, "m"), (total % 60, "s")]
        .iter()
        .filter(|(amount, _)| *amount > 0)
        .map(|(amount, unit)| format!("{}{}", amount, unit))
        .collect();

    if parts.is_empty() {
        "0m".to_string()
    } else {
        parts.join(" ")
    }
}

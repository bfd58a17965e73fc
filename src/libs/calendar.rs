//! Calendar projection of tasks.
//!
//! Any task with a `due_date` or an `event_begin` can be seen as a calendar
//! event. The record below carries the iCalendar fields a consumer needs to
//! place the event, including its recurrence rule.

use crate::libs::date::ComparableDate;
use crate::libs::human::format_duration;
use crate::libs::recurrence::RecurrenceRule;
use chrono::{Duration, NaiveDateTime};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub dtstamp: NaiveDateTime,
    pub dtstart: ComparableDate,
    pub dtend: Option<ComparableDate>,
    pub duration: Option<Duration>,
    pub rrule: Option<RecurrenceRule>,
}

impl CalendarEvent {
    /// True when the event starts at midnight or carries no time at all.
    pub fn is_all_day(&self) -> bool {
        self.dtstart.time().map_or(true, |t| t == chrono::NaiveTime::MIN)
    }

    /// Where the event ends: `dtend`, else start plus duration.
    pub fn end(&self) -> Option<NaiveDateTime> {
        match (&self.dtend, self.duration) {
            (Some(end), _) => Some(end.to_datetime()),
            (None, Some(duration)) => self.dtstart.to_datetime().checked_add_signed(duration),
            (None, None) => None,
        }
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.dtstart, self.summary)?;
        if let Some(duration) = &self.duration {
            write!(f, " for {}", format_duration(duration))?;
        } else if let Some(end) = &self.dtend {
            write!(f, " until {}", end)?;
        }
        if let Some(rule) = &self.rrule {
            write!(f, " ({})", rule)?;
        }
        Ok(())
    }
}

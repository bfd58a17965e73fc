//! Tasks and their structured-text form.
//!
//! On disk a task is a small document: a title framed by `=` rules, a free
//! text description, and a trailing block of `key: value` attributes.
//!
//! ```text
//! ==================
//!  DEMO_1: My title
//! ==================
//!
//! A longer description.
//!
//! creation_date: 2026-10-18, Sun
//! creator: alice
//! id: DEMO_1
//! project: demo
//! stage: todo
//! tags: backend, urgent
//! ```
//!
//! Parsing reads the attribute block from the end of the document upwards
//! until it meets a blank line, so descriptions may contain anything,
//! including lines that look like attributes, as long as a blank line
//! separates them from the block.

use crate::libs::attributes::{is_identifier, AttributeLookup, AttributeMap, AttributeValue};
use crate::libs::calendar::CalendarEvent;
use crate::libs::date::ComparableDate;
use crate::libs::error::{Error, Result};
use crate::libs::human::parse_duration;
use crate::libs::recurrence::RecurrenceRule;
use chrono::Local;

/// Attributes every corrected task carries.
pub const MANDATORY_ATTRIBUTES: [&str; 6] = ["creation_date", "creator", "id", "project", "stage", "tags"];

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub title: String,
    pub description: String,
    pub attributes: AttributeMap,
}

impl Task {
    pub fn new(title: &str, description: &str, attributes: AttributeMap) -> Self {
        Task {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            attributes,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attributes.get_text("id").filter(|id| !id.is_empty())
    }

    /// The title without its `ID:` prefix.
    pub fn bare_title(&self) -> &str {
        self.id()
            .and_then(|id| self.title.strip_prefix(id))
            .and_then(|rest| rest.strip_prefix(':'))
            .map_or(self.title.as_str(), str::trim)
    }

    pub fn get(&self, key: &str) -> AttributeLookup<'_> {
        self.attributes.get(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<AttributeValue>) -> Result<()> {
        self.attributes.set(key, value)
    }

    /// Replaces title, description and attributes with those of `other`.
    pub fn update(&mut self, other: Task) {
        self.title = other.title;
        self.description = other.description;
        self.attributes = other.attributes;
    }

    /// Fails when a key is not an identifier or a mandatory attribute is missing.
    pub fn check(&self) -> Result<()> {
        let mut problems: Vec<String> = self
            .attributes
            .keys()
            .filter(|k| !is_identifier(k))
            .map(|k| format!("\"{}\" is not a valid identifier", k))
            .collect();

        for key in MANDATORY_ATTRIBUTES {
            let present = match key {
                "stage" | "tags" => self.attributes.contains_key(key),
                _ => self.attributes.has_value(key),
            };
            if !present {
                problems.push(format!("{} is missing", key));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidAttributes(problems))
        }
    }

    pub fn from_structured_text(source: &str) -> Result<Self> {
        let lines: Vec<&str> = source.trim().lines().collect();
        if lines.is_empty() {
            return Err(Error::MalformedDocument("the document is empty".to_string()));
        }

        let mut split = lines.len();
        while split > 0 && !lines[split - 1].trim().is_empty() {
            split -= 1;
        }
        if split == 0 {
            return Err(Error::MalformedDocument(
                "no blank line separates the title and description from the attributes".to_string(),
            ));
        }
        let attributes = AttributeMap::from_text(&lines[split..].join("\n"))?;

        let is_rule = |line: &str| {
            let line = line.trim();
            !line.is_empty() && line.chars().all(|c| c == '=')
        };
        let (title, description) = match &lines[..split - 1] {
            [open, title, close, description @ ..] if is_rule(*open) && is_rule(*close) => (title.trim(), description),
            _ => return Err(Error::MalformedDocument("the title border is missing".to_string())),
        };
        if title.is_empty() {
            return Err(Error::MalformedDocument("the title is empty".to_string()));
        }

        Ok(Task::new(title, &description.join("\n"), attributes))
    }

    pub fn to_structured_text(&self) -> String {
        let rule = "=".repeat(self.title.chars().count() + 2);
        let mut lines = vec![rule.clone(), format!(" {}", self.title), rule, String::new()];

        if !self.description.is_empty() {
            lines.push(self.description.clone());
            lines.push(String::new());
        }

        // BTreeMap iteration is already in key order
        for (key, value) in &self.attributes {
            lines.push(format!("{}: {}", key, value).trim_end().to_string());
        }

        lines.push(String::new());
        lines.join("\n")
    }

    /// Projects the task onto a calendar, if it has a start.
    ///
    /// The start is `event_begin`, falling back to `due_date`. Tasks with
    /// neither produce `None`.
    pub fn as_calendar_event(&self, uid: &str) -> Result<Option<CalendarEvent>> {
        let dtstart = match self.date_attribute("event_begin")? {
            Some(start) => start,
            None => match self.date_attribute("due_date")? {
                Some(due) => due,
                None => return Ok(None),
            },
        };

        let duration_text = self.attributes.get_text("duration").filter(|d| !d.trim().is_empty());
        let duration = duration_text.map(parse_duration).transpose()?;

        let dtend = match (self.date_attribute("event_end")?, duration) {
            (Some(end), _) => Some(end),
            (None, Some(d)) => {
                let end = dtstart
                    .to_datetime()
                    .checked_add_signed(d)
                    .ok_or_else(|| Error::DurationParse(duration_text.unwrap_or_default().trim().to_string()))?;
                Some(ComparableDate::from(end))
            }
            (None, None) => None,
        };

        let rrule = match self.attributes.get_text("recurring").filter(|r| !r.trim().is_empty()) {
            Some(text) => {
                let rule = RecurrenceRule::parse(text)?;
                match self.date_attribute("recurring_stop")? {
                    Some(stop) => Some(rule.with_until(stop)),
                    None => Some(rule),
                }
            }
            None => None,
        };

        Ok(Some(CalendarEvent {
            uid: uid.to_string(),
            summary: self.title.clone(),
            description: self.description.clone(),
            dtstamp: Local::now().naive_local(),
            dtstart,
            dtend,
            duration,
            rrule,
        }))
    }

    fn date_attribute(&self, key: &str) -> Result<Option<ComparableDate>> {
        match self.attributes.get_value(key) {
            Some(AttributeValue::Date(d)) => Ok(Some(*d)),
            Some(AttributeValue::Text(s)) if !s.trim().is_empty() => ComparableDate::parse(s).map(Some),
            _ => Ok(None),
        }
    }
}

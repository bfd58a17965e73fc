//! Typed task attributes.
//!
//! An [`AttributeMap`] is the metadata block of a task: an ordered map of
//! identifier keys to values. Keys containing `date` hold a
//! [`ComparableDate`] once set to anything non-empty, and `tags` holds a set
//! of strings.
//!
//! Reading a key that does not exist yields [`AttributeLookup::Incomparable`].
//! The sentinel answers `false` to every comparison, `!=` included, so a
//! filter can test attributes that only some tasks carry.
//!
//! ```rust
//! use master::libs::attributes::AttributeMap;
//!
//! let mut attrs = AttributeMap::new();
//! attrs.set("stage", "todo")?;
//! assert!(attrs.get("stage") == "todo");
//! assert!(!(attrs.get("assignee") == "bob"));
//! assert!(!(attrs.get("assignee") != "bob"));
//! # Ok::<(), master::libs::error::Error>(())
//! ```

use crate::libs::date::ComparableDate;
use crate::libs::error::{Error, Result};
use std::cmp::Ordering;
use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Date(ComparableDate),
    Tags(BTreeSet<String>),
}

impl AttributeValue {
    pub fn is_empty(&self) -> bool {
        match self {
            AttributeValue::Text(s) => s.trim().is_empty(),
            AttributeValue::Date(_) => false,
            AttributeValue::Tags(tags) => tags.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&ComparableDate> {
        match self {
            AttributeValue::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_tags(&self) -> Option<&BTreeSet<String>> {
        match self {
            AttributeValue::Tags(tags) => Some(tags),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => write!(f, "{}", s),
            AttributeValue::Date(d) => write!(f, "{}", d),
            AttributeValue::Tags(tags) => write!(f, "{}", tags.iter().cloned().collect::<Vec<_>>().join(", ")),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<&String> for AttributeValue {
    fn from(s: &String) -> Self {
        AttributeValue::Text(s.clone())
    }
}

impl From<ComparableDate> for AttributeValue {
    fn from(d: ComparableDate) -> Self {
        AttributeValue::Date(d)
    }
}

impl From<BTreeSet<String>> for AttributeValue {
    fn from(tags: BTreeSet<String>) -> Self {
        AttributeValue::Tags(tags)
    }
}

/// Splits a tag list on commas, colons and whitespace.
pub fn parse_tags(value: &str) -> BTreeSet<String> {
    value
        .split(|c: char| c == ',' || c == ':' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// True for bare identifiers: ASCII letters, digits and `_`, no leading digit.
pub fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap {
    values: BTreeMap<String, AttributeValue>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value, turning non-empty text under a `date` key into a date.
    pub fn set(&mut self, key: &str, value: impl Into<AttributeValue>) -> Result<()> {
        if !is_identifier(key) {
            return Err(Error::InvalidKey(key.to_string()));
        }

        let value = match value.into() {
            AttributeValue::Text(s) if key.contains("date") && !s.trim().is_empty() => {
                AttributeValue::Date(ComparableDate::parse(&s)?)
            }
            other => other,
        };
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> AttributeLookup<'_> {
        match self.values.get(key) {
            Some(value) => AttributeLookup::Present(value),
            None => AttributeLookup::Incomparable,
        }
    }

    pub fn get_value(&self, key: &str) -> Option<&AttributeValue> {
        self.values.get(key)
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(AttributeValue::as_text)
    }

    pub fn get_date(&self, key: &str) -> Option<&ComparableDate> {
        self.values.get(key).and_then(AttributeValue::as_date)
    }

    pub fn get_tags(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.values.get(key).and_then(AttributeValue::as_tags)
    }

    /// The rendered value, or `default` when absent.
    pub fn get_or_default(&self, key: &str, default: &str) -> String {
        self.values.get(key).map(|v| v.to_string()).unwrap_or_else(|| default.to_string())
    }

    /// True when the key holds something other than an empty value.
    pub fn has_value(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(|v| !v.is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        self.values.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, AttributeValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copies every entry of `other` over this map.
    pub fn overlay(&mut self, other: &AttributeMap) {
        for (key, value) in other.iter() {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Plain strings for serialization, dates in canonical form.
    pub fn to_persistable(&self) -> BTreeMap<String, String> {
        self.values.iter().map(|(k, v)| (k.clone(), v.to_string())).collect()
    }

    /// Parses `key: value` lines. Values may contain colons.
    pub fn from_text(source: &str) -> Result<Self> {
        let mut attributes = AttributeMap::new();
        for line in source.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (key, value) = line
                .split_once(':')
                .ok_or_else(|| Error::MalformedDocument(format!("attribute line \"{}\" has no colon", line)))?;
            let (key, value) = (key.trim(), value.trim());

            if key == "tags" {
                attributes.set(key, parse_tags(value))?;
            } else {
                attributes.set(key, value)?;
            }
        }
        Ok(attributes)
    }
}

impl<'a> IntoIterator for &'a AttributeMap {
    type Item = (&'a String, &'a AttributeValue);
    type IntoIter = btree_map::Iter<'a, String, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }

    /// The operator to use when the operands swap sides.
    pub fn flip(self) -> Self {
        match self {
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Ge => CompareOp::Le,
            other => other,
        }
    }
}

/// Result of reading an attribute: the value, or the incomparable sentinel.
#[derive(Debug, Clone, Copy)]
pub enum AttributeLookup<'a> {
    Present(&'a AttributeValue),
    Incomparable,
}

impl<'a> AttributeLookup<'a> {
    pub fn is_incomparable(&self) -> bool {
        matches!(self, AttributeLookup::Incomparable)
    }

    pub fn value(&self) -> Option<&'a AttributeValue> {
        match *self {
            AttributeLookup::Present(value) => Some(value),
            AttributeLookup::Incomparable => None,
        }
    }

    fn ordering(&self, literal: &str) -> Option<Ordering> {
        match self.value()? {
            AttributeValue::Date(d) => d.compare_str(literal),
            AttributeValue::Text(s) => match (s.trim().parse::<f64>(), literal.trim().parse::<f64>()) {
                (Ok(a), Ok(b)) => a.partial_cmp(&b),
                _ => Some(s.as_str().cmp(literal)),
            },
            AttributeValue::Tags(tags) => (*tags == parse_tags(literal)).then_some(Ordering::Equal),
        }
    }

    /// Applies `op` with the attribute on the left and `literal` on the right.
    pub fn compare(&self, op: CompareOp, literal: &str) -> bool {
        match (self.value(), op) {
            (None, _) => false,
            (Some(AttributeValue::Tags(tags)), CompareOp::Ne) => *tags != parse_tags(literal),
            _ => self.ordering(literal).is_some_and(|o| op.holds(o)),
        }
    }

    /// Tag membership, or substring for text. Dates contain nothing.
    pub fn contains(&self, needle: &str) -> bool {
        match self.value() {
            Some(AttributeValue::Tags(tags)) => tags.contains(&needle.to_lowercase()),
            Some(AttributeValue::Text(s)) => s.contains(needle),
            _ => false,
        }
    }

    pub fn is_truthy(&self) -> bool {
        self.value().is_some_and(|v| !v.is_empty())
    }
}

impl PartialEq<&str> for AttributeLookup<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.compare(CompareOp::Eq, other)
    }

    #[allow(clippy::partialeq_ne_impl)]
    fn ne(&self, other: &&str) -> bool {
        self.compare(CompareOp::Ne, other)
    }
}

impl PartialOrd<&str> for AttributeLookup<'_> {
    fn partial_cmp(&self, other: &&str) -> Option<Ordering> {
        self.ordering(other)
    }
}

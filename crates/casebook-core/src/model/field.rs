// ── Generic field values ──
//
// The list pipeline never sees concrete record types. It reads fields by
// name through `Record::field`, which hands back one of these.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scalar or list view of one record field.
///
/// Deserialization is untagged: RFC 3339 strings become `Date`, other
/// strings `Text`, arrays `List`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Date(DateTime<Utc>),
    Text(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|d| d.with_timezone(&Utc)),
            _ => None,
        }
    }

    /// Filter equality.
    ///
    /// Same-variant values compare structurally. Text against a typed value
    /// parses the text as that type, so `Text("007")` matches `Integer(7)`
    /// and an offset timestamp matches the same instant in UTC. Other mixed
    /// variants compare by their rendered text. A list field matches when
    /// any element does.
    pub fn loosely_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::List(items), _) => items.iter().any(|v| v.loosely_eq(other)),
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Text(literal), typed) | (typed, Self::Text(literal)) => {
                typed.matches_literal(literal)
            }
            _ => self.to_string() == other.to_string(),
        }
    }

    fn matches_literal(&self, literal: &str) -> bool {
        match self {
            Self::Bool(b) => literal.parse::<bool>().is_ok_and(|l| l == *b),
            Self::Integer(n) => literal.parse::<i64>().is_ok_and(|l| l == *n),
            Self::Date(d) => DateTime::parse_from_rfc3339(literal).is_ok_and(|l| l == *d),
            Self::Text(s) => s == literal,
            Self::List(items) => items.iter().any(|v| v.matches_literal(literal)),
        }
    }

    /// Case-insensitive substring test. `needle` must already be lowercase.
    pub fn contains_text(&self, needle: &str) -> bool {
        match self {
            Self::Text(s) => s.to_lowercase().contains(needle),
            Self::List(items) => items.iter().any(|v| v.contains_text(needle)),
            other => other.to_string().to_lowercase().contains(needle),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Date(d) => write!(f, "{}", d.to_rfc3339()),
            Self::Text(s) => write!(f, "{s}"),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(d: DateTime<Utc>) -> Self {
        Self::Date(d)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

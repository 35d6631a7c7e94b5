//! Daily mood records: one [`Record`] per calendar date.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Comment stored on records the user has not filled in yet.
pub const DEFAULT_COMMENT: &str = "No mood recorded for today yet";

/// Wire format for record dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The closed vocabulary of moods a day can be tagged with.
///
/// Deserializing an unrecognised name yields [`Mood::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Mood {
    Happy,
    Sad,
    Neutral,
    Angry,
    Excited,
    Anxious,
    Calm,
    Bored,
    Busy,
    Tired,
    #[default]
    Unknown,
}

impl Mood {
    /// The moods a user can pick; `Unknown` is only ever a default.
    pub const ALL: [Mood; 10] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Neutral,
        Mood::Angry,
        Mood::Excited,
        Mood::Anxious,
        Mood::Calm,
        Mood::Bored,
        Mood::Busy,
        Mood::Tired,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Happy => "Happy",
            Self::Sad => "Sad",
            Self::Neutral => "Neutral",
            Self::Angry => "Angry",
            Self::Excited => "Excited",
            Self::Anxious => "Anxious",
            Self::Calm => "Calm",
            Self::Bored => "Bored",
            Self::Busy => "Busy",
            Self::Tired => "Tired",
            Self::Unknown => "Unknown",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Happy => "😊",
            Self::Sad => "😢",
            Self::Neutral => "😐",
            Self::Angry => "😠",
            Self::Excited => "🥳",
            Self::Anxious => "😰",
            Self::Calm => "😌",
            Self::Bored => "🥱",
            Self::Busy => "💼",
            Self::Tired => "😴",
            Self::Unknown => "❓",
        }
    }

    /// Exact, case-sensitive lookup; anything else is `Unknown`.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == name)
            .unwrap_or(Self::Unknown)
    }
}

impl From<String> for Mood {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One calendar day's mood and note-creation count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Mood")]
    pub mood: Mood,
    #[serde(rename = "CardCount")]
    pub card_count: u32,
    #[serde(rename = "Comment")]
    pub comment: String,
}

impl Record {
    pub fn new(date: NaiveDate, mood: Mood, card_count: u32, comment: impl Into<String>) -> Self {
        Self {
            date,
            mood,
            card_count,
            comment: comment.into(),
        }
    }

    /// The zero-count, unknown-mood entry a day starts with.
    pub fn placeholder(date: NaiveDate) -> Self {
        Self::new(date, Mood::Unknown, 0, DEFAULT_COMMENT)
    }

    pub fn to_json(&self) -> crate::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Reads one element of the record file.
    ///
    /// Returns `None` if the element has no readable `Date`; other fields fall
    /// back to the placeholder values.
    pub fn from_json(value: &Value) -> Option<Self> {
        let date = row_date(value)?;
        let mood = value
            .get("Mood")
            .and_then(Value::as_str)
            .map(Mood::from_name)
            .unwrap_or_default();
        let comment = value
            .get("Comment")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_COMMENT)
            .to_string();
        Some(Self {
            date,
            mood,
            card_count: card_count_field(value.get("CardCount")),
            comment,
        })
    }
}

/// A day of a calendar month together with its record, if one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub record: Option<Record>,
}

impl CalendarDay {
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// Notes created that day; zero when there is no record.
    pub fn card_count(&self) -> u32 {
        self.record.as_ref().map_or(0, |r| r.card_count)
    }

    pub fn mood(&self) -> Mood {
        self.record.as_ref().map_or(Mood::Unknown, |r| r.mood)
    }
}

/// The `Date` of a raw record row.
pub(crate) fn row_date(row: &Value) -> Option<NaiveDate> {
    let raw = row.get("Date").and_then(Value::as_str)?.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| crate::core::note::parse_timestamp(raw).map(|ts| ts.date()))
}

/// Reads a `CardCount` field, zero when missing or not a count.
pub(crate) fn card_count_field(field: Option<&Value>) -> u32 {
    field
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

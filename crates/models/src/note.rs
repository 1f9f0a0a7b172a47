use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use crate::id::deserialize_optional_id;

/// When a note was written, as the backend reports it (`YYYY-MM-DD`, `HH:MM:SS`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, TS)]
pub struct NoteTimestamp {
    pub date: String,
    pub time: String,
}

impl NoteTimestamp {
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
        }
    }

    /// Parse into a naive date-time. A missing or unreadable time falls back to midnight.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()?;
        let time = parse_time(self.time.trim()).unwrap_or(NaiveTime::MIN);
        Some(date.and_time(time))
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

impl fmt::Display for NoteTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}

// Legacy rows store the timestamp as a single "date time" string.
impl<'de> Deserialize<'de> for NoteTimestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Split { date: String, time: String },
            Joined(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Split { date, time } => Self { date, time },
            Repr::Joined(raw) => {
                let raw = raw.trim();
                match raw.split_once(|c| c == ' ' || c == 'T') {
                    Some((date, time)) => Self::new(date, time),
                    None => Self::new(raw, ""),
                }
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct Note {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: String,
    pub timestamp: NoteTimestamp,
    #[serde(default)]
    pub submitter: String,
    #[serde(alias = "note", alias = "text")]
    pub message: String,
}

/// Body for `POST /{exhibits|parts}/{id}/notes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct NewNote {
    pub submitter: String,
    pub message: String,
}

impl NewNote {
    pub fn new(submitter: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            submitter: submitter.into(),
            message: message.into(),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoteOwnerKind {
    Exhibit,
    Part,
}

/// The record a note hangs off. Exhibit and part notes share one code path keyed on this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
pub struct NoteOwner {
    pub kind: NoteOwnerKind,
    pub id: String,
}

impl NoteOwner {
    pub fn exhibit(id: impl Into<String>) -> Self {
        Self {
            kind: NoteOwnerKind::Exhibit,
            id: id.into(),
        }
    }

    pub fn part(id: impl Into<String>) -> Self {
        Self {
            kind: NoteOwnerKind::Part,
            id: id.into(),
        }
    }

    /// REST collection segment for the owner (`exhibits` or `parts`).
    pub fn collection(&self) -> &'static str {
        match self.kind {
            NoteOwnerKind::Exhibit => "exhibits",
            NoteOwnerKind::Part => "parts",
        }
    }

    pub fn notes_path(&self) -> String {
        format!("/{}/{}/notes", self.collection(), self.id)
    }

    pub fn note_path(&self, note_id: &str) -> String {
        format!("{}/{}", self.notes_path(), note_id)
    }
}

impl fmt::Display for NoteOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_accepts_legacy_keys() {
        let note: Note = serde_json::from_str(
            r#"{"id": 7, "timestamp": "2024-03-01 09:15:00", "note": "belt slipping"}"#,
        )
        .unwrap();
        assert_eq!(note.id, "7");
        assert_eq!(note.message, "belt slipping");
        assert_eq!(note.timestamp, NoteTimestamp::new("2024-03-01", "09:15:00"));
        assert_eq!(note.submitter, "");
    }

    #[test]
    fn test_timestamp_parses_short_time() {
        let ts = NoteTimestamp::new("2024-03-01", "09:15");
        let parsed = ts.to_datetime().unwrap();
        assert_eq!(parsed.to_string(), "2024-03-01 09:15:00");
        assert!(NoteTimestamp::new("yesterday", "noon").to_datetime().is_none());
    }

    #[test]
    fn test_owner_paths() {
        let owner = NoteOwner::part("42");
        assert_eq!(owner.notes_path(), "/parts/42/notes");
        assert_eq!(owner.note_path("n1"), "/parts/42/notes/n1");
        assert_eq!(NoteOwner::exhibit("E1").collection(), "exhibits");
    }
}

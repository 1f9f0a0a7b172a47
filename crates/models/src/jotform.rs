use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum_macros::EnumString;
use ts_rs::TS;

use crate::id::deserialize_id;

/// Triage state of a submitted form.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, EnumString, SerializeDisplay, DeserializeFromStr,
)]
#[strum(ascii_case_insensitive)]
pub enum JotformStatus {
    #[default]
    #[strum(to_string = "Open")]
    Open,
    #[strum(to_string = "InProgress", serialize = "in progress", serialize = "in_progress")]
    InProgress,
    #[strum(to_string = "Closed")]
    Closed,
    #[strum(to_string = "Unplanned")]
    Unplanned,
    #[strum(default)]
    Other(String),
}

impl JotformStatus {
    pub const KNOWN: [JotformStatus; 4] = [
        JotformStatus::Open,
        JotformStatus::InProgress,
        JotformStatus::Closed,
        JotformStatus::Unplanned,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "InProgress",
            Self::Closed => "Closed",
            Self::Unplanned => "Unplanned",
            Self::Other(raw) => raw,
        }
    }

    /// Display bucket used when ordering the triage table: in-progress work first,
    /// then open and closed forms, then unplanned ones, then anything unknown.
    pub fn status_group(&self) -> u8 {
        match self {
            Self::InProgress => 0,
            Self::Open | Self::Closed => 1,
            Self::Unplanned => 2,
            Self::Other(_) => 3,
        }
    }
}

impl fmt::Display for JotformStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, SerializeDisplay, DeserializeFromStr)]
#[strum(ascii_case_insensitive)]
pub enum Priority {
    #[strum(to_string = "High")]
    High,
    #[strum(to_string = "Medium")]
    Medium,
    #[strum(to_string = "Low")]
    Low,
    #[strum(to_string = "N/A")]
    NotApplicable,
    #[strum(default)]
    Other(String),
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::NotApplicable => "N/A",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, SerializeDisplay, DeserializeFromStr)]
#[strum(ascii_case_insensitive)]
pub enum Department {
    #[strum(to_string = "Operations")]
    Operations,
    #[strum(to_string = "Exhibits")]
    Exhibits,
    #[strum(to_string = "N/A")]
    NotApplicable,
    #[strum(default)]
    Other(String),
}

impl Department {
    pub const KNOWN: [Department; 3] = [
        Department::Operations,
        Department::Exhibits,
        Department::NotApplicable,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Operations => "Operations",
            Self::Exhibits => "Exhibits",
            Self::NotApplicable => "N/A",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct SubmitterName {
    pub first: String,
    pub last: String,
}

impl SubmitterName {
    pub fn full(&self) -> String {
        format!("{} {}", self.first.trim(), self.last.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct SubmissionDate {
    pub date: String,
    pub time: String,
}

impl SubmissionDate {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }

    /// `HH:MM[:SS]` rendered on a 12-hour clock (`14:05:00` -> `2:05 PM`).
    pub fn time_12h(&self) -> Option<String> {
        let mut parts = self.time.trim().split(':');
        let hour: u32 = parts.next()?.parse().ok()?;
        let minutes = parts.next()?;
        let suffix = if hour >= 12 { "PM" } else { "AM" };
        let hour12 = match hour % 12 {
            0 => 12,
            h => h,
        };
        Some(format!("{hour12}:{minutes} {suffix}"))
    }
}

/// An externally submitted issue report. `exhibit_name` is free text, not a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct Jotform {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub submitter_name: SubmitterName,
    pub created_at: SubmissionDate,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub exhibit_name: String,
    #[serde(default)]
    pub description: String,
    #[ts(type = "string")]
    pub priority_level: Priority,
    #[ts(type = "string")]
    pub department: Department,
    #[serde(default)]
    #[ts(type = "string")]
    pub status: JotformStatus,
}

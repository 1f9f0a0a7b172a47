use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum_macros::EnumString;
use ts_rs::TS;

use crate::{
    id::{deserialize_id, deserialize_ids},
    note::Note,
};

/// Operational state of an exhibit.
///
/// Backends and older clients disagree on capitalization ("Needs Repair",
/// "needs repair", "needs_repair"), so parsing is case-insensitive and
/// anything unrecognised is kept verbatim in `Other`.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, EnumString, SerializeDisplay, DeserializeFromStr,
)]
#[strum(ascii_case_insensitive)]
pub enum ExhibitStatus {
    #[default]
    #[strum(to_string = "Operational")]
    Operational,
    #[strum(
        to_string = "Needs Repair",
        serialize = "needs_repair",
        serialize = "needsrepair",
        serialize = "needs-repair"
    )]
    NeedsRepair,
    #[strum(
        to_string = "Out of Service",
        serialize = "out_of_service",
        serialize = "outofservice",
        serialize = "out-of-service"
    )]
    OutOfService,
    #[strum(default)]
    Other(String),
}

impl ExhibitStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Operational => "Operational",
            Self::NeedsRepair => "Needs Repair",
            Self::OutOfService => "Out of Service",
            Self::Other(raw) => raw,
        }
    }

    pub const KNOWN: [ExhibitStatus; 3] = [
        ExhibitStatus::Operational,
        ExhibitStatus::NeedsRepair,
        ExhibitStatus::OutOfService,
    ];
}

impl fmt::Display for ExhibitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Sponsorship {
    pub sponsor_name: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct Exhibit {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    pub cluster: String,
    pub location: String,
    #[serde(default)]
    #[ts(type = "string")]
    pub status: ExhibitStatus,
    #[serde(default, deserialize_with = "deserialize_ids")]
    pub part_ids: Vec<String>, // Ordered references into the parts collection
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsorship: Option<Sponsorship>,
}

impl Exhibit {
    pub fn has_part(&self, part_id: &str) -> bool {
        self.part_ids.iter().any(|id| id == part_id)
    }
}

/// Body for `POST /exhibits`. New exhibits always start with no parts and no notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct NewExhibit {
    pub name: String,
    pub cluster: String,
    pub location: String,
    #[ts(type = "string")]
    pub status: ExhibitStatus,
    pub part_ids: Vec<String>,
    pub notes: Vec<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsorship: Option<Sponsorship>,
}

impl NewExhibit {
    pub fn new(
        name: impl Into<String>,
        cluster: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cluster: cluster.into(),
            location: location.into(),
            status: ExhibitStatus::Operational,
            part_ids: Vec::new(),
            notes: Vec::new(),
            image_url: None,
            sponsorship: None,
        }
    }
}

/// Body for `PUT /exhibits/{id}`. Only fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct UpdateExhibit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl UpdateExhibit {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.cluster.is_none()
            && self.location.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
    }
}

/// Body for `POST /exhibits/{id}/add_part`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct AddPartRequest {
    pub part_id: String,
}

/// Body for the `POST .../status` endpoints of exhibits and jotforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange<S> {
    pub new_status: S,
}

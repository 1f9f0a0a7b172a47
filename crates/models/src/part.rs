use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{
    id::{deserialize_id, deserialize_ids},
    note::Note,
};

/// A component that may be shared by several exhibits.
///
/// `exhibit_ids` mirrors `Exhibit::part_ids`; the backend does not guarantee
/// the two sides agree, so callers reconcile them explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct Part {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, deserialize_with = "deserialize_ids")]
    pub exhibit_ids: Vec<String>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Part {
    pub fn belongs_to(&self, exhibit_id: &str) -> bool {
        self.exhibit_ids.iter().any(|id| id == exhibit_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct NewPart {
    pub name: String,
    pub link: String,
    #[serde(default)]
    pub exhibit_ids: Vec<String>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl NewPart {
    pub fn new(name: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
            exhibit_ids: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn for_exhibits(mut self, exhibit_ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exhibit_ids = exhibit_ids.into_iter().map(Into::into).collect();
        self
    }
}

/// Body for `PUT /parts/{id}`; the backend expects `exhibitIds` in camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct UpdatePart {
    pub name: String,
    pub link: String,
    #[serde(rename = "exhibitIds")]
    pub exhibit_ids: Vec<String>,
}

impl From<&Part> for UpdatePart {
    fn from(part: &Part) -> Self {
        Self {
            name: part.name.clone(),
            link: part.link.clone(),
            exhibit_ids: part.exhibit_ids.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_part_wire_name() {
        let update = UpdatePart {
            name: "Servo".into(),
            link: "https://example.com/servo".into(),
            exhibit_ids: vec!["E1".into()],
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["exhibitIds"], serde_json::json!(["E1"]));
        assert!(json.get("exhibit_ids").is_none());
    }

    #[test]
    fn test_new_part_for_exhibits() {
        let part = NewPart::new("Servo", "").for_exhibits(["E1", "E2"]);
        assert_eq!(part.exhibit_ids, vec!["E1", "E2"]);
        assert!(part.notes.is_empty());
    }
}

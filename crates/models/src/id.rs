//! Id (de)serialization helpers.
//!
//! Older backends emit integer row ids, newer ones emit strings. Both are
//! normalized to `String` on the client.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Str(String),
    Int(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Str(s) => s,
            RawId::Int(n) => n.to_string(),
        }
    }
}

pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from).unwrap_or_default())
}

pub fn deserialize_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<RawId>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(String::from)
        .collect())
}

/// Id returned by a create endpoint: a bare id, or the created record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedId(pub String);

impl<'de> Deserialize<'de> for CreatedId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Created {
            Bare(RawId),
            Record { id: RawId },
        }

        Ok(match Created::deserialize(deserializer)? {
            Created::Bare(raw) | Created::Record { id: raw } => CreatedId(raw.into()),
        })
    }
}

impl From<CreatedId> for String {
    fn from(id: CreatedId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_id_shapes() {
        let bare: CreatedId = serde_json::from_str("42").unwrap();
        assert_eq!(bare.0, "42");
        let text: CreatedId = serde_json::from_str(r#""P7""#).unwrap();
        assert_eq!(text.0, "P7");
        let record: CreatedId = serde_json::from_str(r#"{"id": 3, "name": "Gear"}"#).unwrap();
        assert_eq!(record.0, "3");
    }
}

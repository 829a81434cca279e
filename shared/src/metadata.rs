//! Game metadata (`replay.gamemetadata.json`)
//!
//! Added to replays around game version 3.7, so sessions keep it optional.
//! Only the document has to be a JSON object: a field of an unexpected type
//! reads as its default, and the full object stays available as [`Metadata::raw`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Calculated and confirmed game results
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Metadata {
    #[serde(deserialize_with = "lenient")]
    pub title: String,
    #[serde(deserialize_with = "lenient")]
    pub game_version: String,
    #[serde(deserialize_with = "lenient")]
    pub data_build: String,
    #[serde(deserialize_with = "lenient")]
    pub data_version: String,
    #[serde(deserialize_with = "lenient")]
    pub base_build: String,
    /// Game length in seconds
    #[serde(deserialize_with = "lenient")]
    pub duration: f64,
    #[serde(deserialize_with = "lenient")]
    pub is_not_available: bool,
    #[serde(deserialize_with = "lenient")]
    pub players: Vec<MetadataPlayer>,
    /// The whole metadata object
    #[serde(skip)]
    pub raw: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MetadataPlayer {
    #[serde(rename = "PlayerID", deserialize_with = "lenient")]
    pub player_id: i64,
    #[serde(rename = "APM", deserialize_with = "lenient")]
    pub apm: f64,
    #[serde(deserialize_with = "lenient")]
    pub result: String,
    #[serde(deserialize_with = "lenient")]
    pub selected_race: String,
    #[serde(deserialize_with = "lenient")]
    pub assigned_race: String,
}

impl Metadata {
    pub fn from_json(data: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: Map<String, Value> = serde_json::from_slice(data)?;
        let mut meta = Self::deserialize(Value::Object(raw.clone()))?;
        meta.raw = raw;
        Ok(meta)
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

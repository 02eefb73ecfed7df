use serde::{Deserialize, Serialize};

/// Video metadata as the resolution service sends it.
///
/// The same shape is embedded in saved playlists, so field names follow the
/// service (`_id`, `thumb`, `duration` as `HH:MM:SS`). `author` and
/// `description` are missing from records saved by older versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub url: String,
    pub audio: String,
    #[serde(default)]
    pub thumb: String,
    pub title: String,
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(
        default,
        alias = "shortDescription",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
}

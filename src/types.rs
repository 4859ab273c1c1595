use serde::{Deserialize, Serialize};

/// One entry from the race catalog document. The catalog carries more
/// fields than we need; unknown ones are ignored on deserialization.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Race {
    #[serde(default)]
    pub(crate) date: Option<String>,
    #[serde(default)]
    pub(crate) name: Option<String>,
    /// Distance in miles. Stored as a bare number in some catalog entries
    /// and as a string in others, so it stays untyped until render time.
    #[serde(default)]
    pub(crate) distance: Option<serde_json::Value>,
    #[serde(default)]
    pub(crate) time: Option<String>,
    #[serde(default)]
    pub(crate) video: Option<String>,
    #[serde(default)]
    pub(crate) report: Option<String>,
    #[serde(default)]
    pub(crate) strava: Option<String>,
}

/// Top-level shape of `races-data.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct RaceCatalog {
    pub(crate) races: Vec<Race>,
}

/// One stored embed, keyed in the store file by its activity id. The id is
/// kept inside the record as well so the file is self-describing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct EmbedRecord {
    pub(crate) embed_url: String,
    pub(crate) activity_id: String,
}

/// Body of POST /save. Absent fields deserialize to empty strings and are
/// rejected by the same presence check as explicit empties.
#[derive(Debug, Deserialize)]
pub(crate) struct SaveRequest {
    #[serde(default)]
    pub(crate) activity_id: String,
    #[serde(default)]
    pub(crate) embed_url: String,
}

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::EmbedRecord;

pub(crate) type EmbedMap = BTreeMap<String, EmbedRecord>;

/// File-backed mapping from activity id to embed record. Every operation
/// goes through a full load or a full rewrite; there is no locking, and two
/// overlapping writers race with last-writer-wins. The tool assumes one
/// browser tab talking to one server process.
pub(crate) struct EmbedStore {
    path: PathBuf,
}

impl EmbedStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// A store file that does not exist yet reads as an empty mapping.
    /// A file that exists but fails to parse is an error.
    pub(crate) fn load(&self) -> Result<EmbedMap, Box<dyn std::error::Error>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(EmbedMap::new()),
            Err(e) => {
                return Err(io::Error::new(e.kind(), format!("{}: {e}", self.path.display())).into());
            }
        };
        let embeds: EmbedMap = serde_json::from_str(&data).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("{}: {e}", self.path.display()))
        })?;
        Ok(embeds)
    }

    /// Rewrite the whole store: pretty-printed (2-space indent), swapped in
    /// via temp file + rename. A reader never observes a partial document.
    pub(crate) fn save(&self, embeds: &EmbedMap) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(embeds)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Load-modify-save cycle for a single record. Overwrites any existing
    /// record for the same activity id.
    pub(crate) fn upsert(&self, activity_id: &str, embed_url: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut embeds = self.load()?;
        embeds.insert(
            activity_id.to_string(),
            EmbedRecord {
                embed_url: embed_url.to_string(),
                activity_id: activity_id.to_string(),
            },
        );
        self.save(&embeds)
    }
}

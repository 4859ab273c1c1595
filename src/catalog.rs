use std::fs;
use std::io;
use std::path::Path;

use crate::{Race, RaceCatalog};

/// True when an optional catalog field holds something other than whitespace.
pub(crate) fn has_content(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|value| !value.trim().is_empty())
}

/// A race belongs on the collection page when footage exists for it but no
/// written report does yet.
pub(crate) fn wants_embed(race: &Race) -> bool {
    has_content(&race.video) && !has_content(&race.report)
}

/// Load the race catalog and keep only the races awaiting an embed code,
/// in source order. Errors carry the path so startup diagnostics are usable.
pub(crate) fn load_races(path: &Path) -> Result<Vec<Race>, Box<dyn std::error::Error>> {
    let data = fs::read_to_string(path)
        .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display())))?;
    let catalog: RaceCatalog = serde_json::from_str(&data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{}: {e}", path.display())))?;
    Ok(catalog.races.into_iter().filter(wants_embed).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn race(name: &str, video: Option<&str>, report: Option<&str>) -> Race {
        Race {
            date: None,
            name: Some(name.to_string()),
            distance: None,
            time: None,
            video: video.map(str::to_string),
            report: report.map(str::to_string),
            strava: None,
        }
    }

    #[test]
    fn keeps_video_without_report() {
        assert!(wants_embed(&race("a", Some("https://youtu.be/x"), None)));
        assert!(wants_embed(&race("b", Some("https://youtu.be/x"), Some(""))));
        assert!(wants_embed(&race("c", Some("https://youtu.be/x"), Some("   "))));
    }

    #[test]
    fn drops_race_without_video() {
        assert!(!wants_embed(&race("a", None, None)));
        assert!(!wants_embed(&race("b", Some(""), None)));
        assert!(!wants_embed(&race("c", Some("  "), None)));
    }

    #[test]
    fn drops_race_with_report() {
        assert!(!wants_embed(&race("a", Some("https://youtu.be/x"), Some("/posts/report"))));
    }

    #[test]
    fn load_filters_and_preserves_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"races": [
                {{"name": "First", "video": "v1", "extra": 1}},
                {{"name": "Skipped", "video": "", "report": ""}},
                {{"name": "Second", "video": "v2", "report": "  "}},
                {{"name": "Reported", "video": "v3", "report": "/posts/done"}}
            ]}}"#
        )
        .unwrap();

        let races = load_races(file.path()).unwrap();
        let names: Vec<_> = races.iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn load_fails_on_missing_file() {
        assert!(load_races(Path::new("/nonexistent/races-data.json")).is_err());
    }

    #[test]
    fn load_fails_on_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(load_races(file.path()).is_err());
    }
}

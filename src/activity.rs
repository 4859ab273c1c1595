use once_cell::sync::Lazy;
use regex::Regex;

static ACTIVITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"strava\.com/activities/(\d+)").expect("invalid activity pattern"));

/// Pull the numeric activity id out of a Strava activity URL. Returns
/// `None` when the input does not look like an activity URL at all.
pub(crate) fn extract_activity_id(url: &str) -> Option<&str> {
    ACTIVITY_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_full_url() {
        assert_eq!(
            extract_activity_id("https://www.strava.com/activities/123456"),
            Some("123456")
        );
    }

    #[test]
    fn extracts_id_with_trailing_path() {
        assert_eq!(
            extract_activity_id("https://www.strava.com/activities/987654321/overview"),
            Some("987654321")
        );
    }

    #[test]
    fn bare_host_without_scheme() {
        assert_eq!(
            extract_activity_id("strava.com/activities/42"),
            Some("42")
        );
    }

    #[test]
    fn no_match_on_unrelated_text() {
        assert_eq!(extract_activity_id("no-url-here"), None);
    }

    #[test]
    fn no_match_on_empty_input() {
        assert_eq!(extract_activity_id(""), None);
    }

    #[test]
    fn no_match_without_numeric_id() {
        assert_eq!(extract_activity_id("https://www.strava.com/activities/"), None);
    }
}

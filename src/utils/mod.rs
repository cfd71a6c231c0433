//! Utility functions and helpers.

pub mod http;
pub mod pacer;

use chrono::{DateTime, NaiveDate};
use url::Url;

/// Human-readable date layouts seen on listing and article pages.
const DATE_FORMATS: &[&str] = &["%B %d, %Y", "%B %d %Y", "%d %B %Y", "%Y-%m-%d", "%m/%d/%Y"];

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Derive a slug from the second-to-last `/`-delimited segment of a URL path.
///
/// Article URLs end with a trailing slash, so for
/// `https://host/articles/2025/03/some-title/` this yields `some-title`.
/// Returns an empty string when the path has too few segments.
pub fn slug_from_url(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() < 2 {
        return String::new();
    }
    parts[parts.len() - 2].to_string()
}

/// Collapse runs of whitespace (including tabs and newlines) into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Calendar-parse a human-readable date into `YYYY-MM-DD`.
pub fn normalize_date(raw: &str) -> Option<String> {
    let text = normalize_whitespace(raw);
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Some(dt.date_naive().format("%Y-%m-%d").to_string());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&text, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/news/page/2/").unwrap();
        assert_eq!(
            resolve_url(&base, "/remarks/2025/03/x/"),
            "https://example.com/remarks/2025/03/x/"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_slug_from_url() {
        assert_eq!(
            slug_from_url("https://www.whitehouse.gov/articles/2025/03/sunday-shows-the-golden-age-of-america-is-here/"),
            "sunday-shows-the-golden-age-of-america-is-here"
        );
        assert_eq!(slug_from_url("https://example.com/a/b"), "a");
        assert_eq!(slug_from_url("https://example.com/x/slug/?utm=1"), "slug");
        assert_eq!(slug_from_url(""), "");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("\n\t  WEEK EIGHT\n\t\tWINS  "),
            "WEEK EIGHT WINS"
        );
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("March 14, 2025").as_deref(), Some("2025-03-14"));
        assert_eq!(normalize_date(" March 4,\n 2025 ").as_deref(), Some("2025-03-04"));
        assert_eq!(normalize_date("Mar 9, 2025").as_deref(), Some("2025-03-09"));
        assert_eq!(normalize_date("2025-03-11").as_deref(), Some("2025-03-11"));
        assert_eq!(
            normalize_date("2025-03-12T21:15:00-04:00").as_deref(),
            Some("2025-03-12")
        );
        assert_eq!(normalize_date("yesterday"), None);
        assert_eq!(normalize_date(""), None);
    }
}

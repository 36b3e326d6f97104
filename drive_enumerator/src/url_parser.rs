//! Pulls Drive IDs out of the URLs people paste from the browser.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{DriveError, Result};

/// URL shapes that carry an ID in their first capture group.
static URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^https?://drive\.google\.com/drive/(?:u/\d+/)?folders/([a-zA-Z0-9_-]+)",
        r"^https?://drive\.google\.com/drive/(?:u/\d+/)?shared-drives/([a-zA-Z0-9_-]+)",
        r"^https?://drive\.google\.com/file/d/([a-zA-Z0-9_-]+)",
        r"^https?://drive\.google\.com/open\?id=([a-zA-Z0-9_-]+)",
        r"^https?://docs\.google\.com/(?:document|spreadsheets|presentation)/d/([a-zA-Z0-9_-]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid Drive URL regex"))
    .collect()
});

static ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid ID regex"));

/// Extract a Drive ID from a URL, or validate a raw ID.
///
/// Accepts folder, shared drive, file, `open?id=` and Docs editor URLs.
///
/// ```
/// use drive_enumerator::url_parser::extract_id;
///
/// let id = extract_id("https://drive.google.com/drive/folders/1abc123").unwrap();
/// assert_eq!(id, "1abc123");
///
/// let id = extract_id("1abc123").unwrap();
/// assert_eq!(id, "1abc123");
/// ```
pub fn extract_id(url_or_id: &str) -> Result<String> {
    let trimmed = url_or_id.trim();

    let from_url = URL_PATTERNS
        .iter()
        .find_map(|re| re.captures(trimmed).and_then(|c| c.get(1)));
    if let Some(id) = from_url {
        return Ok(id.as_str().to_string());
    }

    if ID_REGEX.is_match(trimmed) {
        return Ok(trimmed.to_string());
    }

    Err(DriveError::InvalidUrlOrId(url_or_id.to_string()))
}

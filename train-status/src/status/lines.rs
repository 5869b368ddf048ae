//! Status line extraction.
//!
//! The NTES running-status page is a loosely structured HTML fragment. We do
//! not attempt to understand its layout; instead we flatten it to text and
//! keep the lines that mention one of the known status keywords.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Keywords that mark a line as carrying running-status information.
///
/// Matching is case-sensitive.
pub const STATUS_KEYWORDS: &[&str] = &[
    "Arrived",
    "Arrive",
    "Arriving",
    "Departed",
    "Depart",
    "Departure",
    "On Time",
    "Yet to start",
    "Reached Destination",
    "Current Position",
    "Last Updates On",
    "Start Date",
];

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid regex"));

static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("valid regex"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

static GLUED_LAST_UPDATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Last Updates On(\d)").expect("valid regex"));

/// A single line of extracted status text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawLine {
    position: usize,
    text: String,
}

impl RawLine {
    /// Create a line at the given position in the extracted sequence.
    pub fn new(position: usize, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }

    /// Ordinal index of this line among the extracted lines.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The cleaned line text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Extract the status lines from an NTES HTML response.
///
/// Lines are returned in document order with entities decoded and whitespace
/// collapsed. Lines without a status keyword are dropped, as are exact
/// repeats of an earlier line.
///
/// # Examples
///
/// ```
/// use train_status::status::extract_status_lines;
///
/// let html = "<div>Departed from Kanpur Central (CNB)</div>\n<div>Coach position</div>";
/// let lines = extract_status_lines(html);
/// assert_eq!(lines.len(), 1);
/// assert_eq!(lines[0].text(), "Departed from Kanpur Central (CNB)");
/// ```
pub fn extract_status_lines(html: &str) -> Vec<RawLine> {
    let text = strip_markup(html);
    let mut seen = HashSet::new();

    text.lines()
        .map(clean_line)
        .filter(|line| !line.is_empty() && is_status_line(line))
        .filter(|line| seen.insert(line.clone()))
        .enumerate()
        .map(|(position, text)| RawLine::new(position, text))
        .collect()
}

/// Whether a cleaned line mentions any status keyword.
pub fn is_status_line(line: &str) -> bool {
    STATUS_KEYWORDS.iter().any(|kw| line.contains(kw))
}

/// Remove script/style blocks and replace every tag with a space.
fn strip_markup(html: &str) -> String {
    let without_scripts = SCRIPT_BLOCK.replace_all(html, "");
    let without_styles = STYLE_BLOCK.replace_all(&without_scripts, "");
    TAG.replace_all(&without_styles, " ").into_owned()
}

/// Decode entities, collapse whitespace and trim a single line.
///
/// Non-breaking spaces decode to U+00A0, which `split_whitespace` treats as
/// a separator. Unknown entities are left untouched.
fn clean_line(line: &str) -> String {
    let decoded = html_escape::decode_html_entities(line);
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    GLUED_LAST_UPDATE
        .replace_all(&collapsed, "Last Updates On $1")
        .into_owned()
}

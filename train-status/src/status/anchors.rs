//! Page-level anchor facts.
//!
//! NTES reports the journey start date and the time the status was last
//! refreshed once per page. Event lines often carry only a clock time, so
//! these two facts supply the missing date.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use super::lines::RawLine;

const START_DATE_KEYWORD: &str = "Start Date";
const LAST_UPDATE_KEYWORD: &str = "Last Updates On";

static START_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Start Date\s*:?\s*(?P<date>\d{1,2}-[A-Za-z]{3}-\d{4}|\d{4}-\d{2}-\d{2})")
        .expect("valid regex")
});

static LAST_UPDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"Last Updates On\s*:?\s*(?P<stamp>(?:\d{1,2}-[A-Za-z]{3}-\d{4}|\d{4}-\d{2}-\d{2})(?:[ T]\d{1,2}:\d{2}(?::\d{2})?)?)",
    )
    .expect("valid regex")
});

const DATE_FORMATS: &[&str] = &["%d-%b-%Y", "%Y-%m-%d"];

const DATETIME_FORMATS: &[&str] = &[
    "%d-%b-%Y %H:%M:%S",
    "%d-%b-%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Start date and last-update stamp as reported by upstream.
///
/// Both values keep the upstream text verbatim; [`Anchors::start_date_value`]
/// and [`Anchors::last_update_value`] parse them on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchors {
    start_date: Option<String>,
    last_update: Option<String>,
}

impl Anchors {
    /// Create anchors from already-extracted upstream strings.
    pub fn new(start_date: Option<String>, last_update: Option<String>) -> Self {
        Self {
            start_date,
            last_update,
        }
    }

    /// Find the anchors in a set of status lines. The first match of each wins.
    pub fn from_lines(lines: &[RawLine]) -> Self {
        let start_date = lines.iter().find_map(|line| {
            START_DATE
                .captures(line.text())
                .map(|caps| caps["date"].to_string())
        });

        let last_update = lines.iter().find_map(|line| {
            LAST_UPDATE
                .captures(line.text())
                .map(|caps| caps["stamp"].to_string())
        });

        Self {
            start_date,
            last_update,
        }
    }

    /// The journey start date as reported upstream.
    pub fn start_date(&self) -> Option<&str> {
        self.start_date.as_deref()
    }

    /// The last-update stamp as reported upstream.
    pub fn last_update(&self) -> Option<&str> {
        self.last_update.as_deref()
    }

    /// The start date, if it parses.
    pub fn start_date_value(&self) -> Option<NaiveDate> {
        self.start_date.as_deref().and_then(parse_date)
    }

    /// The last-update stamp, if it parses. A date without a time is midnight.
    pub fn last_update_value(&self) -> Option<NaiveDateTime> {
        self.last_update.as_deref().and_then(parse_datetime)
    }

    /// Whether a line exists only to carry an anchor fact.
    pub fn is_anchor_line(text: &str) -> bool {
        text.contains(START_DATE_KEYWORD) || text.contains(LAST_UPDATE_KEYWORD)
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| parse_date(s).map(|d| d.and_time(NaiveTime::MIN)))
}

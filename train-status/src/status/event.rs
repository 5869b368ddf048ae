//! Best-effort event parsing.
//!
//! Each field of an [`Event`] is filled by its own detector, a plain function
//! from the line text to an optional value. Detectors never see each other's
//! output, so a line missing one signal still yields the others, and a line
//! with no recognisable structure yields an event with only `raw` set.

use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use chrono::{NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};
use serde::Serialize;

use super::lines::RawLine;

/// Movement reported by a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    Arrived,
    Departed,
}

impl EventKind {
    /// The upstream spelling of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Arrived => "Arrived",
            EventKind::Departed => "Departed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar date as written on a status line; the year is often omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFragment {
    pub day: u32,
    pub month: u32,
    pub year: Option<i32>,
}

/// The time portion of a status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeText {
    /// Matched text, e.g. `14:05` or `14:05, Jan 02`.
    pub text: String,
    /// Parsed clock time.
    pub clock: NaiveTime,
    /// Date written on the same line, if any.
    pub date: Option<DateFragment>,
}

/// One parsed status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// The status line this event was parsed from.
    pub raw: String,
    pub kind: Option<EventKind>,
    pub station_name: Option<String>,
    pub station_code: Option<String>,
    /// Delay in `HH:MM` form.
    pub delay: Option<String>,
    pub time_text: Option<TimeText>,
    /// Absolute local time, filled in by the timestamp resolver.
    pub resolved_datetime: Option<NaiveDateTime>,
}

impl Event {
    /// An event carrying only its raw line.
    pub fn bare(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            kind: None,
            station_name: None,
            station_code: None,
            delay: None,
            time_text: None,
            resolved_datetime: None,
        }
    }
}

/// A field detector: inspects a line and maybe produces a value.
type Detector<T> = fn(&str) -> Option<T>;

/// Station name strategies, most specific first.
const STATION_NAME_DETECTORS: &[Detector<String>] = &[
    station_before_parenthesised_code_after_verb,
    station_between_verb_and_preposition,
    station_before_parenthesised_code,
    station_after_bare_code,
];

/// Date fragment layouts, most specific first.
const DATE_DETECTORS: &[Detector<(DateFragment, Range<usize>)>] =
    &[date_day_month_dashed, date_month_day, date_day_month];

/// Uppercase tokens that look like station codes but never are.
const NON_STATION_CODES: &[&str] = &[
    "ETA", "ETD", "STA", "STD", "IST", "AM", "PM", "KM", "KMS", "PF", "NA", "ON", "AT",
];

const MONTHS: [(&str, &str); 12] = [
    ("jan", "january"),
    ("feb", "february"),
    ("mar", "march"),
    ("apr", "april"),
    ("may", "may"),
    ("jun", "june"),
    ("jul", "july"),
    ("aug", "august"),
    ("sep", "september"),
    ("oct", "october"),
    ("nov", "november"),
    ("dec", "december"),
];

static KIND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(Arrived|Departed)\b").expect("valid regex"));

static PAREN_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*([A-Z]{2,5})\s*\)").expect("valid regex"));

static BARE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2,5}\b").expect("valid regex"));

static VERB_STATION_PAREN_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:Arrived|Departed)\s+(?i:from|at)\s+(?P<station>[^()]+?)\s*\(\s*[A-Z]{2,5}\s*\)")
        .expect("valid regex")
});

static VERB_STATION_PREPOSITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:Arrived|Departed)\s+(?i:from|at)\s+(?P<station>.+?)\s+(?i:at|on)\b")
        .expect("valid regex")
});

static TRAILING_PREPOSITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s(?i:at|on)\b").expect("valid regex"));

static LEADING_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:Arrived|Departed)\b\s*)?(?:(?i:from|at)\s+)?").expect("valid regex")
});

static STATION_STOP_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:(?i:delay(?:ed)?|at|on|from|by)|Arrived|Departed)\b").expect("valid regex")
});

static DELAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bdelay(?:ed)?(?:\s+by)?[\s:\-(]*(?:delay\s*)?(?P<hours>\d{1,2}):(?P<minutes>\d{2})\b",
    )
    .expect("valid regex")
});

static DELAY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bdelay(?:ed)?(?:\s+by)?[\s:\-(]*(?:delay\s*)?$").expect("valid regex")
});

static CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<hour>\d{1,2}):(?P<minute>\d{2})(?::(?P<second>\d{2}))?\b")
        .expect("valid regex")
});

static DAY_MONTH_DASHED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<day>\d{1,2})-(?P<month>[A-Za-z]{3})(?:-(?P<year>\d{4}))?\b")
        .expect("valid regex")
});

static MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<month>[A-Za-z]{3,9})\.?\s+(?P<day>\d{1,2})(?:,?\s+(?P<year>\d{4}))?(?:[^\d:]|$)")
        .expect("valid regex")
});

static DAY_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\d:])(?P<day>\d{1,2})\s+(?P<month>[A-Za-z]{3,9})\b(?:\s+(?P<year>\d{4})\b)?")
        .expect("valid regex")
});

/// Parse one status line into an event.
///
/// Never fails: fields that cannot be recognised are left as `None`.
/// `resolved_datetime` is always `None` here.
///
/// # Examples
///
/// ```
/// use train_status::status::{EventKind, RawLine, parse_event};
///
/// let event = parse_event(&RawLine::new(0, "Arrived NDLS New Delhi 14:05 Delay 00:10"));
/// assert_eq!(event.kind, Some(EventKind::Arrived));
/// assert_eq!(event.station_code.as_deref(), Some("NDLS"));
/// assert_eq!(event.station_name.as_deref(), Some("New Delhi"));
/// assert_eq!(event.delay.as_deref(), Some("00:10"));
/// assert_eq!(event.time_text.unwrap().text, "14:05");
/// ```
pub fn parse_event(line: &RawLine) -> Event {
    let text = line.text();

    Event {
        raw: text.to_string(),
        kind: detect_kind(text),
        station_name: first_match(STATION_NAME_DETECTORS, text),
        station_code: detect_station_code(text),
        delay: detect_delay(text),
        time_text: detect_time_text(text),
        resolved_datetime: None,
    }
}

fn first_match<T>(detectors: &[Detector<T>], text: &str) -> Option<T> {
    detectors.iter().find_map(|detect| detect(text))
}

/// `Arrived` or `Departed`, word-bounded and case-sensitive.
pub fn detect_kind(text: &str) -> Option<EventKind> {
    match KIND.captures(text)?.get(1)?.as_str() {
        "Arrived" => Some(EventKind::Arrived),
        "Departed" => Some(EventKind::Departed),
        _ => None,
    }
}

/// A 2-5 letter uppercase station code, preferring one in parentheses.
pub fn detect_station_code(text: &str) -> Option<String> {
    PAREN_CODE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .or_else(|| first_bare_code(text).map(|m| m.as_str().to_string()))
}

fn first_bare_code(text: &str) -> Option<regex::Match<'_>> {
    BARE_CODE
        .find_iter(text)
        .find(|m| !NON_STATION_CODES.contains(&m.as_str()))
}

/// The delay following a delay keyword, normalised to `HH:MM`.
pub fn detect_delay(text: &str) -> Option<String> {
    DELAY.captures_iter(text).find_map(|caps| {
        let hours: u32 = caps["hours"].parse().ok()?;
        let minutes: u32 = caps["minutes"].parse().ok()?;
        (minutes < 60).then(|| format!("{hours:02}:{minutes:02}"))
    })
}

/// The first clock time that is not a delay, plus any date on the line.
///
/// A clock with out-of-range seconds falls back to its `HH:MM` part.
pub fn detect_time_text(text: &str) -> Option<TimeText> {
    let (clock, clock_text) = CLOCK.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        if DELAY_PREFIX.is_match(&text[..whole.start()]) {
            return None;
        }
        parse_clock(&caps).map(|(clock, end)| (clock, &text[whole.start()..end]))
    })?;

    let date = first_match(DATE_DETECTORS, text);
    let text = match &date {
        Some((_, span)) => format!("{clock_text}, {}", &text[span.clone()]),
        None => clock_text.to_string(),
    };

    Some(TimeText {
        text,
        clock,
        date: date.map(|(fragment, _)| fragment),
    })
}

/// The clock time and the end offset of the text it was read from.
fn parse_clock(caps: &Captures<'_>) -> Option<(NaiveTime, usize)> {
    let hour = caps["hour"].parse().ok()?;
    let minute_match = caps.name("minute")?;
    let minute = minute_match.as_str().parse().ok()?;

    let with_seconds = caps.name("second").and_then(|s| {
        let second = s.as_str().parse().ok()?;
        NaiveTime::from_hms_opt(hour, minute, second).map(|clock| (clock, s.end()))
    });

    with_seconds.or_else(|| {
        NaiveTime::from_hms_opt(hour, minute, 0).map(|clock| (clock, minute_match.end()))
    })
}

// ============================================================================
// Station name detectors
// ============================================================================

/// "Departed from Kanpur Central (CNB) ..."
fn station_before_parenthesised_code_after_verb(text: &str) -> Option<String> {
    let caps = VERB_STATION_PAREN_CODE.captures(text)?;
    let station = &caps["station"];

    // "Departed from X at 10:00 next stop Y (YYY)": the code belongs to Y.
    let station = match TRAILING_PREPOSITION.find(station) {
        Some(prep) => &station[..prep.start()],
        None => station,
    };
    clean_station_name(station)
}

/// "Departed from Kanpur Central at 10:05"
fn station_between_verb_and_preposition(text: &str) -> Option<String> {
    let caps = VERB_STATION_PREPOSITION.captures(text)?;
    clean_station_name(&caps["station"])
}

/// "14:05 New Delhi (NDLS)"
fn station_before_parenthesised_code(text: &str) -> Option<String> {
    let code = PAREN_CODE.find(text)?;
    let prefix = &text[..code.start()];

    // Only the text after the last number or separator belongs to the name.
    let start = prefix
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_ascii_digit() || matches!(c, ':' | ',' | '|' | ';'))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let candidate = &prefix[start..];
    let candidate = LEADING_VERB.replace(candidate.trim_start(), "");

    clean_station_name(&candidate)
}

/// "Arrived NDLS New Delhi 14:05"
fn station_after_bare_code(text: &str) -> Option<String> {
    let code = first_bare_code(text)?;
    let rest = &text[code.end()..];
    let rest = match STATION_STOP_WORD.find(rest) {
        Some(stop) => &rest[..stop.start()],
        None => rest,
    };
    clean_station_name(rest)
}

/// Cut at the first digit or parenthesis and trim punctuation.
///
/// Returns `None` if nothing alphabetic is left.
fn clean_station_name(raw: &str) -> Option<String> {
    let end = raw
        .find(|c: char| c.is_ascii_digit() || c == '(')
        .unwrap_or(raw.len());
    let name = raw[..end]
        .trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .trim();

    name.chars()
        .any(char::is_alphabetic)
        .then(|| name.to_string())
}

// ============================================================================
// Date fragment detectors
// ============================================================================

/// "02-Jan" or "02-Jan-2026"
fn date_day_month_dashed(text: &str) -> Option<(DateFragment, Range<usize>)> {
    DAY_MONTH_DASHED
        .captures_iter(text)
        .find_map(|caps| date_from_captures(&caps))
}

/// "Jan 02" or "Jan 02, 2026"
fn date_month_day(text: &str) -> Option<(DateFragment, Range<usize>)> {
    MONTH_DAY
        .captures_iter(text)
        .find_map(|caps| date_from_captures(&caps))
}

/// "02 Jan" or "02 Jan 2026"
fn date_day_month(text: &str) -> Option<(DateFragment, Range<usize>)> {
    DAY_MONTH
        .captures_iter(text)
        .find_map(|caps| date_from_captures(&caps))
}

/// Build a fragment from `day`/`month`/`year` groups, with the span they cover.
fn date_from_captures(caps: &Captures<'_>) -> Option<(DateFragment, Range<usize>)> {
    let day_match = caps.name("day")?;
    let month_match = caps.name("month")?;
    let year_match = caps.name("year");

    let day: u32 = day_match.as_str().parse().ok()?;
    let month = month_from_name(month_match.as_str())?;
    let year = match year_match {
        Some(y) => Some(y.as_str().parse().ok()?),
        None => None,
    };
    if !(1..=31).contains(&day) {
        return None;
    }

    let start = day_match.start().min(month_match.start());
    let end = year_match
        .map(|y| y.end())
        .unwrap_or_else(|| day_match.end().max(month_match.end()));

    Some((DateFragment { day, month, year }, start..end))
}

/// Month number for an English month name or three-letter abbreviation.
fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|(abbr, full)| lower == *abbr || lower == *full || (lower == "sept" && *abbr == "sep"))
        .map(|i| i as u32 + 1)
}

//! Caller-supplied time window resolution.
//!
//! Bounds arrive as query strings in one of two shapes: a bare clock time
//! (`HH:MM[:SS]`), which is placed on a reference date, or an ISO datetime,
//! which is absolute. The resolved window is always half-open `[start, end)`.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Formats accepted for offset-bearing ISO datetimes (after `Z` is rewritten).
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
];

/// Formats accepted for naive ISO datetimes.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Formats accepted for bare clock times.
const CLOCK_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Error resolving a time window.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    /// A bound matched neither accepted format.
    #[error(
        "invalid {field}: '{value}'. Use HH:MM[:SS] or ISO datetime \
         (e.g. 2026-01-01T10:30:00 or 2026-01-01T10:30:00Z)"
    )]
    InvalidBound { field: &'static str, value: String },

    /// The window would extend past the representable calendar.
    #[error("time window out of range")]
    OutOfRange,
}

impl WindowError {
    /// Name of the offending query field, if a bound was malformed.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            WindowError::InvalidBound { field, .. } => Some(*field),
            WindowError::OutOfRange => None,
        }
    }
}

/// A resolved half-open interval of local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeWindow {
    /// Create a window. Callers are expected to pass `start <= end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Inclusive lower bound.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Exclusive upper bound.
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Whether `t` falls in `[start, end)`.
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t < self.end
    }

    /// Length of the window.
    pub fn duration(&self) -> chrono::Duration {
        self.end.signed_duration_since(self.start)
    }
}

/// One parsed bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    /// Clock time to be placed on a reference date.
    Clock(NaiveTime),
    /// Already absolute local time.
    Absolute(NaiveDateTime),
}

impl Bound {
    fn on(self, date: NaiveDate) -> NaiveDateTime {
        match self {
            Bound::Clock(time) => date.and_time(time),
            Bound::Absolute(dt) => dt,
        }
    }

    fn absolute_date(self) -> Option<NaiveDate> {
        match self {
            Bound::Clock(_) => None,
            Bound::Absolute(dt) => Some(dt.date()),
        }
    }
}

/// Resolve optional start/end bounds against the caller's current time.
///
/// - No bounds: the whole of today.
/// - One bound: the other end is `now`; a reversed pair is swapped.
/// - Two clock times with `end <= start`: the window spans midnight.
/// - ISO datetimes are taken literally; offset-bearing ones are converted to
///   the time zone of `now`. A reversed pair is swapped, never wrapped.
///
/// Clock times are placed on the date of an ISO bound if there is one,
/// otherwise on today.
///
/// # Examples
///
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use train_status::status::resolve_window;
///
/// let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
/// let now = ist.with_ymd_and_hms(2026, 1, 1, 15, 0, 0).unwrap();
///
/// let window = resolve_window(Some("22:00"), Some("02:00"), &now).unwrap();
/// assert_eq!(window.start().to_string(), "2026-01-01 22:00:00");
/// assert_eq!(window.end().to_string(), "2026-01-02 02:00:00");
/// ```
pub fn resolve_window<Tz: TimeZone>(
    start_time: Option<&str>,
    end_time: Option<&str>,
    now: &DateTime<Tz>,
) -> Result<TimeWindow, WindowError> {
    let local_now = now.naive_local();
    let today = local_now.date();

    let start = start_time
        .map(|raw| parse_bound("start_time", raw, &now.timezone()))
        .transpose()?;
    let end = end_time
        .map(|raw| parse_bound("end_time", raw, &now.timezone()))
        .transpose()?;

    if start.is_none() && end.is_none() {
        let tomorrow = next_day(today)?;
        return Ok(TimeWindow::new(
            today.and_time(NaiveTime::MIN),
            tomorrow.and_time(NaiveTime::MIN),
        ));
    }

    let base_date = start
        .and_then(Bound::absolute_date)
        .or_else(|| end.and_then(Bound::absolute_date))
        .unwrap_or(today);

    let start_dt = start.map_or(local_now, |b| b.on(base_date));
    let mut end_dt = end.map_or(local_now, |b| b.on(base_date));

    let both_clock = matches!((start, end), (Some(Bound::Clock(_)), Some(Bound::Clock(_))));
    if both_clock && end_dt <= start_dt {
        end_dt = end_dt
            .checked_add_days(Days::new(1))
            .ok_or(WindowError::OutOfRange)?;
    }

    if end_dt < start_dt {
        return Ok(TimeWindow::new(end_dt, start_dt));
    }
    Ok(TimeWindow::new(start_dt, end_dt))
}

fn next_day(date: NaiveDate) -> Result<NaiveDate, WindowError> {
    date.succ_opt().ok_or(WindowError::OutOfRange)
}

/// Parse one bound, converting offset-bearing datetimes into `tz`.
fn parse_bound<Tz: TimeZone>(
    field: &'static str,
    raw: &str,
    tz: &Tz,
) -> Result<Bound, WindowError> {
    let s = raw.trim();
    let invalid = || WindowError::InvalidBound {
        field,
        value: raw.to_string(),
    };

    // Support the common ISO form with a Z suffix.
    let with_offset = match s.strip_suffix(['Z', 'z']) {
        Some(stripped) => format!("{stripped}+00:00"),
        None => s.to_string(),
    };

    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&with_offset, fmt).ok())
    {
        return Ok(Bound::Absolute(dt.with_timezone(tz).naive_local()));
    }

    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Ok(Bound::Absolute(dt));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Bound::Absolute(date.and_time(NaiveTime::MIN)));
    }

    CLOCK_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .map(Bound::Clock)
        .ok_or_else(invalid)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::FixedOffset;
    use proptest::prelude::*;

    fn bound() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            (0u32..24, 0u32..60).prop_map(|(h, m)| Some(format!("{h:02}:{m:02}"))),
            (1u32..29, 0u32..24, 0u32..60)
                .prop_map(|(d, h, m)| Some(format!("2026-01-{d:02}T{h:02}:{m:02}:00"))),
        ]
    }

    fn now() -> impl Strategy<Value = DateTime<FixedOffset>> {
        (1u32..29, 0u32..24, 0u32..60).prop_map(|(d, h, m)| {
            FixedOffset::east_opt(19800)
                .unwrap()
                .with_ymd_and_hms(2026, 1, d, h, m, 0)
                .unwrap()
        })
    }

    proptest! {
        /// Resolving the same inputs twice gives the same window
        #[test]
        fn idempotent(start in bound(), end in bound(), now in now()) {
            let a = resolve_window(start.as_deref(), end.as_deref(), &now);
            let b = resolve_window(start.as_deref(), end.as_deref(), &now);
            prop_assert_eq!(a, b);
        }

        /// Resolved windows are never reversed
        #[test]
        fn start_not_after_end(start in bound(), end in bound(), now in now()) {
            let window = resolve_window(start.as_deref(), end.as_deref(), &now).unwrap();
            prop_assert!(window.start() <= window.end());
        }

        /// Two clock bounds always give a non-empty window under a day long
        #[test]
        fn clock_pairs_wrap(sh in 0u32..24, sm in 0u32..60, eh in 0u32..24, em in 0u32..60, now in now()) {
            let start = format!("{sh:02}:{sm:02}");
            let end = format!("{eh:02}:{em:02}");
            let window = resolve_window(Some(&start), Some(&end), &now).unwrap();
            prop_assert!(window.start() < window.end());
            prop_assert!(window.duration() <= chrono::Duration::hours(24));
        }
    }
}

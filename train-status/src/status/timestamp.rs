//! Timestamp resolution.
//!
//! Status lines usually carry a bare clock time, sometimes a day and month,
//! rarely a year. The missing parts are borrowed from the page anchors, and
//! failing those from the caller's current date.
//!
//! A year-less date with no anchors takes the current year. Near a year
//! boundary this reads a late-December line fetched in early January as the
//! wrong year; the reading is kept literal rather than guessed at.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use super::anchors::Anchors;
use super::event::{Event, TimeText};

/// Fill in `resolved_datetime` for an event.
///
/// Events without a time are returned unchanged.
pub fn resolve_event(mut event: Event, anchors: &Anchors, today: NaiveDate) -> Event {
    event.resolved_datetime = event
        .time_text
        .as_ref()
        .and_then(|time| resolve_time_text(time, anchors, today));
    event
}

/// Turn partial time text into an absolute local datetime.
///
/// In order of preference, the date comes from:
/// 1. the date written on the line (year from the anchors or `today` if omitted),
/// 2. the last-update anchor,
/// 3. the start-date anchor,
/// 4. `today`.
///
/// Returns `None` only when the line's own date is not a real calendar date.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use train_status::status::{Anchors, TimeText, resolve_time_text};
///
/// let anchors = Anchors::new(None, Some("2026-01-02 09:00:00".to_string()));
/// let time = TimeText {
///     text: "09:30".to_string(),
///     clock: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
///     date: None,
/// };
/// let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
///
/// let resolved = resolve_time_text(&time, &anchors, today).unwrap();
/// assert_eq!(resolved.to_string(), "2026-01-02 09:30:00");
/// ```
pub fn resolve_time_text(
    time: &TimeText,
    anchors: &Anchors,
    today: NaiveDate,
) -> Option<NaiveDateTime> {
    let last_update = anchors.last_update_value().map(|dt| dt.date());
    let start_date = anchors.start_date_value();

    let date = match time.date {
        Some(fragment) => {
            let year = fragment
                .year
                .or(last_update.map(|d| d.year()))
                .or(start_date.map(|d| d.year()))
                .unwrap_or(today.year());
            NaiveDate::from_ymd_opt(year, fragment.month, fragment.day)?
        }
        None => last_update.or(start_date).unwrap_or(today),
    };

    Some(date.and_time(time.clock))
}

//! Whole-page parsing: HTML in, dated events out.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use super::anchors::Anchors;
use super::event::{Event, parse_event};
use super::lines::extract_status_lines;
use super::timestamp::resolve_event;

/// Everything parsed from one running-status page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Journey start date as reported upstream.
    pub start_date: Option<String>,
    /// Last-update stamp as reported upstream.
    pub last_update: Option<String>,
    /// Events in page order.
    pub events: Vec<Event>,
}

/// Parse a running-status page.
///
/// Every status line becomes an event except lines that only carry an anchor
/// fact. Events are dated using the page anchors and `today`. Later events
/// repeating the movement, station and time of an earlier one are dropped.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use train_status::status::parse_status_html;
///
/// let html = "<p>Start Date : 01-Jan-2026</p>\
///             <p>Departed from Howrah Jn (HWH) at 16:50</p>";
/// let today = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
///
/// let report = parse_status_html(html, today);
/// assert_eq!(report.start_date.as_deref(), Some("01-Jan-2026"));
/// assert_eq!(report.events.len(), 1);
/// assert_eq!(
///     report.events[0].resolved_datetime.unwrap().to_string(),
///     "2026-01-01 16:50:00"
/// );
/// ```
pub fn parse_status_html(html: &str, today: NaiveDate) -> StatusReport {
    let lines = extract_status_lines(html);
    let anchors = Anchors::from_lines(&lines);

    let mut seen = HashSet::new();
    let events: Vec<Event> = lines
        .iter()
        .filter_map(|line| {
            let event = parse_event(line);
            if event.kind.is_none() && Anchors::is_anchor_line(&event.raw) {
                debug!(position = line.position(), line = line.text(), "anchor-only line");
                return None;
            }

            let event = resolve_event(event, &anchors, today);
            let repeated = (event.kind.is_some() || event.station_name.is_some())
                && !seen.insert((
                    event.kind,
                    event.station_name.clone(),
                    event.resolved_datetime,
                ));
            if repeated {
                debug!(position = line.position(), line = line.text(), "repeated movement");
                return None;
            }
            Some(event)
        })
        .collect();

    debug!(
        lines = lines.len(),
        events = events.len(),
        start_date = anchors.start_date(),
        last_update = anchors.last_update(),
        "parsed running status page"
    );

    StatusReport {
        start_date: anchors.start_date().map(str::to_string),
        last_update: anchors.last_update().map(str::to_string),
        events,
    }
}

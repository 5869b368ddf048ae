//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::service::TrainStatus;
use crate::status::{Event, EventKind};

/// Timestamp layout used in responses: ISO local time without offset.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Query parameters for the train status endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct StatusParams {
    /// Lower bound, `HH:MM[:SS]` or ISO datetime
    pub start_time: Option<String>,

    /// Upper bound, `HH:MM[:SS]` or ISO datetime
    pub end_time: Option<String>,
}

/// Running status of a train.
#[derive(Debug, Serialize)]
pub struct TrainStatusResponse {
    /// 5-digit train number, as a string
    pub train_number: String,

    /// Journey start date as reported upstream
    pub start_date: Option<String>,

    /// Last-update stamp as reported upstream
    pub last_update: Option<String>,

    /// Events inside the requested window, in page order
    pub events: Vec<TrainEventDto>,
}

/// One running-status event.
#[derive(Debug, Serialize)]
pub struct TrainEventDto {
    /// Status line the event was parsed from
    pub raw: String,

    /// Movement type
    #[serde(rename = "type")]
    pub kind: Option<EventKind>,

    /// Station name
    pub station: Option<String>,

    /// Station code (e.g. "NDLS")
    pub code: Option<String>,

    /// Local timestamp, `YYYY-MM-DDTHH:MM:SS`
    pub datetime: Option<String>,

    /// Delay, `HH:MM`
    pub delay: Option<String>,
}

/// Welcome message for the root endpoint.
#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl TrainEventDto {
    /// Create from a parsed event.
    pub fn from_event(event: &Event) -> Self {
        Self {
            raw: event.raw.clone(),
            kind: event.kind,
            station: event.station_name.clone(),
            code: event.station_code.clone(),
            datetime: event
                .resolved_datetime
                .map(|t| t.format(DATETIME_FORMAT).to_string()),
            delay: event.delay.clone(),
        }
    }
}

impl TrainStatusResponse {
    /// Create from a service result.
    pub fn from_status(status: &TrainStatus) -> Self {
        Self {
            train_number: status.train_number.to_string(),
            start_date: status.report.start_date.clone(),
            last_update: status.report.last_update.clone(),
            events: status
                .report
                .events
                .iter()
                .map(TrainEventDto::from_event)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    use crate::status::{RawLine, StatusReport, TimeWindow, TrainNumber, parse_event};

    fn status(events: Vec<Event>) -> TrainStatus {
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        TrainStatus {
            train_number: TrainNumber::parse("12301").unwrap(),
            window: TimeWindow::new(
                day.and_hms_opt(0, 0, 0).unwrap(),
                day.and_hms_opt(23, 59, 0).unwrap(),
            ),
            report: StatusReport {
                start_date: Some("01-Jan-2026".to_string()),
                last_update: None,
                events,
            },
        }
    }

    #[test]
    fn serializes_full_event() {
        let mut event = parse_event(&RawLine::new(0, "Arrived NDLS New Delhi 14:05 Delay 00:10"));
        event.resolved_datetime = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(14, 5, 0);

        let value = serde_json::to_value(TrainStatusResponse::from_status(&status(vec![event])))
            .unwrap();

        assert_eq!(
            value,
            json!({
                "train_number": "12301",
                "start_date": "01-Jan-2026",
                "last_update": null,
                "events": [{
                    "raw": "Arrived NDLS New Delhi 14:05 Delay 00:10",
                    "type": "Arrived",
                    "station": "New Delhi",
                    "code": "NDLS",
                    "datetime": "2026-01-01T14:05:00",
                    "delay": "00:10"
                }]
            })
        );
    }

    #[test]
    fn serializes_bare_event_with_nulls() {
        let value = serde_json::to_value(TrainEventDto::from_event(&Event::bare(
            "Yet to start from its source",
        )))
        .unwrap();

        assert_eq!(
            value,
            json!({
                "raw": "Yet to start from its source",
                "type": null,
                "station": null,
                "code": null,
                "datetime": null,
                "delay": null
            })
        );
    }
}

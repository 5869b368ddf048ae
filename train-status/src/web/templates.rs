//! Askama templates for the web frontend.

use askama::Template;

use crate::service::TrainStatus;
use crate::status::Event;

const VIEW_TIME_FORMAT: &str = "%d %b %H:%M";

// ============================================================================
// Page Templates
// ============================================================================

/// Running-status page for one train.
#[derive(Template)]
#[template(path = "status.html")]
pub struct StatusTemplate {
    pub train_number: String,
    pub start_date: Option<String>,
    pub last_update: Option<String>,
    pub window_start: String,
    pub window_end: String,
    pub events: Vec<EventView>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Event view model for templates.
///
/// Unknown fields are empty strings.
#[derive(Debug, Clone)]
pub struct EventView {
    pub raw: String,
    pub kind: String,
    pub station: String,
    pub code: String,
    /// Day and time, e.g. "02 Jan 14:05"
    pub time: String,
    pub delay: String,
}

impl EventView {
    /// Whether the event reports a non-zero delay.
    pub fn is_late(&self) -> bool {
        !self.delay.is_empty() && self.delay != "00:00"
    }

    /// Station label, combining name and code where both are known.
    pub fn station_label(&self) -> String {
        match (self.station.is_empty(), self.code.is_empty()) {
            (false, false) => format!("{} ({})", self.station, self.code),
            (false, true) => self.station.clone(),
            (true, _) => self.code.clone(),
        }
    }
}

// Conversion implementations

impl EventView {
    pub fn from_event(event: &Event) -> Self {
        Self {
            raw: event.raw.clone(),
            kind: event.kind.map(|k| k.to_string()).unwrap_or_default(),
            station: event.station_name.clone().unwrap_or_default(),
            code: event.station_code.clone().unwrap_or_default(),
            time: event
                .resolved_datetime
                .map(|t| t.format(VIEW_TIME_FORMAT).to_string())
                .unwrap_or_default(),
            delay: event.delay.clone().unwrap_or_default(),
        }
    }
}

impl StatusTemplate {
    pub fn from_status(status: &TrainStatus) -> Self {
        Self {
            train_number: status.train_number.to_string(),
            start_date: status.report.start_date.clone(),
            last_update: status.report.last_update.clone(),
            window_start: status.window.start().format(VIEW_TIME_FORMAT).to_string(),
            window_end: status.window.end().format(VIEW_TIME_FORMAT).to_string(),
            events: status.report.events.iter().map(EventView::from_event).collect(),
        }
    }
}

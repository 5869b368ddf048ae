//! Running-status parsing pipeline.
//!
//! Raw NTES HTML flows through these stages:
//!
//! 1. [`extract_status_lines`] flattens the page to keyword-bearing lines.
//! 2. [`Anchors::from_lines`] picks out the start date and last-update stamp.
//! 3. [`parse_event`] turns each line into a best-effort [`Event`].
//! 4. [`resolve_event`] dates each event using the anchors.
//! 5. [`filter_events`] keeps the events inside a [`TimeWindow`].
//!
//! Stages 1 to 4 are bundled as [`parse_status_html`]. Every stage is pure:
//! the current date is always passed in, never read from the clock.

mod anchors;
mod event;
mod filter;
mod lines;
mod report;
mod timestamp;
mod train_number;
mod window;

pub use anchors::Anchors;
pub use event::{
    DateFragment, Event, EventKind, TimeText, detect_delay, detect_kind, detect_station_code,
    detect_time_text, parse_event,
};
pub use filter::filter_events;
pub use lines::{RawLine, STATUS_KEYWORDS, extract_status_lines, is_status_line};
pub use report::{StatusReport, parse_status_html};
pub use timestamp::{resolve_event, resolve_time_text};
pub use train_number::{InvalidTrainNumber, TrainNumber};
pub use window::{TimeWindow, WindowError, resolve_window};

//! Window filtering of resolved events.

use super::event::Event;
use super::window::TimeWindow;

/// Keep the events whose resolved time lies inside the window, in order.
///
/// Events that could not be dated are always dropped.
pub fn filter_events(events: Vec<Event>, window: &TimeWindow) -> Vec<Event> {
    events
        .into_iter()
        .filter(|event| event.resolved_datetime.is_some_and(|t| window.contains(t)))
        .collect()
}

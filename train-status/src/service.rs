//! Running-status service: validation, fetch, parse and filter for one request.

use chrono::{DateTime, TimeZone};
use tracing::{debug, info};

use crate::ntes::{NtesError, StatusFetcher};
use crate::status::{
    InvalidTrainNumber, StatusReport, TimeWindow, TrainNumber, WindowError, filter_events,
    parse_status_html, resolve_window,
};

/// Errors from a running-status request.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    /// The train number is malformed
    #[error(transparent)]
    InvalidTrainNumber(#[from] InvalidTrainNumber),

    /// A window bound is malformed
    #[error(transparent)]
    InvalidWindow(#[from] WindowError),

    /// The upstream fetch failed
    #[error("upstream unavailable: {0}")]
    Upstream(#[from] NtesError),

    /// The parse task panicked or was cancelled
    #[error("status parser failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Running status of one train, filtered to a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainStatus {
    pub train_number: TrainNumber,
    pub window: TimeWindow,
    /// Anchors as reported upstream and the events inside `window`.
    pub report: StatusReport,
}

/// Fetch, parse and filter the running status of a train.
///
/// Input is validated before anything is fetched: a bad train number or
/// window bound never reaches upstream. The journey date sent upstream and
/// the fallback date for undated lines are both the local date of `now`.
pub async fn train_status<F, Tz>(
    fetcher: &F,
    train_number: &str,
    start_time: Option<&str>,
    end_time: Option<&str>,
    now: &DateTime<Tz>,
) -> Result<TrainStatus, StatusError>
where
    F: StatusFetcher,
    Tz: TimeZone,
{
    let train_number = TrainNumber::parse(train_number)?;
    let window = resolve_window(start_time, end_time, now)?;
    let today = now.naive_local().date();

    debug!(
        %train_number,
        start = %window.start(),
        end = %window.end(),
        "resolved status window"
    );

    let html = fetcher.fetch_status_html(train_number, today).await?;

    let mut report = tokio::task::spawn_blocking(move || parse_status_html(&html, today)).await?;
    let parsed = report.events.len();
    report.events = filter_events(report.events, &window);

    info!(
        %train_number,
        parsed,
        kept = report.events.len(),
        "train status ready"
    );

    Ok(TrainStatus {
        train_number,
        window,
        report,
    })
}

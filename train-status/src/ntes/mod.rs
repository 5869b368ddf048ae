//! Upstream fetchers for NTES running-status pages.
//!
//! [`NtesClient`] talks to the live site; [`FixtureFetcher`] serves saved
//! pages from disk. Both sit behind [`StatusFetcher`] so the status service
//! can be exercised without the network.

mod client;
mod error;
mod fixture;

use std::future::Future;

use chrono::NaiveDate;

use crate::status::TrainNumber;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_MAX_CONCURRENT, DEFAULT_TIMEOUT_SECS, NtesClient, NtesConfig,
    format_ref_date, parse_csrf_token,
};
pub use error::NtesError;
pub use fixture::FixtureFetcher;

/// Source of raw running-status HTML.
///
/// Implementations never retry; a failure is returned to the caller as is.
pub trait StatusFetcher {
    /// Fetch the running-status page for `train` on journey date `date`.
    fn fetch_status_html(
        &self,
        train: TrainNumber,
        date: NaiveDate,
    ) -> impl Future<Output = Result<String, NtesError>> + Send;
}

impl StatusFetcher for NtesClient {
    fn fetch_status_html(
        &self,
        train: TrainNumber,
        date: NaiveDate,
    ) -> impl Future<Output = Result<String, NtesError>> + Send {
        NtesClient::fetch_status_html(self, train, date)
    }
}

impl StatusFetcher for FixtureFetcher {
    fn fetch_status_html(
        &self,
        train: TrainNumber,
        date: NaiveDate,
    ) -> impl Future<Output = Result<String, NtesError>> + Send {
        FixtureFetcher::fetch_status_html(self, train, date)
    }
}

/// The fetcher chosen at startup.
#[derive(Debug, Clone)]
pub enum Upstream {
    Live(NtesClient),
    Fixture(FixtureFetcher),
}

impl StatusFetcher for Upstream {
    async fn fetch_status_html(
        &self,
        train: TrainNumber,
        date: NaiveDate,
    ) -> Result<String, NtesError> {
        match self {
            Upstream::Live(client) => client.fetch_status_html(train, date).await,
            Upstream::Fixture(fixture) => fixture.fetch_status_html(train, date).await,
        }
    }
}

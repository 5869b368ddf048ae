//! Fixture fetcher for development without access to NTES.
//!
//! Serves saved running-status pages from a directory, one file per train
//! named `{train_number}.html` (e.g. `12301.html`).

use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::status::TrainNumber;

use super::error::NtesError;

/// Fetcher that reads saved HTML pages from disk.
#[derive(Debug, Clone)]
pub struct FixtureFetcher {
    dir: PathBuf,
}

impl FixtureFetcher {
    /// Create a fetcher serving files from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the fixtures are read from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, train: TrainNumber) -> PathBuf {
        self.dir.join(format!("{train}.html"))
    }

    /// Read the saved page for `train`. The journey date is ignored.
    pub async fn fetch_status_html(
        &self,
        train: TrainNumber,
        _date: NaiveDate,
    ) -> Result<String, NtesError> {
        let path = self.path_for(train);
        debug!(path = %path.display(), "reading status fixture");

        match tokio::fs::read_to_string(&path).await {
            Ok(html) => Ok(html),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(NtesError::Api {
                status: 404,
                message: format!("no fixture for train {train}"),
            }),
            Err(e) => Err(NtesError::Fixture(e)),
        }
    }
}

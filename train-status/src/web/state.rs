//! Application state for the web layer.

use std::sync::Arc;

use crate::ntes::Upstream;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Source of running-status pages
    pub upstream: Arc<Upstream>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(upstream: Upstream) -> Self {
        Self {
            upstream: Arc::new(upstream),
        }
    }
}

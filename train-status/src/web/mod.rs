//! Web layer for the running-status service.
//!
//! Serves running status as JSON, or as an HTML page when the client asks
//! for `text/html`.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;

//! Indian Railways running-status server.
//!
//! Fetches a train's live running status from NTES, parses the loosely
//! structured page into dated arrival and departure events, and serves the
//! events falling inside a caller-chosen time window.

pub mod config;
pub mod ntes;
pub mod service;
pub mod status;
pub mod web;

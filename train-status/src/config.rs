//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::ntes::{DEFAULT_BASE_URL, DEFAULT_MAX_CONCURRENT, DEFAULT_TIMEOUT_SECS, NtesConfig};

/// Default listen address.
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Error reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {var}: {value:?} ({reason})")]
pub struct ConfigError {
    var: &'static str,
    value: String,
    reason: String,
}

impl ConfigError {
    /// Name of the offending environment variable.
    pub fn var(&self) -> &'static str {
        self.var
    }
}

/// Startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Address to listen on (`TRAIN_STATUS_ADDR`)
    pub addr: SocketAddr,
    /// NTES base URL (`NTES_BASE_URL`)
    pub ntes_base_url: String,
    /// Upstream request timeout in seconds (`NTES_TIMEOUT_SECS`)
    pub ntes_timeout_secs: u64,
    /// Maximum concurrent upstream fetches (`NTES_MAX_CONCURRENT`)
    pub ntes_max_concurrent: usize,
    /// Serve saved pages from here instead of NTES (`NTES_FIXTURE_DIR`)
    pub fixture_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    ///
    /// Unset and empty variables take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let addr = parse_var("TRAIN_STATUS_ADDR", get("TRAIN_STATUS_ADDR"), DEFAULT_ADDR)?;
        let ntes_timeout_secs = parse_var(
            "NTES_TIMEOUT_SECS",
            get("NTES_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;
        let ntes_max_concurrent = parse_var(
            "NTES_MAX_CONCURRENT",
            get("NTES_MAX_CONCURRENT"),
            DEFAULT_MAX_CONCURRENT,
        )?;

        if ntes_max_concurrent == 0 {
            return Err(ConfigError {
                var: "NTES_MAX_CONCURRENT",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            addr,
            ntes_base_url: get("NTES_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            ntes_timeout_secs,
            ntes_max_concurrent,
            fixture_dir: get("NTES_FIXTURE_DIR").map(PathBuf::from),
        })
    }

    /// Client configuration for the live NTES fetcher.
    pub fn ntes_config(&self) -> NtesConfig {
        NtesConfig::new()
            .with_base_url(&self.ntes_base_url)
            .with_max_concurrent(self.ntes_max_concurrent)
            .with_timeout(self.ntes_timeout_secs)
    }
}

fn parse_var<T, D>(var: &'static str, value: Option<String>, default: D) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    D: ToString,
{
    let raw = value.unwrap_or_else(|| default.to_string());
    raw.trim().parse().map_err(|e: T::Err| ConfigError {
        var,
        value: raw.clone(),
        reason: e.to_string(),
    })
}

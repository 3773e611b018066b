//! Error taxonomy for the display engine.
//!
//! Only [`GlanceError::ConfigurationIncomplete`] is ever shown to the wearer;
//! everything else degrades to a skipped cycle or a fallback value.

use std::time::Duration;
use thiserror::Error;

/// Failure while reading a value from the settings store
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings store unavailable: {0}")]
    Unavailable(String),
    #[error("setting '{key}' could not be read: {reason}")]
    Read { key: String, reason: String },
}

/// Failure while talking to the remote data source
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed response: {0}")]
    Format(String),
    #[error("no reading available")]
    Empty,
}

/// Top-level error kinds surfaced by the engine
#[derive(Debug, Error)]
pub enum GlanceError {
    #[error("data source URL or token is not configured")]
    ConfigurationIncomplete,
    #[error("transient fetch failure: {0}")]
    TransientFetchFailure(#[from] FetchError),
    #[error("display unit probe failed: {0}")]
    UnitProbeFailure(String),
    #[error("invalid timezone '{0}'")]
    InvalidTimezone(String),
    #[error("session '{0}' not found")]
    SessionNotFound(String),
}

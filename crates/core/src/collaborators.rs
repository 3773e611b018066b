//! Traits for the external collaborators the engine talks to
//!
//! The wearable transport, the settings store, and the remote data API are
//! all owned by the host. The engine only needs these narrow interfaces.

use crate::error::{FetchError, SettingsError};
use async_trait::async_trait;
use gluco_glance_types::{DisplayUnit, RawSetting, Reading};

/// Per-session settings store
///
/// Implementations return `Ok(None)` for settings the user never set.
#[async_trait]
pub trait PropertySource: Send + Sync {
    /// Read one setting by key
    async fn get(&self, key: &str) -> Result<Option<RawSetting>, SettingsError>;
}

/// Remote glucose data API
///
/// Retry and backoff are the implementation's business; the engine calls
/// each method at most once per cycle and treats errors as transient.
#[async_trait]
pub trait DataClient: Send + Sync {
    /// Fetch the most recent reading
    async fn fetch_current_reading(&self, url: &str, token: &str) -> Result<Reading, FetchError>;

    /// Ask the data source which unit its owner prefers
    ///
    /// Best effort. Callers fall back to mg/dL on error.
    async fn fetch_display_unit(&self, url: &str, token: &str) -> Result<DisplayUnit, FetchError>;
}

/// Text output on the wearable display
///
/// Both calls are fire-and-forget and idempotent.
pub trait Renderer: Send + Sync {
    fn show_text(&self, text: &str);

    fn clear(&self);
}

/// Path of the "current entry" endpoint on a Nightscout-compatible server
pub const CURRENT_ENTRY_PATH: &str = "/api/v1/entries/current.json";

/// Normalize a user-entered base URL: add `https://` when no scheme is
/// present and drop trailing slashes.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    with_scheme.trim_end_matches('/').to_string()
}

/// Full URL of the current-entry endpoint for a user-entered base URL
pub fn endpoint_url(raw: &str) -> String {
    format!("{}{}", normalize_base_url(raw), CURRENT_ENTRY_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_adds_scheme_and_strips_slash() {
        assert_eq!(
            endpoint_url("demo.example/"),
            "https://demo.example/api/v1/entries/current.json"
        );
        assert_eq!(
            endpoint_url(" http://cgm.local:1337 "),
            "http://cgm.local:1337/api/v1/entries/current.json"
        );
    }

    #[test]
    fn test_normalize_is_stable() {
        let once = normalize_base_url("demo.example//");
        assert_eq!(normalize_base_url(&once), once);
    }
}

//! Resolved per-session configuration.

use crate::units::DisplayUnit;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Permitted range for the low threshold (mg/dL)
pub const LOW_THRESHOLD_RANGE: RangeInclusive<i32> = 40..=90;

/// Permitted range for the high threshold (mg/dL)
pub const HIGH_THRESHOLD_RANGE: RangeInclusive<i32> = 180..=400;

/// Permitted range for the refresh interval (minutes)
pub const REFRESH_INTERVAL_RANGE: RangeInclusive<u32> = 1..=60;

pub const DEFAULT_LOW_THRESHOLD: i32 = 70;
pub const DEFAULT_HIGH_THRESHOLD: i32 = 180;
pub const DEFAULT_REFRESH_INTERVAL_MINUTES: u32 = 5;

/// Display language
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Fr,
    De,
    Pt,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::En,
        Language::Es,
        Language::Fr,
        Language::De,
        Language::Pt,
    ];

    /// Parse a language code or locale tag ("es", "es-MX", "FR_ca")
    pub fn parse(raw: &str) -> Option<Self> {
        let primary = raw
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Language::En),
            "es" => Some(Language::Es),
            "fr" => Some(Language::Fr),
            "de" => Some(Language::De),
            "pt" => Some(Language::Pt),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::Pt => "pt",
        }
    }
}

/// Complete, bounded user configuration for one resolution cycle.
///
/// Thresholds are always stored in mg/dL, whatever `display_unit` says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Data source base URL; empty means not configured
    pub data_source_url: String,
    /// Data source access token; empty means not configured
    pub data_source_token: String,
    pub refresh_interval_minutes: u32,
    pub low_threshold: i32,
    pub high_threshold: i32,
    pub alerts_enabled: bool,
    pub language: Language,
    /// IANA zone name, validated lazily by the formatter
    pub time_zone: Option<String>,
    pub display_unit: DisplayUnit,
    /// Render non-alert readings on periodic refresh too
    pub show_on_refresh: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            data_source_url: String::new(),
            data_source_token: String::new(),
            refresh_interval_minutes: DEFAULT_REFRESH_INTERVAL_MINUTES,
            low_threshold: DEFAULT_LOW_THRESHOLD,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
            alerts_enabled: true,
            language: Language::En,
            time_zone: None,
            display_unit: DisplayUnit::MgDl,
            show_on_refresh: false,
        }
    }
}

impl Configuration {
    /// Whether a data source is configured at all
    pub fn is_complete(&self) -> bool {
        !self.data_source_url.is_empty() && !self.data_source_token.is_empty()
    }

    /// Token with everything past the first four characters masked, for logs
    pub fn masked_token(&self) -> String {
        mask_secret(&self.data_source_token)
    }
}

/// First four characters of a secret followed by `***`, for logs
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "<none>".to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{}***", prefix)
}

//! Application configuration
//!
//! Process-wide knobs for the display engine. Per-user preferences are not
//! stored here; they come from each session's settings store and are
//! resolved by [`super::SettingsResolver`].

use anyhow::Result;
use gluco_glance_core::constants;
use gluco_glance_types::Severity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Current config format version
pub const CONFIG_VERSION: u32 = 1;

/// Application-wide configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the config format
    #[serde(default = "default_version")]
    pub version: u32,
    /// Display and refresh timings
    #[serde(default)]
    pub timings: SchedulerTimings,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl AppConfig {
    /// Load configuration from the user config directory.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from_path(&config_path)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "gluco-glance", "gluco-glance")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.json"))
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a specific file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            timings: SchedulerTimings::default(),
        }
    }
}

/// Timer durations used by the display scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerTimings {
    #[serde(default = "default_initial_display_ms")]
    pub initial_display_ms: u64,
    #[serde(default = "default_interaction_display_ms")]
    pub interaction_display_ms: u64,
    #[serde(default = "default_alert_display_ms")]
    pub alert_display_ms: u64,
    #[serde(default = "default_critical_alert_display_ms")]
    pub critical_alert_display_ms: u64,
    #[serde(default = "default_alert_cooldown_secs")]
    pub alert_cooldown_secs: u64,
    #[serde(default = "default_settings_cache_ttl_secs")]
    pub settings_cache_ttl_secs: u64,
    /// Inactivity cleanup for transports without a disconnect signal
    #[serde(default = "default_session_cleanup_secs")]
    pub session_cleanup_secs: u64,
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

fn default_initial_display_ms() -> u64 {
    constants::INITIAL_DISPLAY_DURATION.as_millis() as u64
}

fn default_interaction_display_ms() -> u64 {
    constants::INTERACTION_DISPLAY_DURATION.as_millis() as u64
}

fn default_alert_display_ms() -> u64 {
    constants::ALERT_DISPLAY_DURATION.as_millis() as u64
}

fn default_critical_alert_display_ms() -> u64 {
    constants::CRITICAL_ALERT_DISPLAY_DURATION.as_millis() as u64
}

fn default_alert_cooldown_secs() -> u64 {
    constants::ALERT_COOLDOWN.as_secs()
}

fn default_settings_cache_ttl_secs() -> u64 {
    constants::SETTINGS_CACHE_TTL.as_secs()
}

fn default_session_cleanup_secs() -> u64 {
    constants::SESSION_CLEANUP_TIMEOUT.as_secs()
}

fn default_fetch_timeout_ms() -> u64 {
    constants::FETCH_TIMEOUT.as_millis() as u64
}

impl Default for SchedulerTimings {
    fn default() -> Self {
        Self {
            initial_display_ms: default_initial_display_ms(),
            interaction_display_ms: default_interaction_display_ms(),
            alert_display_ms: default_alert_display_ms(),
            critical_alert_display_ms: default_critical_alert_display_ms(),
            alert_cooldown_secs: default_alert_cooldown_secs(),
            settings_cache_ttl_secs: default_settings_cache_ttl_secs(),
            session_cleanup_secs: default_session_cleanup_secs(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

impl SchedulerTimings {
    pub fn initial_display(&self) -> Duration {
        Duration::from_millis(self.initial_display_ms)
    }

    pub fn interaction_display(&self) -> Duration {
        Duration::from_millis(self.interaction_display_ms)
    }

    /// On-screen time for an alert; critical bands stay up longer
    pub fn alert_display(&self, severity: Severity) -> Duration {
        if severity.is_critical() {
            Duration::from_millis(self.critical_alert_display_ms)
        } else {
            Duration::from_millis(self.alert_display_ms)
        }
    }

    pub fn alert_cooldown(&self) -> Duration {
        Duration::from_secs(self.alert_cooldown_secs)
    }

    pub fn settings_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.settings_cache_ttl_secs)
    }

    pub fn session_cleanup(&self) -> Duration {
        Duration::from_secs(self.session_cleanup_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

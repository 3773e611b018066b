//! gluco-glance-core: Collaborator traits, errors and constants.
//!
//! This crate contains the interfaces the engine needs from its host
//! (settings store, data API, display), the error taxonomy, and the
//! timing constants shared by the scheduler and its configuration.

pub mod collaborators;
pub mod constants;
pub mod error;

pub use collaborators::{
    endpoint_url, normalize_base_url, DataClient, PropertySource, Renderer, CURRENT_ENTRY_PATH,
};
pub use constants::{
    ALERT_COOLDOWN, ALERT_DISPLAY_DURATION, CRITICAL_ALERT_DISPLAY_DURATION, CRITICAL_HIGH_MGDL,
    CRITICAL_LOW_MGDL, FETCH_TIMEOUT, INITIAL_DISPLAY_DURATION, INTERACTION_DISPLAY_DURATION,
    SESSION_CLEANUP_TIMEOUT, SETTINGS_CACHE_TTL,
};
pub use error::{FetchError, GlanceError, SettingsError};

// Re-export types used in trait signatures for convenience
pub use gluco_glance_types::{DisplayUnit, RawSetting, Reading};

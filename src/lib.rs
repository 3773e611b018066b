//! gluco-glance: glucose readings on a heads-up wearable display
//!
//! This library provides the display engine behind the glasses app:
//! - Per-session settings resolution with caching and unit detection
//! - Formatting of readings for a monochrome text display
//! - Alert classification with cooldown
//! - A per-session scheduler for refresh, temporary display, and cleanup
//! - A read-only glucose summary for the voice assistant

pub mod alerts;
pub mod assistant;
pub mod config;
pub mod core;
pub mod format;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use crate::core::{DisplayScheduler, SessionHandles, SessionRegistry};
pub use config::{AppConfig, MemoryProperties, SettingsResolver};
pub use gluco_glance_core::{DataClient, FetchError, GlanceError, PropertySource, Renderer};
pub use gluco_glance_types::{Configuration, Direction, DisplayUnit, Language, Reading, Severity};

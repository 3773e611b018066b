//! Configuration management
//!
//! Application-level timings live in [`AppConfig`]; per-session user
//! preferences are resolved from the session's settings store by
//! [`SettingsResolver`].

mod memory;
mod resolver;
mod settings;
mod unit_cache;

pub use memory::MemoryProperties;
pub use resolver::{keys, RawSettings, Resolved, SettingsResolver};
pub use settings::{AppConfig, SchedulerTimings, CONFIG_VERSION};
pub use unit_cache::UnitCache;

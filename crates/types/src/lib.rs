//! gluco-glance-types: Shared data types for the gluco-glance display engine.
//!
//! This crate contains pure data types (configuration, readings, units,
//! raw setting values) shared by every gluco-glance crate. It has no async
//! or I/O dependencies.

pub mod config;
pub mod reading;
pub mod setting;
pub mod units;

// Re-export commonly used types at the crate root for convenience
pub use config::{
    mask_secret, Configuration, Language, DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD,
    DEFAULT_REFRESH_INTERVAL_MINUTES, HIGH_THRESHOLD_RANGE, LOW_THRESHOLD_RANGE,
    REFRESH_INTERVAL_RANGE,
};
pub use reading::{Direction, Reading, Severity};
pub use setting::RawSetting;
pub use units::{DisplayUnit, MGDL_PER_MMOL};

//! Shared constants for the display engine

use std::time::Duration;

/// How long the reading stays on screen after a session starts
pub const INITIAL_DISPLAY_DURATION: Duration = Duration::from_secs(5);

/// How long the reading stays on screen after a button press or voice command.
/// Longer than the passive initial display since the wearer asked for it.
pub const INTERACTION_DISPLAY_DURATION: Duration = Duration::from_secs(8);

/// On-screen time for a low/high alert
pub const ALERT_DISPLAY_DURATION: Duration = Duration::from_secs(10);

/// On-screen time for a critical-low/critical-high alert
pub const CRITICAL_ALERT_DISPLAY_DURATION: Duration = Duration::from_secs(20);

/// Minimum time between two fired alerts for the same session
pub const ALERT_COOLDOWN: Duration = Duration::from_secs(10 * 60);

/// How long a resolved configuration is served from cache
pub const SETTINGS_CACHE_TTL: Duration = Duration::from_secs(30);

/// Inactivity cleanup for transports without a disconnect signal
pub const SESSION_CLEANUP_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Upper bound for a single remote fetch
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fixed critical-low bound (mg/dL), independent of user thresholds
pub const CRITICAL_LOW_MGDL: f64 = 70.0;

/// Fixed critical-high bound (mg/dL), independent of user thresholds
pub const CRITICAL_HIGH_MGDL: f64 = 250.0;

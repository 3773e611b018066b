//! Alert decision and suppression policy
//!
//! The policy is pure: it classifies a reading, decides whether an alert
//! fires given the last time one fired, and builds the message. The display
//! scheduler owns the timers and the `last_alert_fired_at` bookkeeping.

use crate::format::locale::alert_text;
use gluco_glance_core::{CRITICAL_HIGH_MGDL, CRITICAL_LOW_MGDL};
use gluco_glance_types::{Configuration, Reading, Severity};
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of evaluating one reading
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDecision {
    pub fire: bool,
    pub severity: Severity,
    /// Text to render; set only when `fire` is true
    pub message: Option<String>,
    /// No alert may fire before this instant
    pub suppress_until: Option<Instant>,
}

impl AlertDecision {
    fn silent(severity: Severity, suppress_until: Option<Instant>) -> Self {
        Self {
            fire: false,
            severity,
            message: None,
            suppress_until,
        }
    }
}

/// Severity band of a canonical value, most severe band first.
///
/// The fixed critical bounds take precedence over user thresholds.
pub fn classify(mg_dl: f64, config: &Configuration) -> Severity {
    if mg_dl < CRITICAL_LOW_MGDL {
        Severity::CriticalLow
    } else if mg_dl < f64::from(config.low_threshold) {
        Severity::Low
    } else if mg_dl > CRITICAL_HIGH_MGDL {
        Severity::CriticalHigh
    } else if mg_dl > f64::from(config.high_threshold) {
        Severity::High
    } else {
        Severity::Normal
    }
}

/// Alert text for a reading in a band, in the configured language and unit
pub fn alert_message(reading: &Reading, severity: Severity, config: &Configuration) -> Option<String> {
    let (headline, advice) = alert_text(severity, config.language)?;
    Some(format!(
        "{}\n{} {}\n{}",
        headline,
        config.display_unit.format_value(reading.value),
        config.display_unit.label(),
        advice
    ))
}

#[derive(Debug, Clone)]
pub struct AlertPolicy {
    cooldown: Duration,
}

impl AlertPolicy {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    /// Decide whether `reading` fires an alert at `now`.
    ///
    /// Once an alert has fired, nothing fires again for the cooldown window,
    /// whatever the band.
    pub fn evaluate(
        &self,
        reading: &Reading,
        config: &Configuration,
        last_alert_fired_at: Option<Instant>,
        now: Instant,
    ) -> AlertDecision {
        let severity = classify(reading.value, config);
        if !config.alerts_enabled || severity == Severity::Normal {
            return AlertDecision::silent(severity, None);
        }

        if let Some(last) = last_alert_fired_at {
            let suppress_until = last + self.cooldown;
            if now < suppress_until {
                return AlertDecision::silent(severity, Some(suppress_until));
            }
        }

        AlertDecision {
            fire: true,
            severity,
            message: alert_message(reading, severity, config),
            suppress_until: Some(now + self.cooldown),
        }
    }
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self::new(gluco_glance_core::ALERT_COOLDOWN)
    }
}

//! Settings resolution: raw property bag in, bounded [`Configuration`] out.
//!
//! Each setting is read independently from the session's [`PropertySource`],
//! normalized through [`RawSetting`], defaulted, clamped, and cached per
//! session for a short freshness window. Resolution never fails: a broken
//! settings store yields the default configuration, flagged as a failed read
//! and never cached.

use super::unit_cache::UnitCache;
use dashmap::DashMap;
use gluco_glance_core::{DataClient, PropertySource, SettingsError};
use gluco_glance_types::{
    Configuration, DisplayUnit, Language, RawSetting, DEFAULT_HIGH_THRESHOLD,
    DEFAULT_LOW_THRESHOLD, DEFAULT_REFRESH_INTERVAL_MINUTES, HIGH_THRESHOLD_RANGE,
    LOW_THRESHOLD_RANGE, REFRESH_INTERVAL_RANGE,
};
use log::{debug, trace, warn};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Setting keys understood by the resolver
pub mod keys {
    pub const URL: &str = "nightscout_url";
    pub const TOKEN: &str = "nightscout_token";
    pub const UPDATE_INTERVAL: &str = "update_interval";
    pub const LOW_ALERT: &str = "low_alert";
    pub const HIGH_ALERT: &str = "high_alert";
    pub const ALERTS_ENABLED: &str = "alerts_enabled";
    pub const LANGUAGE: &str = "language";
    pub const TIMEZONE: &str = "timezone";
    pub const DISPLAY_UNIT: &str = "display_unit";
    pub const SHOW_ON_REFRESH: &str = "show_on_refresh";
}

/// Threshold values below this are taken to be mmol/L and converted
const MMOL_ENTRY_CEILING: f64 = 33.0;

/// Raw values of every known setting, as read from the store
#[derive(Debug, Clone, Default)]
pub struct RawSettings {
    pub url: Option<RawSetting>,
    pub token: Option<RawSetting>,
    pub update_interval: Option<RawSetting>,
    pub low_alert: Option<RawSetting>,
    pub high_alert: Option<RawSetting>,
    pub alerts_enabled: Option<RawSetting>,
    pub language: Option<RawSetting>,
    pub timezone: Option<RawSetting>,
    pub display_unit: Option<RawSetting>,
    pub show_on_refresh: Option<RawSetting>,
}

impl RawSettings {
    /// Read every known key. Any failing read fails the whole batch.
    pub async fn read(source: &dyn PropertySource) -> Result<Self, SettingsError> {
        let (url, token, update_interval, low_alert, high_alert) = tokio::join!(
            source.get(keys::URL),
            source.get(keys::TOKEN),
            source.get(keys::UPDATE_INTERVAL),
            source.get(keys::LOW_ALERT),
            source.get(keys::HIGH_ALERT),
        );
        let (alerts_enabled, language, timezone, display_unit, show_on_refresh) = tokio::join!(
            source.get(keys::ALERTS_ENABLED),
            source.get(keys::LANGUAGE),
            source.get(keys::TIMEZONE),
            source.get(keys::DISPLAY_UNIT),
            source.get(keys::SHOW_ON_REFRESH),
        );

        Ok(Self {
            url: url?,
            token: token?,
            update_interval: update_interval?,
            low_alert: low_alert?,
            high_alert: high_alert?,
            alerts_enabled: alerts_enabled?,
            language: language?,
            timezone: timezone?,
            display_unit: display_unit?,
            show_on_refresh: show_on_refresh?,
        })
    }

    /// Explicitly configured display unit, if any ("auto" counts as none)
    pub fn explicit_unit(&self) -> Option<DisplayUnit> {
        self.display_unit
            .as_ref()
            .and_then(RawSetting::as_text)
            .and_then(|text| DisplayUnit::parse(&text))
    }

    /// Build a complete configuration. Missing or invalid values take their
    /// defaults; thresholds are clamped into their permitted ranges.
    ///
    /// The display unit is taken from the explicit setting or left at mg/dL;
    /// probing the data source is the resolver's job.
    pub fn to_configuration(&self) -> Configuration {
        let text = |raw: &Option<RawSetting>| raw.as_ref().and_then(RawSetting::as_text);

        let language = match text(&self.language) {
            Some(code) => Language::parse(&code).unwrap_or_else(|| {
                debug!("Unsupported language '{}', using English", code);
                Language::En
            }),
            None => Language::En,
        };

        Configuration {
            data_source_url: text(&self.url).unwrap_or_default(),
            data_source_token: text(&self.token).unwrap_or_default(),
            refresh_interval_minutes: refresh_interval(self.update_interval.as_ref()),
            low_threshold: threshold(
                keys::LOW_ALERT,
                self.low_alert.as_ref(),
                DEFAULT_LOW_THRESHOLD,
                LOW_THRESHOLD_RANGE,
            ),
            high_threshold: threshold(
                keys::HIGH_ALERT,
                self.high_alert.as_ref(),
                DEFAULT_HIGH_THRESHOLD,
                HIGH_THRESHOLD_RANGE,
            ),
            alerts_enabled: self
                .alerts_enabled
                .as_ref()
                .and_then(RawSetting::as_bool)
                .unwrap_or(true),
            language,
            time_zone: text(&self.timezone),
            display_unit: self.explicit_unit().unwrap_or_default(),
            show_on_refresh: self
                .show_on_refresh
                .as_ref()
                .and_then(RawSetting::as_bool)
                .unwrap_or(false),
        }
    }
}

/// Parse a threshold, convert mmol/L entries to mg/dL, and clamp it
fn threshold(key: &str, raw: Option<&RawSetting>, default: i32, range: RangeInclusive<i32>) -> i32 {
    let Some(value) = raw.and_then(RawSetting::as_number) else {
        return default;
    };
    if value <= 0.0 {
        return default;
    }

    let mg_dl = if value < MMOL_ENTRY_CEILING {
        DisplayUnit::MmolL.to_canonical(value)
    } else {
        value
    };
    let requested = mg_dl.round() as i32;
    let clamped = requested.clamp(*range.start(), *range.end());
    if clamped != requested {
        warn!(
            "Setting '{}' value {} outside {}..={} mg/dL, clamped to {}",
            key,
            requested,
            range.start(),
            range.end(),
            clamped
        );
    }
    clamped
}

fn refresh_interval(raw: Option<&RawSetting>) -> u32 {
    let Some(value) = raw.and_then(RawSetting::as_number) else {
        return DEFAULT_REFRESH_INTERVAL_MINUTES;
    };
    let minutes = value.trunc();
    if minutes < f64::from(*REFRESH_INTERVAL_RANGE.start()) {
        return DEFAULT_REFRESH_INTERVAL_MINUTES;
    }
    let max = *REFRESH_INTERVAL_RANGE.end();
    if minutes > f64::from(max) {
        warn!(
            "Setting '{}' value {} above {} minutes, clamped",
            keys::UPDATE_INTERVAL,
            minutes,
            max
        );
        return max;
    }
    minutes as u32
}

/// A configuration along with when it was resolved
#[derive(Debug, Clone)]
pub struct Resolved {
    pub config: Arc<Configuration>,
    pub resolved_at: Instant,
    pub from_cache: bool,
    /// The settings store could not be read; `config` is the default
    /// configuration and was not cached
    pub read_failed: bool,
}

struct CachedConfiguration {
    config: Arc<Configuration>,
    resolved_at: Instant,
}

/// Resolves and caches per-session configurations
pub struct SettingsResolver {
    cache: DashMap<String, CachedConfiguration>,
    units: Arc<UnitCache>,
    client: Arc<dyn DataClient>,
    ttl: Duration,
}

impl SettingsResolver {
    pub fn new(client: Arc<dyn DataClient>, units: Arc<UnitCache>, ttl: Duration) -> Self {
        Self {
            cache: DashMap::new(),
            units,
            client,
            ttl,
        }
    }

    /// Resolve the configuration for a session.
    ///
    /// Serves the cached value while it is younger than the freshness window
    /// unless `force_refresh` is set.
    pub async fn resolve(
        &self,
        session_id: &str,
        source: &dyn PropertySource,
        force_refresh: bool,
    ) -> Resolved {
        if !force_refresh {
            if let Some(cached) = self.cache.get(session_id) {
                if cached.resolved_at.elapsed() < self.ttl {
                    trace!("Serving cached configuration for session {}", session_id);
                    return Resolved {
                        config: Arc::clone(&cached.config),
                        resolved_at: cached.resolved_at,
                        from_cache: true,
                        read_failed: false,
                    };
                }
            }
        }

        let raw = match RawSettings::read(source).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "Failed to read settings for session {}: {}; using defaults",
                    session_id, e
                );
                return Resolved {
                    config: Arc::new(Configuration::default()),
                    resolved_at: Instant::now(),
                    from_cache: false,
                    read_failed: true,
                };
            }
        };

        let mut config = raw.to_configuration();
        if raw.explicit_unit().is_none() && config.is_complete() {
            config.display_unit = self
                .units
                .resolve(
                    self.client.as_ref(),
                    &config.data_source_url,
                    &config.data_source_token,
                )
                .await;
        }

        debug!(
            "Resolved configuration for session {}: url set: {}, token {}, every {} min, \
             thresholds {}/{}, alerts {}, language {}, unit {}",
            session_id,
            !config.data_source_url.is_empty(),
            config.masked_token(),
            config.refresh_interval_minutes,
            config.low_threshold,
            config.high_threshold,
            config.alerts_enabled,
            config.language.code(),
            config.display_unit
        );

        let config = Arc::new(config);
        let resolved_at = Instant::now();
        self.cache.insert(
            session_id.to_string(),
            CachedConfiguration {
                config: Arc::clone(&config),
                resolved_at,
            },
        );

        Resolved {
            config,
            resolved_at,
            from_cache: false,
            read_failed: false,
        }
    }

    /// Drop the cached configuration for a session
    pub fn invalidate(&self, session_id: &str) {
        if self.cache.remove(session_id).is_some() {
            debug!("Invalidated cached configuration for session {}", session_id);
        }
    }

    /// Whether a configuration is cached for a session
    pub fn is_cached(&self, session_id: &str) -> bool {
        self.cache.contains_key(session_id)
    }

    /// Shared display-unit cache
    pub fn units(&self) -> &Arc<UnitCache> {
        &self.units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryProperties;
    use crate::test_support::{FailingProperties, ScriptedClient};
    use serde_json::{json, Value};

    fn resolver(client: ScriptedClient) -> SettingsResolver {
        SettingsResolver::new(
            Arc::new(client),
            Arc::new(UnitCache::new()),
            Duration::from_secs(30),
        )
    }

    fn raw(value: Value) -> Option<RawSetting> {
        RawSetting::from_json(value)
    }

    #[test]
    fn test_thresholds_always_in_range() {
        let inputs = vec![
            Value::Null,
            json!(5),
            json!(1000),
            json!(-20),
            json!("not a number"),
            json!({ "value": 10 }),
            json!({ "value": "500" }),
            json!({ "value": null }),
            json!(true),
            json!([70]),
            json!(3.9),
            json!(85),
        ];
        for low in &inputs {
            for high in &inputs {
                let settings = RawSettings {
                    low_alert: raw(low.clone()),
                    high_alert: raw(high.clone()),
                    ..RawSettings::default()
                };
                let config = settings.to_configuration();
                assert!(
                    LOW_THRESHOLD_RANGE.contains(&config.low_threshold),
                    "low {:?} -> {}",
                    low,
                    config.low_threshold
                );
                assert!(
                    HIGH_THRESHOLD_RANGE.contains(&config.high_threshold),
                    "high {:?} -> {}",
                    high,
                    config.high_threshold
                );
                assert!(config.refresh_interval_minutes >= 1);
            }
        }
    }

    #[test]
    fn test_slicer_values_unwrap() {
        let settings = RawSettings {
            url: raw(json!({ "value": " demo.example " })),
            token: raw(json!("abc")),
            update_interval: raw(json!({ "value": "2" })),
            low_alert: raw(json!({ "value": 80 })),
            alerts_enabled: raw(json!({ "value": "false" })),
            language: raw(json!({ "value": "es" })),
            ..RawSettings::default()
        };
        let config = settings.to_configuration();
        assert_eq!(config.data_source_url, "demo.example");
        assert_eq!(config.refresh_interval_minutes, 2);
        assert_eq!(config.low_threshold, 80);
        assert!(!config.alerts_enabled);
        assert_eq!(config.language, Language::Es);
        assert!(config.is_complete());
    }

    #[test]
    fn test_defaults_for_absent_and_malformed() {
        let settings = RawSettings {
            update_interval: raw(json!("0")),
            language: raw(json!("xx")),
            alerts_enabled: raw(json!("sometimes")),
            timezone: raw(json!("   ")),
            ..RawSettings::default()
        };
        let config = settings.to_configuration();
        assert_eq!(config.refresh_interval_minutes, DEFAULT_REFRESH_INTERVAL_MINUTES);
        assert_eq!(config.language, Language::En);
        assert!(config.alerts_enabled);
        assert!(config.time_zone.is_none());
        assert!(!config.show_on_refresh);
        assert!(!config.is_complete());
    }

    #[test]
    fn test_mmol_threshold_entries_are_converted() {
        let settings = RawSettings {
            low_alert: raw(json!("3.9")),
            high_alert: raw(json!(10.0)),
            ..RawSettings::default()
        };
        let config = settings.to_configuration();
        assert_eq!(config.low_threshold, 70);
        assert_eq!(config.high_threshold, 180);
    }

    #[test]
    fn test_interval_is_capped() {
        let settings = RawSettings {
            update_interval: raw(json!(600)),
            ..RawSettings::default()
        };
        assert_eq!(settings.to_configuration().refresh_interval_minutes, 60);
    }

    #[tokio::test]
    async fn test_read_failure_yields_defaults() {
        let resolver = resolver(ScriptedClient::new());
        let resolved = resolver.resolve("s1", &FailingProperties, false).await;
        assert_eq!(*resolved.config, Configuration::default());
        assert!(!resolved.config.is_complete());
        assert!(resolved.read_failed);
        assert!(!resolver.is_cached("s1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_freshness_and_invalidation() {
        let resolver = resolver(ScriptedClient::new());
        let props = MemoryProperties::from_json(json!({
            "nightscout_url": "demo.example",
            "nightscout_token": "abc",
            "low_alert": 75,
        }));

        let first = resolver.resolve("s1", &props, false).await;
        assert!(!first.from_cache);
        assert_eq!(first.config.low_threshold, 75);

        props.set(keys::LOW_ALERT, json!(85));
        let cached = resolver.resolve("s1", &props, false).await;
        assert!(cached.from_cache);
        assert_eq!(cached.config.low_threshold, 75);

        let forced = resolver.resolve("s1", &props, true).await;
        assert!(!forced.from_cache);
        assert_eq!(forced.config.low_threshold, 85);

        props.set(keys::LOW_ALERT, json!(60));
        resolver.invalidate("s1");
        let after_invalidate = resolver.resolve("s1", &props, false).await;
        assert_eq!(after_invalidate.config.low_threshold, 60);

        props.set(keys::LOW_ALERT, json!(65));
        tokio::time::advance(Duration::from_secs(31)).await;
        let stale = resolver.resolve("s1", &props, false).await;
        assert!(!stale.from_cache);
        assert_eq!(stale.config.low_threshold, 65);
    }

    #[tokio::test]
    async fn test_unit_probe_only_when_not_explicit() {
        let client = ScriptedClient::new().with_unit(Some(DisplayUnit::MmolL));
        let resolver = resolver(client.clone());

        let auto = MemoryProperties::from_json(json!({
            "nightscout_url": "demo.example",
            "nightscout_token": "abc",
            "display_unit": "auto",
        }));
        let resolved = resolver.resolve("s1", &auto, false).await;
        assert_eq!(resolved.config.display_unit, DisplayUnit::MmolL);

        let explicit = MemoryProperties::from_json(json!({
            "nightscout_url": "other.example",
            "nightscout_token": "abc",
            "display_unit": { "value": "mg/dL" },
        }));
        let resolved = resolver.resolve("s2", &explicit, false).await;
        assert_eq!(resolved.config.display_unit, DisplayUnit::MgDl);
        assert_eq!(client.unit_probes(), 1);
    }
}

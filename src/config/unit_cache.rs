//! Cross-session cache of detected display units
//!
//! Detecting the unit needs a round trip to the data source, so the answer
//! is kept per data-source identity (the normalized base URL) and shared by
//! every session pointing at the same source.

use dashmap::DashMap;
use gluco_glance_core::{normalize_base_url, DataClient, DisplayUnit, GlanceError};
use log::{debug, warn};

pub struct UnitCache {
    units: DashMap<String, DisplayUnit>,
}

impl UnitCache {
    pub fn new() -> Self {
        Self {
            units: DashMap::new(),
        }
    }

    /// Cached unit for a data source, if it was probed before
    pub fn get(&self, url: &str) -> Option<DisplayUnit> {
        self.units.get(&normalize_base_url(url)).map(|unit| *unit)
    }

    /// Return the cached unit or probe the data source for it.
    ///
    /// A failed probe falls back to mg/dL and is not cached, so the next
    /// resolution tries again.
    pub async fn resolve(&self, client: &dyn DataClient, url: &str, token: &str) -> DisplayUnit {
        if let Some(unit) = self.get(url) {
            return unit;
        }
        let key = normalize_base_url(url);

        match client.fetch_display_unit(url, token).await {
            Ok(unit) => {
                debug!("Detected display unit {} for {}", unit, key);
                self.units.insert(key, unit);
                unit
            }
            Err(e) => {
                let err = GlanceError::UnitProbeFailure(e.to_string());
                warn!("{} ({}), defaulting to mg/dL", err, key);
                DisplayUnit::MgDl
            }
        }
    }

    /// Drop the cached unit for a data source
    pub fn invalidate(&self, url: &str) {
        self.units.remove(&normalize_base_url(url));
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Default for UnitCache {
    fn default() -> Self {
        Self::new()
    }
}

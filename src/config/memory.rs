//! In-memory settings store

use async_trait::async_trait;
use gluco_glance_core::{PropertySource, RawSetting, SettingsError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// A [`PropertySource`] backed by a map of JSON values.
///
/// Useful for hosts that receive settings as a pushed JSON document, and for
/// the demo binary.
#[derive(Debug, Default)]
pub struct MemoryProperties {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object; non-object documents yield an empty store
    pub fn from_json(document: Value) -> Self {
        let values = match document {
            Value::Object(map) => map.into_iter().collect(),
            _ => HashMap::new(),
        };
        Self {
            values: RwLock::new(values),
        }
    }

    pub fn set(&self, key: &str, value: Value) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_string(), value);
        }
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.write() {
            values.remove(key);
        }
    }
}

#[async_trait]
impl PropertySource for MemoryProperties {
    async fn get(&self, key: &str) -> Result<Option<RawSetting>, SettingsError> {
        let values = self
            .values
            .read()
            .map_err(|e| SettingsError::Unavailable(e.to_string()))?;
        Ok(values.get(key).cloned().and_then(RawSetting::from_json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_wrap_and_remove() {
        let props = MemoryProperties::new();
        assert!(props.get("language").await.unwrap().is_none());

        props.set("language", json!({ "value": "fr" }));
        let raw = props.get("language").await.unwrap().unwrap();
        assert_eq!(raw.as_text().as_deref(), Some("fr"));

        props.remove("language");
        assert!(props.get("language").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_null_values_read_as_absent() {
        let props = MemoryProperties::from_json(json!({ "timezone": null }));
        assert!(props.get("timezone").await.unwrap().is_none());
    }
}

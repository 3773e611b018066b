//! Scripted collaborators shared by the unit tests

use crate::config::MemoryProperties;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use gluco_glance_core::{DataClient, FetchError, PropertySource, Renderer, SettingsError};
use gluco_glance_types::{Direction, DisplayUnit, RawSetting, Reading};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// A reading observed at 2024-01-15 13:30 UTC
pub fn reading(value: f64, direction: Direction) -> Reading {
    let observed_at = Utc.with_ymd_and_hms(2024, 1, 15, 13, 30, 0).unwrap();
    Reading::new(value, direction, observed_at)
}

struct Script {
    queue: Mutex<VecDeque<Option<Reading>>>,
    default: Mutex<Reading>,
    unit: Mutex<Option<DisplayUnit>>,
    delay: Mutex<Option<Duration>>,
    fetches: AtomicUsize,
    unit_probes: AtomicUsize,
}

/// Data client that replays queued results, then a default reading
#[derive(Clone)]
pub struct ScriptedClient {
    script: Arc<Script>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Script {
                queue: Mutex::new(VecDeque::new()),
                default: Mutex::new(reading(120.0, Direction::Flat)),
                unit: Mutex::new(Some(DisplayUnit::MgDl)),
                delay: Mutex::new(None),
                fetches: AtomicUsize::new(0),
                unit_probes: AtomicUsize::new(0),
            }),
        }
    }

    pub fn with_default(self, reading: Reading) -> Self {
        self.set_default(reading);
        self
    }

    /// `None` makes every unit probe fail
    pub fn with_unit(self, unit: Option<DisplayUnit>) -> Self {
        *self.script.unit.lock().unwrap() = unit;
        self
    }

    /// Delay every reading response
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.script.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn set_default(&self, reading: Reading) {
        *self.script.default.lock().unwrap() = reading;
    }

    pub fn push_failure(&self) {
        self.script.queue.lock().unwrap().push_back(None);
    }

    pub fn fetches(&self) -> usize {
        self.script.fetches.load(Ordering::SeqCst)
    }

    pub fn unit_probes(&self) -> usize {
        self.script.unit_probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataClient for ScriptedClient {
    async fn fetch_current_reading(&self, _url: &str, _token: &str) -> Result<Reading, FetchError> {
        self.script.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.script.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.queue.lock().unwrap().pop_front();
        match next {
            Some(Some(reading)) => Ok(reading),
            Some(None) => Err(FetchError::Network("scripted failure".to_string())),
            None => Ok(self.script.default.lock().unwrap().clone()),
        }
    }

    async fn fetch_display_unit(&self, _url: &str, _token: &str) -> Result<DisplayUnit, FetchError> {
        self.script.unit_probes.fetch_add(1, Ordering::SeqCst);
        let unit = *self.script.unit.lock().unwrap();
        unit.ok_or_else(|| FetchError::Format("no units in status".to_string()))
    }
}

/// Settings store that is always down
pub struct FailingProperties;

#[async_trait]
impl PropertySource for FailingProperties {
    async fn get(&self, _key: &str) -> Result<Option<RawSetting>, SettingsError> {
        Err(SettingsError::Unavailable("scripted outage".to_string()))
    }
}

/// In-memory settings store that can be taken offline or slowed down
#[derive(Default)]
pub struct ControlledProperties {
    values: MemoryProperties,
    offline: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl ControlledProperties {
    pub fn new(document: serde_json::Value) -> Self {
        Self {
            values: MemoryProperties::from_json(document),
            ..Self::default()
        }
    }

    pub fn set(&self, key: &str, value: serde_json::Value) {
        self.values.set(key, value);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delay every read
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait]
impl PropertySource for ControlledProperties {
    async fn get(&self, key: &str) -> Result<Option<RawSetting>, SettingsError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(SettingsError::Unavailable("store offline".to_string()));
        }
        self.values.get(key).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Show(String),
    Clear,
}

/// Renderer that records every call with the (paused-clock) time it happened
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    calls: Arc<Mutex<Vec<(Instant, RenderCall)>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(Instant, RenderCall)> {
        self.calls.lock().unwrap().clone()
    }

    /// Texts shown so far, in order
    pub fn shown(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(_, call)| match call {
                RenderCall::Show(text) => Some(text.clone()),
                RenderCall::Clear => None,
            })
            .collect()
    }

    pub fn clears(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, call)| *call == RenderCall::Clear)
            .count()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Renderer for RecordingRenderer {
    fn show_text(&self, text: &str) {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), RenderCall::Show(text.to_string())));
    }

    fn clear(&self) {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), RenderCall::Clear));
    }
}

//! Display scheduler: the lifecycle entry points the host calls
//!
//! The scheduler turns transport events into session-task events and owns
//! the services every session task shares (resolver, data client, alert
//! policy, timings).

use super::registry::SessionRegistry;
use super::session::{SessionEvent, SessionHandles, SessionState};
use super::session_task::SessionTask;
use crate::alerts::AlertPolicy;
use crate::assistant::{self, GlucoseSummary};
use crate::config::{AppConfig, SchedulerTimings, SettingsResolver, UnitCache};
use dashmap::DashMap;
use gluco_glance_core::{DataClient, GlanceError};
use gluco_glance_types::Configuration;
use log::{debug, info};
use std::sync::Arc;

/// Services shared by every session
pub struct Services {
    pub resolver: SettingsResolver,
    pub client: Arc<dyn DataClient>,
    pub policy: AlertPolicy,
    pub timings: SchedulerTimings,
    /// Last complete configuration seen per user, for assistant queries
    /// that arrive without an active session
    pub user_configs: DashMap<String, Arc<Configuration>>,
}

pub struct DisplayScheduler {
    services: Arc<Services>,
    registry: Arc<SessionRegistry>,
}

impl DisplayScheduler {
    pub fn new(
        client: Arc<dyn DataClient>,
        registry: Arc<SessionRegistry>,
        config: &AppConfig,
    ) -> Self {
        let timings = config.timings.clone();
        let resolver = SettingsResolver::new(
            Arc::clone(&client),
            Arc::new(UnitCache::new()),
            timings.settings_cache_ttl(),
        );
        let services = Services {
            resolver,
            client,
            policy: AlertPolicy::new(timings.alert_cooldown()),
            timings,
            user_configs: DashMap::new(),
        };
        Self {
            services: Arc::new(services),
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    /// Start a session and spawn its task. A live session with the same id
    /// is shut down and replaced.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_session_start(
        &self,
        session_id: &str,
        user_id: &str,
        handles: SessionHandles,
    ) -> Arc<SessionState> {
        let (state, events) = SessionState::new(session_id, user_id);
        if let Some(previous) = self.registry.create(Arc::clone(&state)) {
            info!("Session {} restarted, replacing previous task", session_id);
            previous.shutdown();
        }
        self.services.resolver.invalidate(session_id);

        let task = SessionTask::new(
            Arc::clone(&self.services),
            Arc::clone(&self.registry),
            Arc::clone(&state),
            handles,
            events,
        );
        state.attach_task(tokio::spawn(task.run()));
        state
    }

    pub fn on_button_press(&self, session_id: &str) -> bool {
        self.send(session_id, SessionEvent::ButtonPress)
    }

    pub fn on_voice_command(&self, session_id: &str, transcript: &str) -> bool {
        self.send(session_id, SessionEvent::VoiceCommand(transcript.to_string()))
    }

    /// Invalidate the cached configuration right away, then let the session
    /// task re-resolve it
    pub fn on_settings_changed(&self, session_id: &str, key: &str, value: serde_json::Value) -> bool {
        self.services.resolver.invalidate(session_id);
        self.send(
            session_id,
            SessionEvent::SettingsChanged {
                key: key.to_string(),
                value,
            },
        )
    }

    /// Cancel every timer of a session and drop it. Idempotent; returns
    /// whether a session was actually removed.
    pub fn on_session_end(&self, session_id: &str) -> bool {
        match self.registry.remove(session_id) {
            Some(state) => {
                state.shutdown();
                self.services.resolver.invalidate(session_id);
                info!(
                    "Session {} ended, {} session(s) active",
                    session_id,
                    self.registry.len()
                );
                true
            }
            None => {
                debug!("Session {} already ended", session_id);
                false
            }
        }
    }

    /// Read-only glucose snapshot for the assistant tool
    pub async fn glucose_summary(&self, user_id: &str, language: Option<&str>) -> GlucoseSummary {
        assistant::glucose_summary(&self.services, &self.registry, user_id, language).await
    }

    /// Number of live sessions, for health reporting
    pub fn active_sessions(&self) -> usize {
        self.registry.len()
    }

    /// End every session, e.g. on process shutdown
    pub fn shutdown_all(&self) {
        for session_id in self.registry.session_ids() {
            self.on_session_end(&session_id);
        }
    }

    fn send(&self, session_id: &str, event: SessionEvent) -> bool {
        match self.registry.get(session_id) {
            Some(state) => state.send(event),
            None => {
                debug!(
                    "Dropping {:?}: {}",
                    event,
                    GlanceError::SessionNotFound(session_id.to_string())
                );
                false
            }
        }
    }
}

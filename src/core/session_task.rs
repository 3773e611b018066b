//! The per-session display state machine
//!
//! Each session runs one task that owns every timer of that session: the
//! periodic refresh, the pending hide deadline, and the inactivity cleanup.
//! All of them are polled from a single `select!` loop together with the
//! session's event queue, so re-arming the hide deadline simply replaces the
//! stored instant and the old deadline can never fire afterwards.

use super::commands::is_glucose_request;
use super::registry::SessionRegistry;
use super::scheduler::Services;
use super::session::{
    ArmedTimers, DisplayPhase, SessionEvent, SessionHandles, SessionState,
};
use crate::config::{keys, Resolved};
use crate::format::{self, locale};
use gluco_glance_core::{FetchError, GlanceError};
use gluco_glance_types::{mask_secret, Configuration, RawSetting, Reading};
use log::{debug, info, trace, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn refresh_period(minutes: u32) -> Duration {
    Duration::from_secs(u64::from(minutes.max(1)) * 60)
}

pub(crate) struct SessionTask {
    services: Arc<Services>,
    registry: Arc<SessionRegistry>,
    state: Arc<SessionState>,
    handles: SessionHandles,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    cancel: CancellationToken,
    config: Arc<Configuration>,
    phase: DisplayPhase,
    refresh: Option<Interval>,
    refresh_minutes: u32,
    cleanup_at: Option<Instant>,
    last_alert_fired_at: Option<Instant>,
}

impl SessionTask {
    pub(crate) fn new(
        services: Arc<Services>,
        registry: Arc<SessionRegistry>,
        state: Arc<SessionState>,
        handles: SessionHandles,
        events: mpsc::UnboundedReceiver<SessionEvent>,
    ) -> Self {
        let cancel = state.cancel_token();
        Self {
            services,
            registry,
            state,
            handles,
            events,
            cancel,
            config: Arc::new(Configuration::default()),
            phase: DisplayPhase::Idle,
            refresh: None,
            refresh_minutes: 0,
            cleanup_at: None,
            last_alert_fired_at: None,
        }
    }

    fn id(&self) -> &str {
        &self.state.session_id
    }

    /// Drive the session until it is cancelled, cleaned up, or its event
    /// queue closes
    pub(crate) async fn run(mut self) {
        self.start().await;

        loop {
            let hide_at = self.phase.deadline();
            let cleanup_at = self.cleanup_at;

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break,
                _ = sleep_until_opt(cleanup_at) => {
                    info!("Session {} inactive, cleaning up", self.id());
                    self.registry.remove_if_same(&self.state);
                    self.services.resolver.invalidate(&self.state.session_id);
                    self.state.shutdown();
                    break;
                }
                _ = sleep_until_opt(hide_at) => self.hide(),
                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
                _ = next_tick(&mut self.refresh) => self.on_periodic_tick().await,
            }
        }

        self.teardown();
    }

    async fn start(&mut self) {
        info!(
            "Session {} started for user {}",
            self.state.session_id, self.state.user_id
        );
        if !self.handles.supports_disconnect {
            debug!(
                "Session {} transport has no disconnect signal, arming inactivity cleanup",
                self.id()
            );
            self.touch_cleanup();
        }

        let Some(resolved) = self.resolve(true).await else {
            return;
        };
        self.apply(resolved);
        if !self.config.is_complete() {
            self.enter_needs_configuration();
            return;
        }
        self.begin_monitoring().await;
    }

    /// Show a first reading and arm the refresh loop
    async fn begin_monitoring(&mut self) {
        self.arm_refresh();
        let duration = self.services.timings.initial_display();
        match self.fetch().await {
            Some(reading) => self.show_reading(&reading, duration),
            None => self.show_message(locale::data_unavailable(self.config.language), duration),
        }
    }

    async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::ButtonPress => {
                debug!("Session {} button press", self.id());
                self.on_user_interaction().await;
            }
            SessionEvent::VoiceCommand(transcript) => {
                if is_glucose_request(&transcript) {
                    debug!("Session {} voice request: {}", self.id(), transcript);
                    self.on_user_interaction().await;
                } else {
                    trace!("Session {} ignoring transcript: {}", self.id(), transcript);
                }
            }
            SessionEvent::SettingsChanged { key, value } => {
                self.on_settings_changed(&key, value).await;
            }
        }
    }

    async fn on_periodic_tick(&mut self) {
        let Some(resolved) = self.resolve(false).await else {
            return;
        };
        if resolved.read_failed && self.config.is_complete() {
            warn!(
                "Session {} settings unavailable, skipping refresh with previous configuration",
                self.id()
            );
            return;
        }
        self.apply(resolved);
        if !self.config.is_complete() {
            self.enter_needs_configuration();
            return;
        }

        let Some(reading) = self.fetch().await else {
            return;
        };

        if self.config.alerts_enabled {
            let now = Instant::now();
            let decision = self.services.policy.evaluate(
                &reading,
                &self.config,
                self.last_alert_fired_at,
                now,
            );
            if decision.fire {
                if let Some(message) = decision.message {
                    warn!(
                        "Session {} alert: {} ({} mg/dL)",
                        self.id(),
                        decision.severity.label(),
                        reading.value
                    );
                    self.last_alert_fired_at = Some(now);
                    self.state
                        .publish(|snapshot| snapshot.last_alert_fired_at = Some(now));
                    let hide_at = now + self.services.timings.alert_display(decision.severity);
                    self.render(&message);
                    self.set_phase(DisplayPhase::AlertShowing {
                        severity: decision.severity,
                        hide_at,
                    });
                    return;
                }
            } else if decision.suppress_until.is_some() {
                trace!(
                    "Session {} {} reading suppressed by cooldown",
                    self.id(),
                    decision.severity.label()
                );
            }
        }

        if self.config.show_on_refresh && !matches!(self.phase, DisplayPhase::AlertShowing { .. }) {
            let duration = self.services.timings.initial_display();
            self.show_reading(&reading, duration);
        } else {
            trace!("Session {} silent refresh: {} mg/dL", self.id(), reading.value);
        }
    }

    async fn on_user_interaction(&mut self) {
        if self.cleanup_at.is_some() {
            self.touch_cleanup();
        }

        let Some(resolved) = self.resolve(true).await else {
            return;
        };
        let was_configured = !matches!(self.phase, DisplayPhase::NeedsConfiguration);
        self.apply(resolved);
        if !self.config.is_complete() {
            self.enter_needs_configuration();
            return;
        }
        if !was_configured || self.refresh.is_none() {
            self.arm_refresh();
        }

        let duration = self.services.timings.interaction_display();
        match self.fetch().await {
            Some(reading) => self.show_reading(&reading, duration),
            None => self.show_message(locale::data_unavailable(self.config.language), duration),
        }
    }

    async fn on_settings_changed(&mut self, key: &str, value: serde_json::Value) {
        let text = RawSetting::from_json(value)
            .and_then(|raw| raw.as_text())
            .unwrap_or_default();
        if key == keys::TOKEN {
            info!("Session {} setting '{}' changed to {}", self.id(), key, mask_secret(&text));
        } else {
            info!("Session {} setting '{}' changed to '{}'", self.id(), key, text);
        }
        if key == keys::URL {
            self.services.resolver.units().invalidate(&self.config.data_source_url);
        }

        let Some(resolved) = self.resolve(true).await else {
            return;
        };
        let needed_configuration = matches!(self.phase, DisplayPhase::NeedsConfiguration);
        self.apply(resolved);

        match (needed_configuration, self.config.is_complete()) {
            (true, true) => {
                info!("Session {} configured, starting monitoring", self.id());
                self.set_phase(DisplayPhase::Idle);
                self.begin_monitoring().await;
            }
            (_, false) => self.enter_needs_configuration(),
            (false, true) => {}
        }
    }

    /// Resolve the configuration, or `None` once the session is cancelled.
    /// A resolution still in flight at that point is dropped before it can
    /// write to the resolver cache.
    async fn resolve(&self, force_refresh: bool) -> Option<Resolved> {
        let resolution = self.services.resolver.resolve(
            &self.state.session_id,
            self.handles.properties.as_ref(),
            force_refresh,
        );
        tokio::select! {
            biased;

            _ = self.cancel.cancelled() => {
                debug!("Session {} ended during settings resolution", self.id());
                None
            }
            resolved = resolution => Some(resolved),
        }
    }

    /// Adopt a freshly resolved configuration and publish it
    fn apply(&mut self, resolved: Resolved) {
        let interval_changed = self.refresh.is_some()
            && resolved.config.refresh_interval_minutes != self.refresh_minutes;
        self.config = Arc::clone(&resolved.config);

        if self.config.is_complete() {
            self.services
                .user_configs
                .insert(self.state.user_id.clone(), Arc::clone(&self.config));
        }
        if interval_changed {
            info!(
                "Session {} refresh interval now {} min",
                self.id(),
                self.config.refresh_interval_minutes
            );
            self.arm_refresh();
        }

        let config = Arc::clone(&self.config);
        self.state.publish(|snapshot| {
            snapshot.configuration = config;
            snapshot.resolved_at = Some(resolved.resolved_at);
        });
    }

    /// Fetch the current reading. Failures and cancellation yield `None`;
    /// a response that arrives after cancellation is dropped.
    async fn fetch(&self) -> Option<Reading> {
        let config = Arc::clone(&self.config);
        let timeout = self.services.timings.fetch_timeout();
        let request = self
            .services
            .client
            .fetch_current_reading(&config.data_source_url, &config.data_source_token);

        let outcome = tokio::select! {
            biased;

            _ = self.cancel.cancelled() => {
                debug!("Session {} ended during fetch, discarding response", self.id());
                return None;
            }
            outcome = tokio::time::timeout(timeout, request) => outcome,
        };

        let result = outcome.unwrap_or(Err(FetchError::Timeout(timeout)));
        match result {
            Ok(reading) => {
                let published = reading.clone();
                self.state
                    .publish(|snapshot| snapshot.last_reading = Some(published));
                Some(reading)
            }
            Err(e) => {
                warn!("Session {}: {}", self.id(), GlanceError::from(e));
                None
            }
        }
    }

    fn show_reading(&mut self, reading: &Reading, duration: Duration) {
        let line = format::format(reading, &self.config);
        self.show_message(&line.text(), duration);
    }

    /// Render `text` and (re)arm the hide deadline, replacing any pending one
    fn show_message(&mut self, text: &str, duration: Duration) {
        self.render(text);
        self.set_phase(DisplayPhase::ShowingTemporary {
            hide_at: Instant::now() + duration,
        });
    }

    fn enter_needs_configuration(&mut self) {
        if self.refresh.take().is_some() {
            debug!("Session {} refresh stopped, configuration incomplete", self.id());
        }
        info!("Session {}: {}", self.id(), GlanceError::ConfigurationIncomplete);
        self.render(locale::configuration_needed(self.config.language));
        self.set_phase(DisplayPhase::NeedsConfiguration);
    }

    fn hide(&mut self) {
        trace!("Session {} hide deadline reached", self.id());
        if !self.cancel.is_cancelled() {
            self.handles.renderer.clear();
        }
        self.set_phase(DisplayPhase::Idle);
    }

    fn render(&self, text: &str) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.handles.renderer.show_text(text);
    }

    fn arm_refresh(&mut self) {
        let minutes = self.config.refresh_interval_minutes;
        let period = refresh_period(minutes);
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.refresh = Some(interval);
        self.refresh_minutes = minutes;
        self.publish_timers();
    }

    fn touch_cleanup(&mut self) {
        self.cleanup_at = Some(Instant::now() + self.services.timings.session_cleanup());
        self.publish_timers();
    }

    fn set_phase(&mut self, phase: DisplayPhase) {
        self.phase = phase;
        self.state.publish(|snapshot| snapshot.phase = phase);
        self.publish_timers();
    }

    fn publish_timers(&self) {
        let timers = ArmedTimers {
            refresh: self.refresh.is_some(),
            hide: self.phase.deadline().is_some(),
            cleanup: self.cleanup_at.is_some(),
        };
        self.state.publish(|snapshot| snapshot.timers = timers);
    }

    fn teardown(&mut self) {
        let replaced = self
            .registry
            .get(&self.state.session_id)
            .is_some_and(|current| !Arc::ptr_eq(&current, &self.state));
        if !replaced {
            self.services.resolver.invalidate(&self.state.session_id);
        }
        self.refresh = None;
        self.cleanup_at = None;
        self.phase = DisplayPhase::Idle;
        let phase = self.phase;
        self.state.publish(|snapshot| {
            snapshot.phase = phase;
            snapshot.timers = ArmedTimers::default();
        });
        debug!("Session {} task stopped", self.id());
    }
}

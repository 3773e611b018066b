//! Per-session state shared between the registry and the session task

use arc_swap::ArcSwap;
use gluco_glance_core::{PropertySource, Renderer};
use gluco_glance_types::{Configuration, Reading, Severity};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Host-provided handles for one wearable session
#[derive(Clone)]
pub struct SessionHandles {
    pub properties: Arc<dyn PropertySource>,
    pub renderer: Arc<dyn Renderer>,
    /// Whether the transport delivers a disconnect event. When false the
    /// session cleans itself up after a period of inactivity.
    pub supports_disconnect: bool,
}

/// Display state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayPhase {
    /// Nothing on screen
    #[default]
    Idle,
    /// A reading is on screen until `hide_at`
    ShowingTemporary { hide_at: Instant },
    /// An alert interrupts whatever was shown, until `hide_at`
    AlertShowing { severity: Severity, hide_at: Instant },
    /// No data source configured; the setup message stays on screen
    NeedsConfiguration,
}

impl DisplayPhase {
    /// Pending hide deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        match self {
            DisplayPhase::ShowingTemporary { hide_at } => Some(*hide_at),
            DisplayPhase::AlertShowing { hide_at, .. } => Some(*hide_at),
            DisplayPhase::Idle | DisplayPhase::NeedsConfiguration => None,
        }
    }
}

/// Which timers the session task currently has armed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArmedTimers {
    pub refresh: bool,
    pub hide: bool,
    pub cleanup: bool,
}

impl ArmedTimers {
    pub fn count(&self) -> usize {
        [self.refresh, self.hide, self.cleanup]
            .into_iter()
            .filter(|armed| *armed)
            .count()
    }
}

/// Point-in-time view of a session, published by its task
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub configuration: Arc<Configuration>,
    pub resolved_at: Option<Instant>,
    pub last_reading: Option<Reading>,
    pub last_alert_fired_at: Option<Instant>,
    pub phase: DisplayPhase,
    pub timers: ArmedTimers,
}

/// Events delivered to a session task
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ButtonPress,
    VoiceCommand(String),
    SettingsChanged { key: String, value: serde_json::Value },
}

/// Registry entry for one session.
///
/// The session task is the only writer of the snapshot; everyone else reads
/// it lock-free.
pub struct SessionState {
    pub session_id: String,
    pub user_id: String,
    snapshot: ArcSwap<SessionSnapshot>,
    events: mpsc::UnboundedSender<SessionEvent>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionState {
    pub(crate) fn new(
        session_id: &str,
        user_id: &str,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(Self {
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            snapshot: ArcSwap::from_pointee(SessionSnapshot::default()),
            events: tx,
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
        });
        (state, rx)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.snapshot.load_full()
    }

    pub(crate) fn publish(&self, update: impl FnOnce(&mut SessionSnapshot)) {
        let mut next = SessionSnapshot::clone(&self.snapshot.load());
        update(&mut next);
        self.snapshot.store(Arc::new(next));
    }

    pub(crate) fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub(crate) fn attach_task(&self, handle: JoinHandle<()>) {
        if let Ok(mut task) = self.task.lock() {
            *task = Some(handle);
        }
    }

    /// Queue an event for the session task. Returns false once the session
    /// has shut down.
    pub fn send(&self, event: SessionEvent) -> bool {
        !self.cancel.is_cancelled() && self.events.send(event).is_ok()
    }

    /// Stop the session task. Safe to call any number of times.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Wait for the session task to exit. Must not be called from the task
    /// itself.
    pub async fn stopped(&self) {
        let handle = self.task.lock().ok().and_then(|mut task| task.take());
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                log::warn!("Session task {} ended abnormally: {}", self.session_id, e);
            }
        }
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("active", &self.is_active())
            .finish()
    }
}

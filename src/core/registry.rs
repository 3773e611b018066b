//! Registry of live sessions
//!
//! A concurrent map of session id → [`SessionState`]. The registry is
//! injected into the scheduler rather than living in a global, so tests and
//! embedders can run independent engines side by side.

use super::session::SessionState;
use dashmap::DashMap;
use log::debug;
use std::sync::Arc;

pub struct SessionRegistry {
    sessions: DashMap<String, Arc<SessionState>>,
}

impl SessionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Insert a session, returning the entry it replaced (if any)
    pub fn create(&self, state: Arc<SessionState>) -> Option<Arc<SessionState>> {
        let previous = self.sessions.insert(state.session_id.clone(), state);
        debug!("Registry now holds {} session(s)", self.sessions.len());
        previous
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<SessionState>> {
        self.sessions
            .get(session_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, session_id: &str) -> Option<Arc<SessionState>> {
        self.sessions.remove(session_id).map(|(_, state)| state)
    }

    /// Remove the entry only if it is still `state`, not a newer session
    /// that reused the id
    pub fn remove_if_same(&self, state: &Arc<SessionState>) -> bool {
        self.sessions
            .remove_if(&state.session_id, |_, current| Arc::ptr_eq(current, state))
            .is_some()
    }

    /// Call `f` for every session belonging to `user_id`.
    ///
    /// Matches are collected before `f` runs, so `f` may create or remove
    /// sessions freely.
    pub fn for_each_by_user(&self, user_id: &str, mut f: impl FnMut(&Arc<SessionState>)) {
        let matches: Vec<Arc<SessionState>> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        for state in &matches {
            f(state);
        }
    }

    /// First active session for a user
    pub fn find_by_user(&self, user_id: &str) -> Option<Arc<SessionState>> {
        let mut found = None;
        self.for_each_by_user(user_id, |state| {
            if found.is_none() && state.is_active() {
                found = Some(Arc::clone(state));
            }
        });
        found
    }

    /// List all session IDs
    pub fn session_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

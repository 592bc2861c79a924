use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use crate::application::SessionObserver;
use crate::domain::SessionState;

/// Number of past states kept by [`SessionStore::history`].
pub const HISTORY_LIMIT: usize = 64;

/// Shared copy of the latest session state, for presentation code that polls
/// rather than reacts. Cloning shares the same underlying state.
#[derive(Clone, Default)]
pub struct SessionStore {
    state: Arc<RwLock<SessionState>>,
    updates: Arc<RwLock<VecDeque<SessionState>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The most recent states, oldest first. At most [`HISTORY_LIMIT`].
    pub fn history(&self) -> Vec<SessionState> {
        self.updates
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .cloned()
            .collect()
    }
}

impl SessionObserver for SessionStore {
    fn on_state_change(&self, state: &SessionState) {
        *self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = state.clone();

        let mut updates = self
            .updates
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if updates.len() == HISTORY_LIMIT {
            updates.pop_front();
        }
        updates.push_back(state.clone());
    }
}

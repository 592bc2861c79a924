use crate::domain::SessionState;

/// Receives every session state transition written by the orchestrator.
///
/// The presentation layer implements this to mirror `loading`, `reply` and
/// `error` into whatever state mechanism it uses.
pub trait SessionObserver: Send + Sync {
    fn on_state_change(&self, state: &SessionState);
}

/// Observer that discards all updates.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_state_change(&self, _state: &SessionState) {}
}

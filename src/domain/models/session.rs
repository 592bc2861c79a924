use serde::{Deserialize, Serialize};

/// Presentation-facing state of the current submission.
///
/// At most one of `reply` and `error` is non-empty, and `loading` is only
/// true between submission and the terminal outcome. The transition methods
/// are the only way to change it, which keeps both invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    loading: bool,
    reply: String,
    error: String,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the in-flight state, clearing any previous outcome.
    pub fn begin(&mut self) {
        self.loading = true;
        self.reply.clear();
        self.error.clear();
    }

    pub fn succeed(&mut self, reply: impl Into<String>) {
        self.loading = false;
        self.reply = reply.into();
        self.error.clear();
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.loading = false;
        self.reply.clear();
        self.error = error.into();
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn reply(&self) -> &str {
        &self.reply
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn has_reply(&self) -> bool {
        !self.reply.is_empty()
    }

    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }
}

use crate::application::SessionObserver;
use crate::domain::SessionState;

/// Renders session transitions to stdout for the interactive chat.
pub struct ConsoleObserver;

impl ConsoleObserver {
    pub fn new() -> Self {
        Self
    }

    pub fn render(state: &SessionState) -> Option<String> {
        if state.loading() {
            Some("Thinking...".to_string())
        } else if state.has_error() {
            Some(format!("Error: {}", state.error()))
        } else if state.has_reply() {
            Some(state.reply().to_string())
        } else {
            None
        }
    }
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionObserver for ConsoleObserver {
    fn on_state_change(&self, state: &SessionState) {
        if let Some(line) = Self::render(state) {
            println!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_follows_state() {
        let mut state = SessionState::new();
        assert_eq!(ConsoleObserver::render(&state), None);

        state.begin();
        assert_eq!(ConsoleObserver::render(&state).as_deref(), Some("Thinking..."));

        state.fail("boom");
        assert_eq!(ConsoleObserver::render(&state).as_deref(), Some("Error: boom"));

        state.begin();
        state.succeed("Hi there");
        assert_eq!(ConsoleObserver::render(&state).as_deref(), Some("Hi there"));
    }
}

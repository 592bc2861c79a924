use std::sync::Arc;

use anyhow::{bail, Result};

use crate::connector::SessionStore;
use crate::domain::SessionState;

use super::super::Container;

pub struct AskController<'a> {
    container: &'a Container,
}

impl<'a> AskController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Submit one prompt and return the reply. A failed submission becomes an
    /// error carrying the session's error text.
    pub async fn ask(&self, prompt: String) -> Result<String> {
        let store = SessionStore::new();
        let use_case = self.container.submit_use_case(Arc::new(store.clone()))?;

        use_case.submit_prompt(&prompt).await;

        self.format_session(&store.snapshot())
    }

    fn format_session(&self, state: &SessionState) -> Result<String> {
        if state.has_error() {
            bail!("{}", state.error());
        }
        Ok(state.reply().to_string())
    }
}

use serde::{Deserialize, Serialize};

/// Message shown when a submission contains nothing but whitespace.
pub const EMPTY_PROMPT_MESSAGE: &str = "Please type something first!";

/// A validated user prompt. The text is trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    text: String,
}

impl PromptRequest {
    /// Returns `None` when `raw` is empty or whitespace-only.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            text: trimmed.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

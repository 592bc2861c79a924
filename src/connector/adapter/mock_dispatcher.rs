use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::application::CompletionDispatcher;
use crate::domain::{CompletionResult, ModelEndpoint};

/// Offline dispatcher. Models with a scripted result return it; every other
/// model echoes the prompt back. Calls are recorded in order.
pub struct MockDispatcher {
    scripted: HashMap<String, CompletionResult>,
    calls: Mutex<Vec<String>>,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self {
            scripted: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_result(mut self, model_id: impl Into<String>, result: CompletionResult) -> Self {
        self.scripted.insert(model_id.into(), result);
        self
    }

    /// Model ids in the order they were called.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    fn echo(model_id: &str, prompt: &str) -> String {
        format!("[{model_id}] {prompt}")
    }
}

impl Default for MockDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionDispatcher for MockDispatcher {
    async fn call(&self, endpoint: &ModelEndpoint, prompt: &str) -> CompletionResult {
        let model = endpoint.model_id();
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(model.to_string());

        let result = self
            .scripted
            .get(model)
            .cloned()
            .unwrap_or_else(|| CompletionResult::success(Self::echo(model, prompt)));

        debug!("MockDispatcher: {} -> success={}", model, result.is_success());
        result
    }
}

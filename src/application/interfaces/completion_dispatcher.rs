use async_trait::async_trait;

use crate::domain::{CompletionResult, ModelEndpoint};

/// Performs a single completion attempt against one endpoint.
///
/// Implementors own transport and wire-format details. Every outcome,
/// including transport faults, comes back as a [`CompletionResult`]; there is
/// no error channel, so the orchestrator can always move on to the next
/// endpoint.
#[async_trait]
pub trait CompletionDispatcher: Send + Sync {
    /// Send `prompt` to `endpoint` exactly once. `prompt` is already trimmed
    /// and non-empty.
    async fn call(&self, endpoint: &ModelEndpoint, prompt: &str) -> CompletionResult;
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::application::{
    CompletionDispatcher, OverlapPolicy, SessionObserver, SubmitPromptUseCase,
};
use crate::connector::{GeminiDispatcher, MockDispatcher};
use crate::domain::{ModelEndpoint, DEFAULT_MODELS, DEFAULT_URL_TEMPLATE};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODELS_ENV: &str = "PROMPTCHAIN_MODELS";
pub const URL_TEMPLATE_ENV: &str = "GEMINI_URL_TEMPLATE";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct ContainerConfig {
    /// Credential sent as the `key` query parameter. Never logged.
    pub api_key: String,
    /// Fallback chain, preferred model first.
    pub models: Vec<String>,
    pub url_template: String,
    pub timeout_secs: u64,
    /// Use the offline echo dispatcher instead of the HTTP service.
    pub mock: bool,
    pub overlap_policy: OverlapPolicy,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            mock: false,
            overlap_policy: OverlapPolicy::default(),
        }
    }
}

impl ContainerConfig {
    /// Construct from environment variables, falling back to defaults:
    ///
    /// | Variable              | Default                                   |
    /// |-----------------------|-------------------------------------------|
    /// | `GEMINI_API_KEY`      | `""` (empty)                              |
    /// | `PROMPTCHAIN_MODELS`  | `gemini-1.5-pro-latest,gemini-1.0-pro,gemini-pro` |
    /// | `GEMINI_URL_TEMPLATE` | Gemini `generateContent` URL with `{model}` |
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            config.api_key = key;
        }
        if let Ok(models) = std::env::var(MODELS_ENV) {
            let models = parse_model_list(&models);
            if !models.is_empty() {
                config.models = models;
            }
        }
        if let Ok(template) = std::env::var(URL_TEMPLATE_ENV) {
            config.url_template = template;
        }
        config
    }
}

/// Split a comma-separated model list, dropping blanks.
pub fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct Container {
    dispatcher: Arc<dyn CompletionDispatcher>,
    endpoints: Vec<ModelEndpoint>,
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self> {
        let endpoints = ModelEndpoint::chain(
            config.models.iter().cloned(),
            &config.url_template,
            &config.api_key,
        )?;

        let dispatcher: Arc<dyn CompletionDispatcher> = if config.mock {
            debug!("Using mock dispatcher");
            Arc::new(MockDispatcher::new())
        } else {
            debug!(
                "Using Gemini dispatcher ({}s timeout, {} models)",
                config.timeout_secs,
                endpoints.len()
            );
            Arc::new(GeminiDispatcher::with_timeout(Duration::from_secs(
                config.timeout_secs,
            )))
        };

        Ok(Self::with_dispatcher(dispatcher, endpoints, config))
    }

    /// Wire an explicit dispatcher, bypassing the one selected by `config`.
    pub fn with_dispatcher(
        dispatcher: Arc<dyn CompletionDispatcher>,
        endpoints: Vec<ModelEndpoint>,
        config: ContainerConfig,
    ) -> Self {
        Self {
            dispatcher,
            endpoints,
            config,
        }
    }

    pub fn submit_use_case(
        &self,
        observer: Arc<dyn SessionObserver>,
    ) -> Result<SubmitPromptUseCase> {
        let use_case = SubmitPromptUseCase::new(self.dispatcher.clone(), self.endpoints.clone())?
            .with_observer(observer)
            .with_overlap_policy(self.config.overlap_policy);
        Ok(use_case)
    }

    pub fn endpoints(&self) -> &[ModelEndpoint] {
        &self.endpoints
    }

    pub fn has_api_key(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    pub fn mock(&self) -> bool {
        self.config.mock
    }

    pub fn overlap_policy(&self) -> OverlapPolicy {
        self.config.overlap_policy
    }
}

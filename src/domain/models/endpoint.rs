use std::fmt;

use crate::domain::DomainError;

/// Placeholder substituted with the model identifier when rendering an endpoint URL.
pub const MODEL_PLACEHOLDER: &str = "{model}";

/// Default URL template for the Gemini `generateContent` API.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent";

/// Default fallback chain, preferred model first.
pub const DEFAULT_MODELS: &[&str] = &["gemini-1.5-pro-latest", "gemini-1.0-pro", "gemini-pro"];

/// One way to reach the completion service: a model identifier, the URL
/// template it is rendered into, and the credential sent with the request.
///
/// Endpoints are built once at startup and never mutated. Their order in the
/// fallback chain defines priority.
#[derive(Clone, PartialEq, Eq)]
pub struct ModelEndpoint {
    model_id: String,
    url_template: String,
    credential: String,
}

impl ModelEndpoint {
    pub fn new(
        model_id: impl Into<String>,
        url_template: impl Into<String>,
        credential: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let model_id: String = model_id.into();
        let url_template: String = url_template.into();

        if model_id.trim().is_empty() {
            return Err(DomainError::invalid_input("model id must not be empty"));
        }
        if !url_template.contains(MODEL_PLACEHOLDER) {
            return Err(DomainError::configuration(format!(
                "URL template '{url_template}' has no {MODEL_PLACEHOLDER} placeholder"
            )));
        }

        Ok(Self {
            model_id: model_id.trim().to_string(),
            url_template,
            credential: credential.into(),
        })
    }

    /// Build an ordered chain sharing one URL template and credential.
    pub fn chain<I, S>(
        model_ids: I,
        url_template: &str,
        credential: &str,
    ) -> Result<Vec<Self>, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        model_ids
            .into_iter()
            .map(|id| Self::new(id, url_template, credential))
            .collect()
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// The template with the model identifier substituted in. The credential
    /// is not part of the returned URL.
    pub fn url(&self) -> String {
        self.url_template.replace(MODEL_PLACEHOLDER, &self.model_id)
    }
}

// Keeps the credential out of logs and panic messages.
impl fmt::Debug for ModelEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelEndpoint")
            .field("model_id", &self.model_id)
            .field("url_template", &self.url_template)
            .field("credential", &"<redacted>")
            .finish()
    }
}

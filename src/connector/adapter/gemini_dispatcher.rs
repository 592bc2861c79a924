use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::CompletionDispatcher;
use crate::domain::{CompletionResult, ErrorKind, ModelEndpoint};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Query parameter carrying the credential; the service does not accept it as a header.
const CREDENTIAL_PARAM: &str = "key";
/// Used when the service reports an error object without a message.
const GENERIC_SERVICE_ERROR: &str = "API Error";

/// `generateContent` request payload.
#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    contents: Vec<ApiContent<'a>>,
}

#[derive(serde::Serialize)]
struct ApiContent<'a> {
    parts: Vec<ApiPart<'a>>,
}

#[derive(serde::Serialize)]
struct ApiPart<'a> {
    text: &'a str,
}

/// Reply path of the response. Every field is optional so that an unfamiliar
/// but valid JSON object is classified rather than rejected.
#[derive(Deserialize, Default)]
struct ApiResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl ApiResponse {
    fn first_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?
            .text
            .filter(|text| !text.is_empty())
    }
}

/// HTTP dispatcher for the Gemini `generateContent` API.
///
/// Sends one POST per call to the endpoint's rendered URL with the
/// credential in the `key` query parameter, and classifies the response with
/// [`classify_response`]. Transport faults become
/// [`ErrorKind::TransportError`] failures; nothing is retried here.
pub struct GeminiDispatcher {
    client: reqwest::Client,
}

impl GeminiDispatcher {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Use a caller-supplied client (proxy settings, custom TLS, tests).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for GeminiDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionDispatcher for GeminiDispatcher {
    async fn call(&self, endpoint: &ModelEndpoint, prompt: &str) -> CompletionResult {
        let model = endpoint.model_id();
        let request = ApiRequest {
            contents: vec![ApiContent {
                parts: vec![ApiPart { text: prompt }],
            }],
        };

        let response = match self
            .client
            .post(endpoint.url())
            .query(&[(CREDENTIAL_PARAM, endpoint.credential())])
            .json(&request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                // reqwest includes the full URL in its errors; drop it so the key stays out.
                let e = e.without_url();
                warn!("GeminiDispatcher: request to {model} failed: {e}");
                return CompletionResult::failure(ErrorKind::TransportError, e.to_string(), model);
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let e = e.without_url();
                warn!("GeminiDispatcher: failed to read response body from {model}: {e}");
                return CompletionResult::failure(ErrorKind::TransportError, e.to_string(), model);
            }
        };

        debug!("GeminiDispatcher: {model} returned {status} ({} bytes)", body.len());
        classify_response(status, &body, model)
    }
}

/// Turn a raw `(status, body)` pair into a [`CompletionResult`].
///
/// Pure and deterministic: the same inputs always give the same outcome.
/// The status is checked before the body is parsed.
pub fn classify_response(status: u16, body: &str, model: &str) -> CompletionResult {
    if !(200..300).contains(&status) {
        return CompletionResult::failure(
            ErrorKind::HttpError,
            format!("{status}: {body}"),
            model,
        );
    }

    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            return CompletionResult::failure(
                ErrorKind::MalformedResponse,
                format!("response is not valid JSON: {e}"),
                model,
            );
        }
    };

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        return CompletionResult::failure(
            ErrorKind::ServiceError,
            service_error_message(error),
            model,
        );
    }

    // Arrays, scalars and mistyped fields are valid JSON in the wrong shape.
    let parsed: ApiResponse = serde_json::from_value(value).unwrap_or_default();

    match parsed.first_text() {
        Some(text) => CompletionResult::success(text),
        None => CompletionResult::failure(
            ErrorKind::UnexpectedShape,
            "response has no candidates[0].content.parts[0].text",
            model,
        ),
    }
}

fn service_error_message(error: &serde_json::Value) -> String {
    match error.get("message").and_then(|m| m.as_str()) {
        Some(message) if !message.is_empty() => message.to_string(),
        Some(_) => GENERIC_SERVICE_ERROR.to_string(),
        None if error.is_object() => GENERIC_SERVICE_ERROR.to_string(),
        None => match error.as_str() {
            Some(message) if !message.is_empty() => message.to_string(),
            Some(_) => GENERIC_SERVICE_ERROR.to_string(),
            None => error.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUCCESS_BODY: &str = r#"{"candidates":[{"content":{"parts":[{"text":"hello"}]}}]}"#;

    #[test]
    fn request_body_matches_wire_format() {
        let request = ApiRequest {
            contents: vec![ApiContent {
                parts: vec![ApiPart { text: "hi" }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"contents": [{"parts": [{"text": "hi"}]}]}));
    }

    #[test]
    fn classify_extracts_reply_text() {
        let result = classify_response(200, SUCCESS_BODY, "m");
        assert_eq!(result, CompletionResult::success("hello"));
    }

    #[test]
    fn classify_non_2xx_as_http_error_with_status_and_body() {
        let body = r#"{"error":{"message":"model not found"}}"#;
        let result = classify_response(404, body, "gemini-pro");
        let failure = result.as_failure().unwrap();
        assert_eq!(failure.kind(), ErrorKind::HttpError);
        assert_eq!(failure.message(), format!("404: {body}"));
        assert_eq!(failure.attempted_model(), "gemini-pro");
    }

    #[test]
    fn classify_invalid_json_as_malformed() {
        let result = classify_response(200, "not-json", "m");
        assert_eq!(result.error_kind(), Some(ErrorKind::MalformedResponse));
    }

    #[test]
    fn classify_error_object_as_service_error() {
        let body = r#"{"error":{"code":400,"message":"quota exceeded"}}"#;
        let result = classify_response(200, body, "m");
        let failure = result.as_failure().unwrap();
        assert_eq!(failure.kind(), ErrorKind::ServiceError);
        assert_eq!(failure.message(), "quota exceeded");
    }

    #[test]
    fn classify_error_without_message_uses_generic_text() {
        let result = classify_response(200, r#"{"error":{"code":500}}"#, "m");
        assert_eq!(result.as_failure().unwrap().message(), GENERIC_SERVICE_ERROR);
    }

    #[test]
    fn classify_bare_error_value_without_json_quoting() {
        let result = classify_response(200, r#"{"error":"quota"}"#, "m");
        let failure = result.as_failure().unwrap();
        assert_eq!(failure.kind(), ErrorKind::ServiceError);
        assert_eq!(failure.message(), "quota");

        let result = classify_response(200, r#"{"error":429}"#, "m");
        assert_eq!(result.as_failure().unwrap().message(), "429");
    }

    #[test]
    fn classify_unrecognized_json_as_unexpected_shape() {
        for body in [
            "{}",
            "[]",
            "42",
            r#"{"candidates":[]}"#,
            r#"{"candidates":[{"content":{"parts":[]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#,
            r#"{"candidates":"nope"}"#,
        ] {
            let result = classify_response(200, body, "m");
            assert_eq!(result.error_kind(), Some(ErrorKind::UnexpectedShape), "body: {body}");
        }
    }

    #[test]
    fn classify_is_deterministic() {
        let cases = [
            (500, "boom"),
            (200, "not-json"),
            (200, r#"{"error":{"message":"x"}}"#),
            (200, "{}"),
            (200, SUCCESS_BODY),
        ];
        for (status, body) in cases {
            assert_eq!(
                classify_response(status, body, "m"),
                classify_response(status, body, "m")
            );
        }
    }
}

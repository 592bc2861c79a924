use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a failed submission or endpoint attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Empty or whitespace-only prompt; never reaches the network.
    ValidationError,
    /// Non-2xx HTTP status.
    HttpError,
    /// Body could not be parsed as JSON.
    MalformedResponse,
    /// Well-formed `error` object reported by the service.
    ServiceError,
    /// Valid JSON without the expected reply fields.
    UnexpectedShape,
    /// The request never produced an HTTP response (connect, DNS, timeout).
    TransportError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::HttpError => "HttpError",
            ErrorKind::MalformedResponse => "MalformedResponse",
            ErrorKind::ServiceError => "ServiceError",
            ErrorKind::UnexpectedShape => "UnexpectedShape",
            ErrorKind::TransportError => "TransportError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    kind: ErrorKind,
    message: String,
    attempted_model: String,
}

impl Failure {
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        attempted_model: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            attempted_model: attempted_model.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Empty for validation failures, which never reach an endpoint.
    pub fn attempted_model(&self) -> &str {
        &self.attempted_model
    }

    /// `"<Kind>: <message>"`, the form shown to the user.
    pub fn summary(&self) -> String {
        format!("{}: {}", self.kind, self.message)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attempted_model.is_empty() {
            write!(f, "{}", self.summary())
        } else {
            write!(f, "{} ({})", self.summary(), self.attempted_model)
        }
    }
}

/// Outcome of one attempt against one endpoint, or of a whole submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionResult {
    Success { reply_text: String },
    Failure(Failure),
}

impl CompletionResult {
    pub fn success(reply_text: impl Into<String>) -> Self {
        Self::Success {
            reply_text: reply_text.into(),
        }
    }

    pub fn failure(
        kind: ErrorKind,
        message: impl Into<String>,
        attempted_model: impl Into<String>,
    ) -> Self {
        Self::Failure(Failure::new(kind, message, attempted_model))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn reply_text(&self) -> Option<&str> {
        match self {
            Self::Success { reply_text } => Some(reply_text),
            Self::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.as_failure().map(Failure::kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_combines_kind_and_message() {
        let failure = Failure::new(ErrorKind::HttpError, "500: boom", "gemini-pro");
        assert_eq!(failure.summary(), "HttpError: 500: boom");
        assert_eq!(failure.to_string(), "HttpError: 500: boom (gemini-pro)");
    }

    #[test]
    fn accessors_follow_variant() {
        let ok = CompletionResult::success("hi");
        assert!(ok.is_success());
        assert_eq!(ok.reply_text(), Some("hi"));
        assert_eq!(ok.error_kind(), None);

        let err = CompletionResult::failure(ErrorKind::UnexpectedShape, "no candidates", "m");
        assert!(!err.is_success());
        assert_eq!(err.reply_text(), None);
        assert_eq!(err.error_kind(), Some(ErrorKind::UnexpectedShape));
    }
}

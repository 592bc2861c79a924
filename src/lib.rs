pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use cli::Commands;

pub use application::{
    CompletionDispatcher, NoopObserver, OverlapPolicy, PendingSubmission, SessionObserver,
    SubmitOutcome, SubmitPromptUseCase, SubmitStart,
};

pub use connector::{
    classify_response, ConsoleObserver, GeminiDispatcher, MockDispatcher, SessionStore,
};

pub use domain::{
    CompletionResult, DomainError, ErrorKind, Failure, ModelEndpoint, PromptRequest, SessionState,
    DEFAULT_MODELS, DEFAULT_URL_TEMPLATE, EMPTY_PROMPT_MESSAGE,
};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::application::{CompletionDispatcher, NoopObserver, SessionObserver};
use crate::domain::{
    CompletionResult, DomainError, ErrorKind, Failure, ModelEndpoint, PromptRequest, SessionState,
    EMPTY_PROMPT_MESSAGE,
};

/// How a submission arriving while another is still in flight is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Drop the new submission; the running chain keeps the session.
    #[default]
    IgnoreWhileLoading,
    /// Start a fresh chain. The stale one stops before its next attempt and
    /// its result is never written to the session.
    SupersedeStale,
}

impl OverlapPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlapPolicy::IgnoreWhileLoading => "ignore",
            OverlapPolicy::SupersedeStale => "supersede",
        }
    }
}

/// What happened to one `submit_prompt` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The submission reached a terminal result and it was written to the session.
    Completed(CompletionResult),
    /// Another submission was in flight; nothing was dispatched or written.
    Ignored,
    /// A newer submission took over the session before this one finished.
    Superseded,
}

impl SubmitOutcome {
    pub fn result(&self) -> Option<&CompletionResult> {
        match self {
            SubmitOutcome::Completed(result) => Some(result),
            _ => None,
        }
    }
}

/// First phase of a submission, see [`SubmitPromptUseCase::start`].
#[derive(Debug)]
pub enum SubmitStart {
    /// Rejected or ignored; nothing to dispatch.
    Finished(SubmitOutcome),
    /// Session claimed; pass to [`SubmitPromptUseCase::run`].
    Dispatch(PendingSubmission),
}

/// A validated prompt holding its claim on the session.
#[derive(Debug)]
pub struct PendingSubmission {
    prompt: PromptRequest,
    generation: u64,
}

impl PendingSubmission {
    pub fn prompt(&self) -> &str {
        self.prompt.text()
    }
}

/// The fallback orchestrator: the single entry point the presentation layer
/// talks to.
///
/// Holds the ordered endpoint chain and walks it one endpoint at a time,
/// stopping at the first success. Session state is only ever written here
/// and pushed to the configured [`SessionObserver`].
pub struct SubmitPromptUseCase {
    dispatcher: Arc<dyn CompletionDispatcher>,
    endpoints: Vec<ModelEndpoint>,
    observer: Arc<dyn SessionObserver>,
    policy: OverlapPolicy,
    session: Mutex<SessionState>,
    publish: Mutex<()>,
    generation: AtomicU64,
}

impl SubmitPromptUseCase {
    pub fn new(
        dispatcher: Arc<dyn CompletionDispatcher>,
        endpoints: Vec<ModelEndpoint>,
    ) -> Result<Self, DomainError> {
        if endpoints.is_empty() {
            return Err(DomainError::invalid_input(
                "at least one model endpoint is required",
            ));
        }

        Ok(Self {
            dispatcher,
            endpoints,
            observer: Arc::new(NoopObserver),
            policy: OverlapPolicy::default(),
            session: Mutex::new(SessionState::new()),
            publish: Mutex::new(()),
            generation: AtomicU64::new(0),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn endpoints(&self) -> &[ModelEndpoint] {
        &self.endpoints
    }

    pub fn overlap_policy(&self) -> OverlapPolicy {
        self.policy
    }

    pub fn state(&self) -> SessionState {
        self.lock_session().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock_session().loading()
    }

    /// Validate `text`, then try each endpoint in order until one succeeds.
    pub async fn submit_prompt(&self, text: &str) -> SubmitOutcome {
        match self.start(text) {
            SubmitStart::Finished(outcome) => outcome,
            SubmitStart::Dispatch(pending) => self.run(pending).await,
        }
    }

    /// Validate `text` and claim the session, without any network activity.
    ///
    /// The session reflects the submission as soon as this returns, so a
    /// caller that runs the chain on another task still gets the overlap
    /// policy applied to the next line it reads.
    pub fn start(&self, text: &str) -> SubmitStart {
        let Some(prompt) = PromptRequest::parse(text) else {
            return SubmitStart::Finished(self.reject(EMPTY_PROMPT_MESSAGE));
        };

        match self.begin() {
            Some(generation) => SubmitStart::Dispatch(PendingSubmission { prompt, generation }),
            None => {
                debug!("Submission ignored: another prompt is in flight");
                SubmitStart::Finished(SubmitOutcome::Ignored)
            }
        }
    }

    /// Walk the endpoint chain for a submission claimed by [`Self::start`].
    pub async fn run(&self, pending: PendingSubmission) -> SubmitOutcome {
        let PendingSubmission { prompt, generation } = pending;
        let start_time = Instant::now();
        let mut last_failure: Option<Failure> = None;

        for (attempt, endpoint) in self.endpoints.iter().enumerate() {
            if self.is_stale(generation) {
                debug!("Submission {} superseded before attempt {}", generation, attempt + 1);
                return SubmitOutcome::Superseded;
            }

            debug!(
                "Attempt {}/{} with model {}",
                attempt + 1,
                self.endpoints.len(),
                endpoint.model_id()
            );

            match self.dispatcher.call(endpoint, prompt.text()).await {
                CompletionResult::Success { reply_text } => {
                    info!(
                        "Model {} replied after {} attempt(s) in {:.2}s",
                        endpoint.model_id(),
                        attempt + 1,
                        start_time.elapsed().as_secs_f64()
                    );
                    return self.finish(generation, CompletionResult::success(reply_text));
                }
                CompletionResult::Failure(failure) => {
                    warn!("Model {} failed: {}", endpoint.model_id(), failure.summary());
                    last_failure = Some(failure);
                }
            }
        }

        let failure = last_failure.unwrap_or_else(|| {
            Failure::new(ErrorKind::UnexpectedShape, "no endpoint produced a result", "")
        });
        warn!(
            "All {} models failed in {:.2}s",
            self.endpoints.len(),
            start_time.elapsed().as_secs_f64()
        );
        self.finish(generation, CompletionResult::Failure(failure))
    }

    fn reject(&self, message: &str) -> SubmitOutcome {
        let _publishing = self.lock_publish();
        let snapshot = {
            let mut session = self.lock_session();
            if session.loading() && self.policy == OverlapPolicy::IgnoreWhileLoading {
                return SubmitOutcome::Ignored;
            }
            self.generation.fetch_add(1, Ordering::SeqCst);
            session.fail(message);
            session.clone()
        };
        self.observer.on_state_change(&snapshot);

        SubmitOutcome::Completed(CompletionResult::failure(
            ErrorKind::ValidationError,
            message,
            "",
        ))
    }

    /// Claim the session for a new chain. Returns its generation, or `None`
    /// when the submission must be ignored.
    fn begin(&self) -> Option<u64> {
        let _publishing = self.lock_publish();
        let (generation, snapshot) = {
            let mut session = self.lock_session();
            if session.loading() && self.policy == OverlapPolicy::IgnoreWhileLoading {
                return None;
            }
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            session.begin();
            (generation, session.clone())
        };
        self.observer.on_state_change(&snapshot);
        Some(generation)
    }

    fn finish(&self, generation: u64, result: CompletionResult) -> SubmitOutcome {
        let _publishing = self.lock_publish();
        let snapshot = {
            let mut session = self.lock_session();
            if self.is_stale(generation) {
                debug!("Discarding result of superseded submission {}", generation);
                return SubmitOutcome::Superseded;
            }
            match &result {
                CompletionResult::Success { reply_text } => session.succeed(reply_text.as_str()),
                CompletionResult::Failure(failure) => session.fail(exhausted_message(failure)),
            }
            session.clone()
        };
        self.observer.on_state_change(&snapshot);

        SubmitOutcome::Completed(result)
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    // The session is plain data, so a poisoned lock still holds a usable value.
    fn lock_session(&self) -> MutexGuard<'_, SessionState> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // Serialises notifications so observers see transitions in write order.
    // Observers may read the session but must not submit from the callback.
    fn lock_publish(&self) -> MutexGuard<'_, ()> {
        self.publish
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// User-facing error for a chain where every endpoint failed.
pub fn exhausted_message(last: &Failure) -> String {
    if last.attempted_model().is_empty() {
        return format!("All models failed. {}", last.summary());
    }
    format!(
        "All models failed. Last error from {}: {}",
        last.attempted_model(),
        last.summary()
    )
}

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::application::{SessionObserver, SubmitOutcome, SubmitPromptUseCase, SubmitStart};
use crate::connector::ConsoleObserver;
use crate::domain::DomainError;

use super::super::Container;

const EXIT_COMMANDS: &[&str] = &["/exit", "/quit"];

/// Tally of one chat session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChatStats {
    pub completed: usize,
    pub ignored: usize,
    pub superseded: usize,
}

impl ChatStats {
    fn record(&mut self, outcome: &SubmitOutcome) {
        match outcome {
            SubmitOutcome::Completed(_) => self.completed += 1,
            SubmitOutcome::Ignored => self.ignored += 1,
            SubmitOutcome::Superseded => self.superseded += 1,
        }
    }
}

pub struct ChatController<'a> {
    container: &'a Container,
}

impl<'a> ChatController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Line-oriented loop over stdin. Each line is one submission; replies
    /// and errors are printed by the [`ConsoleObserver`].
    pub async fn chat(&self) -> Result<String> {
        println!("Type a message and press Enter. /exit to quit.");

        let stdin = BufReader::new(tokio::io::stdin());
        let stats = self
            .run_lines(stdin, Arc::new(ConsoleObserver::new()))
            .await?;

        Ok(format!(
            "Goodbye. ({} answered, {} ignored while busy, {} superseded)",
            stats.completed, stats.ignored, stats.superseded
        ))
    }

    /// Submit every line from `input`. Chains run on their own tasks, so a
    /// line read while one is in flight is subject to the overlap policy.
    pub async fn run_lines<R>(
        &self,
        input: R,
        observer: Arc<dyn SessionObserver>,
    ) -> Result<ChatStats, DomainError>
    where
        R: AsyncBufRead + Unpin,
    {
        let use_case: Arc<SubmitPromptUseCase> = Arc::new(
            self.container
                .submit_use_case(observer)
                .map_err(|e| DomainError::configuration(e.to_string()))?,
        );

        let mut stats = ChatStats::default();
        let mut in_flight: JoinSet<SubmitOutcome> = JoinSet::new();
        let mut lines = input.lines();

        while let Some(line) = lines.next_line().await? {
            if EXIT_COMMANDS.contains(&line.trim()) {
                break;
            }

            match use_case.start(&line) {
                SubmitStart::Finished(outcome) => {
                    if outcome == SubmitOutcome::Ignored {
                        debug!("Previous prompt still in flight; input dropped");
                    }
                    stats.record(&outcome);
                }
                SubmitStart::Dispatch(pending) => {
                    let use_case = use_case.clone();
                    in_flight.spawn(async move { use_case.run(pending).await });
                }
            }

            while let Some(joined) = in_flight.try_join_next() {
                record_joined(&mut stats, joined);
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            record_joined(&mut stats, joined);
        }

        Ok(stats)
    }
}

fn record_joined(stats: &mut ChatStats, joined: Result<SubmitOutcome, tokio::task::JoinError>) {
    match joined {
        Ok(outcome) => stats.record(&outcome),
        Err(e) => warn!("Submission task failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::application::{CompletionDispatcher, OverlapPolicy};
    use crate::connector::api::ContainerConfig;
    use crate::connector::{MockDispatcher, SessionStore};
    use crate::domain::{CompletionResult, ModelEndpoint, DEFAULT_URL_TEMPLATE};

    /// Holds every call until released.
    #[derive(Default)]
    struct HeldDispatcher {
        entered: Notify,
        release: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionDispatcher for HeldDispatcher {
        async fn call(&self, _endpoint: &ModelEndpoint, prompt: &str) -> CompletionResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            CompletionResult::success(format!("re: {prompt}"))
        }
    }

    fn container(dispatcher: Arc<dyn CompletionDispatcher>, policy: OverlapPolicy) -> Container {
        let endpoints = ModelEndpoint::chain(["model-a"], DEFAULT_URL_TEMPLATE, "k").unwrap();
        let config = ContainerConfig {
            overlap_policy: policy,
            ..ContainerConfig::default()
        };
        Container::with_dispatcher(dispatcher, endpoints, config)
    }

    #[tokio::test]
    async fn line_typed_while_busy_is_ignored() {
        let dispatcher = Arc::new(HeldDispatcher::default());
        let container = Arc::new(container(
            dispatcher.clone(),
            OverlapPolicy::IgnoreWhileLoading,
        ));
        let store = SessionStore::new();

        let chat = {
            let container = container.clone();
            let store = store.clone();
            tokio::spawn(async move {
                ChatController::new(&container)
                    .run_lines(&b"first\nsecond\n"[..], Arc::new(store))
                    .await
            })
        };

        dispatcher.entered.notified().await;
        dispatcher.release.notify_one();
        let stats = chat.await.unwrap().unwrap();

        assert_eq!(
            stats,
            ChatStats {
                completed: 1,
                ignored: 1,
                superseded: 0
            }
        );
        assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.snapshot().reply(), "re: first");
    }

    #[tokio::test]
    async fn line_typed_while_busy_supersedes_when_configured() {
        let dispatcher = Arc::new(MockDispatcher::new());
        let container = container(dispatcher.clone(), OverlapPolicy::SupersedeStale);
        let store = SessionStore::new();

        let stats = ChatController::new(&container)
            .run_lines(&b"first\nsecond\n"[..], Arc::new(store.clone()))
            .await
            .unwrap();

        assert_eq!(
            stats,
            ChatStats {
                completed: 1,
                ignored: 0,
                superseded: 1
            }
        );
        assert_eq!(dispatcher.calls(), vec!["model-a"]);
        assert_eq!(store.snapshot().reply(), "[model-a] second");
    }

    #[tokio::test]
    async fn exit_command_stops_reading() {
        let dispatcher = Arc::new(MockDispatcher::new());
        let container = container(dispatcher.clone(), OverlapPolicy::IgnoreWhileLoading);

        let stats = ChatController::new(&container)
            .run_lines(&b"/exit\nnever sent\n"[..], Arc::new(SessionStore::new()))
            .await
            .unwrap();

        assert_eq!(stats, ChatStats::default());
        assert_eq!(dispatcher.call_count(), 0);
    }
}

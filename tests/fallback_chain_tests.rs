//! Fallback ordering properties, checked against the offline mock dispatcher.

use std::sync::Arc;

use promptchain::{
    CompletionResult, ErrorKind, MockDispatcher, ModelEndpoint, SessionStore, SubmitPromptUseCase,
    DEFAULT_URL_TEMPLATE,
};

fn model_ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("model-{i}")).collect()
}

fn failing(model: &str) -> CompletionResult {
    CompletionResult::failure(ErrorKind::HttpError, format!("500: {model} down"), model)
}

fn build(ids: &[String], dispatcher: Arc<MockDispatcher>) -> (SubmitPromptUseCase, SessionStore) {
    let endpoints = ModelEndpoint::chain(ids.iter().cloned(), DEFAULT_URL_TEMPLATE, "k").unwrap();
    let store = SessionStore::new();
    let use_case = SubmitPromptUseCase::new(dispatcher, endpoints)
        .unwrap()
        .with_observer(Arc::new(store.clone()));
    (use_case, store)
}

#[tokio::test]
async fn test_first_k_failures_then_success_makes_k_plus_one_calls() {
    for n in 1..=4 {
        for k in 0..n {
            let ids = model_ids(n);
            let mut dispatcher = MockDispatcher::new();
            for id in &ids[..k] {
                dispatcher = dispatcher.with_result(id.clone(), failing(id));
            }
            let dispatcher = Arc::new(dispatcher);
            let (use_case, store) = build(&ids, dispatcher.clone());

            use_case.submit_prompt("ping").await;

            assert_eq!(dispatcher.calls(), ids[..=k].to_vec(), "n={n} k={k}");
            let state = store.snapshot();
            assert_eq!(state.reply(), format!("[{}] ping", ids[k]));
            assert!(!state.has_error());
        }
    }
}

#[tokio::test]
async fn test_all_failures_make_exactly_n_calls() {
    for n in 1..=4 {
        let ids = model_ids(n);
        let dispatcher = Arc::new(
            ids.iter()
                .fold(MockDispatcher::new(), |d, id| d.with_result(id.clone(), failing(id))),
        );
        let (use_case, store) = build(&ids, dispatcher.clone());

        let outcome = use_case.submit_prompt("ping").await;

        assert_eq!(dispatcher.call_count(), n);
        assert_eq!(dispatcher.calls(), ids);
        let failure = outcome.result().and_then(|r| r.as_failure()).unwrap();
        assert_eq!(failure.attempted_model(), ids[n - 1]);

        let state = store.snapshot();
        assert!(!state.has_reply());
        assert!(state.has_error());
        assert!(!state.loading());
    }
}

#[tokio::test]
async fn test_resubmission_clears_previous_error() {
    let ids = model_ids(1);
    let dispatcher = Arc::new(MockDispatcher::new());
    let (use_case, store) = build(&ids, dispatcher);

    use_case.submit_prompt("").await;
    assert!(store.snapshot().has_error());

    use_case.submit_prompt("again").await;
    let state = store.snapshot();
    assert_eq!(state.reply(), "[model-0] again");
    assert!(!state.has_error());
}

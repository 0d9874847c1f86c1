//! The workflow controller.
//!
//! Single source of truth for what the user currently sees. The state
//! lives in a `tokio::sync::watch` channel so presentation layers can
//! subscribe to transitions without the controller knowing how they
//! render.

use crate::client::AnalysisError;
use crate::models::{AnalysisOutcome, AnalysisResult, AnswerReceipt, AnswerSubmission};
use crate::workflow::state::WorkflowState;
use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, warn};

/// The two operations the workflow depends on.
///
/// Implemented by the HTTP client; tests substitute a scripted stub.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Analyze a URL and return the generated result.
    async fn analyze(&self, url: &str) -> Result<AnalysisResult, AnalysisError>;

    /// Forward a chosen answer.
    async fn submit_answer(
        &self,
        submission: &AnswerSubmission,
    ) -> Result<AnswerReceipt, AnalysisError>;
}

/// Sequences the analysis workflow over a backend.
///
/// The controller is the exclusive writer of the workflow state; it
/// issues one analysis call at a time and suspends only at that call's
/// boundary. A second `submit_url` issued while one is in flight is
/// last-writer-wins on state, so callers gate the submission surface
/// while the phase is `Analyzing`.
pub struct WorkflowController<B> {
    backend: B,
    state_tx: watch::Sender<WorkflowState>,
}

impl<B: AnalysisBackend> WorkflowController<B> {
    /// Create a controller in the `Idle` state.
    pub fn new(backend: B) -> Self {
        let (state_tx, _) = watch::channel(WorkflowState::Idle);
        Self { backend, state_tx }
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state_tx.subscribe()
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> WorkflowState {
        self.state_tx.borrow().clone()
    }

    fn set_state(&self, next: WorkflowState) {
        debug!(
            "workflow: {} -> {}",
            self.state_tx.borrow().phase(),
            next.phase()
        );
        self.state_tx.send_replace(next);
    }

    /// Submit a URL for analysis.
    ///
    /// An empty URL is rejected before any state change or network call;
    /// the returned error is the only one this method propagates. Every
    /// backend failure is absorbed into the `Failed` state with a
    /// user-visible message, and the session stays usable.
    pub async fn submit_url(&mut self, url: &str) -> Result<(), AnalysisError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AnalysisError::Validation("a URL is required".to_string()));
        }

        self.set_state(WorkflowState::Analyzing {
            url: url.to_string(),
        });

        match self.backend.analyze(url).await {
            Ok(result) => {
                self.set_state(WorkflowState::Ready {
                    outcome: AnalysisOutcome::now(url, result),
                    selected: None,
                });
            }
            Err(err) => {
                if let AnalysisError::Service { status, .. } = &err {
                    warn!("analysis service returned HTTP {}", status);
                }
                self.set_state(WorkflowState::Failed {
                    message: err.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Record the chosen option while a result is presented.
    ///
    /// Only meaningful in the `Ready` phase; the selection stays mutable
    /// until [`submit_answer`](Self::submit_answer). Callers are expected
    /// to pass one of the offered options; the controller records
    /// whatever it is given. Returns whether a selection was recorded.
    pub fn select_option(&mut self, option: &str) -> bool {
        self.state_tx.send_if_modified(|state| match state {
            WorkflowState::Ready { selected, .. } => {
                *selected = Some(option.to_string());
                true
            }
            _ => false,
        })
    }

    /// Submit the currently selected answer.
    ///
    /// A no-op returning `false` unless the state is `Ready` with a
    /// non-empty selection. Otherwise transitions to `AnsweredPending`
    /// and forwards the answer; the recording outcome is logged but
    /// never folded back into state. `AnsweredPending` clears only when
    /// a later submission produces a new result.
    pub async fn submit_answer(&mut self) -> bool {
        let (outcome, answer) = {
            let state = self.state_tx.borrow();
            match &*state {
                WorkflowState::Ready {
                    outcome,
                    selected: Some(answer),
                } if !answer.is_empty() => (outcome.clone(), answer.clone()),
                _ => return false,
            }
        };

        self.set_state(WorkflowState::AnsweredPending {
            outcome: outcome.clone(),
            answer: answer.clone(),
        });

        let submission = AnswerSubmission {
            url: outcome.url,
            question: outcome.result.question.text,
            answer,
        };

        match self.backend.submit_answer(&submission).await {
            Ok(receipt) => debug!("answer recorded: {}", receipt.status),
            Err(err) => warn!("answer submission failed: {}", err),
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeneratedQuestion, PageContent};
    use crate::workflow::state::Phase;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;
    use tokio_test::{assert_pending, assert_ready};

    /// Backend scripted with a queue of analyze outcomes.
    #[derive(Clone, Default)]
    struct StubBackend {
        inner: Arc<StubInner>,
    }

    #[derive(Default)]
    struct StubInner {
        responses: Mutex<VecDeque<Result<AnalysisResult, AnalysisError>>>,
        analyze_calls: Mutex<Vec<String>>,
        submissions: Mutex<Vec<AnswerSubmission>>,
        gate: Option<Arc<Notify>>,
    }

    impl StubBackend {
        fn scripted(responses: Vec<Result<AnalysisResult, AnalysisError>>) -> Self {
            Self {
                inner: Arc::new(StubInner {
                    responses: Mutex::new(responses.into()),
                    ..Default::default()
                }),
            }
        }

        /// A stub whose analyze call suspends until the gate is notified.
        fn gated(responses: Vec<Result<AnalysisResult, AnalysisError>>, gate: Arc<Notify>) -> Self {
            Self {
                inner: Arc::new(StubInner {
                    responses: Mutex::new(responses.into()),
                    gate: Some(gate),
                    ..Default::default()
                }),
            }
        }

        fn analyze_calls(&self) -> Vec<String> {
            self.inner.analyze_calls.lock().unwrap().clone()
        }

        fn submissions(&self) -> Vec<AnswerSubmission> {
            self.inner.submissions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AnalysisBackend for StubBackend {
        async fn analyze(&self, url: &str) -> Result<AnalysisResult, AnalysisError> {
            self.inner.analyze_calls.lock().unwrap().push(url.to_string());
            if let Some(gate) = &self.inner.gate {
                gate.notified().await;
            }
            self.inner
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(AnalysisError::Transport("no scripted response".to_string()))
                })
        }

        async fn submit_answer(
            &self,
            submission: &AnswerSubmission,
        ) -> Result<AnswerReceipt, AnalysisError> {
            self.inner.submissions.lock().unwrap().push(submission.clone());
            Ok(AnswerReceipt {
                status: "recorded".to_string(),
            })
        }
    }

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            content: PageContent {
                title: "Example Domain".to_string(),
                meta_description: "An example page".to_string(),
                main_content: "This domain is for use in illustrative examples.".to_string(),
                headings: vec![],
            },
            question: GeneratedQuestion {
                text: "What is the target audience?".to_string(),
                options: vec![
                    "Developers".to_string(),
                    "Marketers".to_string(),
                    "Students".to_string(),
                ],
            },
        }
    }

    async fn ready_controller() -> (WorkflowController<StubBackend>, StubBackend) {
        let backend = StubBackend::scripted(vec![Ok(sample_result())]);
        let mut controller = WorkflowController::new(backend.clone());
        controller.submit_url("https://example.com").await.unwrap();
        assert_eq!(controller.state().phase(), Phase::Ready);
        (controller, backend)
    }

    #[test]
    fn test_starts_idle() {
        let controller = WorkflowController::new(StubBackend::default());
        assert_eq!(controller.state(), WorkflowState::Idle);
    }

    #[tokio::test]
    async fn test_successful_analysis_reaches_ready() {
        let backend = StubBackend::scripted(vec![Ok(sample_result())]);
        let mut controller = WorkflowController::new(backend.clone());

        controller.submit_url("https://example.com").await.unwrap();

        match controller.state() {
            WorkflowState::Ready { outcome, selected } => {
                assert_eq!(outcome.url, "https://example.com");
                assert_eq!(outcome.result, sample_result());
                assert_eq!(selected, None);
            }
            other => panic!("expected Ready, got {:?}", other),
        }
        assert_eq!(backend.analyze_calls(), vec!["https://example.com"]);
    }

    #[tokio::test]
    async fn test_empty_url_rejected_locally() {
        let backend = StubBackend::default();
        let mut controller = WorkflowController::new(backend.clone());

        let err = controller.submit_url("").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Validation(_)));

        // No network call, state untouched.
        assert!(backend.analyze_calls().is_empty());
        assert_eq!(controller.state(), WorkflowState::Idle);

        let err = controller.submit_url("   ").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Validation(_)));
        assert_eq!(controller.state(), WorkflowState::Idle);
    }

    #[tokio::test]
    async fn test_service_error_surfaces_its_message() {
        let backend = StubBackend::scripted(vec![Err(AnalysisError::Service {
            status: 500,
            message: Some("Could not fetch URL".to_string()),
        })]);
        let mut controller = WorkflowController::new(backend);

        controller.submit_url("https://example.com").await.unwrap();

        assert_eq!(
            controller.state().failure_message(),
            Some("Could not fetch URL")
        );
    }

    #[tokio::test]
    async fn test_failure_without_message_uses_generic_text() {
        let backend = StubBackend::scripted(vec![Err(AnalysisError::Service {
            status: 502,
            message: None,
        })]);
        let mut controller = WorkflowController::new(backend);

        controller.submit_url("https://example.com").await.unwrap();

        assert_eq!(
            controller.state().failure_message(),
            Some("An error occurred")
        );
    }

    #[tokio::test]
    async fn test_select_then_submit_reaches_answered_pending() {
        let (mut controller, backend) = ready_controller().await;

        assert!(controller.select_option("Marketers"));
        assert!(controller.submit_answer().await);

        match controller.state() {
            WorkflowState::AnsweredPending { answer, .. } => {
                assert_eq!(answer, "Marketers");
            }
            other => panic!("expected AnsweredPending, got {:?}", other),
        }

        let submissions = backend.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].url, "https://example.com");
        assert_eq!(submissions[0].question, "What is the target audience?");
        assert_eq!(submissions[0].answer, "Marketers");
    }

    #[tokio::test]
    async fn test_submit_without_selection_is_noop() {
        let (mut controller, backend) = ready_controller().await;

        assert!(!controller.submit_answer().await);

        // No transition, no forwarding.
        assert_eq!(controller.state().phase(), Phase::Ready);
        assert!(backend.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_select_option_ignored_outside_ready() {
        let mut controller = WorkflowController::new(StubBackend::default());
        assert!(!controller.select_option("Developers"));
        assert_eq!(controller.state(), WorkflowState::Idle);
    }

    #[tokio::test]
    async fn test_selection_is_mutable_until_submit() {
        let (mut controller, _backend) = ready_controller().await;

        assert!(controller.select_option("Developers"));
        assert!(controller.select_option("Students"));
        assert!(controller.submit_answer().await);

        match controller.state() {
            WorkflowState::AnsweredPending { answer, .. } => assert_eq!(answer, "Students"),
            other => panic!("expected AnsweredPending, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_does_not_lock_the_workflow() {
        let backend = StubBackend::scripted(vec![
            Err(AnalysisError::Transport("Cannot connect".to_string())),
            Ok(sample_result()),
        ]);
        let mut controller = WorkflowController::new(backend);

        controller.submit_url("https://example.com").await.unwrap();
        assert_eq!(controller.state().phase(), Phase::Failed);

        controller.submit_url("https://example.com").await.unwrap();
        assert_eq!(controller.state().phase(), Phase::Ready);
    }

    #[tokio::test]
    async fn test_sequential_resubmission_is_independent() {
        let backend = StubBackend::scripted(vec![
            Ok(sample_result()),
            Err(AnalysisError::Service {
                status: 500,
                message: Some("Could not fetch URL".to_string()),
            }),
        ]);
        let mut controller = WorkflowController::new(backend.clone());

        controller.submit_url("https://example.com").await.unwrap();
        assert_eq!(controller.state().phase(), Phase::Ready);

        // Second outcome is determined solely by the second response.
        controller.submit_url("https://example.com").await.unwrap();
        assert_eq!(
            controller.state().failure_message(),
            Some("Could not fetch URL")
        );
        assert_eq!(backend.analyze_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_answered_pending_cleared_by_next_result() {
        let backend = StubBackend::scripted(vec![Ok(sample_result()), Ok(sample_result())]);
        let mut controller = WorkflowController::new(backend);

        controller.submit_url("https://example.com").await.unwrap();
        controller.select_option("Developers");
        controller.submit_answer().await;
        assert_eq!(controller.state().phase(), Phase::AnsweredPending);

        controller.submit_url("https://other.example").await.unwrap();
        match controller.state() {
            WorkflowState::Ready { outcome, selected } => {
                assert_eq!(outcome.url, "https://other.example");
                assert_eq!(selected, None);
            }
            other => panic!("expected Ready, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_subscribers_observe_the_analyzing_phase() {
        let gate = Arc::new(Notify::new());
        let backend = StubBackend::gated(vec![Ok(sample_result())], gate.clone());
        let mut controller = WorkflowController::new(backend);
        let rx = controller.subscribe();

        let mut submit = tokio_test::task::spawn(controller.submit_url("https://example.com"));

        // First poll sets Analyzing, then suspends at the gated call.
        assert_pending!(submit.poll());
        assert_eq!(rx.borrow().phase(), Phase::Analyzing);

        gate.notify_one();
        assert_ready!(submit.poll()).unwrap();
        drop(submit);

        assert_eq!(rx.borrow().phase(), Phase::Ready);
        assert_eq!(controller.state().phase(), Phase::Ready);
    }
}

//! Single-flight submission lifecycle.
//!
//! A submission clears the report, enters `Busy`, posts the selected file and,
//! once the exchange ends for any reason, renders (if there is anything to
//! render) and then returns to `Idle`. Both steps run under one lock so the
//! idle reset can never interleave with a render.

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Deserialize;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::SubmitError;
use crate::form::{FormState, UploadFile};
use crate::ocr::{OcrResponse, RecognitionService};
use crate::render::html::RESULTS_CONTAINER_ID;
use crate::render::{Report, ResultRenderer};
use crate::view::SubmissionView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Busy,
}

/// Visual properties of the submit control, derived from [`SubmissionState`] only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    pub label: &'static str,
    pub spinner_visible: bool,
    pub submit_enabled: bool,
}

impl SubmissionState {
    pub fn controls(self) -> ControlState {
        match self {
            SubmissionState::Idle => ControlState {
                label: "Process Image",
                spinner_visible: false,
                submit_enabled: true,
            },
            SubmissionState::Busy => ControlState {
                label: "Processing image",
                spinner_visible: true,
                submit_enabled: false,
            },
        }
    }
}

/// What a submit issued while `Busy` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusyPolicy {
    /// Refuse the new submission; the in-flight one carries on.
    #[default]
    Reject,
    /// Abort the in-flight submission and start the new one.
    Replace,
}

impl FromStr for BusyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "replace" => Ok(Self::Replace),
            other => Err(format!("unknown busy policy: {} (expected reject|replace)", other)),
        }
    }
}

/// Result of asking the controller to submit.
#[derive(Debug)]
pub enum Dispatch {
    /// No file selected; nothing was sent.
    NoFile,
    /// A submission is already in flight and the policy is [`BusyPolicy::Reject`].
    Rejected,
    Started(Submission),
}

/// How a dispatched submission ended.
#[derive(Debug)]
pub enum SubmissionOutcome {
    Rendered(Report),
    Failed(SubmitError),
    /// Aborted, or superseded by a newer submission.
    Cancelled,
}

/// Handle to an in-flight submission.
#[derive(Debug)]
pub struct Submission {
    id: String,
    handle: JoinHandle<SubmissionOutcome>,
}

impl Submission {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for the exchange to finish.
    pub async fn outcome(self) -> SubmissionOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => SubmissionOutcome::Cancelled,
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }
}

struct Shared<V> {
    state: SubmissionState,
    /// Bumped on every dispatch and cancel; stale completions compare unequal.
    generation: u64,
    view: V,
}

impl<V: SubmissionView> Shared<V> {
    fn enter(&mut self, state: SubmissionState) {
        self.state = state;
        self.view.apply_controls(&state.controls());
    }
}

fn lock<V>(shared: &Mutex<Shared<V>>) -> MutexGuard<'_, Shared<V>> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the request lifecycle for one form.
///
/// Must be driven from inside a tokio runtime.
pub struct SubmissionController<S, V> {
    service: Arc<S>,
    shared: Arc<Mutex<Shared<V>>>,
    renderer: ResultRenderer,
    timeout: Duration,
    policy: BusyPolicy,
    in_flight: Option<AbortHandle>,
}

impl<S, V> SubmissionController<S, V>
where
    S: RecognitionService + 'static,
    V: SubmissionView + 'static,
{
    pub fn new(service: S, mut view: V, timeout: Duration) -> Self {
        view.apply_controls(&SubmissionState::Idle.controls());
        Self {
            service: Arc::new(service),
            shared: Arc::new(Mutex::new(Shared {
                state: SubmissionState::Idle,
                generation: 0,
                view,
            })),
            renderer: ResultRenderer::new(),
            timeout,
            policy: BusyPolicy::default(),
            in_flight: None,
        }
    }

    pub fn with_policy(mut self, policy: BusyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> SubmissionState {
        lock(&self.shared).state
    }

    pub fn is_busy(&self) -> bool {
        self.state() == SubmissionState::Busy
    }

    /// Inspect the view.
    pub fn with_view<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        f(&lock(&self.shared).view)
    }

    /// Send the selected file to the recognition service.
    pub fn submit(&mut self, form: &FormState) -> Dispatch {
        let Some(selection) = form.selection() else {
            debug!("Submit ignored: no file selected");
            return Dispatch::NoFile;
        };

        if self.is_busy() {
            match self.policy {
                BusyPolicy::Reject => {
                    warn!("Submit ignored: a submission is already in flight");
                    return Dispatch::Rejected;
                }
                BusyPolicy::Replace => {
                    self.cancel();
                }
            }
        }

        let id = format!("sub_{}", Uuid::new_v4().simple());
        let generation = {
            let mut shared = lock(&self.shared);
            shared.view.clear_report();
            shared.enter(SubmissionState::Busy);
            shared.generation += 1;
            shared.generation
        };

        info!(
            submission = %id,
            file = %selection.display_name,
            bytes = selection.file.data.len(),
            "Dispatching to {} recognition service",
            self.service.name()
        );

        let exchange = Exchange {
            id: id.clone(),
            generation,
            file: selection.file.clone(),
            timeout: self.timeout,
            renderer: self.renderer,
        };
        let handle = tokio::spawn(exchange.run(self.service.clone(), self.shared.clone()));
        self.in_flight = Some(handle.abort_handle());

        Dispatch::Started(Submission { id, handle })
    }

    /// Abort the in-flight submission, if any, and return to `Idle`.
    ///
    /// The aborted exchange never reaches its payload handling.
    pub fn cancel(&mut self) -> bool {
        let Some(handle) = self.in_flight.take() else {
            return false;
        };
        handle.abort();

        let mut shared = lock(&self.shared);
        if shared.state != SubmissionState::Busy {
            return false;
        }
        shared.generation += 1;
        shared.enter(SubmissionState::Idle);
        info!("In-flight submission cancelled");
        true
    }
}

impl<S, V> Drop for SubmissionController<S, V> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

/// Everything one spawned exchange needs besides the shared handles.
struct Exchange {
    id: String,
    generation: u64,
    file: UploadFile,
    timeout: Duration,
    renderer: ResultRenderer,
}

impl Exchange {
    async fn run<S, V>(self, service: Arc<S>, shared: Arc<Mutex<Shared<V>>>) -> SubmissionOutcome
    where
        S: RecognitionService,
        V: SubmissionView,
    {
        let result = match tokio::time::timeout(self.timeout, service.recognize(&self.file)).await {
            Ok(result) => result,
            Err(_) => Err(SubmitError::Timeout(self.timeout)),
        };
        let result = result.and_then(OcrResponse::into_data);

        let mut guard = lock(&shared);
        if guard.generation != self.generation {
            debug!(submission = %self.id, "Completion of superseded submission dropped");
            return SubmissionOutcome::Cancelled;
        }

        // Payload handling first, then the unconditional idle reset
        let outcome = match result {
            Ok(data) => {
                let report = self.renderer.render(&data);
                guard.view.show_report(&report);
                guard.view.scroll_into_view(RESULTS_CONTAINER_ID);
                info!(
                    submission = %self.id,
                    extracted = report.success_count(),
                    failed = report.error_count(),
                    "Submission rendered"
                );
                SubmissionOutcome::Rendered(report)
            }
            Err(err) => {
                warn!(submission = %self.id, error = %err, "Submission failed");
                guard.view.show_failure(&err.notice());
                SubmissionOutcome::Failed(err)
            }
        };

        guard.enter(SubmissionState::Idle);
        guard.view.hide_placeholder();
        outcome
    }
}

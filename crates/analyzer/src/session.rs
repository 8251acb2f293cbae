//! Interaction state for the scanner screen.
//!
//! [`SessionState::apply`] is the pure transition function. [`Session`]
//! wires it to the analyzer, the slow-response timer and subscribers.

use futures::future::{AbortHandle, Abortable};
use parking_lot::Mutex;
use services::settings_store::SettingsStore;
use shared::config::strings;
use shared::{AnalysisOutcome, AnalysisResult};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::orchestrator::Analyzer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No image chosen
    #[default]
    Idle,
    /// An image is shown; see [`AnalysisStatus`] for the analysis
    Previewing,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnalysisStatus {
    #[default]
    NotStarted,
    InFlight,
    /// Still in flight past the slow-response threshold
    InFlightSlow,
    Succeeded(AnalysisResult),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ImageSelected,
    SlowThresholdElapsed { attempt: u64 },
    AnalysisSucceeded { attempt: u64, result: AnalysisResult },
    AnalysisFailed { attempt: u64, message: String },
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEffect {
    StartSlowTimer { attempt: u64 },
    CancelSlowTimer,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    pub phase: Phase,
    pub status: AnalysisStatus,
    /// Generation counter; bumped on every selection and clear
    pub attempt: u64,
}

impl SessionState {
    pub fn apply(&mut self, event: SessionEvent) -> Vec<SessionEffect> {
        match event {
            SessionEvent::ImageSelected => {
                self.attempt += 1;
                self.phase = Phase::Previewing;
                self.status = AnalysisStatus::InFlight;
                vec![
                    SessionEffect::CancelSlowTimer,
                    SessionEffect::StartSlowTimer {
                        attempt: self.attempt,
                    },
                ]
            }
            SessionEvent::SlowThresholdElapsed { attempt } => {
                if attempt == self.attempt && self.status == AnalysisStatus::InFlight {
                    self.status = AnalysisStatus::InFlightSlow;
                }
                Vec::new()
            }
            SessionEvent::AnalysisSucceeded { attempt, result } => {
                if !self.accepts_completion(attempt) {
                    return Vec::new();
                }
                self.status = AnalysisStatus::Succeeded(result);
                vec![SessionEffect::CancelSlowTimer]
            }
            SessionEvent::AnalysisFailed { attempt, message } => {
                if !self.accepts_completion(attempt) {
                    return Vec::new();
                }
                self.status = AnalysisStatus::Failed(message);
                vec![SessionEffect::CancelSlowTimer]
            }
            SessionEvent::Cleared => {
                self.attempt += 1;
                self.phase = Phase::Idle;
                self.status = AnalysisStatus::NotStarted;
                vec![SessionEffect::CancelSlowTimer]
            }
        }
    }

    fn accepts_completion(&self, attempt: u64) -> bool {
        attempt == self.attempt && self.is_in_flight()
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(
            self.status,
            AnalysisStatus::InFlight | AnalysisStatus::InFlightSlow
        )
    }

    pub fn is_slow(&self) -> bool {
        self.status == AnalysisStatus::InFlightSlow
    }

    /// Loading hint while an analysis is running
    pub fn status_text(&self) -> Option<&'static str> {
        match self.status {
            AnalysisStatus::InFlight => Some(strings::result::ANALYZING),
            AnalysisStatus::InFlightSlow => Some(strings::result::STILL_ANALYZING),
            _ => None,
        }
    }

    /// What the result card renders, if anything
    pub fn outcome(&self) -> Option<AnalysisOutcome> {
        match &self.status {
            AnalysisStatus::NotStarted => None,
            AnalysisStatus::InFlight | AnalysisStatus::InFlightSlow => {
                Some(AnalysisOutcome::Loading)
            }
            AnalysisStatus::Succeeded(result) => Some(AnalysisOutcome::Success(result.clone())),
            AnalysisStatus::Failed(message) => Some(AnalysisOutcome::Failure(message.clone())),
        }
    }
}

/// Drives [`SessionState`] on the current tokio runtime.
///
/// Methods that start work spawn tasks and must be called from within a
/// runtime.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    analyzer: Arc<Analyzer>,
    store: Arc<SettingsStore>,
    state: Mutex<SessionState>,
    slow_timer: Mutex<Option<AbortHandle>>,
    updates: watch::Sender<SessionState>,
}

impl Session {
    pub fn new(analyzer: Arc<Analyzer>, store: Arc<SettingsStore>) -> Self {
        let (updates, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(SessionInner {
                analyzer,
                store,
                state: Mutex::new(SessionState::default()),
                slow_timer: Mutex::new(None),
                updates,
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.lock().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.updates.subscribe()
    }

    /// Start analyzing a newly chosen image. Any earlier attempt is
    /// abandoned; its result is dropped if it arrives later.
    pub fn select_image(&self, image_bytes: Vec<u8>) -> JoinHandle<()> {
        let attempt = self.inner.dispatch(SessionEvent::ImageSelected).attempt;
        // Read once per attempt; later settings changes apply to the next one
        let credential = self.inner.store.api_key();
        info!(attempt, bytes = image_bytes.len(), "image selected");

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = inner
                .analyzer
                .analyze(image_bytes, credential.as_ref())
                .await;
            let event = match outcome {
                Ok(result) => SessionEvent::AnalysisSucceeded { attempt, result },
                Err(err) => {
                    warn!(attempt, "analysis failed: {}", err);
                    SessionEvent::AnalysisFailed {
                        attempt,
                        message: err.user_message(),
                    }
                }
            };
            inner.dispatch(event);
        })
    }

    pub fn clear(&self) {
        self.inner.dispatch(SessionEvent::Cleared);
    }
}

impl SessionInner {
    fn dispatch(self: &Arc<Self>, event: SessionEvent) -> SessionState {
        let snapshot = {
            let mut state = self.state.lock();
            let effects = state.apply(event);
            debug!(attempt = state.attempt, status = ?state.status, ?effects, "session updated");
            // Effects run under the state lock so timer starts and cancels
            // land in the same order as the transitions that caused them
            for effect in effects {
                match effect {
                    SessionEffect::StartSlowTimer { attempt } => self.start_slow_timer(attempt),
                    SessionEffect::CancelSlowTimer => self.cancel_slow_timer(),
                }
            }
            state.clone()
        };

        self.updates.send_replace(snapshot.clone());
        snapshot
    }

    fn start_slow_timer(self: &Arc<Self>, attempt: u64) {
        let threshold = self.analyzer.config().slow_response_threshold;
        let (handle, registration) = AbortHandle::new_pair();
        let inner = Arc::clone(self);
        tokio::spawn(Abortable::new(
            async move {
                tokio::time::sleep(threshold).await;
                debug!(attempt, "slow-response threshold reached");
                inner.dispatch(SessionEvent::SlowThresholdElapsed { attempt });
            },
            registration,
        ));
        if let Some(previous) = self.slow_timer.lock().replace(handle) {
            previous.abort();
        }
    }

    fn cancel_slow_timer(&self) {
        if let Some(handle) = self.slow_timer.lock().take() {
            handle.abort();
        }
    }
}

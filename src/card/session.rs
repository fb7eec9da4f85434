//! Card session: the presentation state machine for one visitor.
//!
//! Holds the current [`Stage`], the on-screen effects and the submission
//! guard. Stage changes are published on a watch channel for renderers.
//! Answering changes the stage immediately; the submission runs on a
//! detached task whose outcome is only logged and never changes the stage.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::effects::Effects;
use super::stage::Stage;
use super::submitter::ResponseSubmitter;
use crate::config::SessionConfig;
use crate::notifier::ResponseValue;

/// Cap on the recorded transition history.
const MAX_TRANSITIONS: usize = 200;

/// Progress of the one allowed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    /// Nothing sent yet; answering is allowed.
    #[default]
    Idle,
    /// A request is in flight.
    Pending,
    /// The attempt finished, successfully or not.
    Done,
}

/// A recorded stage change.
#[derive(Debug, Clone, Serialize)]
pub struct StageTransition {
    pub from: Stage,
    pub to: Stage,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct SessionState {
    stage: Stage,
    effects: Effects,
    submission: SubmissionState,
    /// Incremented on every envelope open; tags the opening timer.
    open_cycle: u64,
    transitions: Vec<StageTransition>,
}

impl SessionState {
    fn transition_to(&mut self, target: Stage) -> Result<(), String> {
        if !self.stage.can_transition_to(target) {
            return Err(format!("Cannot transition from {} to {}", self.stage, target));
        }

        self.transitions.push(StageTransition {
            from: self.stage,
            to: target,
            timestamp: Utc::now(),
        });
        if self.transitions.len() > MAX_TRANSITIONS {
            let drain_count = self.transitions.len() - MAX_TRANSITIONS;
            self.transitions.drain(..drain_count);
        }

        debug!(from = %self.stage, to = %target, "Stage transition");
        self.stage = target;
        Ok(())
    }
}

/// One visitor's card.
pub struct CardSession {
    state: Mutex<SessionState>,
    stage_tx: watch::Sender<Stage>,
    submitter: Arc<dyn ResponseSubmitter>,
    config: SessionConfig,
}

impl CardSession {
    /// Create a session resting on the closed envelope.
    pub fn new(config: SessionConfig, submitter: Arc<dyn ResponseSubmitter>) -> Arc<Self> {
        let (stage_tx, _rx) = watch::channel(Stage::Envelope);
        Arc::new(Self {
            state: Mutex::new(SessionState::default()),
            stage_tx,
            submitter,
            config,
        })
    }

    /// Receive every stage change. Renderers call this.
    pub fn subscribe(&self) -> watch::Receiver<Stage> {
        self.stage_tx.subscribe()
    }

    pub async fn stage(&self) -> Stage {
        self.state.lock().await.stage
    }

    pub async fn effects(&self) -> Effects {
        self.state.lock().await.effects.clone()
    }

    pub async fn submission(&self) -> SubmissionState {
        self.state.lock().await.submission
    }

    pub async fn transitions(&self) -> Vec<StageTransition> {
        self.state.lock().await.transitions.clone()
    }

    fn publish(&self, stage: Stage) {
        // Ok if nobody is watching.
        self.stage_tx.send_replace(stage);
    }

    /// Tap the envelope. Only honoured while the envelope is closed.
    ///
    /// Starts the opening effect and schedules the card to appear after the
    /// configured delay. Returns `false` when ignored.
    pub async fn open_envelope(self: &Arc<Self>) -> bool {
        let cycle = {
            let mut state = self.state.lock().await;
            if state.stage != Stage::Envelope {
                debug!(stage = %state.stage, "Envelope tap ignored");
                return false;
            }
            if let Err(e) = state.transition_to(Stage::Opening) {
                warn!(error = %e, "Envelope open rejected");
                return false;
            }
            state.effects.open_burst();
            state.open_cycle += 1;
            state.open_cycle
        };
        self.publish(Stage::Opening);

        let session = Arc::clone(self);
        let delay = self.config.open_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            session.finish_opening(cycle).await;
        });

        true
    }

    async fn finish_opening(&self, cycle: u64) {
        {
            let mut state = self.state.lock().await;
            if state.open_cycle != cycle || state.stage != Stage::Opening {
                debug!(cycle, "Stale opening timer ignored");
                return;
            }
            if let Err(e) = state.transition_to(Stage::Card) {
                warn!(error = %e, "Card reveal rejected");
                return;
            }
            state.effects.end_burst();
        }
        self.publish(Stage::Card);
    }

    /// Answer the card.
    ///
    /// Moves to `yes`/`no` at once and fires one detached submission. While a
    /// submission is pending or finished this is a no-op and returns `None`.
    /// The returned handle may be dropped; the task runs to completion anyway.
    pub async fn respond(self: &Arc<Self>, response: ResponseValue) -> Option<JoinHandle<()>> {
        let target = Stage::for_response(response);
        {
            let mut state = self.state.lock().await;
            if state.submission != SubmissionState::Idle {
                debug!(submission = ?state.submission, response = %response, "Answer ignored, already submitted");
                return None;
            }
            if let Err(e) = state.transition_to(target) {
                debug!(error = %e, "Answer ignored");
                return None;
            }
            state.submission = SubmissionState::Pending;
            match response {
                ResponseValue::Yes => state.effects.celebrate(),
                ResponseValue::No => state.effects.wilt(),
            }
        }
        self.publish(target);

        let session = Arc::clone(self);
        Some(tokio::spawn(async move {
            let outcome = session.submitter.submit(response).await;
            let mut state = session.state.lock().await;
            match outcome {
                Ok(email_id) => {
                    info!(
                        response = %response,
                        email_id = email_id.as_deref().unwrap_or("-"),
                        "Answer delivered"
                    );
                    state.submission = SubmissionState::Done;
                }
                Err(e) => {
                    warn!(response = %response, error = %e, "Notification failed");
                    state.submission = if session.config.retry_after_failure {
                        SubmissionState::Idle
                    } else {
                        SubmissionState::Done
                    };
                }
            }
        }))
    }

    /// Leave the declined card and go back to the closed envelope.
    ///
    /// Clears effects but leaves the submission guard untouched.
    pub async fn start_over(&self) -> bool {
        {
            let mut state = self.state.lock().await;
            if state.stage != Stage::No {
                debug!(stage = %state.stage, "Start over ignored");
                return false;
            }
            if let Err(e) = state.transition_to(Stage::Envelope) {
                warn!(error = %e, "Start over rejected");
                return false;
            }
            state.effects.clear();
        }
        self.publish(Stage::Envelope);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::card::effects::{CONFETTI_COUNT, WILTING_PETAL_COUNT};
    use crate::error::SubmitError;

    const DELAY: Duration = Duration::from_millis(1400);

    /// Submitter that counts calls and can be held open.
    struct StubSubmitter {
        calls: AtomicUsize,
        fail: bool,
        gate: Option<Arc<Notify>>,
    }

    impl StubSubmitter {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
                gate: None,
            })
        }

        fn gated(gate: Arc<Notify>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: false,
                gate: Some(gate),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ResponseSubmitter for StubSubmitter {
        async fn submit(&self, _response: ResponseValue) -> Result<Option<String>, SubmitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                Err(SubmitError::Status(500))
            } else {
                Ok(Some("abc123".into()))
            }
        }
    }

    fn session_with(submitter: Arc<StubSubmitter>, retry_after_failure: bool) -> Arc<CardSession> {
        let config = SessionConfig {
            open_delay: DELAY,
            retry_after_failure,
            ..SessionConfig::default()
        };
        CardSession::new(config, submitter)
    }

    async fn open_card(session: &Arc<CardSession>) {
        assert!(session.open_envelope().await);
        tokio::time::sleep(DELAY + Duration::from_millis(1)).await;
        assert_eq!(session.stage().await, Stage::Card);
    }

    #[tokio::test(start_paused = true)]
    async fn card_appears_after_delay_not_before() {
        let session = session_with(StubSubmitter::new(false), false);
        assert_eq!(session.stage().await, Stage::Envelope);

        assert!(session.open_envelope().await);
        assert_eq!(session.stage().await, Stage::Opening);
        assert_eq!(session.effects().await.burst.len(), 12);

        tokio::time::sleep(DELAY - Duration::from_millis(1)).await;
        assert_eq!(session.stage().await, Stage::Opening);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(session.stage().await, Stage::Card);
        assert!(session.effects().await.burst.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_taps_open_once() {
        let session = session_with(StubSubmitter::new(false), false);
        assert!(session.open_envelope().await);
        assert!(!session.open_envelope().await);
        assert!(!session.open_envelope().await);

        tokio::time::sleep(DELAY * 3).await;
        let to_card = session
            .transitions()
            .await
            .iter()
            .filter(|t| t.to == Stage::Card)
            .count();
        assert_eq!(to_card, 1);
        assert!(!session.open_envelope().await);
    }

    #[tokio::test(start_paused = true)]
    async fn answers_ignored_before_card() {
        let submitter = StubSubmitter::new(false);
        let session = session_with(submitter.clone(), false);

        assert!(session.respond(ResponseValue::Yes).await.is_none());
        assert!(session.open_envelope().await);
        assert!(session.respond(ResponseValue::No).await.is_none());
        assert_eq!(session.stage().await, Stage::Opening);
        assert_eq!(session.submission().await, SubmissionState::Idle);
        assert_eq!(submitter.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn yes_celebrates_and_submits_once() {
        let gate = Arc::new(Notify::new());
        let submitter = StubSubmitter::gated(gate.clone());
        let session = session_with(submitter.clone(), false);
        let mut rx = session.subscribe();
        open_card(&session).await;

        let handle = session.respond(ResponseValue::Yes).await.unwrap();
        assert_eq!(session.stage().await, Stage::Yes);
        assert_eq!(*rx.borrow_and_update(), Stage::Yes);
        assert_eq!(session.submission().await, SubmissionState::Pending);
        assert_eq!(session.effects().await.confetti.len(), CONFETTI_COUNT);

        for i in 0..25 {
            let response = if i % 2 == 0 {
                ResponseValue::Yes
            } else {
                ResponseValue::No
            };
            assert!(session.respond(response).await.is_none());
        }
        assert_eq!(session.stage().await, Stage::Yes);

        gate.notify_one();
        handle.await.unwrap();
        assert_eq!(submitter.calls(), 1);
        assert_eq!(session.submission().await, SubmissionState::Done);
        assert_eq!(session.stage().await, Stage::Yes);
        assert!(!session.start_over().await);
    }

    #[tokio::test(start_paused = true)]
    async fn stage_changes_before_submission_resolves() {
        let gate = Arc::new(Notify::new());
        let session = session_with(StubSubmitter::gated(gate.clone()), false);
        open_card(&session).await;

        let _handle = session.respond(ResponseValue::No).await.unwrap();
        // Submission is still parked on the gate.
        assert_eq!(session.submission().await, SubmissionState::Pending);
        assert_eq!(session.stage().await, Stage::No);
        assert_eq!(session.effects().await.petals.len(), WILTING_PETAL_COUNT);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_submission_stays_done_and_blocks_resubmit() {
        let submitter = StubSubmitter::new(true);
        let session = session_with(submitter.clone(), false);
        open_card(&session).await;

        session.respond(ResponseValue::No).await.unwrap().await.unwrap();
        // Failure never changes what the visitor sees.
        assert_eq!(session.stage().await, Stage::No);
        assert_eq!(session.submission().await, SubmissionState::Done);

        assert!(session.start_over().await);
        assert_eq!(session.stage().await, Stage::Envelope);
        assert!(session.effects().await.is_empty());

        open_card(&session).await;
        assert!(session.respond(ResponseValue::Yes).await.is_none());
        assert_eq!(session.stage().await, Stage::Card);
        assert_eq!(submitter.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_failure_reopens_guard() {
        let submitter = StubSubmitter::new(true);
        let session = session_with(submitter.clone(), true);
        open_card(&session).await;

        session.respond(ResponseValue::No).await.unwrap().await.unwrap();
        assert_eq!(session.submission().await, SubmissionState::Idle);

        assert!(session.start_over().await);
        open_card(&session).await;
        let handle = session.respond(ResponseValue::Yes).await;
        assert!(handle.is_some());
        assert_eq!(session.stage().await, Stage::Yes);
        handle.unwrap().await.unwrap();
        assert_eq!(submitter.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn envelope_only_reentered_from_no() {
        let session = session_with(StubSubmitter::new(false), false);
        assert!(!session.start_over().await);
        open_card(&session).await;
        assert!(!session.start_over().await);

        session.respond(ResponseValue::No).await.unwrap().await.unwrap();
        assert!(session.start_over().await);

        let transitions = session.transitions().await;
        let into_envelope: Vec<_> = transitions
            .iter()
            .filter(|t| t.to == Stage::Envelope)
            .collect();
        assert_eq!(into_envelope.len(), 1);
        assert_eq!(into_envelope[0].from, Stage::No);
    }
}

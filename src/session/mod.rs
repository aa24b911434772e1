//! Voice-capture session state machine
//!
//! Owns the lifecycle of a single recognition attempt: starts the engine,
//! interprets streamed partials to decide when to cut listening off,
//! classifies recognizer errors into retry outcomes, holds the ranked
//! result set through user-driven re-ranking, and guards the one-time
//! commit. All transitions happen in one synchronous transition core; the
//! async [`driver`] feeds it engine events and host commands one at a time
//! and owns the deferred timers, so no callback ever fires into a
//! torn-down session.
//!
//! Phase diagram:
//!
//! ```text
//! Idle -> Listening -> ReviewingResults -> { Committed | Listening (retry) }
//!            |  ^
//!            v  |  (auto, after a fixed delay)
//!        ErrorRecovering
//!
//! any phase -> Terminated on dismissal
//! ```

pub mod driver;
#[cfg(test)]
pub(crate) mod mocks;

use crate::classify;
use crate::collaborators::{AnalyticsEvent, Collaborators, SOURCE_VOICE_WIDGET};
use crate::cutoff;
use crate::engine::{self, RecognitionEngine, RecognitionEvent};
use crate::error::SessionError;
use crate::results::{ResultSet, SavedResults};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where the session currently is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, engine not yet started
    Idle,
    /// Engine running, consuming recognition events
    Listening,
    /// Waiting out the fixed delay after a recoverable recognizer error
    ErrorRecovering,
    /// Ranked results on screen, awaiting promote/commit/retry
    ReviewingResults,
    /// Entry committed, lingering so the confirmation can show
    Committed,
    /// Engine released; further events are dropped
    Terminated,
}

/// Deferred work the driver must schedule on the session's behalf
///
/// The session never sleeps itself; it hands the delay to its driver, whose
/// timer is dropped with the driver loop on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    None,
    /// Return to listening after the fixed error-recovery delay
    RetryAfter(Duration),
    /// Terminate after the post-commit linger
    TerminateAfter(Duration),
}

/// Fixed delays governing the session
#[derive(Debug, Clone, Copy)]
pub struct SessionTimings {
    /// Pause after activation before listening starts (UI settle)
    pub settle_delay: Duration,
    /// Pause before listening restarts after a recoverable error
    pub error_retry_delay: Duration,
    /// Pause after a commit so the confirmation affordance can show
    pub commit_linger: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(600),
            error_retry_delay: Duration::from_millis(2500),
            commit_linger: Duration::from_millis(600),
        }
    }
}

/// Session construction parameters
pub struct SessionConfig {
    pub language_hint: String,
    pub timings: SessionTimings,
}

/// The capture session state machine
///
/// One live session per capture UI instance; the engine handle is exclusive
/// and is released exactly once, on whichever path the session terminates
/// from (dismissal, post-commit linger, or drop).
pub struct CaptureSession {
    phase: Phase,
    results: Option<ResultSet>,
    /// Monotonic count of listening attempts
    attempt: u32,
    /// One commit per session; repeat commits are no-ops
    committed: bool,
    /// Rank that was primary at commit time, for analytics
    rank_at_commit: usize,
    /// Cutoff interrupt latch, reset on each attempt
    interrupt_sent: bool,
    language_hint: String,
    timings: SessionTimings,
    engine: Box<dyn RecognitionEngine>,
    collaborators: Collaborators,
}

impl CaptureSession {
    /// Create a session in `Idle`; listening starts on [`activate`](Self::activate)
    pub fn new(
        engine: Box<dyn RecognitionEngine>,
        collaborators: Collaborators,
        config: SessionConfig,
    ) -> Self {
        Self {
            phase: Phase::Idle,
            results: None,
            attempt: 0,
            committed: false,
            rank_at_commit: 0,
            interrupt_sent: false,
            language_hint: config.language_hint,
            timings: config.timings,
            engine,
            collaborators,
        }
    }

    /// Reconstruct a session from persisted results
    ///
    /// With a non-empty snapshot the session starts directly in
    /// `ReviewingResults`, indistinguishable from having arrived there via
    /// a `Final` event. An empty snapshot falls back to the normal `Idle`
    /// start.
    pub fn restore(
        saved: &SavedResults,
        engine: Box<dyn RecognitionEngine>,
        collaborators: Collaborators,
        config: SessionConfig,
    ) -> Self {
        let mut session = Self::new(engine, collaborators, config);
        match ResultSet::from_saved(saved) {
            Ok(set) => {
                info!(candidates = set.len(), "Restored session into result review");
                session.collaborators.presenter.show_results(&set.texts());
                session.results = Some(set);
                session.phase = Phase::ReviewingResults;
            }
            Err(_) => {
                debug!("No persisted results, session resumes in the listening flow");
            }
        }
        session
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn timings(&self) -> SessionTimings {
        self.timings
    }

    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    /// Ordered result strings for suspend/resume persistence
    pub fn persist(&self) -> SavedResults {
        self.results
            .as_ref()
            .map(ResultSet::snapshot)
            .unwrap_or_default()
    }

    /// Begin the first listening attempt
    ///
    /// Only acts from `Idle`; anywhere else it is a silent no-op. Engine
    /// acquisition failure is the one fatal error: it propagates to the
    /// host, which tears the session down.
    pub fn activate(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Idle {
            debug!(phase = ?self.phase, "Ignoring activate outside Idle");
            return Ok(());
        }
        self.begin_listening()
    }

    /// Consume one recognition event
    ///
    /// Events arriving in any phase other than `Listening` are dropped, not
    /// errors; the engine may race one last event past a `stop`.
    pub fn handle_event(&mut self, event: RecognitionEvent) -> Directive {
        if self.phase != Phase::Listening {
            debug!(phase = ?self.phase, ?event, "Dropping event outside the listening phase");
            return Directive::None;
        }
        match event {
            RecognitionEvent::Ready => Directive::None,
            RecognitionEvent::BeginSpeech => {
                self.collaborators.presenter.speech_began();
                Directive::None
            }
            RecognitionEvent::EndSpeech => {
                self.collaborators.presenter.speech_ended();
                Directive::None
            }
            RecognitionEvent::LevelChanged { amplitude } => {
                self.collaborators.presenter.level_changed(amplitude);
                Directive::None
            }
            RecognitionEvent::Partial { transcripts } => self.on_partial(&transcripts),
            RecognitionEvent::Final { transcripts } => self.on_final(&transcripts),
            RecognitionEvent::Error { code } => {
                self.engine.stop();
                self.recover(code)
            }
        }
    }

    /// The error-recovery delay ran out; go back to listening
    pub fn retry_delay_elapsed(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::ErrorRecovering {
            debug!(phase = ?self.phase, "Ignoring retry timer outside ErrorRecovering");
            return Ok(());
        }
        self.begin_listening()
    }

    /// User picked the alternate at `index` as the new primary
    ///
    /// Valid only while reviewing results and before the commit; anything
    /// else (wrong phase, out-of-range index, post-commit) is silently
    /// ignored.
    pub fn select_alternate(&mut self, index: usize) {
        if self.phase != Phase::ReviewingResults || self.committed {
            debug!(phase = ?self.phase, index, "Ignoring alternate selection");
            return;
        }
        let Some(results) = self.results.as_mut() else {
            return;
        };
        match results.promote(index) {
            Ok(()) => {
                self.rank_at_commit = index;
                let texts = results.texts();
                self.collaborators.presenter.show_results(&texts);
            }
            Err(e) => debug!(%e, "Ignoring promote"),
        }
    }

    /// Commit the primary transcript as a new list entry
    ///
    /// Exactly one commit per session: repeat calls are idempotent no-ops.
    /// Records the rank that was primary at commit time, hands the text to
    /// the list service, and asks the driver to terminate after the linger.
    pub fn commit(&mut self) -> Directive {
        if self.phase != Phase::ReviewingResults || self.committed {
            debug!(phase = ?self.phase, committed = self.committed, "Ignoring commit");
            return Directive::None;
        }
        let Some(results) = self.results.as_ref() else {
            return Directive::None;
        };
        self.committed = true;
        let text = results.primary().to_string();
        info!(text = %text, rank = self.rank_at_commit, "Committing entry");

        self.collaborators.analytics.record(AnalyticsEvent::ItemAdded {
            rank_at_commit: self.rank_at_commit,
        });
        self.collaborators
            .list
            .add_entry(&text, SOURCE_VOICE_WIDGET, self.rank_at_commit);
        self.collaborators.presenter.show_committed(&text);

        self.phase = Phase::Committed;
        Directive::TerminateAfter(self.timings.commit_linger)
    }

    /// Discard the results and listen again
    pub fn retry(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::ReviewingResults {
            debug!(phase = ?self.phase, "Ignoring retry");
            return Ok(());
        }
        info!("Retrying capture, discarding results");
        self.results = None;
        self.committed = false;
        self.rank_at_commit = 0;
        self.begin_listening()
    }

    /// Terminate the session and release the engine
    ///
    /// Idempotent; reached from any phase. After this every event and
    /// command is dropped.
    pub fn dismiss(&mut self) {
        if self.phase == Phase::Terminated {
            return;
        }
        self.engine.stop();
        self.engine.release();
        self.phase = Phase::Terminated;
        info!("Capture session terminated");
    }

    fn begin_listening(&mut self) -> Result<(), SessionError> {
        self.engine.start(&self.language_hint)?;
        self.attempt += 1;
        self.interrupt_sent = false;
        self.phase = Phase::Listening;
        self.collaborators.presenter.show_listening();
        info!(attempt = self.attempt, "Listening");
        Ok(())
    }

    fn on_partial(&mut self, transcripts: &[String]) -> Directive {
        let Some(best) = transcripts.first() else {
            return Directive::None;
        };
        if !best.trim().is_empty() {
            self.collaborators.presenter.show_live_text(best);
        }
        // Cut the speaker off once the best partial is long enough. The
        // engine still owes us a Final or an Error, so the phase stays put.
        if !self.interrupt_sent && cutoff::should_interrupt(best) {
            info!(partial = %best, "Cutoff reached, interrupting listening");
            self.engine.interrupt();
            self.interrupt_sent = true;
        }
        Directive::None
    }

    fn on_final(&mut self, transcripts: &[String]) -> Directive {
        self.engine.stop();
        match ResultSet::from_final(transcripts) {
            Ok(set) => {
                info!(candidates = set.len(), "Recognition finished");
                self.collaborators.presenter.show_results(&set.texts());
                self.results = Some(set);
                self.phase = Phase::ReviewingResults;
                Directive::None
            }
            // An empty final reuses the full error-message/retry pipeline
            Err(_) => self.recover(engine::EMPTY_RESULT),
        }
    }

    fn recover(&mut self, code: i32) -> Directive {
        let classification = classify::classify(code);
        warn!(
            code,
            category = ?classification.category,
            message = %classification.message,
            "Recognition error, retrying after delay"
        );
        self.collaborators.presenter.show_message(classification.message);
        self.phase = Phase::ErrorRecovering;
        Directive::RetryAfter(self.timings.error_retry_delay)
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        // Engine release is idempotent, so a host that never called
        // dismiss still gives the audio-service handle back exactly once.
        self.dismiss();
    }
}

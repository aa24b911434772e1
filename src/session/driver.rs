//! Async session driver
//!
//! Feeds the synchronous state machine from two inbound streams (engine
//! events and host commands) inside a single `tokio::select!` loop, so the
//! session processes one input at a time in arrival order. The loop also
//! owns the single slot of deferred work (activation settle, error retry,
//! post-commit linger); a pending timer is dropped together with the loop on
//! every exit path, which is what makes it impossible for the retry timer to
//! fire into a torn-down session.

use super::{CaptureSession, Directive, Phase};
use crate::engine::RecognitionEvent;
use crate::error::SessionError;
use crate::results::SavedResults;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep_until, Instant};
use tracing::warn;

/// Command from the hosting UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// User tapped the alternate at this index
    SelectAlternate(usize),
    /// User tapped the primary result to commit it
    Commit,
    /// User asked to listen again
    Retry,
    /// User dismissed the capture UI
    Dismiss,
}

/// How the session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// An entry was committed; carries the committed text
    Committed { text: String },
    /// Dismissed without a commit; carries the persistable result state so
    /// the host can stash it across a suspend/resume boundary
    Dismissed { saved: SavedResults },
}

/// What the pending timer means when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    /// UI settle delay before the first listen
    Activate,
    /// Error-recovery delay before listening restarts
    Retry,
    /// Post-commit linger before termination
    Linger,
}

/// Drive a capture session to completion
///
/// Returns when the session terminates: on commit (after the linger), on
/// dismissal, or on the one fatal error ([`SessionError::EngineUnavailable`]).
/// The engine handle is released on every path, including the error one.
pub async fn run_session(
    mut session: CaptureSession,
    mut events: broadcast::Receiver<RecognitionEvent>,
    mut commands: mpsc::Receiver<Command>,
) -> Result<SessionOutcome, SessionError> {
    let mut deadline: Option<(TimerKind, Instant)> = if session.phase() == Phase::Idle {
        Some((
            TimerKind::Activate,
            Instant::now() + session.timings().settle_delay,
        ))
    } else {
        // Restored straight into result review; no settle, no listen
        None
    };

    let result = loop {
        let armed = deadline;
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => match session.handle_event(event) {
                    Directive::None => {}
                    Directive::RetryAfter(delay) => {
                        deadline = Some((TimerKind::Retry, Instant::now() + delay));
                    }
                    Directive::TerminateAfter(delay) => {
                        deadline = Some((TimerKind::Linger, Instant::now() + delay));
                    }
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Recognition event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    warn!("Recognition event stream closed, ending session");
                    break Ok(teardown_outcome(&session));
                }
            },
            command = commands.recv() => match command {
                Some(Command::SelectAlternate(index)) => session.select_alternate(index),
                Some(Command::Commit) => {
                    if let Directive::TerminateAfter(delay) = session.commit() {
                        deadline = Some((TimerKind::Linger, Instant::now() + delay));
                    }
                }
                Some(Command::Retry) => {
                    if let Err(e) = session.retry() {
                        break Err(e);
                    }
                }
                Some(Command::Dismiss) | None => {
                    break Ok(teardown_outcome(&session));
                }
            },
            _ = fire(armed), if armed.is_some() => {
                deadline = None;
                match armed.map(|(kind, _)| kind) {
                    Some(TimerKind::Activate) => {
                        if let Err(e) = session.activate() {
                            break Err(e);
                        }
                    }
                    Some(TimerKind::Retry) => {
                        if let Err(e) = session.retry_delay_elapsed() {
                            break Err(e);
                        }
                    }
                    Some(TimerKind::Linger) | None => {
                        break Ok(teardown_outcome(&session));
                    }
                }
            }
        }
    };

    // Runs on every exit path; releases the engine handle exactly once and
    // takes any still-pending timer down with the loop.
    session.dismiss();
    result
}

/// Outcome for a session that is about to terminate
fn teardown_outcome(session: &CaptureSession) -> SessionOutcome {
    if session.is_committed() {
        let text = session
            .results()
            .map(|r| r.primary().to_string())
            .unwrap_or_default();
        SessionOutcome::Committed { text }
    } else {
        SessionOutcome::Dismissed {
            saved: session.persist(),
        }
    }
}

async fn fire(armed: Option<(TimerKind, Instant)>) {
    match armed {
        Some((_, at)) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

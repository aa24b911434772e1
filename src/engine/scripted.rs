//! Scripted recognition engine
//!
//! Canned event source implementing [`RecognitionEngine`], used by the demo
//! binary and the driver tests. Each `start` plays back the next scripted
//! attempt on a spawned task, one event at a time.

use super::{EngineError, RecognitionEngine, RecognitionEvent};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{info, warn};

/// Pause between scripted events
const EVENT_GAP: Duration = Duration::from_millis(40);

/// Recognition engine that replays pre-recorded event scripts
///
/// Holds one script per listening attempt; `start` consumes the next one.
/// `interrupt` skips the remaining interim events and jumps to the script's
/// terminal `Final`/`Error`, mirroring how a real recognizer wraps up after
/// a soft stop. `stop` suppresses everything still queued.
pub struct ScriptedEngine {
    event_tx: broadcast::Sender<RecognitionEvent>,
    attempts: VecDeque<Vec<RecognitionEvent>>,
    listening: Arc<AtomicBool>,
    interrupted: Arc<AtomicBool>,
    released: bool,
}

impl ScriptedEngine {
    /// Create an engine that plays `attempts` in order, one per `start`
    pub fn new<I>(attempts: I) -> Self
    where
        I: IntoIterator<Item = Vec<RecognitionEvent>>,
    {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            event_tx,
            attempts: attempts.into_iter().collect(),
            listening: Arc::new(AtomicBool::new(false)),
            interrupted: Arc::new(AtomicBool::new(false)),
            released: false,
        }
    }
}

impl RecognitionEngine for ScriptedEngine {
    fn subscribe(&self) -> broadcast::Receiver<RecognitionEvent> {
        self.event_tx.subscribe()
    }

    fn start(&mut self, language_hint: &str) -> Result<(), EngineError> {
        if self.released {
            return Err(EngineError::Released);
        }
        // Only one concurrent listen; repeated start is a no-op
        if self.listening.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.interrupted.store(false, Ordering::SeqCst);

        let Some(script) = self.attempts.pop_front() else {
            warn!("Scripted engine is out of attempts, staying silent");
            self.listening.store(false, Ordering::SeqCst);
            return Ok(());
        };

        info!(language_hint, "Scripted engine listening");

        let event_tx = self.event_tx.clone();
        let listening = self.listening.clone();
        let interrupted = self.interrupted.clone();
        tokio::spawn(async move {
            for event in script {
                sleep(EVENT_GAP).await;
                if !listening.load(Ordering::SeqCst) {
                    break;
                }
                // After a soft stop only the terminal event still goes out
                let is_terminal = matches!(
                    event,
                    RecognitionEvent::Final { .. } | RecognitionEvent::Error { .. }
                );
                if interrupted.load(Ordering::SeqCst) && !is_terminal {
                    continue;
                }
                if event_tx.send(event).is_err() {
                    break;
                }
                if is_terminal {
                    break;
                }
            }
            listening.store(false, Ordering::SeqCst);
        });

        Ok(())
    }

    fn interrupt(&mut self) {
        info!("Scripted engine interrupt");
        self.interrupted.store(true, Ordering::SeqCst);
    }

    fn stop(&mut self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.stop();
        self.released = true;
        info!("Scripted engine released");
    }
}

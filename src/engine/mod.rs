//! Recognition engine abstraction
//!
//! Narrow capability interface over an external, asynchronous speech
//! recognition service. The engine emits a stream of [`RecognitionEvent`]s
//! over a broadcast channel until told to stop; the capture session consumes
//! them one at a time, in arrival order.

mod scripted;

pub use scripted::ScriptedEngine;

use thiserror::Error;
use tokio::sync::broadcast;

/// Recognizer error code: network operation timed out
pub const ERROR_NETWORK_TIMEOUT: i32 = 1;
/// Recognizer error code: other network trouble
pub const ERROR_NETWORK: i32 = 2;
/// Recognizer error code: audio recording failed
pub const ERROR_AUDIO: i32 = 3;
/// Recognizer error code: server-side error
pub const ERROR_SERVER: i32 = 4;
/// Recognizer error code: client-side error
pub const ERROR_CLIENT: i32 = 5;
/// Recognizer error code: no speech input before the engine gave up
pub const ERROR_SPEECH_TIMEOUT: i32 = 6;
/// Recognizer error code: speech was heard but nothing matched
pub const ERROR_NO_MATCH: i32 = 7;
/// Recognizer error code: the recognition service is busy
pub const ERROR_RECOGNIZER_BUSY: i32 = 8;

/// Synthesized error code for a final result that carried no transcripts.
///
/// Not a real engine code; an empty final is routed through the same
/// classify-and-retry pipeline as a recognition error.
pub const EMPTY_RESULT: i32 = -1;

/// Event emitted by the recognition engine during a listening attempt
///
/// `Partial` carries interim, possibly-revised candidates (best-first);
/// `Final` carries the terminal ranked set for the attempt, up to five
/// candidates. There is no guarantee on `Partial` timing: zero or more may
/// arrive before a `Final` or an `Error`.
#[derive(Debug, Clone)]
pub enum RecognitionEvent {
    /// Engine is ready for speech
    Ready,
    /// User started speaking
    BeginSpeech,
    /// User stopped speaking
    EndSpeech,
    /// Interim transcript candidates, best-first
    Partial { transcripts: Vec<String> },
    /// Terminal transcript candidates for this attempt, best-first
    Final { transcripts: Vec<String> },
    /// Recognizer error, see the `ERROR_*` constants
    Error { code: i32 },
    /// Input level changed (for the level meter)
    LevelChanged { amplitude: f32 },
}

/// Errors surfaced by a recognition engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Recognition engine unavailable: {0}")]
    Unavailable(String),

    #[error("Recognition engine already released")]
    Released,
}

/// Capability interface over the external speech recognition service
///
/// The engine owns an exclusive hardware/audio-service handle. At most one
/// listen is in flight per engine: `start` while already listening is a
/// no-op. `release` tears the handle down and is idempotent; it must happen
/// before a new session may start on the same device resource.
pub trait RecognitionEngine: Send {
    /// Subscribe to the engine's event stream
    ///
    /// Subscribe before calling [`start`](Self::start) or early events may
    /// be missed.
    fn subscribe(&self) -> broadcast::Receiver<RecognitionEvent>;

    /// Begin a listening attempt
    ///
    /// Idempotent while a listen is already in flight. Fails with
    /// [`EngineError::Unavailable`] if the audio-service handle cannot be
    /// acquired, or [`EngineError::Released`] after [`release`](Self::release).
    fn start(&mut self, language_hint: &str) -> Result<(), EngineError>;

    /// Soft stop: ask the engine to wrap up the current attempt
    ///
    /// A `Final` or `Error` event is still expected afterwards.
    fn interrupt(&mut self);

    /// Hard stop: end the current attempt and suppress further events
    fn stop(&mut self);

    /// Tear down the engine handle; idempotent
    fn release(&mut self);
}

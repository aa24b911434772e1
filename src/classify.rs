//! Recognizer error classification
//!
//! Maps raw engine error codes to a small taxonomy plus the user-facing
//! message key shown while the session waits out the retry delay. Every
//! category is retried automatically; nothing here is fatal. The session
//! only ends via explicit dismissal or a successful commit.

use crate::engine;
use std::fmt;

/// Broad category of a recognizer failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Recording trouble or no speech before the engine gave up
    AudioTrouble,
    /// Network or server-side failure
    Network,
    /// Speech was heard but nothing matched
    NoMatch,
    /// Anything else, including the synthesized empty-final code
    Unknown,
}

/// Key identifying the message shown to the user during error recovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    AudioError,
    NoInternet,
    NoInterpretation,
    DefaultError,
}

impl MessageKey {
    /// Stable string form used by presentation layers for lookup
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::AudioError => "audio-error",
            MessageKey::NoInternet => "no-internet",
            MessageKey::NoInterpretation => "no-interpretation",
            MessageKey::DefaultError => "default-error",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one engine error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: ErrorCategory,
    pub message: MessageKey,
}

/// Classify a recognizer error code
///
/// Unknown codes (including [`engine::EMPTY_RESULT`], the synthesized code
/// for a final result with no transcripts) fall through to
/// [`ErrorCategory::Unknown`] with the default message.
pub fn classify(code: i32) -> Classification {
    match code {
        engine::ERROR_AUDIO | engine::ERROR_SPEECH_TIMEOUT => Classification {
            category: ErrorCategory::AudioTrouble,
            message: MessageKey::AudioError,
        },
        engine::ERROR_NETWORK | engine::ERROR_NETWORK_TIMEOUT | engine::ERROR_SERVER => {
            Classification {
                category: ErrorCategory::Network,
                message: MessageKey::NoInternet,
            }
        }
        engine::ERROR_NO_MATCH => Classification {
            category: ErrorCategory::NoMatch,
            message: MessageKey::NoInterpretation,
        },
        _ => Classification {
            category: ErrorCategory::Unknown,
            message: MessageKey::DefaultError,
        },
    }
}

//! Cutoff policy for proactively ending a listening attempt
//!
//! The recognizer keeps listening until the speaker trails off on its own,
//! which is too long for a single shopping-list entry. Once a partial
//! transcript reaches the token threshold we ask the engine to wrap up.

/// Token count at which listening is proactively interrupted
pub(crate) const CUTOFF_TOKEN_COUNT: usize = 4;

/// Decide whether a partial transcript warrants interrupting the recognizer
///
/// Returns true iff the best partial contains at least
/// [`CUTOFF_TOKEN_COUNT`] whitespace-delimited tokens.
///
/// Best-effort only: partials arrive on the engine's own cadence, so the
/// actual cutoff point is *at least* the threshold, never a hard real-time
/// guarantee.
pub(crate) fn should_interrupt(partial: &str) -> bool {
    partial.split_whitespace().count() >= CUTOFF_TOKEN_COUNT
}

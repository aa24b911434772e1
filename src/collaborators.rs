//! Outbound capability seams
//!
//! The capture session talks to the rest of the app exclusively through
//! these traits, injected at construction. The shopping list, the analytics
//! pipeline, and the capture screen are external collaborators; the session
//! never reaches for a global to find them.

use crate::classify::MessageKey;
use std::sync::Arc;

/// Source tag recorded with entries added through the voice widget
pub const SOURCE_VOICE_WIDGET: &str = "voice-widget";

/// Event recorded with the analytics sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsEvent {
    /// An entry was committed; carries the rank that was primary at commit
    ItemAdded { rank_at_commit: usize },
}

/// Shopping-list mutation service
pub trait ListMutationService: Send + Sync {
    /// Add a new list entry from a committed transcript
    fn add_entry(&self, text: &str, source_tag: &str, rank_at_commit: usize);
}

/// Analytics event sink
pub trait AnalyticsSink: Send + Sync {
    fn record(&self, event: AnalyticsEvent);
}

/// Presentation surface for the two-phase capture screen
///
/// The session drives the screen through these calls; rendering and
/// animation mechanics stay on the other side.
pub trait CapturePresenter: Send {
    /// Listening screen is (back) on display
    fn show_listening(&self);
    /// Update the live partial transcript text
    fn show_live_text(&self, text: &str);
    /// Show a short recoverable-error message
    fn show_message(&self, key: MessageKey);
    /// Switch to the result screen with ranked candidates, primary first
    fn show_results(&self, texts: &[String]);
    /// Show the committed-entry confirmation affordance
    fn show_committed(&self, text: &str);
    /// User started speaking
    fn speech_began(&self);
    /// User stopped speaking
    fn speech_ended(&self);
    /// Input level changed
    fn level_changed(&self, amplitude: f32);
}

/// Collaborator references handed to a capture session at construction
pub struct Collaborators {
    pub list: Arc<dyn ListMutationService>,
    pub analytics: Arc<dyn AnalyticsSink>,
    pub presenter: Box<dyn CapturePresenter>,
}

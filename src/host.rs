//! Demo host collaborators
//!
//! Console-backed implementations of the outbound seams, used by the demo
//! binary. A real host would bind these to its widget UI, shopping-list
//! store, and analytics pipeline.

use crate::classify::MessageKey;
use crate::collaborators::{AnalyticsEvent, AnalyticsSink, CapturePresenter, ListMutationService};
use std::sync::Mutex;
use tracing::info;

/// Presenter that narrates the capture screen to the log
pub struct ConsolePresenter;

impl CapturePresenter for ConsolePresenter {
    fn show_listening(&self) {
        info!("[screen] Listening...");
    }

    fn show_live_text(&self, text: &str) {
        info!("[screen] Heard so far: {text}");
    }

    fn show_message(&self, key: MessageKey) {
        info!("[screen] Message: {key}");
    }

    fn show_results(&self, texts: &[String]) {
        info!("[screen] Did you mean: {texts:?}");
    }

    fn show_committed(&self, text: &str) {
        info!("[screen] Added \"{text}\" to your list");
    }

    fn speech_began(&self) {
        info!("[screen] Speech started");
    }

    fn speech_ended(&self) {
        info!("[screen] Speech ended");
    }

    fn level_changed(&self, amplitude: f32) {
        info!("[screen] Level: {amplitude:.2}");
    }
}

/// One committed shopping-list entry
#[derive(Debug, Clone)]
pub struct ListEntry {
    pub text: String,
    pub source_tag: String,
    pub rank_at_commit: usize,
}

/// In-memory stand-in for the shopping-list service
#[derive(Default)]
pub struct InMemoryShoppingList {
    entries: Mutex<Vec<ListEntry>>,
}

impl InMemoryShoppingList {
    pub fn entries(&self) -> Vec<ListEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ListMutationService for InMemoryShoppingList {
    fn add_entry(&self, text: &str, source_tag: &str, rank_at_commit: usize) {
        info!(text, source_tag, rank_at_commit, "Adding list entry");
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(ListEntry {
                text: text.to_string(),
                source_tag: source_tag.to_string(),
                rank_at_commit,
            });
        }
    }
}

/// Analytics sink that logs events instead of shipping them
pub struct ConsoleAnalytics;

impl AnalyticsSink for ConsoleAnalytics {
    fn record(&self, event: AnalyticsEvent) {
        info!(?event, "Analytics event");
    }
}

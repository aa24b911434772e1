//! Test doubles shared by the session and driver tests

use crate::classify::MessageKey;
use crate::collaborators::{
    AnalyticsEvent, AnalyticsSink, CapturePresenter, Collaborators, ListMutationService,
};
use crate::engine::{EngineError, RecognitionEngine, RecognitionEvent};
use crate::results::SavedResults;
use crate::session::{CaptureSession, SessionConfig, SessionTimings};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::sync::mpsc::UnboundedSender;

/// Engine control calls, in the order the session issued them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EngineCall {
    Start,
    Interrupt,
    Stop,
    Release,
}

/// Engine double that records every control call
///
/// Deliberately does NOT deduplicate `release` calls: the exactly-once
/// guarantee lives in the session, and these logs are how tests verify it.
pub(crate) struct RecordingEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    event_tx: broadcast::Sender<RecognitionEvent>,
    fail_start: bool,
}

impl RecordingEngine {
    pub fn new(calls: Arc<Mutex<Vec<EngineCall>>>) -> Self {
        let (event_tx, _) = broadcast::channel(16);
        Self {
            calls,
            event_tx,
            fail_start: false,
        }
    }

    /// An engine whose `start` always fails with `Unavailable`
    pub fn new_failing(calls: Arc<Mutex<Vec<EngineCall>>>) -> Self {
        Self {
            fail_start: true,
            ..Self::new(calls)
        }
    }
}

impl RecognitionEngine for RecordingEngine {
    fn subscribe(&self) -> broadcast::Receiver<RecognitionEvent> {
        self.event_tx.subscribe()
    }

    fn start(&mut self, _language_hint: &str) -> Result<(), EngineError> {
        if self.fail_start {
            return Err(EngineError::Unavailable("no recognizer on device".into()));
        }
        self.calls.lock().unwrap().push(EngineCall::Start);
        Ok(())
    }

    fn interrupt(&mut self) {
        self.calls.lock().unwrap().push(EngineCall::Interrupt);
    }

    fn stop(&mut self) {
        self.calls.lock().unwrap().push(EngineCall::Stop);
    }

    fn release(&mut self) {
        self.calls.lock().unwrap().push(EngineCall::Release);
    }
}

/// Wrapper that counts lifecycle calls on a real engine implementation
///
/// Used by the driver tests, where a [`ScriptedEngine`](crate::engine::ScriptedEngine)
/// sits inside the session and is no longer reachable for assertions.
pub(crate) struct CountingEngine<E> {
    inner: E,
    pub starts: Arc<AtomicUsize>,
    pub releases: Arc<AtomicUsize>,
}

impl<E: RecognitionEngine> CountingEngine<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            starts: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl<E: RecognitionEngine> RecognitionEngine for CountingEngine<E> {
    fn subscribe(&self) -> broadcast::Receiver<RecognitionEvent> {
        self.inner.subscribe()
    }

    fn start(&mut self, language_hint: &str) -> Result<(), EngineError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.inner.start(language_hint)
    }

    fn interrupt(&mut self) {
        self.inner.interrupt();
    }

    fn stop(&mut self) {
        self.inner.stop();
    }

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.inner.release();
    }
}

/// Presenter calls, in order
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PresenterCall {
    Listening,
    LiveText(String),
    Message(MessageKey),
    Results(Vec<String>),
    Committed(String),
    SpeechBegan,
    SpeechEnded,
    Level(f32),
}

/// Presenter double that records calls and optionally forwards each one
/// over a channel so async tests can await screen transitions
pub(crate) struct RecordingPresenter {
    calls: Arc<Mutex<Vec<PresenterCall>>>,
    notify: Option<UnboundedSender<PresenterCall>>,
}

impl RecordingPresenter {
    pub fn new(calls: Arc<Mutex<Vec<PresenterCall>>>) -> Self {
        Self {
            calls,
            notify: None,
        }
    }

    pub fn with_notify(
        calls: Arc<Mutex<Vec<PresenterCall>>>,
        notify: UnboundedSender<PresenterCall>,
    ) -> Self {
        Self {
            calls,
            notify: Some(notify),
        }
    }

    fn record(&self, call: PresenterCall) {
        self.calls.lock().unwrap().push(call.clone());
        if let Some(tx) = &self.notify {
            let _ = tx.send(call);
        }
    }
}

impl CapturePresenter for RecordingPresenter {
    fn show_listening(&self) {
        self.record(PresenterCall::Listening);
    }

    fn show_live_text(&self, text: &str) {
        self.record(PresenterCall::LiveText(text.to_string()));
    }

    fn show_message(&self, key: MessageKey) {
        self.record(PresenterCall::Message(key));
    }

    fn show_results(&self, texts: &[String]) {
        self.record(PresenterCall::Results(texts.to_vec()));
    }

    fn show_committed(&self, text: &str) {
        self.record(PresenterCall::Committed(text.to_string()));
    }

    fn speech_began(&self) {
        self.record(PresenterCall::SpeechBegan);
    }

    fn speech_ended(&self) {
        self.record(PresenterCall::SpeechEnded);
    }

    fn level_changed(&self, amplitude: f32) {
        self.record(PresenterCall::Level(amplitude));
    }
}

/// List service double
pub(crate) struct RecordingList {
    pub entries: Arc<Mutex<Vec<(String, String, usize)>>>,
}

impl ListMutationService for RecordingList {
    fn add_entry(&self, text: &str, source_tag: &str, rank_at_commit: usize) {
        self.entries
            .lock()
            .unwrap()
            .push((text.to_string(), source_tag.to_string(), rank_at_commit));
    }
}

/// Analytics sink double
pub(crate) struct RecordingAnalytics {
    pub events: Arc<Mutex<Vec<AnalyticsEvent>>>,
}

impl AnalyticsSink for RecordingAnalytics {
    fn record(&self, event: AnalyticsEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// A session wired to recording doubles, plus handles to their logs
pub(crate) struct TestHarness {
    pub session: CaptureSession,
    pub calls: Arc<Mutex<Vec<EngineCall>>>,
    pub presenter: Arc<Mutex<Vec<PresenterCall>>>,
    pub entries: Arc<Mutex<Vec<(String, String, usize)>>>,
    pub events: Arc<Mutex<Vec<AnalyticsEvent>>>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::build(None, false)
    }

    pub fn with_unavailable_engine() -> Self {
        Self::build(None, true)
    }

    pub fn restored(saved: &SavedResults) -> Self {
        Self::build(Some(saved), false)
    }

    fn build(saved: Option<&SavedResults>, fail_start: bool) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let presenter = Arc::new(Mutex::new(Vec::new()));
        let entries = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::new(Mutex::new(Vec::new()));

        let engine = if fail_start {
            Box::new(RecordingEngine::new_failing(calls.clone()))
        } else {
            Box::new(RecordingEngine::new(calls.clone()))
        };
        let collaborators = Collaborators {
            list: Arc::new(RecordingList {
                entries: entries.clone(),
            }),
            analytics: Arc::new(RecordingAnalytics {
                events: events.clone(),
            }),
            presenter: Box::new(RecordingPresenter::new(presenter.clone())),
        };
        let config = SessionConfig {
            language_hint: "en".to_string(),
            timings: SessionTimings::default(),
        };

        let session = match saved {
            Some(saved) => CaptureSession::restore(saved, engine, collaborators, config),
            None => CaptureSession::new(engine, collaborators, config),
        };

        Self {
            session,
            calls,
            presenter,
            entries,
            events,
        }
    }

    pub fn engine_calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn presenter_calls(&self) -> Vec<PresenterCall> {
        self.presenter.lock().unwrap().clone()
    }

    /// Committed entries as (text, rank-at-commit)
    pub fn list_entries(&self) -> Vec<(String, usize)> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|(text, _, rank)| (text.clone(), *rank))
            .collect()
    }

    pub fn analytics_events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().unwrap().clone()
    }
}

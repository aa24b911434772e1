#![deny(clippy::all)]

mod classify;
mod collaborators;
mod cutoff;
mod engine;
mod error;
mod host;
mod persist;
mod results;
mod session;

use crate::collaborators::Collaborators;
use crate::engine::{RecognitionEngine, RecognitionEvent, ScriptedEngine};
use crate::host::{ConsoleAnalytics, ConsolePresenter, InMemoryShoppingList};
use crate::session::driver::{run_session, Command, SessionOutcome};
use crate::session::{CaptureSession, SessionConfig, SessionTimings};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// Application configuration
#[derive(serde::Deserialize)]
struct Config {
    capture: CaptureConfig,
}

#[derive(serde::Deserialize)]
struct CaptureConfig {
    language_hint: String,
    settle_delay_ms: u64,
    error_retry_delay_ms: u64,
    commit_linger_ms: u64,
}

impl CaptureConfig {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            language_hint: self.language_hint.clone(),
            timings: SessionTimings {
                settle_delay: Duration::from_millis(self.settle_delay_ms),
                error_retry_delay: Duration::from_millis(self.error_retry_delay_ms),
                commit_linger: Duration::from_millis(self.commit_linger_ms),
            },
        }
    }
}

/// Load configuration from embedded config.toml
fn load_config() -> anyhow::Result<Config> {
    const CONFIG_TOML: &str = include_str!("../config.toml");
    let config: Config = toml::from_str(CONFIG_TOML).context("invalid embedded config.toml")?;
    Ok(config)
}

fn demo_collaborators(list: Arc<InMemoryShoppingList>) -> Collaborators {
    Collaborators {
        list,
        analytics: Arc::new(ConsoleAnalytics),
        presenter: Box::new(ConsolePresenter),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Send the given commands to a running session, each after its delay
fn send_after(commands: mpsc::Sender<Command>, script: Vec<(Duration, Command)>) {
    tokio::spawn(async move {
        for (delay, command) in script {
            tokio::time::sleep(delay).await;
            if commands.send(command).await.is_err() {
                break;
            }
        }
    });
}

/// First visit: the user speaks, the candidates come up for review, and the
/// widget is put away before a choice is made
async fn capture_and_dismiss(
    config: &Config,
    list: Arc<InMemoryShoppingList>,
) -> Result<SessionOutcome, crate::error::SessionError> {
    let engine = ScriptedEngine::new(vec![vec![
        RecognitionEvent::Ready,
        RecognitionEvent::BeginSpeech,
        RecognitionEvent::LevelChanged { amplitude: 0.4 },
        RecognitionEvent::Partial {
            transcripts: strings(&["milk"]),
        },
        RecognitionEvent::Partial {
            transcripts: strings(&["milk and eggs"]),
        },
        RecognitionEvent::Partial {
            transcripts: strings(&["milk and eggs and bread today"]),
        },
        RecognitionEvent::Final {
            transcripts: strings(&[
                "milk and eggs and bread today",
                "milk and eggs",
                "bread today",
            ]),
        },
    ]]);
    let events = engine.subscribe();
    let session = CaptureSession::new(
        Box::new(engine),
        demo_collaborators(list),
        config.capture.session_config(),
    );

    let (command_tx, command_rx) = mpsc::channel(8);
    send_after(
        command_tx,
        vec![(Duration::from_millis(1500), Command::Dismiss)],
    );

    run_session(session, events, command_rx).await
}

/// Second visit: restore straight into result review, pick the second
/// candidate, and commit it
async fn resume_and_commit(
    config: &Config,
    list: Arc<InMemoryShoppingList>,
    saved: crate::results::SavedResults,
) -> Result<SessionOutcome, crate::error::SessionError> {
    let engine = ScriptedEngine::new(vec![]);
    let events = engine.subscribe();
    let session = CaptureSession::restore(
        &saved,
        Box::new(engine),
        demo_collaborators(list),
        config.capture.session_config(),
    );

    let (command_tx, command_rx) = mpsc::channel(8);
    send_after(
        command_tx,
        vec![
            (Duration::from_millis(200), Command::SelectAlternate(1)),
            (Duration::from_millis(200), Command::Commit),
        ],
    );

    run_session(session, events, command_rx).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for structured logging
    tracing_subscriber::fmt::init();

    // Load configuration from embedded config.toml
    let config = load_config()?;

    // The shopping list outlives individual capture sessions
    let list = Arc::new(InMemoryShoppingList::default());

    let outcome = capture_and_dismiss(&config, list.clone()).await?;
    if let SessionOutcome::Dismissed { saved } = outcome {
        if !saved.is_empty() {
            let path = persist::save_snapshot(&saved)?;
            info!("Results stashed at {:?} for the next visit", path);
        }
    }

    let saved = persist::load_snapshot().unwrap_or_default();
    let outcome = resume_and_commit(&config, list.clone(), saved).await?;
    if let SessionOutcome::Committed { text } = outcome {
        info!(%text, "Capture committed");
        persist::clear_snapshot()?;
    }

    for entry in list.entries() {
        info!(
            text = %entry.text,
            source = %entry.source_tag,
            rank = entry.rank_at_commit,
            "Shopping list entry"
        );
    }

    Ok(())
}

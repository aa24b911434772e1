//! Session snapshot persistence
//!
//! Stores the ordered result strings of a suspended capture session as a
//! JSON file in the application config directory, so a later session can be
//! restored directly into result review. Absent or unreadable snapshots are
//! never fatal: the session simply resumes in the listening flow.

use crate::results::SavedResults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

/// Persisted session state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Ordered result strings; rank is implied by position
    pub results: SavedResults,
    /// When the snapshot was taken (RFC 3339)
    pub saved_at: String,
}

impl SessionSnapshot {
    pub fn new(results: SavedResults) -> Self {
        Self {
            results,
            saved_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Get the snapshot file path
fn snapshot_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Voicelist").join("session.json"))
}

/// Save suspended-session results to disk
pub fn save_snapshot(results: &SavedResults) -> Result<PathBuf, PersistError> {
    let path = snapshot_path().ok_or(PersistError::NoConfigDir)?;

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
            info!("Created snapshot directory: {:?}", parent);
        }
    }

    let snapshot = SessionSnapshot::new(results.clone());
    let json = serde_json::to_string_pretty(&snapshot)?;
    fs::write(&path, json)?;
    info!("Saved session snapshot to: {:?}", path);

    Ok(path)
}

/// Load previously saved results, if any
///
/// Returns `None` when no snapshot exists or the file cannot be parsed;
/// a corrupt snapshot is logged and treated as absent.
pub fn load_snapshot() -> Option<SavedResults> {
    let path = snapshot_path()?;
    if !path.exists() {
        return None;
    }

    match fs::read_to_string(&path) {
        Ok(contents) => match serde_json::from_str::<SessionSnapshot>(&contents) {
            Ok(snapshot) if !snapshot.results.is_empty() => {
                info!(saved_at = %snapshot.saved_at, "Loaded session snapshot");
                Some(snapshot.results)
            }
            Ok(_) => None,
            Err(e) => {
                error!("Failed to parse session snapshot: {}", e);
                None
            }
        },
        Err(e) => {
            error!("Failed to read session snapshot: {}", e);
            None
        }
    }
}

/// Remove the snapshot, typically after a successful commit
pub fn clear_snapshot() -> Result<(), PersistError> {
    let path = snapshot_path().ok_or(PersistError::NoConfigDir)?;
    if path.exists() {
        fs::remove_file(&path)?;
        info!("Cleared session snapshot");
    }
    Ok(())
}

/// Snapshot persistence errors
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Could not find config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

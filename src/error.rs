use thiserror::Error;

/// Session-level errors
///
/// Everything on the recognition path is handled inside the session and
/// retried; the only failure that propagates is the engine refusing to
/// start at all, which the host surfaces by tearing the session down.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Cannot start capture: {0}")]
    EngineUnavailable(#[from] crate::engine::EngineError),
}

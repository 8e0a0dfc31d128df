//! Worker error types

use chess_motifs::ExtractError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Extraction failed for {game}: {error}")]
    Extract { game: String, error: ExtractError },

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Semaphore closed")]
    Semaphore(#[from] tokio::sync::AcquireError),
}

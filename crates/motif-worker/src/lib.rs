//! Batch motif indexing.
//!
//! Reads PGN files matched by a glob, extracts motif facts for every game
//! on a bounded blocking pool and writes one JSON line per game.

pub mod batch;
pub mod config;
pub mod error;

pub use batch::{index_game, pgn_files, run, BatchSummary, IndexedGame};
pub use config::WorkerConfig;
pub use error::WorkerError;

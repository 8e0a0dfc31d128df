//! Worker configuration from environment variables

use std::env;
use std::path::PathBuf;

use crate::error::WorkerError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Glob matching the PGN files to index
    pub pgn_glob: String,

    /// JSON-lines output file; stdout when unset
    pub output_path: Option<PathBuf>,

    /// Games extracted in parallel
    pub max_concurrency: usize,

    /// Stop at the first game that fails to replay instead of skipping it
    pub fail_fast: bool,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, WorkerError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, WorkerError> {
        let pgn_glob = var("PGN_GLOB")
            .filter(|v| !v.trim().is_empty())
            .ok_or(WorkerError::Config("PGN_GLOB not set"))?;

        let output_path = var("OUTPUT_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let max_concurrency = var("MAX_CONCURRENCY")
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or_else(num_cpus::get);

        let fail_fast = var("FAIL_FAST")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            pgn_glob,
            output_path,
            max_concurrency,
            fail_fast,
        })
    }
}

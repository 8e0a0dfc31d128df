//! Motif indexing worker
//!
//! Extracts tactical motifs from PGN files and writes JSON lines for a
//! store to load.

use std::fs::File;
use std::io::{self, BufWriter};
use std::sync::Arc;

use chess_motifs::FeatureExtractor;
use motif_worker::{run, WorkerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout may carry the JSON lines
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load .env file for local dev
    dotenvy::dotenv().ok();

    let config = WorkerConfig::from_env()?;
    info!(
        pgn_glob = %config.pgn_glob,
        max_concurrency = config.max_concurrency,
        fail_fast = config.fail_fast,
        "Worker config loaded"
    );

    let extractor = Arc::new(FeatureExtractor::new()?);
    info!(detectors = extractor.detectors().len(), "Feature extractor ready");

    let summary = match &config.output_path {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            run(&config, extractor, &mut out).await?
        }
        None => {
            let mut out = BufWriter::new(io::stdout());
            run(&config, extractor, &mut out).await?
        }
    };

    info!(
        files = summary.files,
        games = summary.games,
        indexed = summary.indexed,
        skipped = summary.skipped,
        "Indexing complete"
    );
    Ok(())
}

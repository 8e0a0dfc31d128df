//! Batch indexing: PGN files in, one JSON line per game out.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use chess_core::game_data::GameMetadata;
use chess_core::pgn::split_games;
use chess_motifs::{ExtractError, FeatureExtractor, Motif, MotifOccurrence};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::config::WorkerConfig;
use crate::error::WorkerError;

/// One line of worker output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedGame {
    /// The game's `Link`/`Site` URL, or `<file>#<n>` when it has none.
    pub game_url: String,
    pub metadata: GameMetadata,
    pub num_moves: u32,
    /// Queryable motifs present in the game, attack-derived ones included.
    pub motifs: Vec<Motif>,
    pub occurrences: BTreeMap<Motif, Vec<MotifOccurrence>>,
    pub indexed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub files: usize,
    pub games: usize,
    pub indexed: usize,
    pub skipped: usize,
}

/// Extract one game and shape it for output.
pub fn index_game(
    extractor: &FeatureExtractor,
    pgn: &str,
    fallback_url: &str,
) -> Result<IndexedGame, ExtractError> {
    let game = extractor.extract_game(pgn)?;
    let motifs = Motif::ALL
        .into_iter()
        .filter(|m| m.is_queryable() && game.features.has_motif(*m))
        .collect();

    Ok(IndexedGame {
        game_url: game
            .metadata
            .game_url
            .clone()
            .unwrap_or_else(|| fallback_url.to_string()),
        num_moves: game.features.num_moves,
        motifs,
        occurrences: game.features.occurrences,
        metadata: game.metadata,
        indexed_at: Utc::now(),
    })
}

/// Regular files matched by `pattern`, sorted.
pub fn pgn_files(pattern: &str) -> Result<Vec<PathBuf>, WorkerError> {
    let mut files = Vec::new();
    for entry in glob::glob(pattern)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Skipping unreadable path"),
        }
    }
    files.sort();
    if files.is_empty() {
        warn!(pattern, "No PGN files matched");
    }
    Ok(files)
}

/// Index every game in every matched file, writing JSON lines to `out`
/// in input order.
pub async fn run<W: Write>(
    config: &WorkerConfig,
    extractor: Arc<FeatureExtractor>,
    out: &mut W,
) -> Result<BatchSummary, WorkerError> {
    let semaphore = Arc::new(Semaphore::new(config.max_concurrency));
    let mut summary = BatchSummary::default();

    for path in pgn_files(&config.pgn_glob)? {
        let text = tokio::fs::read_to_string(&path).await?;
        let games = split_games(&text);
        summary.files += 1;
        summary.games += games.len();
        info!(path = %path.display(), games = games.len(), "Indexing PGN file");

        let mut handles = Vec::with_capacity(games.len());
        for (i, pgn) in games.into_iter().enumerate() {
            let permit = semaphore.clone().acquire_owned().await?;
            let extractor = extractor.clone();
            let label = format!("{}#{}", path.display(), i + 1);

            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit; // Hold until done
                let result = index_game(&extractor, &pgn, &label);
                (label, result)
            }));
        }

        for joined in futures::future::join_all(handles).await {
            let (label, result) = joined?;
            match result {
                Ok(game) => {
                    serde_json::to_writer(&mut *out, &game)?;
                    out.write_all(b"\n")?;
                    summary.indexed += 1;
                }
                Err(error) if config.fail_fast => {
                    return Err(WorkerError::Extract { game: label, error });
                }
                Err(error) => {
                    warn!(game = %label, error = %error, "Skipping game that failed to replay");
                    summary.skipped += 1;
                }
            }
        }
    }

    out.flush()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const FRIED_LIVER: &str = r#"[Event "Casual"]
[Site "https://lichess.org/abcd1234"]
[White "alice"]
[Black "bob"]
[Result "1-0"]

1. e4 e5 2. Nf3 Nc6 3. Bc4 Nf6 4. Ng5 d5 5. exd5 Nxd5 6. Nxf7 1-0
"#;

    const BROKEN: &str = r#"[Event "Casual"]
[White "carol"]
[Black "dave"]

1. e4 e5 2. Qh8 1-0
"#;

    const SCHOLARS_MATE: &str = r#"[Event "Casual"]
[White "erin"]
[Black "frank"]

1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0
"#;

    fn config(pattern: String, fail_fast: bool) -> WorkerConfig {
        WorkerConfig {
            pgn_glob: pattern,
            output_path: None,
            max_concurrency: 2,
            fail_fast,
        }
    }

    fn lines(out: &[u8]) -> Vec<IndexedGame> {
        String::from_utf8(out.to_vec())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_index_game_uses_site_url() {
        let extractor = FeatureExtractor::new().unwrap();
        let game = index_game(&extractor, FRIED_LIVER, "file.pgn#1").unwrap();
        assert_eq!(game.game_url, "https://lichess.org/abcd1234");
        assert_eq!(game.num_moves, 6);
        assert!(game.motifs.contains(&Motif::Fork));
        assert!(!game.motifs.contains(&Motif::Attack));
    }

    #[test]
    fn test_index_game_falls_back_to_label() {
        let extractor = FeatureExtractor::new().unwrap();
        let game = index_game(&extractor, SCHOLARS_MATE, "file.pgn#2").unwrap();
        assert_eq!(game.game_url, "file.pgn#2");
        assert!(game.motifs.contains(&Motif::Checkmate));
        assert!(game.motifs.contains(&Motif::Check));
    }

    #[tokio::test]
    async fn test_run_skips_broken_games() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.pgn"), format!("{FRIED_LIVER}\n{BROKEN}")).unwrap();
        fs::write(dir.path().join("b.pgn"), SCHOLARS_MATE).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let pattern = format!("{}/*.pgn", dir.path().display());
        let mut out = Vec::new();
        let summary = run(&config(pattern, false), Arc::new(FeatureExtractor::new().unwrap()), &mut out)
            .await
            .unwrap();

        assert_eq!(
            summary,
            BatchSummary {
                files: 2,
                games: 3,
                indexed: 2,
                skipped: 1
            }
        );
        let games = lines(&out);
        assert_eq!(games[0].game_url, "https://lichess.org/abcd1234");
        assert!(games[1].game_url.ends_with("b.pgn#1"));
    }

    #[tokio::test]
    async fn test_run_fail_fast() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.pgn"), BROKEN).unwrap();

        let pattern = format!("{}/*.pgn", dir.path().display());
        let err = run(&config(pattern, true), Arc::new(FeatureExtractor::new().unwrap()), &mut Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::Extract { ref game, .. } if game.ends_with("a.pgn#1")));
    }

    #[tokio::test]
    async fn test_run_with_no_matches() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.pgn", dir.path().display());
        let mut out = Vec::new();
        let summary = run(&config(pattern, false), Arc::new(FeatureExtractor::new().unwrap()), &mut out)
            .await
            .unwrap();
        assert_eq!(summary, BatchSummary::default());
        assert!(out.is_empty());
    }

    #[test]
    fn test_bad_glob_pattern() {
        assert!(matches!(pgn_files("[unclosed"), Err(WorkerError::Glob(_))));
    }
}

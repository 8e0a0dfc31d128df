//! Runs every registered detector over a replayed game.

use std::collections::BTreeMap;

use chess_core::game_data::GameMetadata;
use chess_core::{GameReplayer, Position};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detector_trait::MotifDetector;
use crate::detectors::all_detectors;
use crate::error::ExtractError;
use crate::features::GameFeatures;
use crate::motif::Motif;
use crate::occurrence::MotifOccurrence;

/// A game's headers and its motif facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedGame {
    pub metadata: GameMetadata,
    pub features: GameFeatures,
}

/// Immutable after construction; share one instance across threads.
pub struct FeatureExtractor {
    replayer: GameReplayer,
    detectors: Vec<Box<dyn MotifDetector>>,
}

impl FeatureExtractor {
    /// Extractor with the full built-in detector set.
    pub fn new() -> Result<Self, ExtractError> {
        Self::with_detectors(all_detectors())
    }

    pub fn with_detectors(detectors: Vec<Box<dyn MotifDetector>>) -> Result<Self, ExtractError> {
        Ok(Self {
            replayer: GameReplayer::new()?,
            detectors,
        })
    }

    pub fn detectors(&self) -> &[Box<dyn MotifDetector>] {
        &self.detectors
    }

    /// Replay one PGN game and collect its motif facts.
    pub fn extract(&self, pgn: &str) -> Result<GameFeatures, ExtractError> {
        self.extract_game(pgn).map(|game| game.features)
    }

    /// Like [`extract`](Self::extract), keeping the parsed header metadata.
    pub fn extract_game(&self, pgn: &str) -> Result<ExtractedGame, ExtractError> {
        let parsed = self.replayer.pgn().parse(pgn);
        let metadata = GameMetadata::from_headers(&parsed);
        let positions = self.replayer.replay(&parsed.movetext)?;
        let features = self.extract_positions(&positions);

        Ok(ExtractedGame { metadata, features })
    }

    /// Run the detectors over already replayed positions.
    pub fn extract_positions(&self, positions: &[Position]) -> GameFeatures {
        let num_moves = positions.last().map_or(0, |p| p.move_number);
        let mut features = GameFeatures::new(num_moves);

        for detector in &self.detectors {
            features.insert(detector.motif(), detector.detect(positions));
        }
        let forks = derive_fork(features.occurrences_of(Motif::Attack));
        features.insert(Motif::Fork, forks);

        let counts: BTreeMap<&str, usize> = features
            .occurrences
            .iter()
            .map(|(motif, occs)| (motif.name(), occs.len()))
            .collect();
        debug!(num_moves, plies = positions.len().saturating_sub(1), motifs = ?counts, "Extracted game features");

        features
    }
}

/// Fork occurrences from direct attack facts: every `(ply, attacker)` group
/// with two or more targets yields one fork row per target.
pub fn derive_fork(attacks: &[MotifOccurrence]) -> Vec<MotifOccurrence> {
    let mut groups: BTreeMap<(u32, &str), Vec<&MotifOccurrence>> = BTreeMap::new();
    for occ in attacks.iter().filter(|o| !o.is_discovered) {
        if let Some(attacker) = occ.attacker.as_deref() {
            groups.entry((occ.ply, attacker)).or_default().push(occ);
        }
    }

    groups
        .into_values()
        .filter(|members| members.len() >= 2)
        .flatten()
        .map(|occ| MotifOccurrence {
            description: format!("Fork at move {}", occ.move_number),
            is_discovered: false,
            is_mate: false,
            pin_type: None,
            ..occ.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Color;

    const FRIED_LIVER: &str = r#"[Event "Casual"]
[Site "https://lichess.org/abcd1234"]
[White "alice"]
[Black "bob"]
[Result "1-0"]
[TimeControl "300+0"]

1. e4 e5 2. Nf3 Nc6 3. Bc4 Nf6 4. Ng5 d5 5. exd5 Nxd5 6. Nxf7 1-0"#;

    fn attack(mn: u32, side: Color, attacker: &str, target: &str) -> MotifOccurrence {
        MotifOccurrence::attack(mn, side, "Attack", attacker, attacker, target)
    }

    #[test]
    fn test_derive_fork_groups_by_ply_and_attacker() {
        let attacks = vec![
            attack(6, Color::White, "Nf7", "qd8"),
            attack(6, Color::White, "Nf7", "rh8"),
            attack(7, Color::White, "Bb5", "ke8"),
        ];
        let forks = derive_fork(&attacks);
        assert_eq!(forks.len(), 2);
        assert!(forks.iter().all(|f| f.attacker.as_deref() == Some("Nf7")));
        assert!(forks.iter().all(|f| f.ply == 10 && f.description == "Fork at move 6"));
        assert_eq!(forks[1].target.as_deref(), Some("rh8"));
    }

    #[test]
    fn test_derive_fork_ignores_discovered_and_split_plies() {
        let attacks = vec![
            attack(6, Color::White, "Nf7", "qd8"),
            attack(6, Color::Black, "Nf7", "rh8"),
            attack(8, Color::White, "Re1", "ke8").discovered(true),
            attack(8, Color::White, "Re1", "qe5").discovered(true),
        ];
        assert!(derive_fork(&attacks).is_empty());
    }

    #[test]
    fn test_derive_fork_clears_mate_flag() {
        let attacks = vec![
            attack(20, Color::Black, "qg2", "Kh1").mate(true),
            attack(20, Color::Black, "qg2", "Rf1"),
        ];
        let forks = derive_fork(&attacks);
        assert_eq!(forks.len(), 2);
        assert!(forks.iter().all(|f| !f.is_mate));
    }

    #[test]
    fn test_extract_fried_liver_fork() {
        let extractor = FeatureExtractor::new().unwrap();
        let game = extractor.extract_game(FRIED_LIVER).unwrap();
        assert_eq!(game.metadata.white.as_deref(), Some("alice"));
        assert_eq!(game.features.num_moves, 6);

        let forks = game.features.occurrences_of(Motif::Fork);
        assert!(!forks.is_empty());
        assert!(forks.iter().all(|f| f.move_number == 6 && f.side == Color::White));
        assert!(forks.iter().all(|f| f.attacker.as_deref().is_some_and(|a| a.starts_with('N'))));
        assert!(game.features.has_motif(Motif::Fork));
    }

    #[test]
    fn test_extract_empty_movetext() {
        let features = FeatureExtractor::new().unwrap().extract("").unwrap();
        assert_eq!(features.num_moves, 0);
        assert!(features.found().is_empty());
    }

    #[test]
    fn test_extract_illegal_move_fails() {
        let err = FeatureExtractor::new()
            .unwrap()
            .extract("1. e4 e5 2. Qh8")
            .unwrap_err();
        assert!(matches!(err, ExtractError::Chess(chess_core::ChessError::IllegalMove { ply: 3, .. })));
    }

    #[test]
    fn test_custom_detector_set() {
        let extractor =
            FeatureExtractor::with_detectors(vec![Box::new(crate::detectors::check::CheckDetector)])
                .unwrap();
        assert_eq!(extractor.detectors().len(), 1);
        let features = extractor.extract("1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7#").unwrap();
        assert_eq!(features.found().into_iter().collect::<Vec<_>>(), vec![Motif::Check]);
        assert!(features.occurrences_of(Motif::Check)[0].is_mate);
    }
}

//! Built-in motif detectors.

pub mod attack;
pub mod back_rank_mate;
pub mod check;
pub mod cross_pin;
pub mod interference;
pub mod overloaded_piece;
pub mod pin;
pub mod promotion;
pub mod sacrifice;
pub mod skewer;
pub mod smothered_mate;
pub mod zugzwang;

use chess_core::{Board, Position};
use tracing::debug;

use crate::detector_trait::MotifDetector;

/// Create the full detector set, `Attack` included.
pub fn all_detectors() -> Vec<Box<dyn MotifDetector>> {
    vec![
        Box::new(pin::PinDetector),
        Box::new(cross_pin::CrossPinDetector),
        Box::new(skewer::SkewerDetector),
        Box::new(check::CheckDetector),
        Box::new(attack::AttackDetector),
        Box::new(promotion::PromotionDetector),
        Box::new(promotion::PromotionWithCheckDetector),
        Box::new(promotion::PromotionWithCheckmateDetector),
        Box::new(back_rank_mate::BackRankMateDetector),
        Box::new(smothered_mate::SmotheredMateDetector),
        Box::new(zugzwang::ZugzwangDetector),
        Box::new(overloaded_piece::OverloadedPieceDetector),
        Box::new(sacrifice::SacrificeDetector),
        Box::new(interference::InterferenceDetector),
    ]
}

/// Decoded boards for every position after the first move. Positions whose
/// FEN does not decode are skipped.
pub(crate) fn played_boards(positions: &[Position]) -> impl Iterator<Item = (&Position, Board)> {
    positions
        .iter()
        .filter(|p| p.move_number > 0)
        .filter_map(|p| match p.board() {
            Ok(board) => Some((p, board)),
            Err(e) => {
                debug!(error = %e, "Skipping undecodable position");
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motif::Motif;

    #[test]
    fn test_all_detectors_cover_stored_motifs() {
        let motifs: Vec<Motif> = all_detectors().iter().map(|d| d.motif()).collect();
        assert_eq!(motifs.len(), 14);
        for expected in [
            Motif::Pin,
            Motif::CrossPin,
            Motif::Skewer,
            Motif::Check,
            Motif::Attack,
            Motif::Promotion,
            Motif::PromotionWithCheck,
            Motif::PromotionWithCheckmate,
            Motif::BackRankMate,
            Motif::SmotheredMate,
            Motif::Zugzwang,
            Motif::OverloadedPiece,
            Motif::Sacrifice,
            Motif::Interference,
        ] {
            assert!(motifs.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn test_played_boards_skips_initial_and_bad_fen() {
        let positions = vec![
            Position::initial(),
            Position::new(1, "not a fen", false, Some("e4")),
            Position::new(1, "8/8/8/8/8/8/8/4K2k b", false, Some("Kh1")),
        ];
        assert_eq!(played_boards(&positions).count(), 1);
    }
}

use chess_core::{Position, Square};

use crate::detector_trait::MotifDetector;
use crate::detectors::played_boards;
use crate::motif::Motif;
use crate::occurrence::MotifOccurrence;

/// Mate against a king on its own back rank, with at least one of the three
/// squares in front of it taken by one of its own pieces.
pub struct BackRankMateDetector;

impl MotifDetector for BackRankMateDetector {
    fn motif(&self) -> Motif {
        Motif::BackRankMate
    }

    fn detect(&self, positions: &[Position]) -> Vec<MotifOccurrence> {
        let mut occurrences = Vec::new();

        for (pos, board) in played_boards(positions) {
            if !pos.last_move.as_deref().is_some_and(|m| m.ends_with('#')) {
                continue;
            }
            let mated = pos.side_to_move();
            let Some(king) = board.king_square(mated) else {
                continue;
            };
            if king.rank() != mated.back_rank() {
                continue;
            }

            let escape_rank = king.rank() as i8 + mated.pawn_direction();
            let blocked_by_own = (-1..=1).any(|df: i8| {
                let file = king.file() as i8 + df;
                if !(0..8).contains(&file) || !(0..8).contains(&escape_rank) {
                    return false;
                }
                Square::new(file as u8, escape_rank as u8)
                    .and_then(|sq| board.piece_at(sq))
                    .is_some_and(|p| p.color == mated)
            });
            if !blocked_by_own {
                continue;
            }

            if let Some(occ) =
                MotifOccurrence::at(pos, format!("Back rank mate at move {}", pos.move_number))
            {
                occurrences.push(match board.notation(king) {
                    Some(target) => occ.with_target(target).mate(true),
                    None => occ.mate(true),
                });
            }
        }

        occurrences
    }
}

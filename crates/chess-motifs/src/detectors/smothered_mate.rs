use chess_core::board::ALL_DIRECTIONS;
use chess_core::{Position, Role};

use crate::detector_trait::MotifDetector;
use crate::detectors::played_boards;
use crate::motif::Motif;
use crate::occurrence::MotifOccurrence;

/// Knight mate against a king whose every on-board neighbour holds one of
/// its own pieces.
pub struct SmotheredMateDetector;

impl MotifDetector for SmotheredMateDetector {
    fn motif(&self) -> Motif {
        Motif::SmotheredMate
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
            let Some(knight) = board
                .attackers(king, mated.opposite())
                .into_iter()
                .find(|&sq| board.piece_at(sq).is_some_and(|p| p.role == Role::Knight))
            else {
                continue;
            };

            let smothered = ALL_DIRECTIONS.iter().all(|&(df, dr)| match king.offset(df, dr) {
                Some(sq) => board.piece_at(sq).is_some_and(|p| p.color == mated),
                None => true,
            });
            if !smothered {
                continue;
            }

            let (Some(attacker), Some(target)) = (board.notation(knight), board.notation(king))
            else {
                continue;
            };
            if let Some(occ) =
                MotifOccurrence::at(pos, format!("Smothered mate at move {}", pos.move_number))
            {
                occurrences.push(occ.with_attacker(attacker).with_target(target).mate(true));
            }
        }

        occurrences
    }
}

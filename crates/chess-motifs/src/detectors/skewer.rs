use chess_core::board::ALL_DIRECTIONS;
use chess_core::{Position, Role};

use crate::detector_trait::MotifDetector;
use crate::detectors::played_boards;
use crate::motif::Motif;
use crate::occurrence::MotifOccurrence;

/// A slider of the side that just moved attacks a piece with a lower
/// ranked, non-pawn piece of the same side behind it on the same ray.
/// Pieces compare by [`Role::rank`], so a bishop in front of a knight counts.
pub struct SkewerDetector;

impl MotifDetector for SkewerDetector {
    fn motif(&self) -> Motif {
        Motif::Skewer
    }

    fn detect(&self, positions: &[Position]) -> Vec<MotifOccurrence> {
        let mut occurrences = Vec::new();

        for (pos, board) in played_boards(positions) {
            let mover = pos.mover();
            for (from, piece) in board.pieces_of(mover) {
                if !piece.role.is_slider() {
                    continue;
                }
                for dir in ALL_DIRECTIONS {
                    if !piece.role.slides_along(dir) {
                        continue;
                    }
                    let Some((front_sq, front)) = board.first_piece_along(from, dir) else {
                        continue;
                    };
                    if front.color == mover {
                        continue;
                    }
                    let Some((_, behind)) = board.first_piece_along(front_sq, dir) else {
                        continue;
                    };
                    if behind.color == mover
                        || behind.role == Role::Pawn
                        || front.rank() <= behind.rank()
                    {
                        continue;
                    }

                    let (Some(attacker), Some(target)) =
                        (board.notation(from), board.notation(front_sq))
                    else {
                        continue;
                    };
                    if let Some(occ) =
                        MotifOccurrence::at(pos, format!("Skewer at move {}", pos.move_number))
                    {
                        occurrences.push(occ.with_attacker(attacker).with_target(target));
                    }
                }
            }
        }

        occurrences
    }
}

use chess_core::{Board, Color, Position, Square};

use crate::detector_trait::MotifDetector;
use crate::detectors::played_boards;
use crate::motif::Motif;
use crate::occurrence::MotifOccurrence;

/// One defending piece guards two or more of its side's attacked pieces.
pub struct OverloadedPieceDetector;

impl MotifDetector for OverloadedPieceDetector {
    fn motif(&self) -> Motif {
        Motif::OverloadedPiece
    }

    fn detect(&self, positions: &[Position]) -> Vec<MotifOccurrence> {
        let mut occurrences = Vec::new();

        for (pos, board) in played_boards(positions) {
            let Some(overloaded) = find_overloaded(&board, pos.side_to_move()) else {
                continue;
            };
            if let Some(occ) =
                MotifOccurrence::at(pos, format!("Overloaded piece at move {}", pos.move_number))
            {
                occurrences.push(match board.notation(overloaded) {
                    Some(target) => occ.with_target(target),
                    None => occ,
                });
            }
        }

        occurrences
    }
}

/// First `defender` piece, in reading order, guarding two or more attacked
/// pieces of its own side.
fn find_overloaded(board: &Board, defender: Color) -> Option<Square> {
    let attacked: Vec<Square> = board
        .pieces_of(defender)
        .filter(|&(sq, _)| board.is_attacked(sq, defender.opposite()))
        .map(|(sq, _)| sq)
        .collect();
    if attacked.len() < 2 {
        return None;
    }

    board
        .pieces_of(defender)
        .map(|(sq, _)| sq)
        .find(|&guard| {
            attacked
                .iter()
                .filter(|&&sq| sq != guard && board.attacks_square(guard, sq))
                .count()
                >= 2
        })
}

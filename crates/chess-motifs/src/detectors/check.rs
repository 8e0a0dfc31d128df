use chess_core::Position;

use crate::detector_trait::MotifDetector;
use crate::detectors::played_boards;
use crate::motif::Motif;
use crate::occurrence::MotifOccurrence;

/// Side to move's king is attacked by the side that just moved.
/// When several pieces give check, the first in reading order (a8..h1) is
/// reported as the attacker.
pub struct CheckDetector;

impl MotifDetector for CheckDetector {
    fn motif(&self) -> Motif {
        Motif::Check
    }

    fn detect(&self, positions: &[Position]) -> Vec<MotifOccurrence> {
        let mut occurrences = Vec::new();

        for (pos, board) in played_boards(positions) {
            let Some(last_move) = pos.last_move.as_deref() else {
                continue;
            };
            let defender = pos.side_to_move();
            let Some(king) = board.king_square(defender) else {
                continue;
            };
            let Some(&checker) = board.attackers(king, defender.opposite()).first() else {
                continue;
            };
            let (Some(attacker), Some(target)) = (board.notation(checker), board.notation(king))
            else {
                continue;
            };

            if let Some(occ) = MotifOccurrence::at(pos, format!("Check at move {}", pos.move_number)) {
                occurrences.push(
                    occ.with_attacker(attacker)
                        .with_target(target)
                        .mate(last_move.ends_with('#')),
                );
            }
        }

        occurrences
    }
}

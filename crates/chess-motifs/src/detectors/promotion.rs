use chess_core::{Board, Position, Square};

use crate::detector_trait::MotifDetector;
use crate::detectors::played_boards;
use crate::motif::Motif;
use crate::occurrence::MotifOccurrence;

/// Any move carrying `=`.
pub struct PromotionDetector;

/// A promotion marked `+` where the promoted piece itself gives check.
/// Discovered checks from a pawn leaving a line do not count.
pub struct PromotionWithCheckDetector;

/// A promotion marked `#` where the promoted piece itself gives check.
pub struct PromotionWithCheckmateDetector;

impl MotifDetector for PromotionDetector {
    fn motif(&self) -> Motif {
        Motif::Promotion
    }

    fn detect(&self, positions: &[Position]) -> Vec<MotifOccurrence> {
        let mut occurrences = Vec::new();

        for (pos, board) in played_boards(positions) {
            let Some(dest) = pos.last_move.as_deref().and_then(promotion_square) else {
                continue;
            };
            let Some(occ) =
                MotifOccurrence::at(pos, format!("Promotion at move {}", pos.move_number))
            else {
                continue;
            };
            occurrences.push(match board.notation(dest) {
                Some(piece) => occ.with_moved_piece(piece),
                None => occ,
            });
        }

        occurrences
    }
}

impl MotifDetector for PromotionWithCheckDetector {
    fn motif(&self) -> Motif {
        Motif::PromotionWithCheck
    }

    fn detect(&self, positions: &[Position]) -> Vec<MotifOccurrence> {
        checking_promotions(positions, '+', "Promotion with check")
    }
}

impl MotifDetector for PromotionWithCheckmateDetector {
    fn motif(&self) -> Motif {
        Motif::PromotionWithCheckmate
    }

    fn detect(&self, positions: &[Position]) -> Vec<MotifOccurrence> {
        checking_promotions(positions, '#', "Promotion with checkmate")
    }
}

fn checking_promotions(positions: &[Position], suffix: char, label: &str) -> Vec<MotifOccurrence> {
    let mut occurrences = Vec::new();

    for (pos, board) in played_boards(positions) {
        let Some(last_move) = pos.last_move.as_deref() else {
            continue;
        };
        if !last_move.ends_with(suffix) {
            continue;
        }
        let Some(dest) = promotion_square(last_move) else {
            continue;
        };
        let Some(king) = promoted_piece_checks(&board, pos, dest) else {
            continue;
        };
        let (Some(attacker), Some(target)) = (board.notation(dest), board.notation(king)) else {
            continue;
        };
        if let Some(occ) = MotifOccurrence::at(pos, format!("{label} at move {}", pos.move_number)) {
            occurrences.push(
                occ.with_moved_piece(attacker.clone())
                    .with_attacker(attacker)
                    .with_target(target)
                    .mate(suffix == '#'),
            );
        }
    }

    occurrences
}

/// Destination square of a promotion token: the two characters before `=`.
fn promotion_square(san: &str) -> Option<Square> {
    let eq = san.find('=')?;
    let square = san.get(eq.checked_sub(2)?..eq)?;
    Square::parse(square)
}

/// The defending king's square if the mover's piece on `dest` attacks it.
fn promoted_piece_checks(board: &Board, pos: &Position, dest: Square) -> Option<Square> {
    let piece = board.piece_at(dest)?;
    if piece.color != pos.mover() {
        return None;
    }
    let king = board.king_square(pos.side_to_move())?;
    board.attacks_square(dest, king).then_some(king)
}

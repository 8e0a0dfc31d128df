use chess_core::board::notation;
use chess_core::{Board, Color, Position, Square};

use crate::detector_trait::MotifDetector;
use crate::motif::Motif;
use crate::occurrence::MotifOccurrence;

/// A capture made with a piece ranked above the one it takes, e.g. a queen
/// taking a pawn. Pieces compare by [`chess_core::Role::rank`]. Whether the
/// capturer can be taken back is not checked.
pub struct SacrificeDetector;

impl MotifDetector for SacrificeDetector {
    fn motif(&self) -> Motif {
        Motif::Sacrifice
    }

    fn detect(&self, positions: &[Position]) -> Vec<MotifOccurrence> {
        let mut occurrences = Vec::new();

        for pair in positions.windows(2) {
            let (before_pos, after_pos) = (&pair[0], &pair[1]);
            let (Ok(before), Ok(after)) = (before_pos.board(), after_pos.board()) else {
                continue;
            };
            let Some(square) = capture_square(&before, &after, after_pos.mover()) else {
                continue;
            };
            let (Some(capturer), Some(captured)) = (after.piece_at(square), before.piece_at(square))
            else {
                continue;
            };
            if capturer.rank() <= captured.rank() {
                continue;
            }
            if let Some(occ) =
                MotifOccurrence::at(after_pos, format!("Sacrifice at move {}", after_pos.move_number))
            {
                let moved = notation(capturer, square);
                occurrences.push(
                    occ.with_moved_piece(moved.clone())
                        .with_attacker(moved)
                        .with_target(notation(captured, square)),
                );
            }
        }

        occurrences
    }
}

/// First square, in reading order, where a `mover` piece replaced an enemy one.
fn capture_square(before: &Board, after: &Board, mover: Color) -> Option<Square> {
    Square::scan_order().find(|&sq| {
        before.piece_at(sq).is_some_and(|p| p.color != mover)
            && after.piece_at(sq).is_some_and(|p| p.color == mover)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect_move(before: &str, after: &str, san: &str) -> Vec<MotifOccurrence> {
        let positions = vec![
            Position::new(19, before, true, None),
            Position::new(20, after, false, Some(san)),
        ];
        SacrificeDetector.detect(&positions)
    }

    #[test]
    fn test_queen_takes_pawn() {
        let occs = detect_move("4k3/8/8/4Q3/4p3/8/8/4K3 w", "4k3/8/8/8/4Q3/8/8/4K3 b", "Qxe4");
        assert_eq!(occs.len(), 1);
        assert_eq!(occs[0].move_number, 20);
        assert_eq!(occs[0].side, Color::White);
        assert_eq!(occs[0].attacker.as_deref(), Some("Qe4"));
        assert_eq!(occs[0].target.as_deref(), Some("pe4"));
    }

    #[test]
    fn test_even_trade_is_not_sacrifice() {
        let occs = detect_move("4k3/8/8/4r3/4R3/8/8/4K3 w", "4k3/8/8/4R3/8/8/8/4K3 b", "Rxe5");
        assert!(occs.is_empty());
    }

    #[test]
    fn test_pawn_takes_queen_is_not_sacrifice() {
        let occs = detect_move("4k3/8/8/4q3/5P2/8/8/4K3 w", "4k3/8/8/4P3/8/8/8/4K3 b", "fxe5");
        assert!(occs.is_empty());
    }

    #[test]
    fn test_bishop_takes_knight() {
        // Bishop ranks above knight even though both are worth three.
        let occs = detect_move("4k3/8/8/3n4/8/8/8/B3K3 w", "4k3/8/8/3B4/8/8/8/4K3 b", "Bxd5");
        assert_eq!(occs.len(), 1);
    }

    #[test]
    fn test_quiet_move_and_short_input() {
        let occs = detect_move("4k3/8/8/8/8/8/8/Q3K3 w", "4k3/8/8/8/8/8/Q7/4K3 b", "Qa2");
        assert!(occs.is_empty());
        assert!(SacrificeDetector
            .detect(&[Position::new(20, "4k3/8/8/8/4Q3/8/8/4K3 b", false, Some("Qxe4"))])
            .is_empty());
        assert!(SacrificeDetector.detect(&[]).is_empty());
    }
}

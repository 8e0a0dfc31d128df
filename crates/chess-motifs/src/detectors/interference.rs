use chess_core::{Board, Color, Position, Square};

use crate::detector_trait::MotifDetector;
use crate::motif::Motif;
use crate::occurrence::MotifOccurrence;

/// A piece lands on a square an enemy slider was covering, cutting the
/// slider's line short. The line must run on past the landing square.
pub struct InterferenceDetector;

impl MotifDetector for InterferenceDetector {
    fn motif(&self) -> Motif {
        Motif::Interference
    }

    fn detect(&self, positions: &[Position]) -> Vec<MotifOccurrence> {
        let mut occurrences = Vec::new();

        for pair in positions.windows(2) {
            let (before_pos, after_pos) = (&pair[0], &pair[1]);
            let (Ok(before), Ok(after)) = (before_pos.board(), after_pos.board()) else {
                continue;
            };
            let mover = after_pos.mover();
            let Some(dest) = landing_square(&before, &after, mover) else {
                continue;
            };
            let Some(slider) = blocked_slider(&before, dest, mover.opposite()) else {
                continue;
            };
            if let Some(occ) = MotifOccurrence::at(
                after_pos,
                format!("Interference at move {}", after_pos.move_number),
            ) {
                let occ = match (after.notation(dest), before.notation(slider)) {
                    (Some(moved), Some(attacker)) => {
                        occ.with_moved_piece(moved).with_attacker(attacker)
                    }
                    _ => occ,
                };
                occurrences.push(occ);
            }
        }

        occurrences
    }
}

/// First square, in reading order, that was empty and now holds a `mover` piece.
fn landing_square(before: &Board, after: &Board, mover: Color) -> Option<Square> {
    Square::scan_order().find(|&sq| {
        before.piece_at(sq).is_none() && after.piece_at(sq).is_some_and(|p| p.color == mover)
    })
}

/// First `enemy` slider whose line passes through `dest` and continues beyond it.
fn blocked_slider(before: &Board, dest: Square, enemy: Color) -> Option<Square> {
    before
        .pieces_of(enemy)
        .filter(|(_, piece)| piece.role.is_slider())
        .map(|(sq, _)| sq)
        .find(|&sq| {
            if !before.attacks_square(sq, dest) {
                return false;
            }
            let df = (dest.file() as i8 - sq.file() as i8).signum();
            let dr = (dest.rank() as i8 - sq.rank() as i8).signum();
            dest.offset(df, dr).is_some()
        })
}

use std::collections::BTreeMap;

use chess_core::{Position, Square};

use crate::detector_trait::MotifDetector;
use crate::detectors::pin::{find_pins, PinLine};
use crate::detectors::played_boards;
use crate::motif::Motif;
use crate::occurrence::{MotifOccurrence, PinType};

/// A single piece pinned along two different lines at once, at least one
/// of them to the king. The second pinner in reading order is reported.
pub struct CrossPinDetector;

impl MotifDetector for CrossPinDetector {
    fn motif(&self) -> Motif {
        Motif::CrossPin
    }

    fn detect(&self, positions: &[Position]) -> Vec<MotifOccurrence> {
        let mut occurrences = Vec::new();

        for (pos, board) in played_boards(positions) {
            let mut by_pinned: BTreeMap<Square, Vec<PinLine>> = BTreeMap::new();
            for pin in find_pins(&board, pos.side_to_move()) {
                by_pinned.entry(pin.pinned).or_default().push(pin);
            }

            for (pinned, lines) in by_pinned {
                if lines.len() < 2 || !lines.iter().any(|l| l.pin_type == PinType::Absolute) {
                    continue;
                }
                let first_line = axis(lines[0].direction);
                let Some(second) = lines.iter().find(|l| axis(l.direction) != first_line) else {
                    continue;
                };
                let (Some(attacker), Some(target)) =
                    (board.notation(second.pinner), board.notation(pinned))
                else {
                    continue;
                };
                if let Some(occ) =
                    MotifOccurrence::at(pos, format!("Cross-pin at move {}", pos.move_number))
                {
                    occurrences.push(occ.with_attacker(attacker).with_target(target));
                }
            }
        }

        occurrences
    }
}

/// The line a direction runs along, ignoring which way.
fn axis(dir: (i8, i8)) -> (i8, i8) {
    if dir.0 < 0 || (dir.0 == 0 && dir.1 < 0) {
        (-dir.0, -dir.1)
    } else {
        dir
    }
}

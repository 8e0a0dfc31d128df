use chess_core::board::ALL_DIRECTIONS;
use chess_core::{Board, Color, Position, Role, Square};

use crate::detector_trait::MotifDetector;
use crate::detectors::played_boards;
use crate::motif::Motif;
use crate::occurrence::{MotifOccurrence, PinType};

/// One pin line: slider, pinned piece, and the piece behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinLine {
    pub pinner: Square,
    pub pinned: Square,
    pub anchor: Square,
    pub direction: (i8, i8),
    pub pin_type: PinType,
}

/// Pins against `pinned_side`, pinners in reading order.
///
/// A pin is a slider of the other side, then exactly one `pinned_side`
/// piece, then that side's king (absolute) or a strictly more valuable
/// piece (relative), all on one open ray.
pub fn find_pins(board: &Board, pinned_side: Color) -> Vec<PinLine> {
    let mut pins = Vec::new();

    for (pinner, piece) in board.pieces_of(pinned_side.opposite()) {
        if !piece.role.is_slider() {
            continue;
        }
        for dir in ALL_DIRECTIONS {
            if !piece.role.slides_along(dir) {
                continue;
            }
            let Some((pinned, front)) = board.first_piece_along(pinner, dir) else {
                continue;
            };
            if front.color != pinned_side || front.role == Role::King {
                continue;
            }
            let Some((anchor, back)) = board.first_piece_along(pinned, dir) else {
                continue;
            };
            if back.color != pinned_side {
                continue;
            }
            let pin_type = if back.role == Role::King {
                PinType::Absolute
            } else if back.value() > front.value() {
                PinType::Relative
            } else {
                continue;
            };
            pins.push(PinLine {
                pinner,
                pinned,
                anchor,
                direction: dir,
                pin_type,
            });
        }
    }

    pins
}

/// Pieces of the side to move pinned by the side that just moved.
pub struct PinDetector;

impl MotifDetector for PinDetector {
    fn motif(&self) -> Motif {
        Motif::Pin
    }

    fn detect(&self, positions: &[Position]) -> Vec<MotifOccurrence> {
        let mut occurrences = Vec::new();

        for (pos, board) in played_boards(positions) {
            for pin in find_pins(&board, pos.side_to_move()) {
                let (Some(attacker), Some(target)) =
                    (board.notation(pin.pinner), board.notation(pin.pinned))
                else {
                    continue;
                };
                let Some(occ) = MotifOccurrence::at(pos, format!("Pin at move {}", pos.move_number))
                else {
                    continue;
                };
                occurrences.push(
                    occ.with_attacker(attacker)
                        .with_target(target)
                        .with_pin_type(pin.pin_type),
                );
            }
        }

        occurrences
    }
}

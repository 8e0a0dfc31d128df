//! Raw attack facts. Fork, discovered attack, checkmate, discovered check
//! and double check are all derived from these rows at query time.

use chess_core::board::{notation, ALL_DIRECTIONS};
use chess_core::{Board, Color, Piece, Position, Role, Square};

use crate::detector_trait::MotifDetector;
use crate::motif::Motif;
use crate::occurrence::MotifOccurrence;

/// Placeholder origin for a moved piece whose destination cannot be found,
/// e.g. a pawn that promoted.
const UNKNOWN_SQUARE: &str = "??";

/// Significant attacks created by each move.
///
/// Direct rows: the piece that moved attacks a king or queen, or two or more
/// non-pawn pieces at once. Castling produces no direct rows.
///
/// Discovered rows: a slider of the mover stood behind a vacated square and
/// now sees an enemy piece through it. Every such target is reported.
pub struct AttackDetector;

/// A slider line opened by moving a piece out of the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealedAttack {
    /// Letter, origin and destination of the piece that moved, e.g. `Ne2c3`.
    pub moved_piece: String,
    pub attacker: String,
    pub target: String,
}

impl MotifDetector for AttackDetector {
    fn motif(&self) -> Motif {
        Motif::Attack
    }

    fn detect(&self, positions: &[Position]) -> Vec<MotifOccurrence> {
        let mut occurrences = Vec::new();

        for pair in positions.windows(2) {
            let (before_pos, after_pos) = (&pair[0], &pair[1]);
            let Some(last_move) = after_pos.last_move.as_deref() else {
                continue;
            };
            let (Ok(before), Ok(after)) = (before_pos.board(), after_pos.board()) else {
                continue;
            };

            let mover = after_pos.mover();
            let move_number = after_pos.move_number;
            let checkmate = last_move.ends_with('#');

            if !last_move.starts_with("O-") {
                if let Some((attacker, targets)) = direct_attacks(&before, &after, mover) {
                    for target in targets {
                        let is_mate = checkmate && is_king(&target);
                        occurrences.push(
                            MotifOccurrence::attack(
                                move_number,
                                mover,
                                format!("Attack at move {move_number}"),
                                attacker.clone(),
                                attacker.clone(),
                                target,
                            )
                            .mate(is_mate),
                        );
                    }
                }
            }

            for revealed in discovered_attacks(&before, &after, mover) {
                let is_mate = checkmate && is_king(&revealed.target);
                occurrences.push(
                    MotifOccurrence::attack(
                        move_number,
                        mover,
                        format!("Discovered attack at move {move_number}"),
                        revealed.moved_piece,
                        revealed.attacker,
                        revealed.target,
                    )
                    .discovered(true)
                    .mate(is_mate),
                );
            }
        }

        occurrences
    }
}

/// Attacker notation and significant targets of the piece that moved.
fn direct_attacks(before: &Board, after: &Board, mover: Color) -> Option<(String, Vec<String>)> {
    vacated_squares(before, after, mover).next()?;
    let dest = Square::scan_order().find(|&sq| {
        after.piece_at(sq).is_some_and(|p| p.color == mover)
            && before.piece_at(sq).map_or(true, |p| p.color != mover)
    })?;
    let attacker = after.notation(dest)?;

    let attacked: Vec<(Square, Role)> = Square::scan_order()
        .filter_map(|sq| after.piece_at(sq).map(|p| (sq, p)))
        .filter(|(sq, p)| p.color != mover && after.attacks_square(dest, *sq))
        .map(|(sq, p)| (sq, p.role))
        .collect();

    let mut targets: Vec<String> = attacked
        .iter()
        .filter(|(_, role)| matches!(role, Role::King | Role::Queen))
        .filter_map(|(sq, _)| after.notation(*sq))
        .collect();

    let valuable = attacked.iter().filter(|(_, role)| *role != Role::Pawn).count();
    if valuable >= 2 {
        for (sq, role) in &attacked {
            if matches!(role, Role::Pawn | Role::King | Role::Queen) {
                continue;
            }
            if let Some(t) = after.notation(*sq) {
                targets.push(t);
            }
        }
    }

    Some((attacker, targets))
}

/// Every attack a move reveals by clearing a slider's line.
pub fn discovered_attacks(before: &Board, after: &Board, mover: Color) -> Vec<RevealedAttack> {
    let mut revealed = Vec::new();

    for (from, piece) in vacated_squares(before, after, mover).collect::<Vec<_>>() {
        let dest = Square::scan_order().find(|&sq| {
            sq != from && after.piece_at(sq) == Some(piece) && before.piece_at(sq) != Some(piece)
        });
        let moved_piece = format!(
            "{}{}",
            notation(piece, from),
            dest.map_or_else(|| UNKNOWN_SQUARE.to_string(), |d| d.to_string())
        );

        for dir in ALL_DIRECTIONS {
            let back = (-dir.0, -dir.1);
            let Some((slider_sq, slider)) = after.first_piece_along(from, back) else {
                continue;
            };
            if Some(slider_sq) == dest
                || slider.color != mover
                || !slider.role.is_slider()
                || !slider.role.slides_along(dir)
            {
                continue;
            }
            let Some((target_sq, target)) = after.first_piece_along(from, dir) else {
                continue;
            };
            if target.color == mover {
                continue;
            }
            revealed.push(RevealedAttack {
                moved_piece: moved_piece.clone(),
                attacker: notation(slider, slider_sq),
                target: notation(target, target_sq),
            });
        }
    }

    revealed
}

/// Mover squares, in reading order, that were occupied before and are empty after.
fn vacated_squares<'a>(
    before: &'a Board,
    after: &'a Board,
    mover: Color,
) -> impl Iterator<Item = (Square, Piece)> + 'a {
    Square::scan_order().filter_map(move |sq| match before.piece_at(sq) {
        Some(p) if p.color == mover && after.piece_at(sq).is_none() => Some((sq, p)),
        _ => None,
    })
}

fn is_king(piece: &str) -> bool {
    piece.starts_with('K') || piece.starts_with('k')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect_move(before: &str, after: &str, white_to_move: bool, san: &str) -> Vec<MotifOccurrence> {
        let positions = vec![
            Position::new(7, before, !white_to_move, None),
            Position::new(8, after, white_to_move, Some(san)),
        ];
        AttackDetector.detect(&positions)
    }

    fn rows(occs: &[MotifOccurrence]) -> Vec<(&str, &str, &str, bool)> {
        occs.iter()
            .map(|o| {
                (
                    o.moved_piece.as_deref().unwrap(),
                    o.attacker.as_deref().unwrap(),
                    o.target.as_deref().unwrap(),
                    o.is_discovered,
                )
            })
            .collect()
    }

    #[test]
    fn test_knight_fork_king_and_rook() {
        let occs = detect_move(
            "r3k3/8/8/3N4/8/8/8/4K3 w",
            "r3k3/2N5/8/8/8/8/8/4K3 b",
            false,
            "Nc7+",
        );
        assert_eq!(
            rows(&occs),
            vec![
                ("Nc7", "Nc7", "ke8", false),
                ("Nc7", "Nc7", "ra8", false),
            ]
        );
        assert!(occs.iter().all(|o| o.side == Color::White && o.ply == 14));
    }

    #[test]
    fn test_discovered_check() {
        let occs = detect_move(
            "4k3/8/8/8/8/8/4N3/4R1K1 w",
            "4k3/8/8/8/8/2N5/8/4R1K1 b",
            false,
            "Nc3+",
        );
        assert_eq!(rows(&occs), vec![("Ne2c3", "Re1", "ke8", true)]);
        assert!(!occs[0].is_mate);
        assert!(occs[0].targets_king());
    }

    #[test]
    fn test_queen_check_is_significant() {
        let occs = detect_move("4k3/8/8/8/8/8/8/3QK3 w", "4k3/8/8/7Q/8/8/8/4K3 b", false, "Qh5+");
        assert_eq!(rows(&occs), vec![("Qh5", "Qh5", "ke8", false)]);
    }

    #[test]
    fn test_single_minor_target_is_not_significant() {
        let occs = detect_move("r3k3/8/8/8/8/8/8/4KB2 w", "r3k3/8/8/8/8/8/6B1/4K3 b", false, "Bg2");
        assert!(occs.is_empty());
    }

    #[test]
    fn test_castling_has_no_direct_rows() {
        let occs = detect_move(
            "5k2/8/8/8/8/8/8/4K2R w",
            "5k2/8/8/8/8/8/8/5RK1 b",
            false,
            "O-O+",
        );
        assert!(occs.is_empty());
    }

    #[test]
    fn test_mate_flag_on_king_target() {
        let occs = detect_move(
            "6k1/5ppp/8/8/8/8/8/R3K3 w",
            "R5k1/5ppp/8/8/8/8/8/4K3 b",
            false,
            "Ra8#",
        );
        assert_eq!(rows(&occs), vec![("Ra8", "Ra8", "kg8", false)]);
        assert!(occs[0].is_mate);
    }

    #[test]
    fn test_black_move_ply() {
        let occs = detect_move("4k3/8/8/8/8/8/8/q3K3 b", "4k3/8/8/8/8/8/8/3qK3 w", true, "Qd1+");
        assert_eq!(rows(&occs), vec![("qd1", "qd1", "Ke1", false)]);
        assert_eq!(occs[0].side, Color::Black);
        assert_eq!(occs[0].ply, 15);
    }
}

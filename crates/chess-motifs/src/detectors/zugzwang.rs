use chess_core::board::{BISHOP_DIRECTIONS, KNIGHT_OFFSETS, ROOK_DIRECTIONS};
use chess_core::{Board, Color, Position, Role, Square};

use crate::detector_trait::MotifDetector;
use crate::detectors::played_boards;
use crate::motif::Motif;
use crate::occurrence::MotifOccurrence;

/// Most pieces allowed on the board for the zugzwang check to run.
const MAX_ENDGAME_PIECES: usize = 8;

/// Heuristic: in a queenless endgame the side to move has at least one pawn
/// and every non-king piece is frozen. Pawns are blocked, knights have no
/// empty landing square and bishops and rooks have no empty neighbouring
/// square along their lines. A bare king is never reported.
pub struct ZugzwangDetector;

impl MotifDetector for ZugzwangDetector {
    fn motif(&self) -> Motif {
        Motif::Zugzwang
    }

    fn detect(&self, positions: &[Position]) -> Vec<MotifOccurrence> {
        let mut occurrences = Vec::new();

        for (pos, board) in played_boards(positions) {
            if pos.last_move.is_none() || !is_endgame(&board) {
                continue;
            }
            if !is_frozen(&board, pos.side_to_move()) {
                continue;
            }
            if let Some(occ) = MotifOccurrence::at(
                pos,
                format!("Zugzwang (heuristic) at move {}", pos.move_number),
            ) {
                occurrences.push(occ);
            }
        }

        occurrences
    }
}

fn is_endgame(board: &Board) -> bool {
    board.piece_count() <= MAX_ENDGAME_PIECES && !board.has_queens()
}

fn is_frozen(board: &Board, side: Color) -> bool {
    let empty = |sq: Option<Square>| sq.is_some_and(|s| board.piece_at(s).is_none());

    if board.count(side, Role::Pawn) == 0 {
        return false;
    }
    board.pieces_of(side).all(|(sq, piece)| match piece.role {
        Role::King | Role::Queen => true,
        Role::Pawn => !empty(sq.offset(0, side.pawn_direction())),
        Role::Knight => !KNIGHT_OFFSETS
            .iter()
            .any(|&(df, dr)| empty(sq.offset(df, dr))),
        Role::Bishop => !BISHOP_DIRECTIONS
            .iter()
            .any(|&(df, dr)| empty(sq.offset(df, dr))),
        Role::Rook => !ROOK_DIRECTIONS
            .iter()
            .any(|&(df, dr)| empty(sq.offset(df, dr))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(fen: &str, white_to_move: bool) -> Vec<MotifOccurrence> {
        ZugzwangDetector.detect(&[Position::new(50, fen, white_to_move, Some("Kd6"))])
    }

    #[test]
    fn test_king_and_blocked_pawn() {
        // Black has only a king and a pawn blocked by the white pawn.
        let occs = detect("8/8/3k4/3p4/3P4/3K4/8/8 b", false);
        assert_eq!(occs.len(), 1);
        assert_eq!(occs[0].side, Color::White);
    }

    #[test]
    fn test_bare_king_is_not_zugzwang() {
        assert!(detect("8/8/8/4k3/8/8/8/4K3 b", false).is_empty());
        // King and rook against a lone king.
        assert!(detect("8/8/8/4k3/8/8/8/R3K3 b", false).is_empty());
    }

    #[test]
    fn test_blocked_pawn_and_frozen_bishop() {
        // The a8 bishop's only neighbour is its own pawn, blocked on b7.
        assert_eq!(detect("b7/1p6/1P6/8/8/3k4/8/3K4 b", false).len(), 1);
        // Without the pawn the side is down to pieces alone.
        assert!(detect("b7/8/1P6/8/8/3k4/8/3K4 b", false).is_empty());
    }

    #[test]
    fn test_mobile_pieces_are_not_zugzwang() {
        // Pawn can advance.
        assert!(detect("8/p7/3k4/8/8/3K4/8/8 b", false).is_empty());
        // Knight has a free square.
        assert!(detect("8/8/3k4/8/4n3/3K4/8/8 b", false).is_empty());
        // Rook can step sideways.
        assert!(detect("8/8/3k4/8/4r3/3K4/8/8 b", false).is_empty());
    }

    #[test]
    fn test_not_an_endgame() {
        // Queens on the board.
        assert!(detect("8/8/3k4/3p4/3P4/3K4/8/q7 b", false).is_empty());
        // Every pawn blocked, but too many pieces.
        assert!(detect("8/8/3k4/pppp4/PPPP4/3K4/8/8 b", false).is_empty());
    }
}

use serde::{Deserialize, Serialize};

use crate::board::{Board, Color, STARTING_FEN};
use crate::error::ChessError;

/// One snapshot of a replayed game.
///
/// `move_number` is the full-move number in which `last_move` was played:
/// both `1. e4` and `1... e5` produce positions with `move_number == 1`.
/// The initial position has `move_number == 0` and no last move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub move_number: u32,
    pub fen: String,
    pub white_to_move: bool,
    pub last_move: Option<String>,
}

impl Position {
    pub fn new(
        move_number: u32,
        fen: impl Into<String>,
        white_to_move: bool,
        last_move: Option<&str>,
    ) -> Self {
        Self {
            move_number,
            fen: fen.into(),
            white_to_move,
            last_move: last_move.map(str::to_string),
        }
    }

    pub fn initial() -> Self {
        Self::new(0, STARTING_FEN, true, None)
    }

    pub fn board(&self) -> Result<Board, ChessError> {
        Board::from_fen(&self.fen)
    }

    pub fn side_to_move(&self) -> Color {
        Color::from_white(self.white_to_move)
    }

    /// The side that played `last_move`.
    pub fn mover(&self) -> Color {
        self.side_to_move().opposite()
    }

    /// Half-move index of `last_move`, `None` for the initial position.
    pub fn ply(&self) -> Option<u32> {
        (self.move_number > 0).then(|| ply_for(self.move_number, self.mover()))
    }
}

/// `(move_number - 1) * 2`, plus one for black.
pub fn ply_for(move_number: u32, side: Color) -> u32 {
    let base = move_number.saturating_sub(1) * 2;
    match side {
        Color::White => base,
        Color::Black => base + 1,
    }
}

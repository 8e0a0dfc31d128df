//! Game replay: SAN movetext to an ordered list of positions.

use tracing::debug;

use crate::board::Board;
use crate::error::ChessError;
use crate::pgn::PgnParser;
use crate::position::Position;
use crate::san::{resolve, SanParser};

/// Rebuilds board state from recorded movetext. Holds compiled patterns,
/// so construct once and share.
#[derive(Debug, Clone)]
pub struct GameReplayer {
    pgn: PgnParser,
    san: SanParser,
}

impl GameReplayer {
    pub fn new() -> Result<Self, ChessError> {
        Ok(Self {
            pgn: PgnParser::new()?,
            san: SanParser::new()?,
        })
    }

    pub fn pgn(&self) -> &PgnParser {
        &self.pgn
    }

    /// Replay raw movetext. Comments, variations, NAGs and the result token
    /// are stripped first. Returns the initial position followed by one
    /// position per half-move.
    pub fn replay(&self, movetext: &str) -> Result<Vec<Position>, ChessError> {
        let tokens = self.pgn.san_tokens(movetext);
        self.replay_tokens(&tokens)
    }

    /// Replay already-cleaned SAN tokens. Fails on the first token that is
    /// not SAN or does not resolve to exactly one piece.
    pub fn replay_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<Position>, ChessError> {
        let mut board = Board::starting();
        let mut positions = Vec::with_capacity(tokens.len() + 1);
        positions.push(Position::initial());

        for (i, token) in tokens.iter().enumerate() {
            let token = token.as_ref();
            let ply = i + 1;
            let san = self
                .san
                .parse(token)
                .ok_or_else(|| ChessError::illegal_move(token, ply, "not a SAN move"))?;
            let mv = resolve(&board, &san)
                .map_err(|reason| ChessError::illegal_move(token, ply, reason))?;

            let move_number = board.fullmove_number();
            board.play(&mv);
            positions.push(Position::new(
                move_number,
                board.to_fen(),
                board.side_to_move().is_white(),
                Some(token),
            ));
        }

        debug!(plies = tokens.len(), "Replayed game");
        Ok(positions)
    }
}

//! Error types for board decoding and game replay.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Illegal move '{token}' at ply {ply}: {reason}")]
    IllegalMove {
        token: String,
        ply: usize,
        reason: String,
    },

    #[error("Pattern error: {0}")]
    Pattern(String),
}

impl From<regex::Error> for ChessError {
    fn from(e: regex::Error) -> Self {
        ChessError::Pattern(e.to_string())
    }
}

impl ChessError {
    pub(crate) fn invalid_fen(fen: &str, reason: impl Into<String>) -> Self {
        ChessError::InvalidFen {
            fen: fen.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn illegal_move(token: &str, ply: usize, reason: impl Into<String>) -> Self {
        ChessError::IllegalMove {
            token: token.to_string(),
            ply,
            reason: reason.into(),
        }
    }
}

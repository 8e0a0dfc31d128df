use chess_core::ChessError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error(transparent)]
    Chess(#[from] ChessError),
}

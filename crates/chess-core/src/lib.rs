//! Chess primitives shared by the motif engine.
//!
//! A small, self-contained rules layer: FEN decoding, attack geometry, SAN
//! resolution and PGN cleanup. It reconstructs board state from recorded
//! games; it does not generate moves or search.

pub mod board;
pub mod error;
pub mod game_data;
pub mod pgn;
pub mod position;
pub mod replay;
pub mod san;

pub use board::{Board, Color, Piece, Role, Square};
pub use error::ChessError;
pub use position::{ply_for, Position};
pub use replay::GameReplayer;

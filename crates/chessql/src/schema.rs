//! Identifier allow-list shared by every dialect. Nothing reaches SQL
//! identifier text without passing through here.

use chess_motifs::Motif;

use crate::compiler::Dialect;
use crate::error::{CompileError, MotifContext};

/// Dotted query names and the column each maps to.
pub const FIELD_ALIASES: [(&str, &str); 8] = [
    ("white.elo", "white_elo"),
    ("black.elo", "black_elo"),
    ("white.username", "white_username"),
    ("black.username", "black_username"),
    ("time.class", "time_class"),
    ("num.moves", "num_moves"),
    ("game.url", "game_url"),
    ("played.at", "played_at"),
];

pub const COLUMNS: [&str; 11] = [
    "white_username",
    "black_username",
    "white_elo",
    "black_elo",
    "time_class",
    "eco",
    "result",
    "num_moves",
    "platform",
    "game_url",
    "played_at",
];

/// Columns compared case-insensitively on `=`, `!=` and `IN`.
pub const STRING_COLUMNS: [&str; 7] = [
    "white_username",
    "black_username",
    "time_class",
    "eco",
    "result",
    "platform",
    "game_url",
];

pub const OPERATORS: [&str; 6] = ["=", "!=", "<", "<=", ">", ">="];

/// Column for a query field name: an alias, a column name, or a dotted
/// spelling of one.
pub fn resolve_field(name: &str) -> Result<&'static str, CompileError> {
    if let Some((_, column)) = FIELD_ALIASES.iter().find(|(alias, _)| *alias == name) {
        return Ok(*column);
    }
    let underscored = name.replace('.', "_");
    COLUMNS
        .iter()
        .find(|c| **c == underscored)
        .copied()
        .ok_or_else(|| CompileError::UnknownField(name.to_string()))
}

pub fn is_string_column(column: &str) -> bool {
    STRING_COLUMNS.contains(&column)
}

pub fn resolve_operator(op: &str) -> Result<&'static str, CompileError> {
    OPERATORS
        .iter()
        .find(|o| **o == op)
        .copied()
        .ok_or_else(|| CompileError::InvalidOperator(op.to_string()))
}

/// Motif for a query name, if `dialect` can evaluate it.
pub fn resolve_motif(
    name: &str,
    dialect: Dialect,
    context: MotifContext,
) -> Result<Motif, CompileError> {
    Motif::from_name(name)
        .filter(|m| dialect.supports(*m))
        .ok_or_else(|| CompileError::UnknownMotif {
            name: name.to_string(),
            context,
        })
}

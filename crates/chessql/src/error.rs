//! Query error types

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("{message} at position {position}")]
    Lex { message: String, position: usize },

    #[error("{message} at position {position}")]
    Parse { message: String, position: usize },

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Where a motif name appeared, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotifContext {
    Predicate,
    Sequence,
    OrderBy,
}

impl fmt::Display for MotifContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotifContext::Predicate => Ok(()),
            MotifContext::Sequence => f.write_str(" in sequence"),
            MotifContext::OrderBy => f.write_str(" in ORDER BY"),
        }
    }
}

/// Semantic errors raised while lowering a parsed query to SQL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown motif{context}: {name}")]
    UnknownMotif { name: String, context: MotifContext },

    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    #[error("sequence() requires at least 2 motifs")]
    SequenceTooShort,
}

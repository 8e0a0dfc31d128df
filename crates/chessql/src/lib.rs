//! ChessQL: a small query language over game metadata and tactical motifs.
//!
//! ```text
//! motif(fork) AND white.elo >= 2000 ORDER BY motif_count(fork) DESC
//! ```
//!
//! A query is lexed, parsed into an [`Expr`] tree and lowered to SQL by a
//! [`Compiler`] for one storage [`Dialect`].

pub mod ast;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod schema;

pub use ast::{Expr, OrderBy, ParsedQuery, Value};
pub use compiler::{CompiledQuery, Compiler, Dialect, SEQUENCE_PLY_STEP};
pub use error::{CompileError, MotifContext, QueryError, Result};
pub use parser::parse;

/// Lex, parse and compile `query` in one step.
pub fn compile(query: &str, dialect: Dialect) -> Result<CompiledQuery> {
    let parsed = parse(query)?;
    Ok(Compiler::new(dialect).compile(&parsed)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_end_to_end() {
        let q = compile("motif(fork) AND white.elo >= 2000", Dialect::FlagColumns).unwrap();
        assert!(q.sql.starts_with("SELECT g.* FROM game_features g WHERE"));
        assert_eq!(q.parameters, vec![Value::Int(2000)]);
    }

    #[test]
    fn test_compile_reports_each_stage() {
        assert!(matches!(compile("eco = \"", Dialect::FactTable), Err(QueryError::Lex { .. })));
        assert!(matches!(compile("motif(", Dialect::FactTable), Err(QueryError::Parse { .. })));
        assert!(matches!(
            compile("motif(nope)", Dialect::FactTable),
            Err(QueryError::Compile(CompileError::UnknownMotif { .. }))
        ));
    }

    #[test]
    fn test_parameters_serialize_as_plain_json() {
        let q = compile(r#"eco = "B20" AND num_moves > 30"#, Dialect::FlagColumns).unwrap();
        assert_eq!(serde_json::to_string(&q.parameters).unwrap(), r#"["B20",30]"#);
    }
}

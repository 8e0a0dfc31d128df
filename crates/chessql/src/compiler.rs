//! Lowers a parsed query to SQL for one of two storage layouts.
//!
//! Both dialects read `game_features g` and answer the same questions.
//! `FlagColumns` tests the denormalized `has_<motif>` booleans and binds
//! every literal as a `?` parameter. `FactTable` rebuilds each motif from
//! `motif_occurrences` rows and inlines every literal, returning no
//! parameters. `sequence()` and `ORDER BY motif_count()` read the fact
//! rows in both.

use chess_motifs::Motif;
use serde::Serialize;
use tracing::debug;

use crate::ast::{Expr, OrderBy, ParsedQuery, Value};
use crate::error::{CompileError, MotifContext};
use crate::schema::{is_string_column, resolve_field, resolve_motif, resolve_operator};

/// Ply distance between consecutive `sequence()` steps: the same side's
/// next move.
pub const SEQUENCE_PLY_STEP: u32 = 2;

const KING_TARGET: &str = "(mo.target LIKE 'K%' OR mo.target LIKE 'k%')";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dialect {
    /// One boolean column per motif on `game_features`; parameterized.
    FlagColumns,
    /// Normalized occurrence rows; literals inlined.
    FactTable,
}

impl Dialect {
    /// Whether a motif is in this dialect's query vocabulary.
    pub fn supports(self, motif: Motif) -> bool {
        match self {
            Dialect::FlagColumns => motif.has_flag_column(),
            Dialect::FactTable => motif.is_queryable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledQuery {
    pub sql: String,
    /// Positional `?` values in textual order. Always empty for `FactTable`.
    pub parameters: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compiler {
    dialect: Dialect,
}

impl Compiler {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn compile(&self, query: &ParsedQuery) -> Result<CompiledQuery, CompileError> {
        let mut lowering = Lowering {
            dialect: self.dialect,
            parameters: Vec::new(),
        };

        // The count subquery precedes WHERE in the SQL text, so its
        // parameters are collected first.
        let ordering = query
            .order_by
            .as_ref()
            .map(|order| lowering.order_by(order))
            .transpose()?;
        let predicate = lowering.expr(&query.expr)?;

        let sql = match ordering {
            Some((counts, direction)) => format!(
                "SELECT g.* FROM game_features g LEFT JOIN ({counts}) cnt ON g.game_url = cnt.game_url WHERE {predicate} ORDER BY COALESCE(cnt.c, 0) {direction}"
            ),
            None => format!(
                "SELECT g.* FROM game_features g WHERE {predicate} ORDER BY g.played_at DESC"
            ),
        };

        debug!(dialect = ?self.dialect, parameters = lowering.parameters.len(), "Compiled query");
        Ok(CompiledQuery {
            sql,
            parameters: lowering.parameters,
        })
    }
}

/// Rows of `motif_occurrences` that make up one motif.
struct MotifRows {
    stored_as: Motif,
    /// Extra conditions, joined with `AND`.
    filters: &'static [&'static str],
    /// Grouping within a game; groups of two or more count once.
    group_by: Option<&'static str>,
}

fn motif_rows(motif: Motif) -> MotifRows {
    let derived = |filters: &'static [&'static str], group_by| MotifRows {
        stored_as: Motif::Attack,
        filters,
        group_by,
    };
    match motif {
        Motif::Fork => derived(
            &["mo.is_discovered = FALSE", "mo.attacker IS NOT NULL"],
            Some("mo.ply, mo.attacker"),
        ),
        Motif::DiscoveredAttack => derived(&["mo.is_discovered = TRUE"], None),
        Motif::Checkmate => derived(&["mo.is_mate = TRUE"], None),
        Motif::DiscoveredCheck => derived(&["mo.is_discovered = TRUE", KING_TARGET], None),
        Motif::DoubleCheck => derived(&[KING_TARGET], Some("mo.ply")),
        stored => MotifRows {
            stored_as: stored,
            filters: &[],
            group_by: None,
        },
    }
}

struct Lowering {
    dialect: Dialect,
    parameters: Vec<Value>,
}

impl Lowering {
    fn literal(&mut self, value: &Value) -> String {
        match self.dialect {
            Dialect::FlagColumns => {
                self.parameters.push(value.clone());
                "?".to_string()
            }
            Dialect::FactTable => inline_literal(value),
        }
    }

    fn expr(&mut self, expr: &Expr) -> Result<String, CompileError> {
        match expr {
            Expr::Or(operands) => self.join(operands, " OR ", "FALSE"),
            Expr::And(operands) => self.join(operands, " AND ", "TRUE"),
            Expr::Not(operand) => Ok(format!("(NOT {})", self.expr(operand)?)),
            Expr::Comparison { field, op, value } => self.comparison(field, op, value),
            Expr::In { field, values } => self.in_list(field, values),
            Expr::Motif(name) => self.motif(name),
            Expr::Sequence(names) => self.sequence(names),
        }
    }

    fn join(&mut self, operands: &[Expr], sep: &str, empty: &str) -> Result<String, CompileError> {
        if operands.is_empty() {
            return Ok(empty.to_string());
        }
        let parts = operands
            .iter()
            .map(|e| self.expr(e))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("({})", parts.join(sep)))
    }

    fn comparison(&mut self, field: &str, op: &str, value: &Value) -> Result<String, CompileError> {
        let column = resolve_field(field)?;
        let op = resolve_operator(op)?;
        let literal = self.literal(value);
        if is_string_column(column) && (op == "=" || op == "!=") {
            Ok(format!("LOWER(g.{column}) {op} LOWER({literal})"))
        } else {
            Ok(format!("g.{column} {op} {literal}"))
        }
    }

    fn in_list(&mut self, field: &str, values: &[Value]) -> Result<String, CompileError> {
        let column = resolve_field(field)?;
        let fold = is_string_column(column);
        let items: Vec<String> = values
            .iter()
            .map(|v| {
                let literal = self.literal(v);
                if fold {
                    format!("LOWER({literal})")
                } else {
                    literal
                }
            })
            .collect();
        let target = if fold {
            format!("LOWER(g.{column})")
        } else {
            format!("g.{column}")
        };
        Ok(format!("{target} IN ({})", items.join(", ")))
    }

    fn motif(&mut self, name: &str) -> Result<String, CompileError> {
        let motif = resolve_motif(name, self.dialect, MotifContext::Predicate)?;
        match self.dialect {
            Dialect::FlagColumns => Ok(format!("g.has_{} = TRUE", motif.name())),
            Dialect::FactTable => {
                let rows = motif_rows(motif);
                let conditions = self.conditions(&rows);
                let grouping = rows
                    .group_by
                    .map(|key| format!(" GROUP BY {key} HAVING COUNT(*) >= 2"))
                    .unwrap_or_default();
                Ok(format!(
                    "EXISTS (SELECT 1 FROM motif_occurrences mo WHERE mo.game_url = g.game_url AND {conditions}{grouping})"
                ))
            }
        }
    }

    fn sequence(&mut self, names: &[String]) -> Result<String, CompileError> {
        if names.len() < 2 {
            return Err(CompileError::SequenceTooShort);
        }
        let motifs = names
            .iter()
            .map(|name| resolve_motif(name, self.dialect, MotifContext::Sequence))
            .collect::<Result<Vec<_>, _>>()?;

        let mut sql = String::from("EXISTS (SELECT 1");
        for (i, motif) in motifs.into_iter().enumerate() {
            let rows = self.ply_rows(motif);
            if i == 0 {
                sql.push_str(&format!(" FROM ({rows}) sq1"));
            } else {
                let n = i + 1;
                sql.push_str(&format!(
                    " JOIN ({rows}) sq{n} ON sq{n}.game_url = sq1.game_url AND sq{n}.ply = sq{i}.ply + {SEQUENCE_PLY_STEP}"
                ));
            }
        }
        sql.push_str(" WHERE sq1.game_url = g.game_url)");
        Ok(sql)
    }

    /// Count subquery and direction for `ORDER BY motif_count(..)`.
    fn order_by(&mut self, order: &OrderBy) -> Result<(String, &'static str), CompileError> {
        let motif = resolve_motif(&order.motif, self.dialect, MotifContext::OrderBy)?;
        let rows = self.ply_rows(motif);
        let direction = if order.ascending { "ASC" } else { "DESC" };
        Ok((
            format!("SELECT game_url, COUNT(*) AS c FROM ({rows}) m GROUP BY game_url"),
            direction,
        ))
    }

    /// `(game_url, ply)` for every occurrence of `motif`, one row per group
    /// for grouped motifs.
    fn ply_rows(&mut self, motif: Motif) -> String {
        let rows = motif_rows(motif);
        let conditions = self.conditions(&rows);
        let grouping = rows
            .group_by
            .map(|key| format!(" GROUP BY mo.game_url, {key} HAVING COUNT(*) >= 2"))
            .unwrap_or_default();
        format!("SELECT mo.game_url, mo.ply FROM motif_occurrences mo WHERE {conditions}{grouping}")
    }

    fn conditions(&mut self, rows: &MotifRows) -> String {
        let value = self.literal(&Value::Str(rows.stored_as.db_value().to_string()));
        std::iter::once(format!("mo.motif = {value}"))
            .chain(rows.filters.iter().map(|f| f.to_string()))
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

/// SQL text for a literal. Strings are always quoted with `'` doubled,
/// whatever column they are compared against.
fn inline_literal(value: &Value) -> String {
    match value {
        Value::Int(n) => n.to_string(),
        Value::Str(s) => format!("'{}'", s.replace('\'', "''")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn compile(query: &str, dialect: Dialect) -> Result<CompiledQuery, CompileError> {
        Compiler::new(dialect).compile(&parse(query).unwrap())
    }

    fn flags(query: &str) -> CompiledQuery {
        compile(query, Dialect::FlagColumns).unwrap()
    }

    fn facts(query: &str) -> CompiledQuery {
        compile(query, Dialect::FactTable).unwrap()
    }

    fn s(v: &str) -> Value {
        Value::Str(v.to_string())
    }

    #[test]
    fn test_flag_motif_and_comparison() {
        let q = flags("white_elo >= 2000 AND motif(pin)");
        assert_eq!(
            q.sql,
            "SELECT g.* FROM game_features g WHERE (g.white_elo >= ? AND g.has_pin = TRUE) ORDER BY g.played_at DESC"
        );
        assert_eq!(q.parameters, vec![Value::Int(2000)]);
    }

    #[test]
    fn test_fact_motif_and_comparison() {
        let q = facts("white.elo >= 2000 AND motif(pin)");
        assert_eq!(
            q.sql,
            "SELECT g.* FROM game_features g WHERE (g.white_elo >= 2000 AND EXISTS (SELECT 1 FROM motif_occurrences mo WHERE mo.game_url = g.game_url AND mo.motif = 'PIN')) ORDER BY g.played_at DESC"
        );
        assert!(q.parameters.is_empty());
    }

    #[test]
    fn test_fact_derived_motifs() {
        assert!(facts("motif(fork)").sql.contains(
            "mo.motif = 'ATTACK' AND mo.is_discovered = FALSE AND mo.attacker IS NOT NULL GROUP BY mo.ply, mo.attacker HAVING COUNT(*) >= 2)"
        ));
        assert!(facts("motif(double_check)").sql.contains(
            "mo.motif = 'ATTACK' AND (mo.target LIKE 'K%' OR mo.target LIKE 'k%') GROUP BY mo.ply HAVING COUNT(*) >= 2)"
        ));
        assert!(facts("motif(checkmate)").sql.contains("mo.motif = 'ATTACK' AND mo.is_mate = TRUE)"));
        assert!(facts("motif(discovered_attack)")
            .sql
            .contains("mo.motif = 'ATTACK' AND mo.is_discovered = TRUE)"));
        assert!(facts("motif(discovered_check)")
            .sql
            .contains("mo.is_discovered = TRUE AND (mo.target LIKE 'K%' OR mo.target LIKE 'k%'))"));
        assert!(facts("motif(zugzwang)").sql.contains("mo.motif = 'ZUGZWANG')"));
        assert!(facts("motif(sacrifice)").sql.contains("mo.motif = 'SACRIFICE')"));
    }

    #[test]
    fn test_king_target_pattern_shared() {
        for name in ["discovered_check", "double_check"] {
            let sql = facts(&format!("motif({name})")).sql;
            assert_eq!(sql.matches(KING_TARGET).count(), 1, "{name}");
        }
    }

    #[test]
    fn test_string_columns_fold_case() {
        let q = flags(r#"white.username = "Magnus" AND eco < "C00""#);
        assert!(q.sql.contains("(LOWER(g.white_username) = LOWER(?) AND g.eco < ?)"));
        assert_eq!(q.parameters, vec![s("Magnus"), s("C00")]);

        let q = facts(r#"white.username != "Magnus""#);
        assert!(q.sql.contains("LOWER(g.white_username) != LOWER('Magnus')"));
    }

    #[test]
    fn test_in_lists() {
        let q = flags(r#"platform IN ["CHESS_COM", "LICHESS"]"#);
        assert!(q.sql.contains("LOWER(g.platform) IN (LOWER(?), LOWER(?))"));
        assert_eq!(q.parameters, vec![s("CHESS_COM"), s("LICHESS")]);

        let q = facts("white.elo IN [1500, 2000]");
        assert!(q.sql.contains("WHERE g.white_elo IN (1500, 2000) ORDER BY"));
    }

    #[test]
    fn test_not_and_or() {
        let q = flags("NOT motif(pin) OR motif(fork)");
        assert!(q.sql.contains("WHERE ((NOT g.has_pin = TRUE) OR g.has_fork = TRUE) ORDER BY"));
    }

    #[test]
    fn test_sequence_joins_on_ply_step() {
        let q = facts("sequence(pin THEN check THEN checkmate)");
        assert!(q.sql.contains(
            "EXISTS (SELECT 1 FROM (SELECT mo.game_url, mo.ply FROM motif_occurrences mo WHERE mo.motif = 'PIN') sq1 \
             JOIN (SELECT mo.game_url, mo.ply FROM motif_occurrences mo WHERE mo.motif = 'CHECK') sq2 \
             ON sq2.game_url = sq1.game_url AND sq2.ply = sq1.ply + 2 \
             JOIN (SELECT mo.game_url, mo.ply FROM motif_occurrences mo WHERE mo.motif = 'ATTACK' AND mo.is_mate = TRUE) sq3 \
             ON sq3.game_url = sq1.game_url AND sq3.ply = sq2.ply + 2 \
             WHERE sq1.game_url = g.game_url)"
        ));

        let q = flags("sequence(fork THEN check)");
        assert_eq!(q.parameters, vec![s("ATTACK"), s("CHECK")]);
        assert!(q.sql.contains("GROUP BY mo.game_url, mo.ply, mo.attacker HAVING COUNT(*) >= 2) sq1"));
    }

    #[test]
    fn test_order_by_parameters_precede_where() {
        let q = flags(r#"eco = "B20" ORDER BY motif_count(pin)"#);
        assert_eq!(
            q.sql,
            "SELECT g.* FROM game_features g LEFT JOIN (SELECT game_url, COUNT(*) AS c FROM \
             (SELECT mo.game_url, mo.ply FROM motif_occurrences mo WHERE mo.motif = ?) m GROUP BY game_url) cnt \
             ON g.game_url = cnt.game_url WHERE LOWER(g.eco) = LOWER(?) ORDER BY COALESCE(cnt.c, 0) DESC"
        );
        assert_eq!(q.parameters, vec![s("PIN"), s("B20")]);
    }

    #[test]
    fn test_order_by_ascending_fact_table() {
        let q = facts("motif(check) ORDER BY motif_count(check) ASC");
        assert!(q.sql.ends_with("ORDER BY COALESCE(cnt.c, 0) ASC"));
        assert!(q.sql.contains("WHERE mo.motif = 'CHECK') m GROUP BY game_url) cnt"));
        assert!(q.parameters.is_empty());
    }

    #[test]
    fn test_inlined_strings_are_escaped() {
        let q = facts(r#"white.username = "o'neil') OR 1=1 --""#);
        assert!(q.sql.contains("LOWER('o''neil'') OR 1=1 --')"));
        // Strings stay quoted against numeric columns.
        let q = facts(r#"white.elo > "2000 OR 1=1""#);
        assert!(q.sql.contains("g.white_elo > '2000 OR 1=1'"));
    }

    #[test]
    fn test_compile_errors() {
        for dialect in [Dialect::FlagColumns, Dialect::FactTable] {
            assert_eq!(
                compile("elo > 5", dialect),
                Err(CompileError::UnknownField("elo".into()))
            );
            assert_eq!(
                compile("motif(brilliancy)", dialect),
                Err(CompileError::UnknownMotif {
                    name: "brilliancy".into(),
                    context: MotifContext::Predicate
                })
            );
            assert_eq!(compile("sequence(pin)", dialect), Err(CompileError::SequenceTooShort));
            assert_eq!(
                compile("sequence(pin THEN attack)", dialect),
                Err(CompileError::UnknownMotif {
                    name: "attack".into(),
                    context: MotifContext::Sequence
                })
            );
            assert_eq!(
                compile("motif(pin) ORDER BY motif_count(nope)", dialect),
                Err(CompileError::UnknownMotif {
                    name: "nope".into(),
                    context: MotifContext::OrderBy
                })
            );
        }
    }

    #[test]
    fn test_hand_built_invalid_operator() {
        let query = ParsedQuery {
            expr: Expr::Comparison {
                field: "white_elo".into(),
                op: "LIKE".into(),
                value: Value::Int(1),
            },
            order_by: None,
        };
        assert_eq!(
            Compiler::new(Dialect::FactTable).compile(&query),
            Err(CompileError::InvalidOperator("LIKE".into()))
        );
    }

    #[test]
    fn test_flag_vocabulary_is_smaller() {
        for name in [
            "back_rank_mate",
            "smothered_mate",
            "zugzwang",
            "double_check",
            "overloaded_piece",
            "sacrifice",
            "interference",
        ] {
            let query = format!("motif({name})");
            assert!(compile(&query, Dialect::FlagColumns).is_err(), "{name}");
            assert!(compile(&query, Dialect::FactTable).is_ok(), "{name}");
        }
    }
}

//! Shared fixtures: a small PGN corpus and an in-memory SQLite store laid
//! out the way the indexer's consumers store motif facts.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use chess_motifs::{FeatureExtractor, GameFeatures, Motif, MotifKind};
use chessql::{CompiledQuery, Value};
use sqlx::{Connection, Row, SqliteConnection};

pub const OPERA_GAME: &str = r#"[Event "Paris Opera"]
[Link "https://www.chess.com/game/live/1001"]
[White "Morphy"]
[Black "Duke"]
[WhiteElo "2600"]
[BlackElo "1900"]
[ECO "C41"]
[TimeControl "600"]
[Date "2024.11.02"]
[Result "1-0"]

1. e4 e5 2. Nf3 d6 3. d4 Bg4 4. dxe5 Bxf3 5. Qxf3 dxe5 6. Bc4 Nf6 7. Qb3 Qe7
8. Nc3 c6 9. Bg5 b5 10. Nxb5 cxb5 11. Bxb5+ Nbd7 12. O-O-O Rd8 13. Rxd7 Rxd7
14. Rd1 Qe6 15. Bxd7+ Nxd7 16. Qb8+ Nxb8 17. Rd8# 1-0
"#;

pub const FRIED_LIVER: &str = r#"[Event "Casual"]
[Site "https://lichess.org/fried001"]
[White "alice"]
[Black "bob"]
[WhiteElo "1500"]
[BlackElo "1450"]
[ECO "C57"]
[TimeControl "300+0"]
[Date "2024.10.01"]
[Result "1-0"]

1. e4 e5 2. Nf3 Nc6 3. Bc4 Nf6 4. Ng5 d5 5. exd5 Nxd5 6. Nxf7 Kxf7 7. Qf3+ Ke6
8. Nc3 Ncb4 9. a3 Nxc3 10. bxc3 Nd5 11. Bxd5+ Kd6 1-0
"#;

pub const SCHOLARS_MATE: &str = r#"[Event "Casual"]
[Site "https://lichess.org/scholar01"]
[White "erin"]
[Black "frank"]
[WhiteElo "1200"]
[BlackElo "1100"]
[ECO "C20"]
[TimeControl "60+0"]
[Date "2024.09.15"]
[Result "1-0"]

1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0
"#;

pub const FOOLS_MATE: &str = r#"[Event "Live Chess"]
[Link "https://www.chess.com/game/live/2002"]
[White "gina"]
[Black "hank"]
[WhiteElo "900"]
[BlackElo "1000"]
[ECO "A00"]
[TimeControl "180+2"]
[Date "2024.08.20"]
[Result "0-1"]

1. f3 e5 2. g4 Qh4# 0-1
"#;

pub const QUIET_GAME: &str = r#"[Event "Rated Classical"]
[Site "https://lichess.org/quiet0001"]
[White "ivan"]
[Black "judy"]
[WhiteElo "2100"]
[BlackElo "2050"]
[ECO "D30"]
[TimeControl "1800+30"]
[Date "2024.07.04"]
[Result "1/2-1/2"]

1. d4 d5 2. c4 e6 3. Nc3 Nf6 1/2-1/2
"#;

pub const CORPUS: [&str; 5] = [OPERA_GAME, FRIED_LIVER, SCHOLARS_MATE, FOOLS_MATE, QUIET_GAME];

const SCHEMA: &str = r#"
CREATE TABLE motif_occurrences (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    game_url TEXT NOT NULL,
    motif TEXT NOT NULL,
    ply INTEGER NOT NULL,
    side TEXT NOT NULL,
    move_number INTEGER NOT NULL,
    description TEXT NOT NULL,
    moved_piece TEXT,
    attacker TEXT,
    target TEXT,
    is_discovered BOOLEAN NOT NULL DEFAULT FALSE,
    is_mate BOOLEAN NOT NULL DEFAULT FALSE,
    pin_type TEXT
);
CREATE INDEX idx_motif_occurrences_game ON motif_occurrences (game_url, motif, ply);
"#;

/// `game_features` with one boolean per flag-column motif.
fn game_features_ddl() -> String {
    let flags: Vec<String> = Motif::FLAG_COLUMNS
        .iter()
        .map(|m| format!("    has_{} BOOLEAN NOT NULL DEFAULT FALSE", m.name()))
        .collect();
    format!(
        "CREATE TABLE game_features (
    game_url TEXT PRIMARY KEY,
    platform TEXT,
    white_username TEXT,
    black_username TEXT,
    white_elo INTEGER,
    black_elo INTEGER,
    time_class TEXT,
    eco TEXT,
    result TEXT,
    played_at TEXT,
    num_moves INTEGER NOT NULL,
{}
)",
        flags.join(",\n")
    )
}

/// Empty in-memory store with both tables.
pub async fn memory_db() -> SqliteConnection {
    let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
    sqlx::raw_sql(SCHEMA).execute(&mut conn).await.unwrap();
    sqlx::query(&game_features_ddl()).execute(&mut conn).await.unwrap();
    conn
}

/// Extract every corpus game and write it to both tables. Returns the
/// features keyed by game URL.
pub async fn seed_corpus(conn: &mut SqliteConnection) -> BTreeMap<String, GameFeatures> {
    let extractor = FeatureExtractor::new().unwrap();
    let mut seeded = BTreeMap::new();

    for pgn in CORPUS {
        let game = extractor.extract_game(pgn).unwrap();
        let url = game.metadata.game_url.clone().unwrap();
        let meta = &game.metadata;

        let flag_columns: Vec<String> = Motif::FLAG_COLUMNS
            .iter()
            .map(|m| format!("has_{}", m.name()))
            .collect();
        let placeholders = vec!["?"; 11 + flag_columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO game_features (game_url, platform, white_username, black_username, \
             white_elo, black_elo, time_class, eco, result, played_at, num_moves, {}) VALUES ({})",
            flag_columns.join(", "),
            placeholders
        );

        let mut insert = sqlx::query(&sql)
            .bind(&url)
            .bind(meta.platform.clone())
            .bind(meta.white.clone())
            .bind(meta.black.clone())
            .bind(meta.white_elo.map(i64::from))
            .bind(meta.black_elo.map(i64::from))
            .bind(meta.time_class.map(|t| t.as_str()))
            .bind(meta.eco.clone())
            .bind(meta.result.clone())
            .bind(meta.played_at.clone())
            .bind(i64::from(game.features.num_moves));
        for motif in Motif::FLAG_COLUMNS {
            insert = insert.bind(game.features.has_motif(motif));
        }
        insert.execute(&mut *conn).await.unwrap();

        for (motif, occurrences) in &game.features.occurrences {
            // Derived motifs are rebuilt from ATTACK rows.
            if motif.kind() != MotifKind::Stored {
                continue;
            }
            for occ in occurrences {
                sqlx::query(
                    "INSERT INTO motif_occurrences (game_url, motif, ply, side, move_number, \
                     description, moved_piece, attacker, target, is_discovered, is_mate, pin_type) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(&url)
                .bind(motif.db_value())
                .bind(i64::from(occ.ply))
                .bind(occ.side.name())
                .bind(i64::from(occ.move_number))
                .bind(&occ.description)
                .bind(occ.moved_piece.clone())
                .bind(occ.attacker.clone())
                .bind(occ.target.clone())
                .bind(occ.is_discovered)
                .bind(occ.is_mate)
                .bind(occ.pin_type.map(|p| p.as_str()))
                .execute(&mut *conn)
                .await
                .unwrap();
            }
        }

        seeded.insert(url, game.features);
    }

    seeded
}

/// Run a compiled query and return the matched game URLs in result order.
pub async fn run_query(conn: &mut SqliteConnection, compiled: &CompiledQuery) -> Vec<String> {
    let mut query = sqlx::query(&compiled.sql);
    for value in &compiled.parameters {
        query = match value {
            Value::Int(n) => query.bind(*n),
            Value::Str(s) => query.bind(s.clone()),
        };
    }
    query
        .fetch_all(&mut *conn)
        .await
        .unwrap_or_else(|e| panic!("query failed: {e}\n{}", compiled.sql))
        .iter()
        .map(|row| row.get::<String, _>("game_url"))
        .collect()
}

pub fn url_set(urls: &[String]) -> BTreeSet<String> {
    urls.iter().cloned().collect()
}

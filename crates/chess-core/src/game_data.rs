use serde::{Deserialize, Serialize};

use crate::pgn::ParsedGame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeClass {
    Bullet,
    Blitz,
    Rapid,
    Classical,
    Daily,
}

impl TimeClass {
    /// Classify a PGN `TimeControl` value such as `180+2` or `1/86400`.
    /// Uses estimated game length: base seconds plus forty increments.
    pub fn from_time_control(tc: &str) -> Option<TimeClass> {
        if tc.contains('/') {
            return Some(TimeClass::Daily);
        }
        let mut parts = tc.split('+');
        let base: u32 = parts.next()?.trim().parse().ok()?;
        let increment: u32 = parts.next().and_then(|v| v.trim().parse().ok()).unwrap_or(0);
        let estimated = base + 40 * increment;
        Some(match estimated {
            0..=179 => TimeClass::Bullet,
            180..=479 => TimeClass::Blitz,
            480..=1499 => TimeClass::Rapid,
            _ => TimeClass::Classical,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeClass::Bullet => "bullet",
            TimeClass::Blitz => "blitz",
            TimeClass::Rapid => "rapid",
            TimeClass::Classical => "classical",
            TimeClass::Daily => "daily",
        }
    }
}

/// Per-game metadata stored next to the motif facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMetadata {
    pub game_url: Option<String>,
    pub platform: Option<String>, // "CHESS_COM", "LICHESS"
    pub white: Option<String>,
    pub black: Option<String>,
    pub white_elo: Option<u32>,
    pub black_elo: Option<u32>,
    pub result: Option<String>, // "1-0", "0-1", "1/2-1/2"
    pub eco: Option<String>,
    pub time_control: Option<String>,
    pub time_class: Option<TimeClass>,
    pub played_at: Option<String>, // ISO date, optionally with time
    pub event: Option<String>,
}

impl GameMetadata {
    pub fn from_headers(game: &ParsedGame) -> Self {
        let text = |name: &str| game.header(name).map(str::to_string);
        let elo = |name: &str| game.header(name).and_then(|v| v.parse().ok());

        let game_url = text("Link").or_else(|| text("Site").filter(|s| s.starts_with("http")));
        let platform = game_url
            .as_deref()
            .or(game.header("Site"))
            .and_then(platform_from_site);
        let time_control = text("TimeControl");
        let time_class = time_control.as_deref().and_then(TimeClass::from_time_control);

        let date = game
            .header("UTCDate")
            .or(game.header("Date"))
            .filter(|d| !d.contains('?'))
            .map(|d| d.replace('.', "-"));
        let played_at = match (date, game.header("UTCTime")) {
            (Some(d), Some(t)) => Some(format!("{d} {t}")),
            (d, _) => d,
        };

        Self {
            game_url,
            platform,
            white: text("White"),
            black: text("Black"),
            white_elo: elo("WhiteElo"),
            black_elo: elo("BlackElo"),
            result: text("Result").filter(|r| r != "*"),
            eco: text("ECO"),
            time_control,
            time_class,
            played_at,
            event: text("Event"),
        }
    }
}

fn platform_from_site(site: &str) -> Option<String> {
    let site = site.to_ascii_lowercase();
    if site.contains("chess.com") {
        Some("CHESS_COM".to_string())
    } else if site.contains("lichess") {
        Some("LICHESS".to_string())
    } else {
        None
    }
}

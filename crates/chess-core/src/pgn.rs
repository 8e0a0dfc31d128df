//! PGN handling: header extraction, movetext cleanup and tokenizing.
//!
//! Lightweight regex-based. Comments, variations, NAGs, annotation glyphs,
//! move numbers and the result token are stripped so only SAN tokens remain.

use regex::Regex;

use crate::error::ChessError;

const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Header tag pairs plus the raw movetext of one game.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedGame {
    pub headers: Vec<(String, String)>,
    pub movetext: String,
}

impl ParsedGame {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }
}

/// Compiled patterns for PGN cleanup. Build once and reuse across games.
#[derive(Debug, Clone)]
pub struct PgnParser {
    header_re: Regex,
    tag_re: Regex,
    comment_re: Regex,
    line_comment_re: Regex,
    move_number_re: Regex,
}

impl PgnParser {
    pub fn new() -> Result<Self, ChessError> {
        Ok(Self {
            header_re: Regex::new(r#"\[(\w+)\s+"([^"]*)"\]"#)?,
            tag_re: Regex::new(r"\[[^\]]*\]")?,
            comment_re: Regex::new(r"\{[^}]*\}")?,
            line_comment_re: Regex::new(r";[^\n]*")?,
            move_number_re: Regex::new(r"^\d+\.+")?,
        })
    }

    /// Split one game into header tags and movetext.
    pub fn parse(&self, pgn: &str) -> ParsedGame {
        let headers = self
            .header_re
            .captures_iter(pgn)
            .map(|cap| (cap[1].to_string(), cap[2].to_string()))
            .collect();
        let movetext = self.tag_re.replace_all(pgn, "").trim().to_string();
        ParsedGame { headers, movetext }
    }

    /// Remove comments, variations, NAGs, annotation glyphs, move numbers and
    /// the result token, leaving SAN moves separated by single spaces.
    pub fn clean_movetext(&self, movetext: &str) -> String {
        self.san_tokens(movetext).join(" ")
    }

    /// SAN tokens of the main line, in order.
    pub fn san_tokens(&self, movetext: &str) -> Vec<String> {
        let no_tags = self.tag_re.replace_all(movetext, "");
        let no_comments = self.comment_re.replace_all(&no_tags, " ");
        let no_line_comments = self.line_comment_re.replace_all(&no_comments, " ");
        let main_line = strip_variations(&no_line_comments);

        main_line
            .split_whitespace()
            .filter_map(|raw| {
                let token = self.move_number_re.replace(raw, "");
                let token = token.trim_end_matches(['!', '?']);
                if token.is_empty() || token.starts_with('$') || RESULT_TOKENS.contains(&token) {
                    None
                } else {
                    Some(token.to_string())
                }
            })
            .collect()
    }
}

/// Drop parenthesized variations, nested ones included.
fn strip_variations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '(' => {
                depth += 1;
                out.push(' ');
            }
            ')' => {
                depth = depth.saturating_sub(1);
                out.push(' ');
            }
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Split a multi-game PGN file into individual games. A new game starts at
/// the first tag line that follows movetext.
pub fn split_games(pgn: &str) -> Vec<String> {
    let mut games = Vec::new();
    let mut current = String::new();
    let mut seen_moves = false;

    for line in pgn.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && seen_moves {
            games.push(std::mem::take(&mut current));
            seen_moves = false;
        }
        if !trimmed.is_empty() && !trimmed.starts_with('[') {
            seen_moves = true;
        }
        current.push_str(line);
        current.push('\n');
    }

    if !current.trim().is_empty() {
        games.push(current);
    }
    games
}

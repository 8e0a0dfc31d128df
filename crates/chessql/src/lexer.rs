//! Tokenizer for ChessQL.

use serde::Serialize;

use crate::error::{QueryError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Number,
    Str,
    Ident,
    // Keywords (case-sensitive)
    And,
    Or,
    Not,
    In,
    Motif,
    // Operators
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Eof,
}

/// One token. `text` holds the unescaped contents for strings and the
/// source slice otherwise; `position` is the byte offset of its first char.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }
}

fn keyword(word: &str) -> Option<TokenKind> {
    match word {
        "AND" => Some(TokenKind::And),
        "OR" => Some(TokenKind::Or),
        "NOT" => Some(TokenKind::Not),
        "IN" => Some(TokenKind::In),
        "motif" => Some(TokenKind::Motif),
        _ => None,
    }
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Tokenize the whole input. The last token is always `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            let start = self.pos;
            if c.is_whitespace() {
                self.bump();
                continue;
            }

            let single = match c {
                '(' => Some(TokenKind::LParen),
                ')' => Some(TokenKind::RParen),
                '[' => Some(TokenKind::LBracket),
                ']' => Some(TokenKind::RBracket),
                ',' => Some(TokenKind::Comma),
                '.' => Some(TokenKind::Dot),
                '=' => Some(TokenKind::Eq),
                _ => None,
            };
            if let Some(kind) = single {
                self.bump();
                tokens.push(Token::new(kind, c.to_string(), start));
                continue;
            }

            let token = match c {
                '!' if self.peek_next() == Some('=') => self.operator(TokenKind::Neq, "!="),
                '<' if self.peek_next() == Some('=') => self.operator(TokenKind::Lte, "<="),
                '<' => self.operator(TokenKind::Lt, "<"),
                '>' if self.peek_next() == Some('=') => self.operator(TokenKind::Gte, ">="),
                '>' => self.operator(TokenKind::Gt, ">"),
                '"' => self.string()?,
                '-' if self.peek_next().is_some_and(|n| n.is_ascii_digit()) => self.number(),
                c if c.is_ascii_digit() => self.number(),
                c if c.is_ascii_alphabetic() || c == '_' => self.word(),
                other => {
                    return Err(QueryError::Lex {
                        message: format!("Unexpected character '{other}'"),
                        position: start,
                    })
                }
            };
            tokens.push(token);
        }

        tokens.push(Token::new(TokenKind::Eof, "", self.pos));
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        self.input[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn operator(&mut self, kind: TokenKind, text: &str) -> Token {
        let start = self.pos;
        self.pos += text.len();
        Token::new(kind, text, start)
    }

    fn string(&mut self) -> Result<Token> {
        let start = self.pos;
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(Token::new(TokenKind::Str, value, start)),
                Some('\\') => match self.bump() {
                    Some(escaped) => value.push(escaped),
                    None => break,
                },
                Some(c) => value.push(c),
                None => break,
            }
        }
        Err(QueryError::Lex {
            message: "Unterminated string".to_string(),
            position: start,
        })
    }

    fn number(&mut self) -> Token {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        Token::new(TokenKind::Number, &self.input[start..self.pos], start)
    }

    fn word(&mut self) -> Token {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }
        let text = &self.input[start..self.pos];
        Token::new(keyword(text).unwrap_or(TokenKind::Ident), text, start)
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).tokenize()
}

//! Recursive-descent parser for ChessQL.
//!
//! Precedence, lowest first: `OR`, `AND`, `NOT`, then primaries. `sequence`,
//! `THEN`, `ORDER`, `BY`, `motif_count`, `ASC` and `DESC` are plain
//! identifiers to the lexer and are recognized here by context.

use crate::ast::{Expr, OrderBy, ParsedQuery, Value};
use crate::error::{QueryError, Result};
use crate::lexer::{tokenize, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// A missing trailing `Eof` is appended.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let position = tokens.last().map_or(0, |t| t.position + t.text.len());
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                position,
            });
        }
        Self { tokens, pos: 0 }
    }

    /// Parse a complete query; trailing tokens are an error.
    pub fn parse_query(mut self) -> Result<ParsedQuery> {
        let expr = self.parse_or()?;
        let order_by = if self.check_word("ORDER") {
            Some(self.parse_order_by()?)
        } else {
            None
        };
        self.expect(TokenKind::Eof)?;
        Ok(ParsedQuery { expr, order_by })
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut operands = vec![self.parse_and()?];
        while self.check(TokenKind::Or) {
            self.advance();
            operands.push(self.parse_and()?);
        }
        Ok(flatten(operands, Expr::Or))
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut operands = vec![self.parse_not()?];
        while self.check(TokenKind::And) {
            self.advance();
            operands.push(self.parse_not()?);
        }
        Ok(flatten(operands, Expr::And))
    }

    fn parse_not(&mut self) -> Result<Expr> {
        if self.check(TokenKind::Not) {
            self.advance();
            return Ok(Expr::Not(Box::new(self.parse_not()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let kind = self.current().kind;
        match kind {
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_or()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Motif => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let name = self.expect(TokenKind::Ident)?.text;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Motif(name))
            }
            TokenKind::Ident
                if self.check_word("sequence") && self.peek_kind(1) == TokenKind::LParen =>
            {
                self.parse_sequence()
            }
            TokenKind::Ident => self.parse_field_expr(),
            _ => Err(self.error(format!("Unexpected token '{}'", self.current().text))),
        }
    }

    fn parse_sequence(&mut self) -> Result<Expr> {
        self.advance();
        self.expect(TokenKind::LParen)?;
        let mut names = vec![self.expect(TokenKind::Ident)?.text];
        while self.check_word("THEN") {
            self.advance();
            names.push(self.expect(TokenKind::Ident)?.text);
        }
        self.expect(TokenKind::RParen)?;
        Ok(Expr::Sequence(names))
    }

    fn parse_field_expr(&mut self) -> Result<Expr> {
        let field = self.parse_field_name()?;

        if self.check(TokenKind::In) {
            self.advance();
            self.expect(TokenKind::LBracket)?;
            let mut values = vec![self.parse_value()?];
            while self.check(TokenKind::Comma) {
                self.advance();
                values.push(self.parse_value()?);
            }
            self.expect(TokenKind::RBracket)?;
            return Ok(Expr::In { field, values });
        }

        let kind = self.current().kind;
        let op = match kind {
            TokenKind::Eq | TokenKind::Neq | TokenKind::Lt | TokenKind::Lte | TokenKind::Gt
            | TokenKind::Gte => self.advance().text,
            _ => {
                return Err(self.error(format!(
                    "Expected comparison operator, got '{}'",
                    self.current().text
                )))
            }
        };
        let value = self.parse_value()?;
        Ok(Expr::Comparison { field, op, value })
    }

    fn parse_field_name(&mut self) -> Result<String> {
        let mut name = self.expect(TokenKind::Ident)?.text;
        while self.check(TokenKind::Dot) {
            self.advance();
            name.push('.');
            name.push_str(&self.expect(TokenKind::Ident)?.text);
        }
        Ok(name)
    }

    fn parse_value(&mut self) -> Result<Value> {
        let kind = self.current().kind;
        match kind {
            TokenKind::Number => {
                let token = self.advance();
                token.text.parse().map(Value::Int).map_err(|_| QueryError::Parse {
                    message: format!("Number out of range: {}", token.text),
                    position: token.position,
                })
            }
            TokenKind::Str => Ok(Value::Str(self.advance().text)),
            _ => Err(self.error(format!("Expected value, got '{}'", self.current().text))),
        }
    }

    fn parse_order_by(&mut self) -> Result<OrderBy> {
        self.expect_word("ORDER")?;
        self.expect_word("BY")?;
        self.expect_word("motif_count")?;
        self.expect(TokenKind::LParen)?;
        let motif = self.expect(TokenKind::Ident)?.text;
        self.expect(TokenKind::RParen)?;

        let ascending = if self.check_word("ASC") {
            self.advance();
            true
        } else {
            if self.check_word("DESC") {
                self.advance();
            }
            false
        };
        Ok(OrderBy { motif, ascending })
    }

    fn current(&self) -> &Token {
        // Eof is never consumed, so `pos` stays in range.
        &self.tokens[self.pos]
    }

    fn peek_kind(&self, ahead: usize) -> TokenKind {
        self.tokens
            .get(self.pos + ahead)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn check_word(&self, word: &str) -> bool {
        let token = self.current();
        token.kind == TokenKind::Ident && token.text == word
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!(
                "Expected {kind:?}, got {:?} '{}'",
                self.current().kind,
                self.current().text
            )))
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<Token> {
        if self.check_word(word) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("Expected {word}, got '{}'", self.current().text)))
        }
    }

    fn error(&self, message: String) -> QueryError {
        QueryError::Parse {
            message,
            position: self.current().position,
        }
    }
}

/// A single operand stands alone; two or more become one N-ary node.
fn flatten(mut operands: Vec<Expr>, node: fn(Vec<Expr>) -> Expr) -> Expr {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        node(operands)
    }
}

/// Lex and parse a query string.
pub fn parse(input: &str) -> Result<ParsedQuery> {
    Parser::new(tokenize(input)?).parse_query()
}

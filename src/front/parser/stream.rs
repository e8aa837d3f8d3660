//! TokenStream: cursor over the scanned token vector with lookahead.

use super::ParseError;
use crate::front::token::{Token, TokenKind};

pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map(|t| t.line).unwrap_or(1);
            tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                line,
            });
        }
        Self { tokens, pos: 0 }
    }

    pub fn peek(&self) -> &Token {
        self.at(self.pos)
    }

    pub fn peek_ahead(&self, n: usize) -> &Token {
        self.at(self.pos + n)
    }

    fn at(&self, i: usize) -> &Token {
        // The trailing Eof is sticky: lookahead past the end keeps yielding it.
        self.tokens.get(i).unwrap_or_else(|| self.tokens.last().expect("stream has Eof"))
    }

    pub fn line(&self) -> u32 {
        self.peek().line
    }

    pub fn bump(&mut self) -> Token {
        let tok = self.at(self.pos).clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let tok = self.peek();
        if tok.kind == kind {
            Ok(self.bump())
        } else {
            Err(ParseError {
                line: tok.line,
                message: format!("expected '{}', found '{}'", kind.name(), tok.kind.name()),
            })
        }
    }
}

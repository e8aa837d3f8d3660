//! Recursive-descent parser producing the tagged-variant AST. Node ids are
//! handed out densely in visit order so the semantic analyzer can size its
//! annotation table from `Program::node_count`.

mod decl;
mod expr;
mod stmt;
mod stream;

pub use stream::TokenStream;

use thiserror::Error;

use crate::front::ast::{Item, NodeId, Program};
use crate::front::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: u32,
    pub message: String,
}

pub type PResult<T> = Result<T, ParseError>;

pub struct Parser {
    ts: TokenStream,
    next_id: u32,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            ts: TokenStream::new(tokens),
            next_id: 0,
        }
    }

    pub fn parse_program(mut self) -> PResult<Program> {
        let id = self.fresh();
        let mut items = Vec::new();
        while !self.ts.check(TokenKind::Eof) {
            items.push(self.parse_top()?);
        }
        Ok(Program {
            id,
            items,
            node_count: self.next_id,
        })
    }

    fn parse_top(&mut self) -> PResult<Item> {
        let line = self.ts.line();
        let ty = self.parse_type_name()?;
        let name = self.parse_ident()?;
        if self.ts.check(TokenKind::LParen) {
            Ok(Item::Function(self.parse_function_def(ty, name, line)?))
        } else {
            Ok(Item::Global(self.parse_var_decl_tail(ty, name, line)?))
        }
    }

    pub(crate) fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn parse_ident(&mut self) -> PResult<String> {
        let tok = self.ts.expect(TokenKind::Identifier)?;
        Ok(tok.lexeme)
    }

    pub(crate) fn error<T>(&self, message: impl Into<String>) -> PResult<T> {
        Err(ParseError {
            line: self.ts.line(),
            message: message.into(),
        })
    }
}

/// Parse a scanned token stream into a program.
pub fn parse(tokens: Vec<Token>) -> PResult<Program> {
    Parser::new(tokens).parse_program()
}

//! Statements: blocks, if/while/for, return, declarations, and expression
//! statements. A stray ';' in statement position parses as an empty block.

use super::{PResult, Parser};
use crate::front::ast::Stmt;
use crate::front::token::TokenKind as K;

impl Parser {
    pub(crate) fn parse_stmt(&mut self) -> PResult<Stmt> {
        match self.ts.peek().kind {
            K::LBrace => self.parse_compound(),
            K::If => self.parse_if(),
            K::While => self.parse_while(),
            K::For => self.parse_for(),
            K::Return => self.parse_return(),
            K::Semicolon => {
                let id = self.fresh();
                let line = self.ts.line();
                self.ts.bump();
                Ok(Stmt::Compound {
                    id,
                    line,
                    stmts: Vec::new(),
                })
            }
            k if k.is_type_name() => self.parse_declaration(),
            _ => self.parse_expr_stmt(),
        }
    }

    pub(crate) fn parse_compound(&mut self) -> PResult<Stmt> {
        let line = self.ts.line();
        self.ts.expect(K::LBrace)?;
        let id = self.fresh();
        let mut stmts = Vec::new();
        while !self.ts.check(K::RBrace) {
            if self.ts.check(K::Eof) {
                return self.error("unexpected end of input inside block");
            }
            // Stray semicolons inside a block produce no node.
            if self.ts.matches(K::Semicolon) {
                continue;
            }
            stmts.push(self.parse_stmt()?);
        }
        self.ts.expect(K::RBrace)?;
        Ok(Stmt::Compound { id, line, stmts })
    }

    fn parse_expr_stmt(&mut self) -> PResult<Stmt> {
        let id = self.fresh();
        let line = self.ts.line();
        let expr = self.parse_expr()?;
        self.ts.expect(K::Semicolon)?;
        Ok(Stmt::Expr { id, line, expr })
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        let line = self.ts.line();
        self.ts.expect(K::If)?;
        let id = self.fresh();
        self.ts.expect(K::LParen)?;
        let cond = self.parse_expr()?;
        self.ts.expect(K::RParen)?;
        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if self.ts.matches(K::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Ok(Stmt::If {
            id,
            line,
            cond,
            then_branch,
            else_branch,
        })
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        let line = self.ts.line();
        self.ts.expect(K::While)?;
        let id = self.fresh();
        self.ts.expect(K::LParen)?;
        let cond = self.parse_expr()?;
        self.ts.expect(K::RParen)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::While {
            id,
            line,
            cond,
            body,
        })
    }

    fn parse_for(&mut self) -> PResult<Stmt> {
        let line = self.ts.line();
        self.ts.expect(K::For)?;
        let id = self.fresh();
        self.ts.expect(K::LParen)?;

        // All three header pieces are optional; the init may be a declaration
        // (analyzed in the enclosing scope, not a scope of its own).
        let init = if self.ts.matches(K::Semicolon) {
            None
        } else if self.ts.peek().kind.is_type_name() {
            Some(Box::new(self.parse_declaration()?))
        } else {
            let stmt = self.parse_expr_stmt()?;
            Some(Box::new(stmt))
        };

        let cond = if self.ts.matches(K::Semicolon) {
            None
        } else {
            let e = self.parse_expr()?;
            self.ts.expect(K::Semicolon)?;
            Some(e)
        };

        let update = if self.ts.check(K::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.ts.expect(K::RParen)?;

        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::For {
            id,
            line,
            init,
            cond,
            update,
            body,
        })
    }

    fn parse_return(&mut self) -> PResult<Stmt> {
        let line = self.ts.line();
        self.ts.expect(K::Return)?;
        let id = self.fresh();
        let value = if self.ts.check(K::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.ts.expect(K::Semicolon)?;
        Ok(Stmt::Return { id, line, value })
    }
}

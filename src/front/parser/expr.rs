//! Expression grammar, one precedence level per function: assignment,
//! logical or/and, equality, relational, additive, multiplicative, unary,
//! primary.

use super::{PResult, Parser};
use crate::front::ast::{BinOp, Expr, UnOp};
use crate::front::token::TokenKind as K;

impl Parser {
    pub(crate) fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_assignment()
    }

    pub(crate) fn parse_assignment(&mut self) -> PResult<Expr> {
        // The left-hand side of '=' is restricted to a plain identifier, so
        // one token of lookahead decides between assignment and the binary
        // operator ladder.
        if self.ts.check(K::Identifier) && self.ts.peek_ahead(1).kind == K::Assign {
            let line = self.ts.line();
            let name = self.parse_ident()?;
            let id = self.fresh();
            self.ts.expect(K::Assign)?;
            let value = Box::new(self.parse_assignment()?);
            return Ok(Expr::Assign {
                id,
                line,
                name,
                value,
            });
        }
        self.parse_logical_or()
    }

    fn parse_logical_or(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_logical_and()?;
        while self.ts.check(K::OrOr) {
            lhs = self.binary(lhs, BinOp::LogOr, Self::parse_logical_and)?;
        }
        Ok(lhs)
    }

    fn parse_logical_and(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_equality()?;
        while self.ts.check(K::AndAnd) {
            lhs = self.binary(lhs, BinOp::LogAnd, Self::parse_equality)?;
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.ts.peek().kind {
                K::EqEq => BinOp::Eq,
                K::NotEq => BinOp::Ne,
                _ => break,
            };
            lhs = self.binary(lhs, op, Self::parse_relational)?;
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.ts.peek().kind {
                K::Less => BinOp::Lt,
                K::Greater => BinOp::Gt,
                K::LessEq => BinOp::Le,
                K::GreaterEq => BinOp::Ge,
                _ => break,
            };
            lhs = self.binary(lhs, op, Self::parse_additive)?;
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.ts.peek().kind {
                K::Plus => BinOp::Add,
                K::Minus => BinOp::Sub,
                _ => break,
            };
            lhs = self.binary(lhs, op, Self::parse_multiplicative)?;
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.ts.peek().kind {
                K::Star => BinOp::Mul,
                K::Slash => BinOp::Div,
                K::Percent => BinOp::Mod,
                _ => break,
            };
            lhs = self.binary(lhs, op, Self::parse_unary)?;
        }
        Ok(lhs)
    }

    fn binary(
        &mut self,
        lhs: Expr,
        op: BinOp,
        next: fn(&mut Self) -> PResult<Expr>,
    ) -> PResult<Expr> {
        let line = self.ts.line();
        self.ts.bump();
        let id = self.fresh();
        let rhs = next(self)?;
        Ok(Expr::Binary {
            id,
            line,
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let op = match self.ts.peek().kind {
            K::Minus => Some(UnOp::Neg),
            K::Plus => Some(UnOp::Plus),
            K::Not => Some(UnOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let line = self.ts.line();
            self.ts.bump();
            let id = self.fresh();
            let operand = Box::new(self.parse_unary()?);
            return Ok(Expr::Unary {
                id,
                line,
                op,
                operand,
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let tok = self.ts.peek().clone();
        match tok.kind {
            K::IntegerLiteral => {
                self.ts.bump();
                let value: i64 = match tok.lexeme.parse() {
                    Ok(v) => v,
                    Err(_) => {
                        return Err(super::ParseError {
                            line: tok.line,
                            message: format!("integer literal '{}' out of range", tok.lexeme),
                        })
                    }
                };
                Ok(Expr::IntLit {
                    id: self.fresh(),
                    line: tok.line,
                    value,
                })
            }
            K::Identifier => {
                let name = self.parse_ident()?;
                if self.ts.check(K::LParen) {
                    return self.parse_call(name, tok.line);
                }
                Ok(Expr::Ident {
                    id: self.fresh(),
                    line: tok.line,
                    name,
                })
            }
            K::LParen => {
                self.ts.bump();
                let e = self.parse_expr()?;
                self.ts.expect(K::RParen)?;
                Ok(e)
            }
            other => self.error(format!("expected an expression, found '{}'", other.name())),
        }
    }

    fn parse_call(&mut self, callee: String, line: u32) -> PResult<Expr> {
        let id = self.fresh();
        self.ts.expect(K::LParen)?;
        let mut args = Vec::new();
        if !self.ts.check(K::RParen) {
            loop {
                args.push(self.parse_assignment()?);
                if self.ts.matches(K::Comma) {
                    continue;
                }
                break;
            }
        }
        self.ts.expect(K::RParen)?;
        Ok(Expr::Call {
            id,
            line,
            callee,
            args,
        })
    }
}

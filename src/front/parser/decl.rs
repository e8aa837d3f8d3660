//! Declarations: type names, variable declarators, parameter lists, and
//! function definitions.

use super::{PResult, Parser};
use crate::front::ast::{BaseType, FunctionDef, Param, Stmt};
use crate::front::token::TokenKind as K;

impl Parser {
    pub(crate) fn parse_type_name(&mut self) -> PResult<BaseType> {
        let tok = self.ts.peek().clone();
        let ty = match tok.kind {
            K::Int => BaseType::Int,
            K::Char => BaseType::Char,
            K::Float => BaseType::Float,
            K::Double => BaseType::Double,
            K::Void => BaseType::Void,
            other => return self.error(format!("expected a type name, found '{}'", other.name())),
        };
        self.ts.bump();
        Ok(ty)
    }

    /// A declaration statement starting from its leading type keyword.
    pub(crate) fn parse_declaration(&mut self) -> PResult<Stmt> {
        let line = self.ts.line();
        let ty = self.parse_type_name()?;
        let first = self.parse_ident()?;
        self.parse_var_decl_tail(ty, first, line)
    }

    /// Declarator list after `type ident` has been consumed, through the
    /// closing ';'. Plain names and initialized names keep their own lists,
    /// both in source order.
    pub(crate) fn parse_var_decl_tail(
        &mut self,
        ty: BaseType,
        first: String,
        line: u32,
    ) -> PResult<Stmt> {
        let id = self.fresh();
        let mut names = Vec::new();
        let mut inits = Vec::new();

        let mut name = first;
        loop {
            if self.ts.matches(K::Assign) {
                let value = self.parse_assignment()?;
                inits.push((name, value));
            } else {
                names.push(name);
            }
            if self.ts.matches(K::Comma) {
                name = self.parse_ident()?;
                continue;
            }
            break;
        }
        self.ts.expect(K::Semicolon)?;

        Ok(Stmt::VarDecl {
            id,
            line,
            ty,
            names,
            inits,
        })
    }

    pub(crate) fn parse_function_def(
        &mut self,
        ret: BaseType,
        name: String,
        line: u32,
    ) -> PResult<FunctionDef> {
        let id = self.fresh();
        self.ts.expect(K::LParen)?;
        let params = self.parse_param_list()?;
        self.ts.expect(K::RParen)?;
        let body = self.parse_compound()?;
        Ok(FunctionDef {
            id,
            line,
            ret,
            name,
            params,
            body,
        })
    }

    fn parse_param_list(&mut self) -> PResult<Vec<Param>> {
        let mut params = Vec::new();
        if self.ts.check(K::RParen) {
            return Ok(params);
        }
        // `(void)` is an empty parameter list.
        if self.ts.check(K::Void) && self.ts.peek_ahead(1).kind == K::RParen {
            self.ts.bump();
            return Ok(params);
        }
        loop {
            let ty = self.parse_type_name()?;
            let name = self.parse_ident()?;
            params.push(Param { ty, name });
            if self.ts.matches(K::Comma) {
                continue;
            }
            break;
        }
        Ok(params)
    }
}

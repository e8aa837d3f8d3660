//! Semantic analysis: resolves names against the scoped symbol table, infers
//! expression types, fills the annotation side table, and accumulates
//! diagnostics. The analyzer never aborts on an error; offending nodes are
//! marked and their type becomes invalid, which silences dependent checks
//! further up the tree.

mod symbols;
mod types;

pub use symbols::{SymbolInfo, SymbolTable};
pub use types::TypeInfo;

use std::fmt;

use thiserror::Error;

use crate::front::ast::{
    Annotations, BaseType, Expr, FunctionDef, Item, NodeId, Program, Stmt, SymbolKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Undeclared,
    Redeclaration,
    Type,
    Assignment,
    Semantic,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Undeclared => "undeclared error",
            ErrorKind::Redeclaration => "redeclaration error",
            ErrorKind::Type => "type error",
            ErrorKind::Assignment => "assignment error",
            ErrorKind::Semantic => "semantic error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("[{kind}] line {line} in {context}: {message}")]
pub struct SemanticError {
    pub kind: ErrorKind,
    pub line: u32,
    pub context: String,
    pub message: String,
}

/// Everything the analyzer produced: the filled annotation table plus the
/// accumulated diagnostics.
pub struct Analysis {
    pub annotations: Annotations,
    pub errors: Vec<SemanticError>,
    pub warnings: Vec<String>,
}

impl Analysis {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct SemanticAnalyzer {
    table: SymbolTable,
    annotations: Annotations,
    errors: Vec<SemanticError>,
    warnings: Vec<String>,
    current_line: u32,
    context: String,
    current_ret: Option<BaseType>,
    saw_return: bool,
}

impl SemanticAnalyzer {
    pub fn new(program: &Program) -> Self {
        Self {
            table: SymbolTable::new(),
            annotations: Annotations::new(program.node_count),
            errors: Vec::new(),
            warnings: Vec::new(),
            current_line: 0,
            context: String::new(),
            current_ret: None,
            saw_return: false,
        }
    }

    pub fn analyze(mut self, program: &Program) -> Analysis {
        for item in &program.items {
            match item {
                Item::Function(func) => self.visit_func(func),
                Item::Global(decl) => self.visit_stmt(decl),
            }
        }
        Analysis {
            annotations: self.annotations,
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    // --- diagnostics ---

    fn error(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.errors.push(SemanticError {
            kind,
            line: self.current_line,
            context: self.context.clone(),
            message: message.into(),
        });
    }

    /// Record an error and mark the node it anchors to.
    fn error_at(&mut self, id: NodeId, kind: ErrorKind, message: String) {
        let info = self.annotations.get_mut(id);
        info.error = Some(message.clone());
        self.error(kind, message);
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn set_context(&mut self, line: u32, context: String) {
        self.current_line = line;
        self.context = context;
    }

    // --- functions and statements ---

    fn visit_func(&mut self, func: &FunctionDef) {
        self.set_context(func.line, format!("function definition '{}'", func.name));
        let signature: Vec<BaseType> = func.params.iter().map(|p| p.ty).collect();
        let declared = self
            .table
            .declare(&func.name, func.ret, SymbolKind::Function)
            .map(|sym| {
                sym.initialized = true;
                sym.params = Some(signature);
            })
            .is_some();
        if !declared {
            let msg = format!("redeclaration of function '{}'", func.name);
            self.error_at(func.id, ErrorKind::Redeclaration, msg);
        }

        self.table.enter_scope();
        self.current_ret = Some(func.ret);
        self.saw_return = false;

        for param in &func.params {
            self.set_context(func.line, "function parameter".to_string());
            let declared = self
                .table
                .declare(&param.name, param.ty, SymbolKind::Parameter)
                .map(|sym| sym.initialized = true)
                .is_some();
            if !declared {
                let msg = format!("redeclaration of parameter '{}'", param.name);
                self.error(ErrorKind::Redeclaration, msg);
            }
        }

        // The body is a compound statement and opens its own scope, one level
        // below the parameters.
        self.visit_stmt(&func.body);

        if func.ret != BaseType::Void && !self.saw_return {
            self.warn(format!("function '{}' may not return a value", func.name));
        }

        self.table.exit_scope();
        self.current_ret = None;
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr { expr, .. } => {
                self.visit_expr(expr);
            }
            Stmt::VarDecl {
                line,
                ty,
                names,
                inits,
                ..
            } => self.visit_var_decl(*line, *ty, names, inits),
            Stmt::Compound { stmts, .. } => {
                self.table.enter_scope();
                for s in stmts {
                    self.visit_stmt(s);
                }
                self.table.exit_scope();
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                self.visit_expr(cond);
                self.visit_stmt(then_branch);
                if let Some(els) = else_branch {
                    self.visit_stmt(els);
                }
            }
            Stmt::While { cond, body, .. } => {
                self.visit_expr(cond);
                self.visit_stmt(body);
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
                ..
            } => {
                // The init runs in the enclosing scope; the for header does
                // not open one.
                if let Some(init) = init {
                    self.visit_stmt(init);
                }
                if let Some(cond) = cond {
                    self.visit_expr(cond);
                }
                if let Some(update) = update {
                    self.visit_expr(update);
                }
                self.visit_stmt(body);
            }
            Stmt::Return { line, value, .. } => self.visit_return(*line, value.as_ref()),
        }
    }

    fn visit_var_decl(&mut self, line: u32, ty: BaseType, names: &[String], inits: &[(String, Expr)]) {
        self.set_context(line, "variable declaration".to_string());
        for name in names {
            if self.table.declare(name, ty, SymbolKind::Variable).is_none() {
                let msg = format!("redeclaration of variable '{}'", name);
                self.error(ErrorKind::Redeclaration, msg);
            }
        }

        for (name, init) in inits {
            self.set_context(line, "variable declaration".to_string());
            if self.table.declare(name, ty, SymbolKind::Variable).is_none() {
                let msg = format!("redeclaration of variable '{}'", name);
                self.error(ErrorKind::Redeclaration, msg);
                continue;
            }
            let init_ty = self.visit_expr(init);
            self.set_context(line, "variable initialization".to_string());
            let var_ty = TypeInfo::of(ty);
            if !init_ty.is_valid() {
                // The initializer already failed; stay silent and leave the
                // variable uninitialized.
                continue;
            }
            if !init_ty.can_assign_to(var_ty) {
                let msg = format!(
                    "initialization type mismatch: cannot assign {} to {}",
                    init_ty, var_ty
                );
                self.error(ErrorKind::Type, msg);
            } else if let Some(sym) = self.table.lookup_mut(name) {
                sym.initialized = true;
            }
        }
    }

    fn visit_return(&mut self, line: u32, value: Option<&Expr>) {
        self.saw_return = true;
        self.set_context(line, "return statement".to_string());
        let expected = self.current_ret.map(TypeInfo::of).unwrap_or_else(TypeInfo::invalid);
        match value {
            Some(expr) => {
                let actual = self.visit_expr(expr);
                self.set_context(line, "return statement".to_string());
                if actual.is_valid() && expected.is_valid() && !actual.can_assign_to(expected) {
                    let msg = format!(
                        "return type mismatch: expected {}, got {}",
                        expected, actual
                    );
                    self.error(ErrorKind::Type, msg);
                }
            }
            None => {
                if self.current_ret.map_or(false, |ret| ret != BaseType::Void) {
                    self.error(
                        ErrorKind::Semantic,
                        "non-void function must return a value".to_string(),
                    );
                }
            }
        }
    }

    // --- expressions ---

    fn visit_expr(&mut self, expr: &Expr) -> TypeInfo {
        match expr {
            Expr::IntLit { id, .. } => {
                let info = self.annotations.get_mut(*id);
                info.ty = Some(BaseType::Int);
                info.kind = Some(SymbolKind::Literal);
                info.initialized = true;
                TypeInfo::of(BaseType::Int)
            }
            Expr::Ident { id, line, name } => self.visit_ident(*id, *line, name),
            Expr::Binary {
                id,
                line,
                op,
                lhs,
                rhs,
            } => {
                let lt = self.visit_expr(lhs);
                let rt = self.visit_expr(rhs);
                self.set_context(*line, format!("binary expression '{}'", op.symbol()));
                if !lt.is_valid() || !rt.is_valid() {
                    // An invalid operand already carries its own diagnostic.
                    self.annotations.get_mut(*id).kind = Some(SymbolKind::Expression);
                    return TypeInfo::invalid();
                }
                if !types::binary_operands_ok(*op, lt, rt) {
                    let msg = format!("invalid binary operation: {} {} {}", lt, op.symbol(), rt);
                    self.error_at(*id, ErrorKind::Type, msg);
                    self.annotations.get_mut(*id).kind = Some(SymbolKind::Expression);
                    return TypeInfo::invalid();
                }
                let result = types::binary_result(*op, lt, rt);
                let info = self.annotations.get_mut(*id);
                info.ty = result.base();
                info.kind = Some(SymbolKind::Expression);
                info.initialized = true;
                result
            }
            Expr::Unary {
                id,
                line,
                op,
                operand,
            } => {
                let ot = self.visit_expr(operand);
                self.set_context(*line, format!("unary expression '{}'", op.symbol()));
                if !ot.is_valid() {
                    self.annotations.get_mut(*id).kind = Some(SymbolKind::Expression);
                    return TypeInfo::invalid();
                }
                if !types::unary_operand_ok(*op, ot) {
                    let msg = format!("invalid unary operation: {}{}", op.symbol(), ot);
                    self.error_at(*id, ErrorKind::Type, msg);
                    self.annotations.get_mut(*id).kind = Some(SymbolKind::Expression);
                    return TypeInfo::invalid();
                }
                let info = self.annotations.get_mut(*id);
                info.ty = ot.base();
                info.kind = Some(SymbolKind::Expression);
                info.initialized = true;
                ot
            }
            Expr::Assign {
                id,
                line,
                name,
                value,
            } => self.visit_assign(*id, *line, name, value),
            Expr::Call {
                id,
                line,
                callee,
                args,
            } => self.visit_call(*id, *line, callee, args),
        }
    }

    fn visit_ident(&mut self, id: NodeId, line: u32, name: &str) -> TypeInfo {
        self.set_context(line, format!("identifier '{}'", name));
        let found = self
            .table
            .lookup(name)
            .map(|sym| (sym.ty, sym.kind, sym.initialized, sym.scope_level));
        let Some((ty, kind, initialized, scope_level)) = found else {
            let msg = format!("undeclared identifier '{}'", name);
            self.error_at(id, ErrorKind::Undeclared, msg);
            return TypeInfo::invalid();
        };
        if kind == SymbolKind::Variable && !initialized {
            self.warn(format!("use of uninitialized variable '{}'", name));
        }
        let info = self.annotations.get_mut(id);
        info.ty = Some(ty);
        info.kind = Some(kind);
        info.initialized = initialized;
        info.scope_level = scope_level;
        TypeInfo::of(ty)
    }

    fn visit_assign(&mut self, id: NodeId, line: u32, name: &str, value: &Expr) -> TypeInfo {
        self.set_context(line, "assignment expression".to_string());
        let found = self.table.lookup(name).map(|sym| (sym.ty, sym.kind));
        let Some((ty, kind)) = found else {
            let msg = format!("undeclared variable '{}'", name);
            self.error_at(id, ErrorKind::Undeclared, msg);
            return TypeInfo::invalid();
        };
        if kind != SymbolKind::Variable && kind != SymbolKind::Parameter {
            let msg = format!("cannot assign to non-variable '{}'", name);
            self.error_at(id, ErrorKind::Assignment, msg);
            return TypeInfo::invalid();
        }

        let value_ty = self.visit_expr(value);
        self.set_context(line, "assignment expression".to_string());
        let target = TypeInfo::of(ty);
        if !value_ty.is_valid() {
            return TypeInfo::invalid();
        }
        if !value_ty.can_assign_to(target) {
            let msg = format!("type mismatch: cannot assign {} to {}", value_ty, target);
            self.error_at(id, ErrorKind::Type, msg);
            return TypeInfo::invalid();
        }

        if let Some(sym) = self.table.lookup_mut(name) {
            sym.initialized = true;
        }
        let info = self.annotations.get_mut(id);
        info.ty = Some(ty);
        info.kind = Some(SymbolKind::Expression);
        info.initialized = true;
        target
    }

    fn visit_call(&mut self, id: NodeId, line: u32, callee: &str, args: &[Expr]) -> TypeInfo {
        self.set_context(line, format!("function call '{}'", callee));
        let found = self
            .table
            .lookup(callee)
            .map(|sym| (sym.ty, sym.kind, sym.params.clone()));
        let Some((ret, kind, params)) = found else {
            let msg = format!("undeclared function '{}'", callee);
            self.error_at(id, ErrorKind::Undeclared, msg);
            return TypeInfo::invalid();
        };
        if kind != SymbolKind::Function {
            let msg = format!("'{}' is not a function", callee);
            self.error_at(id, ErrorKind::Assignment, msg);
            return TypeInfo::invalid();
        }

        let arg_types: Vec<TypeInfo> = args.iter().map(|a| self.visit_expr(a)).collect();
        self.set_context(line, format!("function call '{}'", callee));

        if let Some(params) = params {
            if params.len() != arg_types.len() {
                let msg = format!(
                    "function '{}' expects {} argument(s), got {}",
                    callee,
                    params.len(),
                    arg_types.len()
                );
                self.error_at(id, ErrorKind::Type, msg);
            }
            for (i, (param, arg)) in params.iter().zip(arg_types.iter()).enumerate() {
                if arg.is_valid() && !arg.can_assign_to(TypeInfo::of(*param)) {
                    let msg = format!(
                        "argument {} to '{}': cannot pass {} as {}",
                        i + 1,
                        callee,
                        arg,
                        param
                    );
                    self.error(ErrorKind::Type, msg);
                }
            }
        }

        let info = self.annotations.get_mut(id);
        info.ty = Some(ret);
        info.kind = Some(SymbolKind::Expression);
        info.initialized = true;
        TypeInfo::of(ret)
    }
}

/// Run semantic analysis over a parsed program.
pub fn analyze(program: &Program) -> Analysis {
    SemanticAnalyzer::new(program).analyze(program)
}

//! Human-readable tree rendering for the inspection modes: the plain AST
//! (`--ast`) and the AST annotated with semantic information (`--semantic`).

use crate::front::ast::{Annotations, Expr, FunctionDef, Item, Program, SemanticInfo, Stmt};

/// Render the plain tree.
pub fn render_ast(program: &Program) -> String {
    let mut p = Printer {
        out: String::new(),
        annotations: None,
    };
    p.program(program);
    p.out
}

/// Render the tree with each node's semantic annotation underneath it.
pub fn render_annotated(program: &Program, annotations: &Annotations) -> String {
    let mut p = Printer {
        out: String::new(),
        annotations: Some(annotations),
    };
    p.program(program);
    p.out
}

struct Printer<'a> {
    out: String,
    annotations: Option<&'a Annotations>,
}

impl<'a> Printer<'a> {
    fn line(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn info(&mut self, indent: usize, info: &SemanticInfo) {
        if info.is_empty() {
            return;
        }
        let mut text = String::from("[semantic:");
        if info.ty.is_some() {
            text.push_str(&format!(" type={}", info.type_name()));
        }
        if let Some(kind) = info.kind {
            text.push_str(&format!(" kind={}", kind.as_str()));
        }
        if info.scope_level > 0 {
            text.push_str(&format!(" scope={}", info.scope_level));
        }
        if info.initialized {
            text.push_str(" initialized");
        }
        if let Some(err) = &info.error {
            text.push_str(&format!(" error: {}", err));
        }
        text.push(']');
        self.line(indent, &text);
    }

    fn annotate(&mut self, indent: usize, id: crate::front::ast::NodeId) {
        if let Some(ann) = self.annotations {
            self.info(indent, ann.get(id));
        }
    }

    fn program(&mut self, program: &Program) {
        self.line(0, "Program:");
        self.annotate(0, program.id);
        for item in &program.items {
            match item {
                Item::Function(func) => self.function(func, 1),
                Item::Global(decl) => self.stmt(decl, 1),
            }
        }
    }

    fn function(&mut self, func: &FunctionDef, indent: usize) {
        let params = func
            .params
            .iter()
            .map(|p| format!("{} {}", p.ty, p.name))
            .collect::<Vec<_>>()
            .join(", ");
        self.line(
            indent,
            &format!("FunctionDefinition: {} {}({})", func.ret, func.name, params),
        );
        self.annotate(indent, func.id);
        self.stmt(&func.body, indent + 1);
    }

    fn stmt(&mut self, stmt: &Stmt, indent: usize) {
        match stmt {
            Stmt::Expr { id, expr, .. } => {
                self.line(indent, "ExpressionStatement:");
                self.annotate(indent, *id);
                self.expr(expr, indent + 1);
            }
            Stmt::VarDecl {
                id,
                ty,
                names,
                inits,
                ..
            } => {
                let mut header = format!("VariableDeclaration: {}", ty);
                for name in names {
                    header.push(' ');
                    header.push_str(name);
                }
                for (name, _) in inits {
                    header.push(' ');
                    header.push_str(name);
                    header.push_str(" (with initializer)");
                }
                self.line(indent, &header);
                self.annotate(indent, *id);
                for (_, init) in inits {
                    self.expr(init, indent + 1);
                }
            }
            Stmt::Compound { id, stmts, .. } => {
                self.line(indent, "CompoundStatement:");
                self.annotate(indent, *id);
                for s in stmts {
                    self.stmt(s, indent + 1);
                }
            }
            Stmt::If {
                id,
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                self.line(indent, "IfStatement:");
                self.annotate(indent, *id);
                self.line(indent, "Condition:");
                self.expr(cond, indent + 1);
                self.line(indent, "Then:");
                self.stmt(then_branch, indent + 1);
                if let Some(els) = else_branch {
                    self.line(indent, "Else:");
                    self.stmt(els, indent + 1);
                }
            }
            Stmt::While { id, cond, body, .. } => {
                self.line(indent, "WhileStatement:");
                self.annotate(indent, *id);
                self.line(indent, "Condition:");
                self.expr(cond, indent + 1);
                self.line(indent, "Body:");
                self.stmt(body, indent + 1);
            }
            Stmt::For {
                id,
                init,
                cond,
                update,
                body,
                ..
            } => {
                self.line(indent, "ForStatement:");
                self.annotate(indent, *id);
                if let Some(init) = init {
                    self.line(indent, "Init:");
                    self.stmt(init, indent + 1);
                }
                if let Some(cond) = cond {
                    self.line(indent, "Condition:");
                    self.expr(cond, indent + 1);
                }
                if let Some(update) = update {
                    self.line(indent, "Update:");
                    self.expr(update, indent + 1);
                }
                self.line(indent, "Body:");
                self.stmt(body, indent + 1);
            }
            Stmt::Return { id, value, .. } => {
                self.line(indent, "ReturnStatement:");
                self.annotate(indent, *id);
                if let Some(value) = value {
                    self.expr(value, indent + 1);
                }
            }
        }
    }

    fn expr(&mut self, expr: &Expr, indent: usize) {
        match expr {
            Expr::IntLit { id, value, .. } => {
                self.line(indent, &format!("IntegerLiteral: {}", value));
                self.annotate(indent, *id);
            }
            Expr::Ident { id, name, .. } => {
                self.line(indent, &format!("Identifier: {}", name));
                self.annotate(indent, *id);
            }
            Expr::Binary {
                id, op, lhs, rhs, ..
            } => {
                self.line(indent, &format!("BinaryExpression: {}", op.symbol()));
                self.annotate(indent, *id);
                self.line(indent, "Left:");
                self.expr(lhs, indent + 1);
                self.line(indent, "Right:");
                self.expr(rhs, indent + 1);
            }
            Expr::Unary {
                id, op, operand, ..
            } => {
                self.line(indent, &format!("UnaryExpression: {}", op.symbol()));
                self.annotate(indent, *id);
                self.expr(operand, indent + 1);
            }
            Expr::Assign {
                id, name, value, ..
            } => {
                self.line(indent, &format!("AssignmentExpression: {} =", name));
                self.annotate(indent, *id);
                self.expr(value, indent + 1);
            }
            Expr::Call {
                id, callee, args, ..
            } => {
                self.line(indent, &format!("FunctionCall: {}", callee));
                self.annotate(indent, *id);
                if !args.is_empty() {
                    self.line(indent, "Arguments:");
                    for arg in args {
                        self.expr(arg, indent + 1);
                    }
                }
            }
        }
    }
}

//! Code generation: lower the analyzed AST into AT&T x86-64 assembly text.
//!
//! All values are 64 bits wide and every operation uses the 64-bit forms.
//! Expressions evaluate into `%rax`; binary operators spill their right
//! operand to a fresh frame slot rather than relying on a register stack, so
//! nested operations and calls cannot clobber each other. Locals and spill
//! slots grow downward from `%rbp` in 8-byte steps; parameters sit at
//! positive offsets starting at +16 (pushed arguments with the return
//! address and saved base pointer in between).

use std::collections::HashMap;

use crate::front::ast::{BaseType, BinOp, Expr, FunctionDef, Item, Program, Stmt, UnOp};

/// Generated assembly plus any codegen-time diagnostics ("undefined
/// variable" is the only kind; the offending instruction is skipped).
pub struct Assembly {
    pub text: String,
    pub diagnostics: Vec<String>,
}

/// Lower a whole program. Assumes semantic analysis has already accepted it.
pub fn generate(program: &Program) -> Assembly {
    let mut cg = CodeGenerator::new();
    cg.gen_program(program);
    cg.finish()
}

struct CodeGenerator {
    lines: Vec<String>,
    /// name -> signed byte offset from %rbp (negative = local, positive =
    /// parameter) for the function currently being emitted.
    frame: HashMap<String, i64>,
    /// Next free downward offset for locals and spill slots, in bytes.
    stack_offset: i64,
    /// Shared across the whole program so label suffixes are globally unique.
    label_counter: usize,
    current_function: String,
    diagnostics: Vec<String>,
}

impl CodeGenerator {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            frame: HashMap::new(),
            stack_offset: 0,
            label_counter: 0,
            current_function: String::new(),
            diagnostics: Vec::new(),
        }
    }

    fn finish(self) -> Assembly {
        let mut text = self.lines.join("\n");
        text.push('\n');
        Assembly {
            text,
            diagnostics: self.diagnostics,
        }
    }

    fn emit(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn label(&mut self, prefix: &str) -> String {
        let label = format!("{}{}", prefix, self.label_counter);
        self.label_counter += 1;
        label
    }

    fn allocate_variable(&mut self, name: &str) -> i64 {
        self.stack_offset += 8;
        let offset = -self.stack_offset;
        self.frame.insert(name.to_string(), offset);
        offset
    }

    fn spill_slot(&mut self) -> i64 {
        self.stack_offset += 8;
        -self.stack_offset
    }

    fn address_of(&mut self, name: &str) -> Option<String> {
        match self.frame.get(name) {
            Some(offset) => Some(format!("{}(%rbp)", offset)),
            None => {
                self.diagnostics
                    .push(format!("undefined variable '{}' in function '{}'", name, self.current_function));
                None
            }
        }
    }

    // --- program and functions ---

    fn gen_program(&mut self, program: &Program) {
        self.emit("# Generated by minicc");
        self.emit("");
        for item in &program.items {
            match item {
                Item::Function(func) => self.gen_func(func),
                Item::Global(decl) => self.gen_global(decl),
            }
        }
    }

    /// Globals have no data section in this backend; they are recorded as a
    /// comment so the output still reflects every top-level declaration.
    fn gen_global(&mut self, decl: &Stmt) {
        if let Stmt::VarDecl { ty, names, inits, .. } = decl {
            for name in names {
                self.emit(format!("# global: {} {}", ty, name));
            }
            for (name, _) in inits {
                self.emit(format!("# global: {} {} (initializer ignored)", ty, name));
            }
            self.emit("");
        }
    }

    fn gen_func(&mut self, func: &FunctionDef) {
        self.frame.clear();
        self.stack_offset = 0;
        self.current_function = func.name.clone();

        let mut offset = 16;
        for param in &func.params {
            self.frame.insert(param.name.clone(), offset);
            offset += 8;
        }

        // Emit the body into a scratch buffer first; the final stack_offset
        // then becomes a single frame reservation in the prologue.
        let outer = std::mem::take(&mut self.lines);
        self.gen_stmt(&func.body);
        let body = std::mem::replace(&mut self.lines, outer);

        self.emit(".text");
        self.emit(format!(".globl {}", func.name));
        self.emit(format!("{}:", func.name));
        self.emit("    pushq %rbp");
        self.emit("    movq %rsp, %rbp");
        if self.stack_offset > 0 {
            self.emit(format!("    subq ${}, %rsp", self.stack_offset));
        }
        self.lines.extend(body);

        let end = self.label("func_end_");
        self.emit(format!("{}:", end));
        if func.ret != BaseType::Void {
            // Default return value when control falls off the end.
            self.emit("    movq $0, %rax");
        }
        self.emit("    leave");
        self.emit("    ret");
        self.emit("");
    }

    // --- statements ---

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr { expr, .. } => {
                self.gen_expr(expr);
            }
            Stmt::VarDecl { ty, names, inits, .. } => {
                for name in names {
                    let offset = self.allocate_variable(name);
                    self.emit(format!("    # {} {} at {}(%rbp)", ty, name, offset));
                }
                for (name, init) in inits {
                    let offset = self.allocate_variable(name);
                    self.emit(format!("    # {} {} at {}(%rbp)", ty, name, offset));
                    self.gen_expr(init);
                    self.emit(format!("    movq %rax, {}(%rbp)", offset));
                }
            }
            Stmt::Compound { stmts, .. } => {
                // Inner-scope names must not stay addressable past their
                // block, and sibling scopes must not clobber one another, so
                // the frame map is snapshotted around the block. stack_offset
                // stays monotone: slots are not reused.
                let snapshot = self.frame.clone();
                for s in stmts {
                    self.gen_stmt(s);
                }
                self.frame = snapshot;
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                let false_label = self.label("if_false_");
                let end_label = self.label("if_end_");
                self.gen_expr(cond);
                self.emit("    testq %rax, %rax");
                self.emit(format!("    je {}", false_label));
                self.gen_stmt(then_branch);
                self.emit(format!("    jmp {}", end_label));
                self.emit(format!("{}:", false_label));
                if let Some(els) = else_branch {
                    self.gen_stmt(els);
                }
                self.emit(format!("{}:", end_label));
            }
            Stmt::While { cond, body, .. } => {
                let loop_label = self.label("while_loop_");
                let end_label = self.label("while_end_");
                self.emit(format!("{}:", loop_label));
                self.gen_expr(cond);
                self.emit("    testq %rax, %rax");
                self.emit(format!("    je {}", end_label));
                self.gen_stmt(body);
                self.emit(format!("    jmp {}", loop_label));
                self.emit(format!("{}:", end_label));
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
                ..
            } => {
                let loop_label = self.label("for_loop_");
                let update_label = self.label("for_update_");
                let end_label = self.label("for_end_");
                if let Some(init) = init {
                    self.gen_stmt(init);
                }
                self.emit(format!("{}:", loop_label));
                if let Some(cond) = cond {
                    self.gen_expr(cond);
                    self.emit("    testq %rax, %rax");
                    self.emit(format!("    je {}", end_label));
                }
                self.gen_stmt(body);
                self.emit(format!("{}:", update_label));
                if let Some(update) = update {
                    self.gen_expr(update);
                }
                self.emit(format!("    jmp {}", loop_label));
                self.emit(format!("{}:", end_label));
            }
            Stmt::Return { value, .. } => {
                match value {
                    Some(expr) => self.gen_expr(expr),
                    None => self.emit("    movq $0, %rax"),
                }
                self.emit("    leave");
                self.emit("    ret");
            }
        }
    }

    // --- expressions ---

    fn gen_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::IntLit { value, .. } => {
                self.emit(format!("    movq ${}, %rax", value));
            }
            Expr::Ident { name, .. } => {
                if let Some(addr) = self.address_of(name) {
                    self.emit(format!("    movq {}, %rax", addr));
                }
            }
            Expr::Binary { op, lhs, rhs, .. } => self.gen_binary(*op, lhs, rhs),
            Expr::Unary { op, operand, .. } => {
                self.gen_expr(operand);
                match op {
                    UnOp::Neg => self.emit("    negq %rax"),
                    UnOp::Plus => {}
                    UnOp::Not => {
                        self.emit("    testq %rax, %rax");
                        self.emit("    sete %al");
                        self.emit("    movzbq %al, %rax");
                    }
                }
            }
            Expr::Assign { name, value, .. } => {
                self.gen_expr(value);
                if let Some(addr) = self.address_of(name) {
                    self.emit(format!("    movq %rax, {}", addr));
                }
            }
            Expr::Call { callee, args, .. } => self.gen_call(callee, args),
        }
    }

    /// Evaluate the right operand first and park it in a fresh spill slot,
    /// then evaluate the left into %rax and reload the right into %rbx.
    fn gen_binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr) {
        self.gen_expr(rhs);
        let spill = self.spill_slot();
        self.emit(format!("    movq %rax, {}(%rbp)", spill));
        self.gen_expr(lhs);
        self.emit(format!("    movq {}(%rbp), %rbx", spill));

        match op {
            BinOp::Add => self.emit("    addq %rbx, %rax"),
            BinOp::Sub => self.emit("    subq %rbx, %rax"),
            BinOp::Mul => self.emit("    imulq %rbx, %rax"),
            BinOp::Div => {
                self.emit("    cqto");
                self.emit("    idivq %rbx");
            }
            BinOp::Mod => {
                self.emit("    cqto");
                self.emit("    idivq %rbx");
                self.emit("    movq %rdx, %rax");
            }
            BinOp::Eq => self.compare("sete"),
            BinOp::Ne => self.compare("setne"),
            BinOp::Lt => self.compare("setl"),
            BinOp::Gt => self.compare("setg"),
            BinOp::Le => self.compare("setle"),
            BinOp::Ge => self.compare("setge"),
            BinOp::LogAnd => {
                // Normalize both operands to 0/1 before the bitwise and.
                self.emit("    testq %rax, %rax");
                self.emit("    setne %al");
                self.emit("    testq %rbx, %rbx");
                self.emit("    setne %bl");
                self.emit("    andb %bl, %al");
                self.emit("    movzbq %al, %rax");
            }
            BinOp::LogOr => {
                self.emit("    orq %rbx, %rax");
                self.emit("    testq %rax, %rax");
                self.emit("    setne %al");
                self.emit("    movzbq %al, %rax");
            }
        }
    }

    fn compare(&mut self, set: &str) {
        self.emit("    cmpq %rbx, %rax");
        self.emit(format!("    {} %al", set));
        self.emit("    movzbq %al, %rax");
    }

    /// Arguments are pushed right to left; the callee finds the first one at
    /// +16(%rbp). `printf` has no real lowering and produces a comment only.
    fn gen_call(&mut self, callee: &str, args: &[Expr]) {
        if callee == "printf" {
            self.emit("    # printf call (not lowered)");
            return;
        }
        for arg in args.iter().rev() {
            self.gen_expr(arg);
            self.emit("    pushq %rax");
        }
        self.emit(format!("    call {}", callee));
        if !args.is_empty() {
            self.emit(format!("    addq ${}, %rsp", args.len() * 8));
        }
    }
}

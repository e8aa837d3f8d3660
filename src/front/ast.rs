//! AST for the language: tagged expression and statement variants, function
//! definitions, and the program root. Every node carries a dense [`NodeId`]
//! assigned at parse time and its source line; semantic results live in a
//! side table ([`Annotations`]) indexed by that id, so the tree itself stays
//! immutable after parsing.

/// Dense node index assigned by the parser, used to key the annotation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// The closed set of type names the language accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Int,
    Char,
    Float,
    Double,
    Void,
}

impl BaseType {
    pub fn name(self) -> &'static str {
        match self {
            BaseType::Int => "int",
            BaseType::Char => "char",
            BaseType::Float => "float",
            BaseType::Double => "double",
            BaseType::Void => "void",
        }
    }
}

impl std::fmt::Display for BaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    LogAnd,
    LogOr,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        use BinOp::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Eq => "==",
            Ne => "!=",
            Lt => "<",
            Gt => ">",
            Le => "<=",
            Ge => ">=",
            LogAnd => "&&",
            LogOr => "||",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod)
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::LogAnd | BinOp::LogOr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Plus,
    Not,
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Plus => "+",
            UnOp::Not => "!",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    IntLit {
        id: NodeId,
        line: u32,
        value: i64,
    },
    Ident {
        id: NodeId,
        line: u32,
        name: String,
    },
    Binary {
        id: NodeId,
        line: u32,
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        id: NodeId,
        line: u32,
        op: UnOp,
        operand: Box<Expr>,
    },
    // The assignment target is structurally restricted to an identifier.
    Assign {
        id: NodeId,
        line: u32,
        name: String,
        value: Box<Expr>,
    },
    Call {
        id: NodeId,
        line: u32,
        callee: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::IntLit { id, .. }
            | Expr::Ident { id, .. }
            | Expr::Binary { id, .. }
            | Expr::Unary { id, .. }
            | Expr::Assign { id, .. }
            | Expr::Call { id, .. } => *id,
        }
    }

    pub fn line(&self) -> u32 {
        match self {
            Expr::IntLit { line, .. }
            | Expr::Ident { line, .. }
            | Expr::Binary { line, .. }
            | Expr::Unary { line, .. }
            | Expr::Assign { line, .. }
            | Expr::Call { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expr {
        id: NodeId,
        line: u32,
        expr: Expr,
    },
    /// One declared type with plain declarators and initialized declarators,
    /// kept as two parallel lists.
    VarDecl {
        id: NodeId,
        line: u32,
        ty: BaseType,
        names: Vec<String>,
        inits: Vec<(String, Expr)>,
    },
    Compound {
        id: NodeId,
        line: u32,
        stmts: Vec<Stmt>,
    },
    If {
        id: NodeId,
        line: u32,
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        id: NodeId,
        line: u32,
        cond: Expr,
        body: Box<Stmt>,
    },
    For {
        id: NodeId,
        line: u32,
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    Return {
        id: NodeId,
        line: u32,
        value: Option<Expr>,
    },
}

impl Stmt {
    pub fn id(&self) -> NodeId {
        match self {
            Stmt::Expr { id, .. }
            | Stmt::VarDecl { id, .. }
            | Stmt::Compound { id, .. }
            | Stmt::If { id, .. }
            | Stmt::While { id, .. }
            | Stmt::For { id, .. }
            | Stmt::Return { id, .. } => *id,
        }
    }

    pub fn line(&self) -> u32 {
        match self {
            Stmt::Expr { line, .. }
            | Stmt::VarDecl { line, .. }
            | Stmt::Compound { line, .. }
            | Stmt::If { line, .. }
            | Stmt::While { line, .. }
            | Stmt::For { line, .. }
            | Stmt::Return { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub ty: BaseType,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub id: NodeId,
    pub line: u32,
    pub ret: BaseType,
    pub name: String,
    pub params: Vec<Param>,
    /// Always a `Stmt::Compound`.
    pub body: Stmt,
}

#[derive(Debug, Clone)]
pub enum Item {
    Function(FunctionDef),
    /// A file-scope `Stmt::VarDecl`.
    Global(Stmt),
}

#[derive(Debug, Clone)]
pub struct Program {
    pub id: NodeId,
    pub items: Vec<Item>,
    /// Total number of `NodeId`s handed out while parsing; sizes the
    /// annotation table.
    pub node_count: u32,
}

/// Symbol classification shared by the annotation table and the symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Parameter,
    Literal,
    Expression,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Function => "function",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Literal => "literal",
            SymbolKind::Expression => "expression",
        }
    }
}

/// Per-node result of semantic analysis. Default-constructed empty; the
/// analyzer fills slots in as it visits.
#[derive(Debug, Clone, Default)]
pub struct SemanticInfo {
    pub ty: Option<BaseType>,
    pub initialized: bool,
    pub scope_level: usize,
    pub kind: Option<SymbolKind>,
    pub error: Option<String>,
}

impl SemanticInfo {
    pub fn is_empty(&self) -> bool {
        self.ty.is_none() && !self.initialized && self.kind.is_none() && self.error.is_none()
    }

    /// Type name as rendered by the annotated printer; empty when unresolved.
    pub fn type_name(&self) -> &'static str {
        self.ty.map(BaseType::name).unwrap_or("")
    }
}

/// Side table mapping `NodeId` to its `SemanticInfo`.
#[derive(Debug, Clone)]
pub struct Annotations {
    slots: Vec<SemanticInfo>,
}

impl Annotations {
    pub fn new(node_count: u32) -> Self {
        Self {
            slots: vec![SemanticInfo::default(); node_count as usize],
        }
    }

    pub fn get(&self, id: NodeId) -> &SemanticInfo {
        &self.slots[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut SemanticInfo {
        &mut self.slots[id.0 as usize]
    }
}

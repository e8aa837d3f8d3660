//! Lexer and parser behavior: token kinds and line numbers, error tokens,
//! grammar acceptance, and AST shape.

use minicc::front::ast::{BaseType, BinOp, Expr, Item, Stmt};
use minicc::front::token::TokenKind as K;
use minicc::front::{lexer, parser};

fn kinds(source: &str) -> Vec<K> {
    lexer::tokenize(source).into_iter().map(|t| t.kind).collect()
}

fn parse(source: &str) -> minicc::front::ast::Program {
    parser::parse(lexer::lex(source).expect("lexes")).expect("parses")
}

#[test]
fn tokenizes_a_declaration() {
    assert_eq!(
        kinds("int x = 1;"),
        vec![K::Int, K::Identifier, K::Assign, K::IntegerLiteral, K::Semicolon, K::Eof]
    );
}

#[test]
fn tokenizes_multi_char_operators_greedily() {
    assert_eq!(
        kinds("a <= b && c == d || e != f >= g"),
        vec![
            K::Identifier,
            K::LessEq,
            K::Identifier,
            K::AndAnd,
            K::Identifier,
            K::EqEq,
            K::Identifier,
            K::OrOr,
            K::Identifier,
            K::NotEq,
            K::Identifier,
            K::GreaterEq,
            K::Identifier,
            K::Eof,
        ]
    );
}

#[test]
fn keywords_are_not_identifiers() {
    assert_eq!(kinds("return returned"), vec![K::Return, K::Identifier, K::Eof]);
}

#[test]
fn tracks_lines_across_comments() {
    let source = "int a;\n/* multi\nline */\nint b; // trailing\nint c;";
    let tokens = lexer::tokenize(source);
    let lines: Vec<(K, u32)> = tokens.iter().map(|t| (t.kind, t.line)).collect();
    assert_eq!(
        lines,
        vec![
            (K::Int, 1),
            (K::Identifier, 1),
            (K::Semicolon, 1),
            (K::Int, 4),
            (K::Identifier, 4),
            (K::Semicolon, 4),
            (K::Int, 5),
            (K::Identifier, 5),
            (K::Semicolon, 5),
            (K::Eof, 5),
        ]
    );
}

#[test]
fn unknown_character_becomes_error_token_and_stops_scanning() {
    let tokens = lexer::tokenize("int @ x;");
    assert_eq!(tokens[0].kind, K::Int);
    assert_eq!(tokens[1].kind, K::Error);
    assert_eq!(tokens[1].lexeme, "@");
    // Scanning stopped: only the Eof sentinel follows.
    assert_eq!(tokens[2].kind, K::Eof);

    let err = lexer::lex("int @ x;").unwrap_err();
    assert_eq!(err.line, 1);
    assert_eq!(err.lexeme, "@");
}

#[test]
fn lone_ampersand_is_a_lex_error() {
    assert!(lexer::lex("a & b").is_err());
    assert!(lexer::lex("a && b").is_ok());
}

#[test]
fn parses_minimal_program() {
    let program = parse("int main() { return 0; }");
    assert_eq!(program.items.len(), 1);
    let Item::Function(func) = &program.items[0] else {
        panic!("expected a function");
    };
    assert_eq!(func.name, "main");
    assert_eq!(func.ret, BaseType::Int);
    assert!(func.params.is_empty());
    let Stmt::Compound { stmts, .. } = &func.body else {
        panic!("body must be a block");
    };
    assert_eq!(stmts.len(), 1);
    assert!(matches!(stmts[0], Stmt::Return { value: Some(_), .. }));
}

#[test]
fn void_parameter_list_is_empty() {
    let program = parse("int main(void) { return 0; }");
    let Item::Function(func) = &program.items[0] else {
        panic!("expected a function");
    };
    assert!(func.params.is_empty());
}

#[test]
fn parses_parameters_in_order() {
    let program = parse("int f(int a, double b) { return 0; }");
    let Item::Function(func) = &program.items[0] else {
        panic!("expected a function");
    };
    let sig: Vec<(BaseType, &str)> = func.params.iter().map(|p| (p.ty, p.name.as_str())).collect();
    assert_eq!(sig, vec![(BaseType::Int, "a"), (BaseType::Double, "b")]);
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let program = parse("int main() { return 1 + 2 * 3; }");
    let Item::Function(func) = &program.items[0] else {
        panic!("expected a function");
    };
    let Stmt::Compound { stmts, .. } = &func.body else {
        panic!("body must be a block");
    };
    let Stmt::Return { value: Some(expr), .. } = &stmts[0] else {
        panic!("expected return with a value");
    };
    let Expr::Binary { op: BinOp::Add, rhs, .. } = expr else {
        panic!("expected addition at the root, got {:?}", expr);
    };
    assert!(matches!(**rhs, Expr::Binary { op: BinOp::Mul, .. }));
}

#[test]
fn assignment_is_right_associative() {
    let program = parse("int main() { int a; int b; a = b = 1; return a; }");
    let Item::Function(func) = &program.items[0] else {
        panic!("expected a function");
    };
    let Stmt::Compound { stmts, .. } = &func.body else {
        panic!("body must be a block");
    };
    let Stmt::Expr { expr, .. } = &stmts[2] else {
        panic!("expected an expression statement");
    };
    let Expr::Assign { name, value, .. } = expr else {
        panic!("expected assignment");
    };
    assert_eq!(name, "a");
    assert!(matches!(**value, Expr::Assign { .. }));
}

#[test]
fn declaration_keeps_plain_and_initialized_declarators_apart() {
    let program = parse("int main() { int x, y = 5, z; return 0; }");
    let Item::Function(func) = &program.items[0] else {
        panic!("expected a function");
    };
    let Stmt::Compound { stmts, .. } = &func.body else {
        panic!("body must be a block");
    };
    let Stmt::VarDecl { names, inits, .. } = &stmts[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(names, &vec!["x".to_string(), "z".to_string()]);
    assert_eq!(inits.len(), 1);
    assert_eq!(inits[0].0, "y");
}

#[test]
fn global_declarations_parse_at_top_level() {
    let program = parse("int g; int main() { return 0; }");
    assert_eq!(program.items.len(), 2);
    assert!(matches!(program.items[0], Item::Global(Stmt::VarDecl { .. })));
}

#[test]
fn for_header_pieces_are_optional() {
    let program = parse("int main() { for (;;) { } return 0; }");
    let Item::Function(func) = &program.items[0] else {
        panic!("expected a function");
    };
    let Stmt::Compound { stmts, .. } = &func.body else {
        panic!("body must be a block");
    };
    let Stmt::For { init, cond, update, .. } = &stmts[0] else {
        panic!("expected a for loop");
    };
    assert!(init.is_none() && cond.is_none() && update.is_none());
}

#[test]
fn unsupported_keywords_are_parse_errors() {
    let tokens = lexer::lex("int main() { break; }").expect("break lexes fine");
    assert!(parser::parse(tokens).is_err());

    let tokens = lexer::lex("int main() { int x; x++; }").expect("++ lexes fine");
    assert!(parser::parse(tokens).is_err());
}

#[test]
fn integer_literal_overflow_is_a_parse_error() {
    let tokens = lexer::lex("int main() { return 99999999999999999999; }").unwrap();
    let err = parser::parse(tokens).unwrap_err();
    assert!(err.message.contains("out of range"));
}

#[test]
fn missing_semicolon_is_a_parse_error() {
    let tokens = lexer::lex("int main() { return 0 }").unwrap();
    let err = parser::parse(tokens).unwrap_err();
    assert_eq!(err.line, 1);
}

#[test]
fn node_ids_are_dense_and_sized_by_node_count() {
    let program = parse("int main() { int x; x = 1 + 2; return x; }");
    // Every id handed out must be below node_count; the annotation table is
    // sized from it.
    let mut max_seen = 0;
    for item in &program.items {
        if let Item::Function(f) = item {
            max_seen = max_seen.max(f.id.0);
            max_seen = max_seen.max(walk_stmt_max(&f.body));
        }
    }
    assert!(max_seen < program.node_count);
}

fn walk_stmt_max(stmt: &Stmt) -> u32 {
    let mut max = stmt.id().0;
    match stmt {
        Stmt::Expr { expr, .. } => max = max.max(walk_expr_max(expr)),
        Stmt::VarDecl { inits, .. } => {
            for (_, e) in inits {
                max = max.max(walk_expr_max(e));
            }
        }
        Stmt::Compound { stmts, .. } => {
            for s in stmts {
                max = max.max(walk_stmt_max(s));
            }
        }
        Stmt::If { cond, then_branch, else_branch, .. } => {
            max = max.max(walk_expr_max(cond)).max(walk_stmt_max(then_branch));
            if let Some(e) = else_branch {
                max = max.max(walk_stmt_max(e));
            }
        }
        Stmt::While { cond, body, .. } => {
            max = max.max(walk_expr_max(cond)).max(walk_stmt_max(body));
        }
        Stmt::For { init, cond, update, body, .. } => {
            if let Some(i) = init {
                max = max.max(walk_stmt_max(i));
            }
            if let Some(c) = cond {
                max = max.max(walk_expr_max(c));
            }
            if let Some(u) = update {
                max = max.max(walk_expr_max(u));
            }
            max = max.max(walk_stmt_max(body));
        }
        Stmt::Return { value, .. } => {
            if let Some(v) = value {
                max = max.max(walk_expr_max(v));
            }
        }
    }
    max
}

fn walk_expr_max(expr: &Expr) -> u32 {
    let mut max = expr.id().0;
    match expr {
        Expr::Binary { lhs, rhs, .. } => {
            max = max.max(walk_expr_max(lhs)).max(walk_expr_max(rhs));
        }
        Expr::Unary { operand, .. } => max = max.max(walk_expr_max(operand)),
        Expr::Assign { value, .. } => max = max.max(walk_expr_max(value)),
        Expr::Call { args, .. } => {
            for a in args {
                max = max.max(walk_expr_max(a));
            }
        }
        Expr::IntLit { .. } | Expr::Ident { .. } => {}
    }
    max
}

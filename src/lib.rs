//! Crate root: wires together the compilation pipeline.
//!
//! The stages are small and composable:
//! - `front::lexer` scans the source into a token stream (logos DFA).
//! - `front::parser` builds the tagged-variant AST with dense node ids.
//! - `front::semantics` resolves names and types against a scoped symbol
//!   table, filling a side table of per-node annotations.
//! - `back` lowers the analyzed tree into x86-64 AT&T assembly text.
//!
//! The inspection printers for the token stream and the (annotated) tree
//! live in `front::printer` and `front::token`; the binary drives them.

pub mod back;
pub mod front;

use thiserror::Error;

use front::lexer::LexError;
use front::parser::ParseError;
use front::semantics::SemanticError;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("lexical analysis failed: {0}")]
    Lex(#[from] LexError),
    #[error("syntax analysis failed: {0}")]
    Parse(#[from] ParseError),
    #[error("semantic analysis failed with {} error(s)", .0.len())]
    Semantic(Vec<SemanticError>),
}

/// Compile a source string into assembly, running every phase. Semantic
/// errors are returned as a batch; warnings are dropped here (the driver
/// surfaces them through [`front::semantics::analyze`] directly).
pub fn compile(source: &str) -> Result<back::Assembly, CompileError> {
    let tokens = front::lexer::lex(source)?;
    let program = front::parser::parse(tokens)?;
    let analysis = front::semantics::analyze(&program);
    if !analysis.ok() {
        return Err(CompileError::Semantic(analysis.errors));
    }
    Ok(back::generate(&program))
}

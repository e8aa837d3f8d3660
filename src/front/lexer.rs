//! Scanner built on a `logos`-derived DFA. The raw scanner enum below maps
//! 1:1 onto [`TokenKind`]; the wrapper adds 1-based line numbers by counting
//! newlines in the gaps between consecutive token spans, so skipped
//! whitespace and comments still advance the line counter.

use logos::Logos;
use thiserror::Error;

use super::token::{Token, TokenKind};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*[^*]*\*+(?:[^*/][^*]*\*+)*/")]
enum Raw {
    // Keywords
    #[token("int")]
    Int,
    #[token("char")]
    Char,
    #[token("float")]
    Float,
    #[token("double")]
    Double,
    #[token("void")]
    Void,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,

    // Literals and names
    #[regex(r"[0-9]+")]
    IntegerLiteral,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    // Multi-character operators
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LessEq,
    #[token(">=")]
    GreaterEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,

    // Single-character operators and punctuation
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Assign,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("!")]
    Not,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
}

impl Raw {
    fn kind(self) -> TokenKind {
        use TokenKind as K;
        match self {
            Raw::Int => K::Int,
            Raw::Char => K::Char,
            Raw::Float => K::Float,
            Raw::Double => K::Double,
            Raw::Void => K::Void,
            Raw::If => K::If,
            Raw::Else => K::Else,
            Raw::While => K::While,
            Raw::For => K::For,
            Raw::Return => K::Return,
            Raw::Break => K::Break,
            Raw::Continue => K::Continue,
            Raw::IntegerLiteral => K::IntegerLiteral,
            Raw::Identifier => K::Identifier,
            Raw::EqEq => K::EqEq,
            Raw::NotEq => K::NotEq,
            Raw::LessEq => K::LessEq,
            Raw::GreaterEq => K::GreaterEq,
            Raw::AndAnd => K::AndAnd,
            Raw::OrOr => K::OrOr,
            Raw::PlusPlus => K::PlusPlus,
            Raw::MinusMinus => K::MinusMinus,
            Raw::Plus => K::Plus,
            Raw::Minus => K::Minus,
            Raw::Star => K::Star,
            Raw::Slash => K::Slash,
            Raw::Percent => K::Percent,
            Raw::Assign => K::Assign,
            Raw::Less => K::Less,
            Raw::Greater => K::Greater,
            Raw::Not => K::Not,
            Raw::LParen => K::LParen,
            Raw::RParen => K::RParen,
            Raw::LBrace => K::LBrace,
            Raw::RBrace => K::RBrace,
            Raw::LBracket => K::LBracket,
            Raw::RBracket => K::RBracket,
            Raw::Semicolon => K::Semicolon,
            Raw::Comma => K::Comma,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized token '{lexeme}' at line {line}")]
pub struct LexError {
    pub line: u32,
    pub lexeme: String,
}

/// Scan the whole source into a token vector terminated by an `Eof` token.
///
/// Scanning stops at the first unrecognized character, which is recorded as
/// an `Error` token; the token-printing mode renders it as part of the
/// stream. Use [`lex`] when a clean stream is required.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = Raw::lexer(source);
    let mut line: u32 = 1;
    let mut scanned_to = 0usize;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        line += newlines(&source[scanned_to..span.start]);
        scanned_to = span.start;
        let token = Token {
            kind: result.map(Raw::kind).unwrap_or(TokenKind::Error),
            lexeme: lexer.slice().to_string(),
            line,
        };
        let stop = token.kind == TokenKind::Error;
        tokens.push(token);
        if stop {
            break;
        }
    }

    line += newlines(&source[scanned_to..]);
    tokens.push(Token {
        kind: TokenKind::Eof,
        lexeme: String::new(),
        line,
    });
    tokens
}

/// Scan for the compilation pipeline: an error token becomes a hard error.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let tokens = tokenize(source);
    if let Some(bad) = tokens.iter().find(|t| t.kind == TokenKind::Error) {
        return Err(LexError {
            line: bad.line,
            lexeme: bad.lexeme.clone(),
        });
    }
    Ok(tokens)
}

fn newlines(text: &str) -> u32 {
    text.bytes().filter(|&b| b == b'\n').count() as u32
}

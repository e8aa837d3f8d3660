use std::fs;
use std::io::Write;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};

use minicc::front::ast::Program;
use minicc::front::semantics::Analysis;
use minicc::front::token::{RuleStats, Token, TokenKind};
use minicc::front::{lexer, parser, printer, semantics};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Tokens,
    TokensDfa,
    Ast,
    Semantic,
    AllPhases,
    Compile,
}

struct Options {
    input: String,
    output: Option<String>,
    mode: Mode,
}

fn usage(prog: &str) {
    eprintln!("usage: {} [options] <input-file>", prog);
    eprintln!("options:");
    eprintln!("  -o <file>      write assembly to <file> instead of stdout");
    eprintln!("  -h, --help     show this help");
    eprintln!("  -v, --version  show version information");
    eprintln!("  --tokens       lexical analysis only, print the token stream");
    eprintln!("  --tokens-dfa   token stream plus scanner statistics");
    eprintln!("  --ast          syntax analysis only, print the tree");
    eprintln!("  --semantic     semantic analysis, print the annotated tree");
    eprintln!("  --all-phases   print the results of every phase");
}

fn parse_args() -> Result<Option<Options>> {
    let mut args: Vec<String> = std::env::args().collect();
    let prog = if args.is_empty() { "minicc".to_string() } else { args.remove(0) };

    let mut input: Option<String> = None;
    let mut output: Option<String> = None;
    let mut mode: Option<Mode> = None;

    let mut set_mode = |current: &mut Option<Mode>, m: Mode| -> Result<()> {
        if current.is_some() {
            bail!("phase options are mutually exclusive");
        }
        *current = Some(m);
        Ok(())
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                usage(&prog);
                return Ok(None);
            }
            "-v" | "--version" => {
                eprintln!("minicc {}", VERSION);
                eprintln!("compiles a small C-family language to x86-64 assembly");
                return Ok(None);
            }
            "--tokens" => set_mode(&mut mode, Mode::Tokens)?,
            "--tokens-dfa" => set_mode(&mut mode, Mode::TokensDfa)?,
            "--ast" => set_mode(&mut mode, Mode::Ast)?,
            "--semantic" => set_mode(&mut mode, Mode::Semantic)?,
            "--all-phases" => set_mode(&mut mode, Mode::AllPhases)?,
            "-o" => {
                if i + 1 >= args.len() {
                    bail!("-o requires a value");
                }
                output = Some(args[i + 1].clone());
                i += 1;
            }
            s if s.starts_with('-') => {
                usage(&prog);
                bail!("unknown option: {}", s);
            }
            s => {
                if input.is_some() {
                    bail!("only one input file is supported");
                }
                input = Some(s.to_string());
            }
        }
        i += 1;
    }

    let Some(input) = input else {
        usage(&prog);
        bail!("no input file");
    };

    Ok(Some(Options {
        input,
        output,
        mode: mode.unwrap_or(Mode::Compile),
    }))
}

fn print_token_stream(tokens: &[Token]) {
    eprintln!("=== Token stream ===");
    eprintln!("line\ttoken\t\tlexeme");
    let mut valid = 0usize;
    let mut errors = 0usize;
    for tok in tokens {
        match tok.kind {
            TokenKind::Eof => break,
            TokenKind::Error => {
                errors += 1;
                eprintln!("{}\t{}\t{}", tok.line, tok.kind.name(), tok.lexeme);
            }
            _ => {
                valid += 1;
                eprintln!("{}\t{}\t\t{}", tok.line, tok.kind.name(), tok.lexeme);
            }
        }
    }
    eprintln!();
    eprintln!("valid tokens: {}", valid);
    if errors > 0 {
        eprintln!("lexical errors: {}", errors);
        eprintln!("lexical analysis failed");
    } else {
        eprintln!("lexical analysis succeeded");
    }
    eprintln!("====================");
}

fn print_scanner_stats() {
    let stats = RuleStats::collect();
    eprintln!("=== Scanner rules ===");
    eprintln!("total rules: {}", stats.total());
    eprintln!("  keywords:       {}", stats.keyword_rules);
    eprintln!("  operators:      {}", stats.operator_rules);
    eprintln!("  single-char:    {}", stats.single_char_rules);
    eprintln!("  literals/names: {}", stats.literal_rules);
    eprintln!("  comments:       {}", stats.comment_rules);
    eprintln!("  whitespace:     {}", stats.whitespace_rules);
    eprintln!("  error handling: {}", stats.error_rules);
    eprintln!("estimated DFA states: ~{}", stats.estimated_states());
    eprintln!("=====================");
}

fn parse_source(source: &str) -> Result<Program, ExitCode> {
    let tokens = match lexer::lex(source) {
        Ok(tokens) => tokens,
        Err(err) => {
            eprintln!("{}", err);
            return Err(ExitCode::FAILURE);
        }
    };
    match parser::parse(tokens) {
        Ok(program) => Ok(program),
        Err(err) => {
            eprintln!("syntax error: {}", err);
            eprintln!("compilation stopped: the program contains syntax errors");
            Err(ExitCode::FAILURE)
        }
    }
}

fn report_analysis(analysis: &Analysis) {
    if !analysis.errors.is_empty() {
        eprintln!("semantic errors ({}):", analysis.errors.len());
        for err in &analysis.errors {
            eprintln!("{}", err);
        }
    }
    if !analysis.warnings.is_empty() {
        eprintln!("warnings ({}):", analysis.warnings.len());
        for warning in &analysis.warnings {
            eprintln!("warning: {}", warning);
        }
    }
    if analysis.errors.is_empty() && analysis.warnings.is_empty() {
        eprintln!("semantic analysis passed with no errors or warnings");
    }
}

fn run(opts: &Options) -> Result<ExitCode> {
    let source = fs::read_to_string(&opts.input)
        .with_context(|| format!("could not read {}", opts.input))?;

    match opts.mode {
        Mode::Tokens => {
            print_token_stream(&lexer::tokenize(&source));
            Ok(ExitCode::SUCCESS)
        }
        Mode::TokensDfa => {
            print_scanner_stats();
            print_token_stream(&lexer::tokenize(&source));
            Ok(ExitCode::SUCCESS)
        }
        Mode::Ast => {
            let program = match parse_source(&source) {
                Ok(p) => p,
                Err(code) => return Ok(code),
            };
            eprintln!("=== Abstract syntax tree ===");
            eprint!("{}", printer::render_ast(&program));
            eprintln!("============================");
            Ok(ExitCode::SUCCESS)
        }
        Mode::Semantic => {
            let program = match parse_source(&source) {
                Ok(p) => p,
                Err(code) => return Ok(code),
            };
            let analysis = semantics::analyze(&program);
            report_analysis(&analysis);
            eprintln!("=== Annotated syntax tree ===");
            eprint!("{}", printer::render_annotated(&program, &analysis.annotations));
            eprintln!("=============================");
            Ok(if analysis.ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Mode::AllPhases => {
            print_scanner_stats();
            print_token_stream(&lexer::tokenize(&source));
            let program = match parse_source(&source) {
                Ok(p) => p,
                Err(code) => return Ok(code),
            };
            eprintln!("=== Abstract syntax tree ===");
            eprint!("{}", printer::render_ast(&program));
            eprintln!("============================");
            let analysis = semantics::analyze(&program);
            report_analysis(&analysis);
            eprintln!("=== Annotated syntax tree ===");
            eprint!("{}", printer::render_annotated(&program, &analysis.annotations));
            eprintln!("=============================");
            Ok(if analysis.ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Mode::Compile => {
            let program = match parse_source(&source) {
                Ok(p) => p,
                Err(code) => return Ok(code),
            };
            let analysis = semantics::analyze(&program);
            if !analysis.ok() {
                report_analysis(&analysis);
                eprintln!("semantic analysis failed, stopping before code generation");
                eprintln!("run with --semantic for the annotated tree");
                return Ok(ExitCode::FAILURE);
            }
            let assembly = minicc::back::generate(&program);
            for diag in &assembly.diagnostics {
                eprintln!("codegen: {}", diag);
            }
            match &opts.output {
                Some(path) => {
                    fs::write(path, &assembly.text)
                        .with_context(|| format!("could not write {}", path))?;
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(assembly.text.as_bytes())?;
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let opts = match parse_args() {
        Ok(Some(opts)) => opts,
        Ok(None) => return ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("minicc: error: {}", err);
            return ExitCode::FAILURE;
        }
    };
    match run(&opts) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("minicc: error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

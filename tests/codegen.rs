//! Assembly shape: frame layout, evaluation order, labels, and the
//! end-to-end compile pipeline.

use minicc::back;
use minicc::front::{lexer, parser};
use minicc::{compile, CompileError};

fn assemble(source: &str) -> String {
    compile(source).expect("program compiles").text
}

fn generate_unchecked(source: &str) -> back::Assembly {
    let program = parser::parse(lexer::lex(source).expect("lexes")).expect("parses");
    back::generate(&program)
}

fn index_of(text: &str, needle: &str) -> usize {
    text.find(needle)
        .unwrap_or_else(|| panic!("expected {:?} in:\n{}", needle, text))
}

/// Offsets of every `(%rbp)` operand in the text.
fn rbp_offsets(text: &str) -> Vec<i64> {
    let mut offsets = Vec::new();
    for (pos, _) in text.match_indices("(%rbp)") {
        let head = &text[..pos];
        let start = head
            .rfind(|c: char| !(c.is_ascii_digit() || c == '-'))
            .map(|i| i + 1)
            .unwrap_or(0);
        if start < pos {
            offsets.push(head[start..].parse().expect("offset parses"));
        }
    }
    offsets
}

#[test]
fn minimal_program_returns_zero() {
    let text = assemble("int main() { return 0; }");
    assert!(text.contains(".text"));
    assert!(text.contains(".globl main"));
    assert!(text.contains("main:"));
    assert!(text.contains("    pushq %rbp"));
    assert!(text.contains("    movq %rsp, %rbp"));
    assert!(text.contains("    movq $0, %rax"));
    assert!(text.contains("    leave"));
    assert!(text.contains("    ret"));
    // Nothing was allocated, so no frame reservation is emitted.
    assert!(!text.contains("subq"));
}

#[test]
fn empty_body_still_gets_prologue_and_default_return() {
    let text = assemble("int main() { }");
    let prologue = index_of(&text, "    movq %rsp, %rbp");
    let end_label = index_of(&text, "func_end_0:");
    let default_ret = index_of(&text, "    movq $0, %rax");
    assert!(prologue < end_label && end_label < default_ret);
}

#[test]
fn void_function_has_no_default_return_value() {
    let text = assemble("void f() { } int main() { return 0; }");
    let f_end = index_of(&text, "func_end_0:");
    let main_start = index_of(&text, ".globl main");
    // Between f's end label and main there must be no accumulator reset.
    assert!(!text[f_end..main_start].contains("movq $0, %rax"));
}

#[test]
fn local_store_and_load_use_one_slot() {
    let text = assemble("int main() { int x; x = 5; return x; }");
    assert!(text.contains("    subq $8, %rsp"));
    let store = index_of(&text, "    movq %rax, -8(%rbp)");
    let load = index_of(&text, "    movq -8(%rbp), %rax");
    assert!(index_of(&text, "    movq $5, %rax") < store);
    assert!(store < load);
}

#[test]
fn binary_expression_reserves_a_spill_slot() {
    let text = assemble("int main() { int x; return x + 1; }");
    // One local plus one spill slot: 16 bytes reserved up front.
    assert!(text.contains("    subq $16, %rsp"));
    // Right operand is computed first and parked in the spill slot.
    let rhs = index_of(&text, "    movq $1, %rax");
    let spill = index_of(&text, "    movq %rax, -16(%rbp)");
    let lhs = index_of(&text, "    movq -8(%rbp), %rax");
    let reload = index_of(&text, "    movq -16(%rbp), %rbx");
    let add = index_of(&text, "    addq %rbx, %rax");
    assert!(rhs < spill && spill < lhs && lhs < reload && reload < add);
}

#[test]
fn division_sign_extends_and_modulo_takes_the_remainder() {
    let div = assemble("int main() { return 7 / 2; }");
    let cqto = index_of(&div, "    cqto");
    let idiv = index_of(&div, "    idivq %rbx");
    assert!(cqto < idiv);

    let rem = assemble("int main() { return 7 % 2; }");
    let idiv = index_of(&rem, "    idivq %rbx");
    let take_rdx = index_of(&rem, "    movq %rdx, %rax");
    assert!(idiv < take_rdx);
}

#[test]
fn comparison_sets_flags_then_zero_extends() {
    let text = assemble("int main() { return 1 < 2; }");
    let cmp = index_of(&text, "    cmpq %rbx, %rax");
    let set = index_of(&text, "    setl %al");
    let ext = index_of(&text, "    movzbq %al, %rax");
    assert!(cmp < set && set < ext);
}

#[test]
fn logical_and_normalizes_both_operands() {
    let text = assemble("int main() { return 1 && 2; }");
    assert!(text.contains("    setne %bl"));
    assert!(text.contains("    andb %bl, %al"));
}

#[test]
fn unary_not_tests_against_zero() {
    let text = assemble("int main() { return !0; }");
    let test = index_of(&text, "    testq %rax, %rax");
    let set = index_of(&text, "    sete %al");
    assert!(test < set);
}

#[test]
fn if_without_else_emits_an_empty_false_label() {
    let text = assemble("int main() { if (1) { return 1; } return 0; }");
    let lines: Vec<&str> = text.lines().collect();
    let false_at = lines.iter().position(|l| *l == "if_false_0:").expect("false label");
    assert_eq!(lines[false_at + 1], "if_end_1:");
    let cond = index_of(&text, "    testq %rax, %rax");
    let branch = index_of(&text, "    je if_false_0");
    assert!(cond < branch);
}

#[test]
fn while_loop_jumps_back_to_its_head() {
    let text = assemble("int main() { int i; i = 0; while (i < 3) { i = i + 1; } return i; }");
    let head = index_of(&text, "while_loop_0:");
    let exit_branch = index_of(&text, "    je while_end_1");
    let back_edge = index_of(&text, "    jmp while_loop_0");
    let end = index_of(&text, "while_end_1:");
    assert!(head < exit_branch && exit_branch < back_edge && back_edge < end);
}

#[test]
fn bare_for_loop_is_unconditional() {
    let text = assemble("int main() { for (;;) { } return 0; }");
    assert!(text.contains("for_loop_0:"));
    assert!(text.contains("for_update_1:"));
    assert!(text.contains("    jmp for_loop_0"));
    assert!(text.contains("for_end_2:"));
    // No condition, no conditional exit.
    assert!(!text.contains("je for_end_2"));
}

#[test]
fn full_for_loop_checks_condition_and_runs_update() {
    let text =
        assemble("int main() { int s; s = 0; for (int i = 0; i < 3; i = i + 1) { s = s + i; } return s; }");
    let head = index_of(&text, "for_loop_0:");
    let exit = index_of(&text, "    je for_end_2");
    let update = index_of(&text, "for_update_1:");
    let back = index_of(&text, "    jmp for_loop_0");
    assert!(head < exit && exit < update && update < back);
}

#[test]
fn label_suffixes_are_unique_across_functions() {
    let text = assemble(
        "int f(int n) { while (n > 0) { n = n - 1; } return n; }\n\
         int main() { if (1) { return f(2); } return 0; }",
    );
    let mut suffixes = Vec::new();
    for line in text.lines() {
        if let Some(label) = line.strip_suffix(':') {
            if line.starts_with(' ') {
                continue;
            }
            let digits: String = label
                .chars()
                .rev()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if !digits.is_empty() {
                suffixes.push(digits.chars().rev().collect::<String>());
            }
        }
    }
    let mut deduped = suffixes.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(suffixes.len(), deduped.len(), "duplicate label suffix in:\n{}", text);
}

#[test]
fn local_offsets_are_distinct_multiples_of_eight() {
    let text = assemble(
        "int main() { int a; int b; int c; a = 1; b = 2; c = 3; return a + b + c; }",
    );
    for offset in rbp_offsets(&text) {
        assert_eq!(offset % 8, 0, "offset {} not 8-aligned in:\n{}", offset, text);
    }
    assert!(text.contains("movq %rax, -8(%rbp)"));
    assert!(text.contains("movq %rax, -16(%rbp)"));
    assert!(text.contains("movq %rax, -24(%rbp)"));
}

#[test]
fn sibling_scopes_get_distinct_slots() {
    let text = assemble("int main() { { int x; x = 1; } { int x; x = 2; } return 0; }");
    let first = index_of(&text, "    movq %rax, -8(%rbp)");
    let second = index_of(&text, "    movq %rax, -16(%rbp)");
    assert!(first < second);
}

#[test]
fn arguments_push_right_to_left_and_clean_the_stack() {
    let text = assemble("int f(int a, int b) { return a + b; } int main() { return f(1, 2); }");
    // Parameters land at +16 and +24 in declaration order.
    assert!(text.contains("movq 16(%rbp), %rax"));
    assert!(text.contains("24(%rbp)"));
    // Call site: 2 is pushed before 1, then the stack is popped by 16 bytes.
    let push_b = index_of(&text, "    movq $2, %rax");
    let push_a = index_of(&text, "    movq $1, %rax");
    let call = index_of(&text, "    call f");
    let cleanup = index_of(&text, "    addq $16, %rsp");
    assert!(push_b < push_a && push_a < call && call < cleanup);
}

#[test]
fn call_without_arguments_skips_stack_cleanup() {
    let text = assemble("int f() { return 4; } int main() { return f(); }");
    let call = index_of(&text, "    call f");
    assert!(!text[call..].contains("addq $0"));
}

#[test]
fn printf_is_only_a_comment() {
    // `printf` is not a declared symbol, so this goes straight to the
    // generator the way the driver never would.
    let assembly = generate_unchecked("int main() { printf(); return 0; }");
    assert!(assembly.text.contains("# printf call"));
    assert!(!assembly.text.contains("call printf"));
}

#[test]
fn functions_are_emitted_in_source_order_after_a_banner() {
    let text = assemble("int a() { return 1; } int b() { return 2; } int main() { return 0; }");
    assert!(text.starts_with("# Generated by minicc"));
    let a = index_of(&text, ".globl a");
    let b = index_of(&text, ".globl b");
    let main = index_of(&text, ".globl main");
    assert!(a < b && b < main);
}

#[test]
fn instructions_are_indented_and_labels_flush_left() {
    let text = assemble("int main() { if (1) { return 1; } return 0; }");
    for line in text.lines() {
        if line.is_empty() || line.starts_with('#') || line.starts_with('.') {
            continue;
        }
        if line.ends_with(':') {
            assert!(!line.starts_with(' '), "label not flush-left: {:?}", line);
        } else {
            assert!(line.starts_with("    "), "instruction not indented: {:?}", line);
        }
    }
}

#[test]
fn undefined_variable_is_reported_on_the_diagnostic_channel() {
    // Bypasses semantic analysis on purpose: the generator's only runtime
    // diagnostic is an address lookup failure, and the load is skipped.
    let assembly = generate_unchecked("int main() { return y; }");
    assert_eq!(assembly.diagnostics.len(), 1);
    assert!(assembly.diagnostics[0].contains("undefined variable 'y'"));
    assert!(!assembly.text.contains("movq y"));
}

#[test]
fn semantic_errors_refuse_codegen() {
    match compile("int main() { return y; }") {
        Err(CompileError::Semantic(errors)) => assert_eq!(errors.len(), 1),
        other => panic!("expected a semantic failure, got {:?}", other.map(|a| a.text)),
    }
}

#[test]
fn parse_errors_refuse_codegen() {
    assert!(matches!(
        compile("int main() { return 0 }"),
        Err(CompileError::Parse(_))
    ));
}

#[test]
fn lex_errors_refuse_codegen() {
    assert!(matches!(compile("int main() { return $; }"), Err(CompileError::Lex(_))));
}

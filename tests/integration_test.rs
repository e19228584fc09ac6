// Integration tests for the compilation pipeline

use pascc::codegen::BackendProfile;
use pascc::error::CompileError;
use pascc::parser::errors::ErrorKind;
use pascc::parser::symbols::DeclaredType;
use pascc::{compile, Compilation};

fn compile_default(source: &str) -> Compilation {
    compile(source, &BackendProfile::default()).expect("Compilation aborted")
}

fn text(compilation: &Compilation) -> &str {
    compilation
        .output
        .as_ref()
        .expect("Code generation failed")
}

#[test]
fn test_scenario_assignments() {
    let source = r#"
        program P;
        var a, b : integer;
        begin
            a := 1;
            b := a + 2;
        end.
    "#;

    let compilation = compile_default(source);
    assert!(!compilation.has_errors());

    let symbols = &compilation.program.symbols;
    assert_eq!(symbols.len(), 2);
    assert_eq!(symbols.get("a").unwrap().declared_type, DeclaredType::Integer);
    assert_eq!(symbols.get("b").unwrap().declared_type, DeclaredType::Integer);

    let asm = text(&compilation);
    assert!(!asm.contains(".data"));
    assert!(asm.contains("a: .space 4"));
    assert!(asm.contains("b: .space 4"));
    assert!(asm.contains("    movl $1, a\n"));

    let expected_tail = "    movl a, %eax\n\
                         \x20   pushl %eax\n\
                         \x20   pushl $2\n\
                         \x20   popl %ebx\n\
                         \x20   popl %eax\n\
                         \x20   addl %ebx, %eax\n\
                         \x20   pushl %eax\n\
                         \x20   popl %eax\n\
                         \x20   movl %eax, b\n\
                         \x20   ret\n";
    assert!(asm.ends_with(expected_tail), "unexpected output:\n{}", asm);
}

#[test]
fn test_scenario_conditional() {
    let source = r#"
        program P;
        var a, b, c : integer;
        begin
            if a > b then c := 1 else c := 0;
        end.
    "#;

    let compilation = compile_default(source);
    assert!(!compilation.has_errors());
    let asm = text(&compilation);

    assert_eq!(asm.matches("_nope1_:").count(), 1);
    assert_eq!(asm.matches("_end1_:").count(), 1);
    assert!(!asm.contains("_nope2_"));
    assert!(asm.contains("    cmpl %ebx, %eax\n    jle _nope1_\n"));
    assert!(asm.contains("    jmp _end1_\n_nope1_:\n"));
}

#[test]
fn test_missing_terminating_dot() {
    let source = r#"
        program P;
        var a : integer;
        begin
            a := 1;
        end
    "#;

    let compilation = compile_default(source);
    assert!(compilation.has_errors());

    let diagnostics = &compilation.program.diagnostics;
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, ErrorKind::ExpectedDot);
    assert!(!compilation.program.finished);

    let root = compilation.program.root().expect("Tree should be kept");
    assert!(compilation.program.tree[root].right().is_some());
}

#[test]
fn test_duplicate_identifier_keeps_first() {
    let source = "program P; var x : integer; x : boolean; begin x := 3; end.";

    let compilation = compile_default(source);
    let duplicates = compilation
        .program
        .diagnostics
        .iter()
        .filter(|d| d.kind == ErrorKind::DuplicateIdentifier)
        .count();
    assert_eq!(duplicates, 1);
    assert_eq!(
        compilation.program.symbols.get("x").unwrap().declared_type,
        DeclaredType::Integer
    );
    assert!(text(&compilation).contains("x: .space 4"));
}

#[test]
fn test_array_sizing() {
    let source = r#"
        program Arrays;
        var v : array[1..5] of integer;
            w : array[0..9] of boolean;
        begin
            v[1] := 10;
            w[0] := true;
        end.
    "#;

    let compilation = compile_default(source);
    assert!(!compilation.has_errors());
    let asm = text(&compilation);
    assert!(asm.contains("v: .space 20"));
    assert!(asm.contains("w: .space 10"));
    assert!(asm.contains("    subl $1, %ebx\n"));
    assert!(asm.contains("    movl %eax, v(,%ebx,4)\n"));
    assert!(asm.contains("    movb %al, w(,%ebx,1)\n"));
}

#[test]
fn test_initialized_storage() {
    let source = "program P; var n : integer = 42; ok : boolean = false; begin end.";

    let compilation = compile_default(source);
    let asm = text(&compilation);
    assert!(asm.starts_with(".data\nn: .long 42\nok: .byte 0\n.text\n"));
}

#[test]
fn test_missing_header_aborts() {
    let result = compile("var a : integer; begin end.", &BackendProfile::default());
    match result {
        Err(CompileError::Aborted { diagnostics }) => {
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].kind, ErrorKind::ExpectedProgram);
        }
        other => panic!("Expected an abort, got {:?}", other),
    }
}

#[test]
fn test_premature_eof_aborts() {
    let result = compile("program P; begin a := ", &BackendProfile::default());
    let err = result.expect_err("Expected an abort");
    assert_eq!(
        err.diagnostics().last().map(|d| d.kind),
        Some(ErrorKind::PrematureEof)
    );
}

#[test]
fn test_soft_errors_still_lower() {
    let source = "program P; var a : integer; begin a := 1 a := 2; end.";

    let compilation = compile_default(source);
    assert!(compilation.has_errors());
    assert!(compilation.output.is_ok());
}

#[test]
fn test_custom_profile() {
    let profile: BackendProfile = "entry_label = _start\nreturn_opcode = hlt".parse().unwrap();
    let compilation = compile("program P; begin end.", &profile).unwrap();
    let asm = text(&compilation);
    assert_eq!(asm, ".text\n    .globl _start\n_start:\n    hlt\n");
}

#[test]
fn test_loops_parse_but_do_not_lower() {
    let source = r#"
        program Loops;
        var i, s : integer;
        begin
            s := 0;
            for i := 1 to 10 do s := s + i;
        end.
    "#;

    let compilation = compile_default(source);
    assert!(compilation.program.diagnostics.is_empty());
    assert!(compilation.output.is_err());
    assert!(compilation.has_errors());
}

#[test]
fn test_empty_program_aborts() {
    let compilation = compile_default("program P; .");
    assert!(compilation.is_abort());
    assert!(compilation.has_errors());

    let compilation = compile_default("program P; begin end.");
    assert!(!compilation.is_abort());
}

#[test]
fn test_long_array_initializer() {
    let values = vec!["1"; 100_000].join(",");
    let source = format!(
        "program P; var v, w : array[1..100000] of integer = ({values}); begin end."
    );

    let compilation = compile_default(&source);
    assert!(!compilation.has_errors());
    let asm = text(&compilation);
    assert!(asm.contains("v: .space 400000"));
    assert!(asm.contains("w: .space 400000"));
}

#[test]
fn test_long_expression() {
    let terms = vec!["a"; 100_000].join(" + ");
    let source = format!("program P; var a, x : integer; begin x := {terms}; end.");

    let compilation = compile_default(&source);
    assert!(!compilation.has_errors());
    assert!(text(&compilation).ends_with("    movl %eax, x\n    ret\n"));
}

#[test]
fn test_oversized_bounds_and_literals() {
    let source = "program P; var v : array[0..9223372036854775807] of integer; x : integer; \
                  begin x := 99999999999999999999; end.";

    let compilation = compile_default(source);
    let kinds: Vec<ErrorKind> = compilation
        .program
        .diagnostics
        .iter()
        .map(|d| d.kind)
        .collect();
    assert_eq!(kinds, vec![ErrorKind::ExpectedConstant, ErrorKind::ExpectedConstant]);
    assert!(compilation.output.is_err());
    assert!(!compilation.is_abort());
}

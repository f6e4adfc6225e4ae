//! Integration tests for end-to-end compilation.
//!
//! These tests verify that the complete pipeline works correctly from source
//! code through tokenization, parsing, LLVM IR generation and JIT evaluation.

use std::{io::Write, path::PathBuf};

use inkwell::context::Context;
use kaleidoscope::{
    compiler::{compiler::Compiler, target::Runtime},
    driver::driver::{Driver, EmitOptions, Report},
    lexer::lexer::{spawn_lexer, tokenize},
    parser::parser::{parse, spawn_parser},
};

const EXECUTE: EmitOptions = EmitOptions {
    dump_ir: false,
    execute: true,
};

/// Compiles and runs `source`, returning the driver report.
fn run_source(source: &str, optimize: bool) -> Report {
    let tokens = tokenize(source.to_string(), Some("test.k".to_string())).unwrap();
    let (_, nodes) = parse(tokens);

    let context = Context::create();
    let runtime = Runtime::initialize(false).unwrap();
    let mut compiler = Compiler::new(&context, "test", optimize);

    let mut driver = Driver::new(&mut compiler, &runtime, EXECUTE, Vec::new());
    driver.run(nodes.unwrap()).unwrap()
}

/// Values of every top-level expression in `source`.
fn evaluate(source: &str) -> Vec<f64> {
    run_source(source, false).evaluated
}

/// Value of the last top-level expression in `source`.
fn evaluate_last(source: &str) -> f64 {
    *evaluate(source).last().expect("no top-level expression was evaluated")
}

/// `a : b` evaluates both sides and yields `b`.
const SEQUENCE: &str = "def binary : 1 (x y) y;\n";

#[test]
fn test_arithmetic() {
    assert_eq!(evaluate("2 + 3 * 4; (1 + 2) * 3 - 4 / 2; 1 - 2 - 3"), [14.0, 7.0, -4.0]);
}

#[test]
fn test_comparison_yields_zero_or_one() {
    assert_eq!(evaluate("1 < 2; 3 < 2; 2 < 2"), [1.0, 0.0, 0.0]);
}

#[test]
fn test_functions_and_recursion() {
    let source = "
        # Recursive fibonacci
        def fib(x)
            if x < 3 then
                1
            else
                fib(x - 1) + fib(x - 2);

        fib(10)
    ";

    assert_eq!(evaluate_last(source), 55.0);
}

#[test]
fn test_if_picks_branch() {
    let source = "
        def pick(x) if x then 10 else 20;
        pick(1); pick(0); pick(0.5)
    ";

    assert_eq!(evaluate(source), [10.0, 20.0, 10.0]);
}

#[test]
fn test_if_with_block_creating_branches() {
    let source = format!(
        "{}def f(x)
            if x < 5 then
                (var s = 0 in (for i = 0, i < 3 in s = s + 1) : s)
            else
                if x < 10 then 100 else 1000;
        f(1); f(7); f(12)",
        SEQUENCE
    );

    assert_eq!(evaluate(&source), [3.0, 100.0, 1000.0]);
}

#[test]
fn test_for_runs_body_five_times() {
    let source = format!(
        "{}var count = 0 in (for i = 0, i < 5, 1.0 in count = count + 1) : count",
        SEQUENCE
    );

    assert_eq!(evaluate_last(&source), 5.0);
}

#[test]
fn test_for_with_step() {
    let source = format!(
        "{}var total = 0 in (for i = 0, i < 10, 2 in total = total + i) : total",
        SEQUENCE
    );

    assert_eq!(evaluate_last(&source), 20.0);
}

#[test]
fn test_for_value_is_zero() {
    assert_eq!(evaluate_last("for i = 0, i < 3 in i"), 0.0);
}

#[test]
fn test_for_restores_outer_variable() {
    let source = format!("{}def f(i) (for i = 0, i < 3 in 0) : i; f(42)", SEQUENCE);

    assert_eq!(evaluate_last(&source), 42.0);
}

#[test]
fn test_assignment_mutates_enclosing_binding() {
    let source = format!("{}var a = 1 in (a = 5) : a", SEQUENCE);

    assert_eq!(evaluate_last(&source), 5.0);
}

#[test]
fn test_assignment_does_not_leak_into_sibling_scope() {
    let source = format!(
        "{}var a = 1 in (var a = 2 in a = 10) : (var b = 3 in a = a + b) : a",
        SEQUENCE
    );

    assert_eq!(evaluate_last(&source), 4.0);
}

#[test]
fn test_parameters_are_assignable() {
    let source = format!("{}def inc(x) (x = x + 1) : x; inc(1)", SEQUENCE);

    assert_eq!(evaluate_last(&source), 2.0);
}

#[test]
fn test_var_initializers_see_earlier_bindings() {
    assert_eq!(evaluate_last("var a = 2, b = a * 3, c in a + b + c"), 8.0);
}

#[test]
fn test_user_defined_operators() {
    let source = "
        def unary-(v) 0 - v;
        def unary!(v) if v then 0 else 1;
        def binary> 10 (a b) b < a;
        def binary| 5 (a b) if a then 1 else if b then 1 else 0;
        def binary& 6 (a b) if !a then 0 else !!b;

        -3 > -5;
        0 | 1;
        1 < 2 & 2 < 3;
        1 < 2 & 3 < 2 | 1
    ";

    assert_eq!(evaluate(source), [1.0, 1.0, 1.0, 1.0]);
}

#[test]
fn test_builtins_are_callable() {
    assert_eq!(
        evaluate("extern printd(x); extern putchard(c); printd(42); putchard(10)"),
        [0.0, 0.0]
    );
}

#[test]
fn test_extern_from_process() {
    assert_eq!(evaluate("extern cos(x); cos(0)"), [1.0]);
}

#[test]
fn test_forward_declaration_then_definition() {
    let source = "
        extern odd(n);
        def even(n) if n < 1 then 1 else odd(n - 1);
        def odd(n) if n < 1 then 0 else even(n - 1);
        even(10); even(7)
    ";

    assert_eq!(evaluate(source), [1.0, 0.0]);
}

#[test]
fn test_failed_definition_of_called_declaration() {
    let report = run_source(
        "extern foo(x); def bar(x) foo(x) + 1; def foo(x) y; def foo(x) x * 2; bar(4); bar(0)",
        false,
    );

    assert_eq!(report.failed, 1);
    assert_eq!(report.evaluated, [9.0, 1.0]);
}

#[test]
fn test_codegen_errors_are_skipped() {
    let report = run_source(
        "def f(x) x; def f(x) x + 1; def g(a b) a; g(1); f(3); undefined(1); 7",
        false,
    );

    assert_eq!(report.failed, 3);
    assert_eq!(report.generated, 4);
    assert_eq!(report.evaluated, [3.0, 7.0]);
}

#[test]
fn test_optimized_results_match() {
    let source = format!(
        "{}def fib(x) if x < 3 then 1 else fib(x - 1) + fib(x - 2);
        def sum(n) var s = 0 in (for i = 1, i < n + 1 in s = s + i) : s;
        fib(15); sum(100)",
        SEQUENCE
    );

    let plain = run_source(&source, false).evaluated;
    let optimized = run_source(&source, true).evaluated;

    assert_eq!(plain, [610.0, 5050.0]);
    assert_eq!(plain, optimized);
}

#[test]
fn test_threaded_pipeline() {
    let mut first = tempfile::Builder::new().suffix(".k").tempfile().unwrap();
    writeln!(first, "def square(x) x * x;").unwrap();
    let mut second = tempfile::Builder::new().suffix(".k").tempfile().unwrap();
    writeln!(second, "def f(x) x; ) square(4) + 1").unwrap();

    let (tokens, lexer) = spawn_lexer(vec![
        first.path().to_path_buf(),
        second.path().to_path_buf(),
    ]);
    let (nodes, parser) = spawn_parser(tokens);

    let context = Context::create();
    let runtime = Runtime::initialize(false).unwrap();
    let mut compiler = Compiler::new(&context, "pipeline", false);
    let mut driver = Driver::new(&mut compiler, &runtime, EXECUTE, Vec::new());
    let report = driver.run(nodes).unwrap();

    assert!(lexer.join().unwrap().is_ok());
    assert_eq!(parser.join().unwrap(), 1);
    assert_eq!(report.generated, 3);
    assert_eq!(report.evaluated, [17.0]);
    assert_eq!(
        String::from_utf8(driver.into_output()).unwrap(),
        "Evaluated to: 17\n"
    );
}

#[test]
fn test_missing_source_file() {
    let (tokens, lexer) = spawn_lexer(vec![PathBuf::from("/nonexistent/missing.k")]);

    assert_eq!(tokens.iter().count(), 0);
    let error = lexer.join().unwrap().unwrap_err();
    assert_eq!(error.get_error_name(), "Io");
}

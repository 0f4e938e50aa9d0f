//! Integration tests for the Compiler API
//!
//! These tests run complete programs through the pipeline and check what the
//! generated module computes.

use float_cmp::assert_approx_eq;

use lc::{
    CompileOptions, Compiler, LcError,
    config::{AppConfig, CodegenConfig, DiagnosticsConfig, EvalConfig},
    diagnostics::{ErrorCode, Severity},
    eval::EvalError,
    identifier::Id,
};

fn run(source: &str) -> f64 {
    let compiler = Compiler::default();
    let module = compiler
        .build(source)
        .unwrap_or_else(|err| panic!("Failed to compile {source:?}: {err}"));
    compiler
        .evaluate(&module)
        .unwrap_or_else(|err| panic!("Failed to run {source:?}: {err}"))
}

fn error_messages(source: &str) -> Vec<String> {
    let compilation = Compiler::default().compile(source, CompileOptions::default());
    assert!(compilation.failed(), "Expected {source:?} to fail");
    compilation
        .diagnostics()
        .iter()
        .filter(|diag| diag.severity().is_error())
        .map(|diag| diag.message().to_owned())
        .collect()
}

#[test]
fn test_defvar_binds_global() {
    let compiler = Compiler::default();
    let compilation = compiler.compile("(defvar x 3)", CompileOptions::default());
    assert!(!compilation.failed());
    assert!(matches!(
        compilation.desugared().unwrap().forms[0].kind,
        lc::ast::ExprKind::VarDef { .. }
    ));

    assert_approx_eq!(f64, run("(defvar x 3)"), 3.0);
}

#[test]
fn test_top_level_sum() {
    assert_approx_eq!(f64, run("(sum 2 3)"), 5.0);
    assert_approx_eq!(f64, run("(+ 2 3)"), 5.0);
}

#[test]
fn test_function_definition_and_call() {
    let compiler = Compiler::default();
    let module = compiler
        .build("(defun (f a b) (sum a b)) (f 4 5)")
        .expect("Failed to compile");

    let f = module.function(Id::new("f")).expect("f should be declared");
    assert_eq!(f.arity(), 2);
    assert!(!f.is_declaration());
    assert_approx_eq!(f64, compiler.evaluate(&module).unwrap(), 9.0);
}

#[test]
fn test_forward_reference() {
    assert_approx_eq!(f64, run("(f 4 5)\n(defun (f a b) (sum a b))"), 9.0);
}

#[test]
fn test_unknown_function() {
    let messages = error_messages("(foo 1)");
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("could not find function 'foo'"));
}

#[test]
fn test_unknown_named_value() {
    let compilation =
        Compiler::default().compile("(defun (g x) (sum x y))", CompileOptions::default());

    assert!(compilation.failed());
    let messages: Vec<_> = compilation
        .diagnostics()
        .iter()
        .map(|diag| diag.message())
        .collect();
    assert_eq!(messages, ["could not find named value 'y'"]);

    let g = compilation
        .target()
        .and_then(|module| module.function(Id::new("g")))
        .expect("g should still be generated");
    assert!(!g.is_declaration());
}

#[test]
fn test_call_arity_mismatch() {
    let messages = error_messages("(defun (h a) a) (h 1 2)");
    assert_eq!(messages.len(), 1);
    assert!(
        messages[0].contains("got 2 arguments, expected 1"),
        "unexpected message: {}",
        messages[0]
    );
}

#[test]
fn test_defvar_in_function_does_not_leak_locals() {
    let compilation = Compiler::default().compile(
        "(defun (f a) (defvar y a))\n(defun (g b c) (sum y c))\n(g 1 2)",
        CompileOptions::default(),
    );

    assert!(compilation.failed());
    let codes: Vec<_> = compilation
        .diagnostics()
        .iter()
        .filter_map(|diag| diag.code())
        .collect();
    assert_eq!(codes, [ErrorCode::E310]);

    let err = Compiler::default()
        .build("(defun (f a) (defvar y (sum a 1)))\n(sum y 1)")
        .unwrap_err();
    assert!(matches!(err, LcError::Compile { .. }));
}

#[test]
fn test_failed_run_returns_compile_error() {
    let source = "(foo 1)\n(bar 2)";
    let err = Compiler::default().build(source).unwrap_err();
    match err {
        LcError::Compile { err, src } => {
            assert_eq!(err.diagnostics().len(), 2);
            assert_eq!(src, source);
        }
        other => panic!("Expected a compile error, got {other:?}"),
    }
}

#[test]
fn test_fatal_error_is_recorded_last() {
    let compilation =
        Compiler::default().compile("(sum 1 2 3)\n(mul 1)", CompileOptions::default());

    let diagnostics = compilation.diagnostics();
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].severity(), Severity::Info);
    assert_eq!(diagnostics[1].severity(), Severity::Fatal);
    assert_eq!(diagnostics[1].code(), Some(ErrorCode::E202));
    assert!(compilation.target().is_none());
}

#[test]
fn test_info_does_not_fail_the_run() {
    let compilation = Compiler::default().compile("(sum 1 2 3)", CompileOptions::default());
    assert!(!compilation.failed());
    assert_eq!(compilation.diagnostics().len(), 1);
}

#[test]
fn test_syntax_only() {
    let options = CompileOptions {
        syntax_only: true,
        keep_stages: false,
    };
    let compilation = Compiler::default().compile("(foo 1)", options);

    assert!(!compilation.failed());
    assert!(compilation.desugared().is_some());
    assert!(compilation.target().is_none());
}

#[test]
fn test_keep_stages() {
    let options = CompileOptions {
        syntax_only: false,
        keep_stages: true,
    };
    let compilation = Compiler::default().compile("(sum 1 2)", options);

    assert_eq!(compilation.preprocessed().unwrap().text(), " ( sum 1 2 ) ");
    assert_eq!(compilation.tokens().unwrap().len(), 6);
    assert!(compilation.parsed().unwrap().forms[0].is_list());
    assert!(!compilation.desugared().unwrap().forms[0].is_list());
    assert!(compilation.target().is_some());
}

#[test]
fn test_stages_kept_up_to_a_fatal_error() {
    let options = CompileOptions {
        syntax_only: false,
        keep_stages: true,
    };
    let compilation = Compiler::default().compile("(a))", options);

    assert!(compilation.failed());
    assert!(compilation.preprocessed().is_some());
    assert!(compilation.tokens().is_none());
    assert_eq!(
        compilation.diagnostics()[0].code(),
        Some(ErrorCode::E100)
    );
}

#[test]
fn test_listing() {
    let module = Compiler::default()
        .build("(defun (f a b) (sum a b))\n(f 4 5)")
        .unwrap();

    assert_eq!(
        module.to_string(),
        "; ModuleID = 'lisp compiler'\n\
         \n\
         define double @f(double %a, double %b) {\n\
         entry:\n  \
         %sum00 = fadd double %a, %b\n  \
         ret double %sum00\n\
         }\n\
         \n\
         define double @main() {\n\
         entry:\n  \
         %call01 = call double @f(double 4.0, double 5.0)\n  \
         ret double %call01\n\
         }\n"
    );
}

#[test]
fn test_unbounded_recursion_is_an_eval_error() {
    let config = AppConfig::new(
        CodegenConfig::default(),
        EvalConfig::new(16),
        DiagnosticsConfig::default(),
    );
    let compiler = Compiler::new(config);
    let module = compiler.build("(defun (r x) (r x))\n(r 1)").unwrap();

    let err = compiler.evaluate(&module).unwrap_err();
    assert!(matches!(err, LcError::Eval(EvalError::CallDepthExceeded(16))));
}

#[test]
fn test_compiler_reusability() {
    let compiler = Compiler::default();
    let first = compiler.build("(sum 1 1)").unwrap();
    let second = compiler.build("(mul 3 3)").unwrap();

    assert_approx_eq!(f64, compiler.evaluate(&first).unwrap(), 2.0);
    assert_approx_eq!(f64, compiler.evaluate(&second).unwrap(), 9.0);
}

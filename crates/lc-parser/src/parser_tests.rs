//! Scenario tests for the parser and the complete front end.

use crate::{
    ast::{ExprKind, Module},
    build_module,
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    parse, preprocess, tokenize,
};

/// Helper function to parse a source string into the untyped tree
fn parse_source(source: &str) -> Result<Module, Diagnostic> {
    let tokens = tokenize(&preprocess(source))?;
    build_module(&tokens)
}

/// Helper function to parse a source string and assert success
fn assert_parses_successfully(source: &str) -> Module {
    match parse_source(source) {
        Ok(module) => module,
        Err(e) => panic!("Expected parsing to succeed, but got error: {e}"),
    }
}

/// Helper function to parse a source string and assert failure
fn assert_parse_fails(source: &str) -> Diagnostic {
    match parse_source(source) {
        Ok(module) => panic!("Expected parsing to fail, but it succeeded: {module:?}"),
        Err(e) => e,
    }
}

mod basic_parsing_tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(assert_parses_successfully("").is_empty());
        assert!(assert_parses_successfully("\n\n; only a comment\n").is_empty());
    }

    #[test]
    fn test_single_form() {
        let module = assert_parses_successfully("(sum 2 3)");
        assert_eq!(module.forms.len(), 1);
        let ExprKind::SExpression(children) = &module.forms[0].kind else {
            panic!("expected list");
        };
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].as_identifier(), Some("sum"));
        assert_eq!(children[1].kind, ExprKind::NumberLiteral(2));
    }

    #[test]
    fn test_multiple_forms_keep_order() {
        let module = assert_parses_successfully("(a)\n(b)\n\n(c)");
        let heads: Vec<_> = module
            .forms
            .iter()
            .map(|form| match &form.kind {
                ExprKind::SExpression(children) => children[0].as_identifier(),
                _ => None,
            })
            .collect();
        assert_eq!(heads, [Some("a"), Some("b"), Some("c")]);
    }

    #[test]
    fn test_forms_on_one_line() {
        let module = assert_parses_successfully("(defun (f a b) (sum a b)) (f 4 5)");
        assert_eq!(module.forms.len(), 2);
    }

    #[test]
    fn test_form_spanning_lines() {
        let module = assert_parses_successfully("(defun (f a)\n  (mul a\n     a))");
        assert_eq!(module.forms.len(), 1);
        assert_eq!(module.forms[0].span.start(), 0);
    }

    #[test]
    fn test_nested_lists() {
        let module = assert_parses_successfully("(((x)))");
        let ExprKind::SExpression(outer) = &module.forms[0].kind else {
            panic!("expected list");
        };
        assert!(outer[0].is_list());
    }

    #[test]
    fn test_string_atom() {
        let module = assert_parses_successfully("(print \"hello world\")");
        let ExprKind::SExpression(children) = &module.forms[0].kind else {
            panic!("expected list");
        };
        assert_eq!(
            children[1].kind,
            ExprKind::StringLiteral("hello world".to_owned())
        );
    }

    #[test]
    fn test_list_span_covers_parens() {
        let module = assert_parses_successfully("  (f (g 1))");
        assert_eq!(module.forms[0].span.start(), 2);
        assert_eq!(module.forms[0].span.end(), 11);
    }
}

mod error_tests {
    use super::*;

    #[test]
    fn test_atom_at_top_level() {
        let err = assert_parse_fails("x");
        assert_eq!(err.code(), Some(ErrorCode::E101));
        assert!(err.severity().is_fatal());

        let err = assert_parse_fails("(a) 42");
        assert_eq!(err.code(), Some(ErrorCode::E101));
        assert_eq!(err.labels()[0].span().start(), 4);
    }

    #[test]
    fn test_stray_close_at_top_level() {
        // The balance check normally rejects this first.
        let err = assert_parse_fails(")");
        assert_eq!(err.code(), Some(ErrorCode::E101));
    }

    #[test]
    fn test_unclosed_list() {
        let err = assert_parse_fails("(a (b c)\n");
        assert_eq!(err.code(), Some(ErrorCode::E102));
        assert_eq!(err.labels()[0].span().start(), 0);
        assert!(err.labels()[1].is_secondary());
    }

    #[test]
    fn test_tokens_without_end_of_file() {
        let mut tokens = tokenize(&preprocess("(a")).unwrap();
        tokens.pop();
        let err = build_module(&tokens).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E102));
    }
}

mod pipeline_tests {
    use super::*;

    fn run(source: &str) -> (Result<Module, Diagnostic>, DiagnosticCollector) {
        let mut diagnostics = DiagnosticCollector::new();
        let result = parse(source, &mut diagnostics);
        (result, diagnostics)
    }

    #[test]
    fn test_forward_reference_program() {
        let (result, diagnostics) = run("(f 4 5)\n(defun (f a b) (sum a b))");
        let module = result.unwrap();

        assert!(matches!(module.forms[0].kind, ExprKind::Call { .. }));
        assert!(matches!(module.forms[1].kind, ExprKind::FuncDef { .. }));
        assert!(diagnostics.diagnostics().is_empty());
    }

    #[test]
    fn test_balance_runs_before_parsing() {
        let (result, _) = run("(a))");
        assert_eq!(result.unwrap_err().code(), Some(ErrorCode::E100));
    }

    #[test]
    fn test_extra_open_paren_fails_in_parser() {
        let (result, _) = run("((sum 1 2)");
        assert_eq!(result.unwrap_err().code(), Some(ErrorCode::E102));
    }

    #[test]
    fn test_tokenizer_error_stops_pipeline() {
        let (result, diagnostics) = run("(f \"open");
        assert_eq!(result.unwrap_err().code(), Some(ErrorCode::E001));
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn test_spans_refer_to_original_source() {
        let source = "(defvar answer (mul 6 7))";
        let (result, _) = run(source);
        let module = result.unwrap();

        let ExprKind::VarDef { name, init } = &module.forms[0].kind else {
            panic!("expected VarDef");
        };
        assert_eq!(&source[name.span().start()..name.span().end()], "answer");
        assert_eq!(&source[init.span.start()..init.span.end()], "(mul 6 7)");
    }
}

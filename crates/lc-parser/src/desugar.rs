//! Desugaring of special forms.
//!
//! Lists whose head is an identifier are rewritten into typed nodes:
//!
//! | Head           | Result                        |
//! |----------------|-------------------------------|
//! | `sum`, `+`     | [`ExprKind::BinaryOp`] `Sum`  |
//! | `mul`, `*`     | [`ExprKind::BinaryOp`] `Mul`  |
//! | `defvar`       | [`ExprKind::VarDef`]          |
//! | `defun`        | [`ExprKind::FuncDef`]         |
//! | anything else  | [`ExprKind::Call`]            |
//!
//! A rewritten node is folded again right away, so nested lists in operands,
//! initializers, bodies and arguments are reached in the same walk. Sweeps over
//! the module repeat until one of them rewrites nothing.

use std::iter;

use log::{debug, trace};

use crate::{
    ast::{BinaryOpKind, Expr, ExprKind, Module, Prototype},
    error::{Diagnostic, DiagnosticCollector, ErrorCode, Result},
    span::{Span, Spanned},
};

/// A fallible, consuming tree transformation.
///
/// Every method defaults to rebuilding the node from its folded children.
trait Folder {
    fn fold_module(&mut self, module: Module) -> Result<Module> {
        Ok(Module::new(self.fold_exprs(module.forms)?))
    }

    fn fold_exprs(&mut self, exprs: Vec<Expr>) -> Result<Vec<Expr>> {
        exprs.into_iter().map(|expr| self.fold_expr(expr)).collect()
    }

    fn fold_expr(&mut self, expr: Expr) -> Result<Expr> {
        let Expr { kind, span } = expr;
        let kind = match kind {
            ExprKind::SExpression(children) => return self.fold_sexpr(children, span),
            ExprKind::BinaryOp { op, lhs, rhs } => ExprKind::BinaryOp {
                op,
                lhs: Box::new(self.fold_expr(*lhs)?),
                rhs: Box::new(self.fold_expr(*rhs)?),
            },
            ExprKind::VarDef { name, init } => ExprKind::VarDef {
                name,
                init: Box::new(self.fold_expr(*init)?),
            },
            ExprKind::FuncDef { proto, body } => ExprKind::FuncDef {
                proto,
                body: Box::new(self.fold_expr(*body)?),
            },
            ExprKind::Call { callee, args } => ExprKind::Call {
                callee,
                args: self.fold_exprs(args)?,
            },
            atom @ (ExprKind::Identifier(_)
            | ExprKind::NumberLiteral(_)
            | ExprKind::StringLiteral(_)) => atom,
        };
        Ok(Expr::new(kind, span))
    }

    fn fold_sexpr(&mut self, children: Vec<Expr>, span: Span) -> Result<Expr> {
        Ok(Expr::new(
            ExprKind::SExpression(self.fold_exprs(children)?),
            span,
        ))
    }
}

/// Rewrites lists headed by an identifier into typed nodes.
struct DesugarSpecialForms<'d> {
    diagnostics: &'d mut DiagnosticCollector,
    rewrites: usize,
}

impl<'d> DesugarSpecialForms<'d> {
    fn new(diagnostics: &'d mut DiagnosticCollector) -> Self {
        Self {
            diagnostics,
            rewrites: 0,
        }
    }

    fn binary_op(
        &mut self,
        op: BinaryOpKind,
        head: &Spanned<String>,
        operands: Vec<Expr>,
        span: Span,
    ) -> Result<ExprKind> {
        let count = operands.len();
        let mut operands = operands.into_iter();
        let (Some(lhs), Some(rhs)) = (operands.next(), operands.next()) else {
            return Err(Diagnostic::fatal(format!(
                "`{head}` expects 2 operands, got {count}"
            ))
            .with_code(ErrorCode::E202)
            .with_label(span, "missing operands")
            .with_help(format!("write it as `({head} lhs rhs)`")));
        };

        let extra = operands.map(|operand| operand.span).reduce(|a, b| a.union(b));
        if let Some(extra) = extra {
            self.diagnostics.emit(
                Diagnostic::info(format!(
                    "`{head}` takes exactly 2 operands; extra operands are ignored"
                ))
                .with_code(ErrorCode::E203)
                .with_label(extra, "ignored")
                .with_help(format!("nest the operation, e.g. `({head} a ({head} b c))`")),
            );
        }

        Ok(ExprKind::BinaryOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn var_def(&mut self, operands: Vec<Expr>, span: Span) -> Result<ExprKind> {
        let [name, init]: [Expr; 2] = operands.try_into().map_err(|operands: Vec<Expr>| {
            Diagnostic::fatal(format!(
                "defvar expects a name and an initializer, got {} arguments",
                operands.len()
            ))
            .with_code(ErrorCode::E200)
            .with_label(span, "malformed variable definition")
            .with_help("write it as `(defvar name value)`")
        })?;

        let found = name.describe();
        let name = match name.kind {
            ExprKind::Identifier(id) => Spanned::new(id, name.span),
            _ => {
                return Err(
                    Diagnostic::fatal("defvar called with non-id as first parameter")
                        .with_code(ErrorCode::E200)
                        .with_label(name.span, format!("found {found}"))
                        .with_help("the variable name must be an identifier"),
                );
            }
        };

        Ok(ExprKind::VarDef {
            name,
            init: Box::new(init),
        })
    }

    fn func_def(&mut self, operands: Vec<Expr>, span: Span) -> Result<ExprKind> {
        let [proto, body]: [Expr; 2] = operands.try_into().map_err(|operands: Vec<Expr>| {
            Diagnostic::fatal(format!(
                "defun expects a prototype and a body, got {} arguments",
                operands.len()
            ))
            .with_code(ErrorCode::E201)
            .with_label(span, "malformed function definition")
            .with_help("write it as `(defun (name params...) body)`")
        })?;

        Ok(ExprKind::FuncDef {
            proto: prototype(proto)?,
            body: Box::new(body),
        })
    }
}

/// Reads `(name params...)`.
fn prototype(expr: Expr) -> Result<Prototype> {
    let span = expr.span;
    let found = expr.describe();
    let ExprKind::SExpression(children) = expr.kind else {
        return Err(Diagnostic::fatal("function prototype must be a list")
            .with_code(ErrorCode::E204)
            .with_label(span, format!("found {found}"))
            .with_help("write the prototype as `(name params...)`"));
    };

    let mut names = Vec::with_capacity(children.len());
    for child in children {
        let found = child.describe();
        match child.kind {
            ExprKind::Identifier(name) => names.push(Spanned::new(name, child.span)),
            _ => {
                return Err(
                    Diagnostic::fatal("prototype sexpr must have all ID element types")
                        .with_code(ErrorCode::E204)
                        .with_label(child.span, format!("found {found}"))
                        .with_secondary_label(span, "in this prototype"),
                );
            }
        }
    }

    let mut names = names.into_iter();
    let Some(name) = names.next() else {
        return Err(Diagnostic::fatal("function prototype is empty")
            .with_code(ErrorCode::E204)
            .with_label(span, "expected a function name")
            .with_help("write the prototype as `(name params...)`"));
    };

    Ok(Prototype {
        name,
        params: names.collect(),
        span,
    })
}

impl Folder for DesugarSpecialForms<'_> {
    fn fold_sexpr(&mut self, children: Vec<Expr>, span: Span) -> Result<Expr> {
        let mut rest = children.into_iter();
        let head = match rest.next() {
            None => return Ok(Expr::new(ExprKind::SExpression(Vec::new()), span)),
            Some(Expr {
                kind: ExprKind::Identifier(head),
                span: head_span,
            }) => Spanned::new(head, head_span),
            Some(other) => {
                let children = iter::once(other).chain(rest).collect();
                return Ok(Expr::new(
                    ExprKind::SExpression(self.fold_exprs(children)?),
                    span,
                ));
            }
        };
        let operands: Vec<Expr> = rest.collect();

        let kind = if let Some(op) = BinaryOpKind::from_head(&head) {
            self.binary_op(op, &head, operands, span)?
        } else {
            match head.as_str() {
                "defvar" => self.var_def(operands, span)?,
                "defun" => self.func_def(operands, span)?,
                _ => ExprKind::Call {
                    callee: head,
                    args: operands,
                },
            }
        };

        self.rewrites += 1;
        let rewritten = Expr::new(kind, span);
        trace!(form = rewritten.describe(), start = span.start(); "Rewrote list");

        // Continue into the operands of the node just created.
        self.fold_expr(rewritten)
    }
}

/// Runs one sweep over `module` and returns it with the number of rewrites.
fn sweep(module: Module, diagnostics: &mut DiagnosticCollector) -> Result<(Module, usize)> {
    let mut folder = DesugarSpecialForms::new(diagnostics);
    let module = folder.fold_module(module)?;
    Ok((module, folder.rewrites))
}

/// Desugars every special form of `module`.
///
/// Advisory diagnostics (ignored operands) go to `diagnostics`.
///
/// # Errors
///
/// Returns a fatal [`Diagnostic`] for a malformed `defvar`, `defun`, `sum` or
/// `mul`.
pub fn desugar(module: Module, diagnostics: &mut DiagnosticCollector) -> Result<Module> {
    debug!(forms = module.forms.len(); "Desugaring module");
    let mut module = module;
    let mut sweeps = 0;
    loop {
        let (swept, rewrites) = sweep(module, diagnostics)?;
        module = swept;
        sweeps += 1;
        trace!(sweep = sweeps, rewrites; "Desugaring sweep");
        if rewrites == 0 {
            break;
        }
    }
    debug!(sweeps; "Desugared module");
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Severity,
        lexer::tokenize,
        parser::build_module,
        preprocess::preprocess,
    };

    // Test-only IdentityFolder for verifying identity transformations
    struct IdentityFolder;

    impl Folder for IdentityFolder {}

    fn parse(source: &str) -> Module {
        let tokens = tokenize(&preprocess(source)).expect("source should tokenize");
        build_module(&tokens).expect("source should parse")
    }

    fn desugar_source(source: &str) -> (Result<Module>, Vec<Diagnostic>) {
        let mut diagnostics = DiagnosticCollector::new();
        let result = desugar(parse(source), &mut diagnostics);
        (result, diagnostics.diagnostics().to_vec())
    }

    fn desugared(source: &str) -> Module {
        desugar_source(source).0.expect("source should desugar")
    }

    fn desugar_err(source: &str) -> Diagnostic {
        desugar_source(source).0.expect_err("desugaring should fail")
    }

    #[test]
    fn test_identity_folder() {
        let module = parse("(f (g 1) \"s\")\n(1 2)");
        let folded = IdentityFolder.fold_module(module.clone()).unwrap();
        assert_eq!(folded, module);
    }

    #[test]
    fn test_sum_and_aliases() {
        for source in ["(sum 2 3)", "(+ 2 3)"] {
            let module = desugared(source);
            match &module.forms[0].kind {
                ExprKind::BinaryOp { op, lhs, rhs } => {
                    assert_eq!(*op, BinaryOpKind::Sum);
                    assert_eq!(lhs.kind, ExprKind::NumberLiteral(2));
                    assert_eq!(rhs.kind, ExprKind::NumberLiteral(3));
                }
                other => panic!("expected BinaryOp, got {other:?}"),
            }
        }
        let module = desugared("(* 2 3)");
        assert!(matches!(
            module.forms[0].kind,
            ExprKind::BinaryOp {
                op: BinaryOpKind::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_extra_operands_are_dropped_with_info() {
        let (result, diagnostics) = desugar_source("(sum 1 2 3 4)");
        let module = result.unwrap();

        assert!(matches!(module.forms[0].kind, ExprKind::BinaryOp { .. }));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity(), Severity::Info);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E203));
        assert_eq!(diagnostics[0].labels()[0].span(), Span::new(9..12));
    }

    #[test]
    fn test_missing_operands_is_fatal() {
        let err = desugar_err("(mul 2)");
        assert_eq!(err.code(), Some(ErrorCode::E202));
        assert!(err.severity().is_fatal());
    }

    #[test]
    fn test_defvar() {
        let module = desugared("(defvar x (sum 1 2))");
        let ExprKind::VarDef { name, init } = &module.forms[0].kind else {
            panic!("expected VarDef");
        };
        assert_eq!(name.as_str(), "x");
        assert_eq!(name.span(), Span::new(8..9));
        assert!(matches!(init.kind, ExprKind::BinaryOp { .. }));
    }

    #[test]
    fn test_defvar_non_identifier_name() {
        let err = desugar_err("(defvar 3 4)");
        assert_eq!(err.message(), "defvar called with non-id as first parameter");
        assert_eq!(err.code(), Some(ErrorCode::E200));
    }

    #[test]
    fn test_defvar_wrong_arity() {
        assert_eq!(desugar_err("(defvar x)").code(), Some(ErrorCode::E200));
        assert_eq!(desugar_err("(defvar x 1 2)").code(), Some(ErrorCode::E200));
    }

    #[test]
    fn test_defun() {
        let module = desugared("(defun (f a b) (sum a (g b)))");
        let ExprKind::FuncDef { proto, body } = &module.forms[0].kind else {
            panic!("expected FuncDef");
        };
        assert_eq!(proto.name.as_str(), "f");
        assert_eq!(proto.arity(), 2);
        let ExprKind::BinaryOp { rhs, .. } = &body.kind else {
            panic!("expected BinaryOp body");
        };
        assert!(matches!(&rhs.kind, ExprKind::Call { callee, args } if callee.as_str() == "g" && args.len() == 1));
    }

    #[test]
    fn test_defun_body_may_be_an_atom() {
        let module = desugared("(defun (h a) a)");
        let ExprKind::FuncDef { body, .. } = &module.forms[0].kind else {
            panic!("expected FuncDef");
        };
        assert_eq!(body.as_identifier(), Some("a"));
    }

    #[test]
    fn test_defun_bad_prototype() {
        assert_eq!(desugar_err("(defun (f 1) 1)").code(), Some(ErrorCode::E204));
        assert_eq!(desugar_err("(defun () 1)").code(), Some(ErrorCode::E204));
        assert_eq!(desugar_err("(defun f 1)").code(), Some(ErrorCode::E204));
        assert_eq!(desugar_err("(defun (f))").code(), Some(ErrorCode::E201));
    }

    #[test]
    fn test_call_arguments_are_desugared() {
        let module = desugared("(f (mul 2 3) x \"s\")");
        let ExprKind::Call { callee, args } = &module.forms[0].kind else {
            panic!("expected Call");
        };
        assert_eq!(callee.as_str(), "f");
        assert_eq!(args.len(), 3);
        assert!(matches!(args[0].kind, ExprKind::BinaryOp { .. }));
        assert_eq!(args[1].as_identifier(), Some("x"));
    }

    #[test]
    fn test_non_identifier_head_stays_a_list() {
        let module = desugared("(1 (sum 1 2))\n()");
        let ExprKind::SExpression(children) = &module.forms[0].kind else {
            panic!("expected list");
        };
        assert!(matches!(children[1].kind, ExprKind::BinaryOp { .. }));
        assert_eq!(module.forms[1].kind, ExprKind::SExpression(Vec::new()));
    }

    #[test]
    fn test_operand_identifiers_are_not_rewritten() {
        let module = desugared("(sum defvar defun)");
        let ExprKind::BinaryOp { lhs, rhs, .. } = &module.forms[0].kind else {
            panic!("expected BinaryOp");
        };
        assert_eq!(lhs.as_identifier(), Some("defvar"));
        assert_eq!(rhs.as_identifier(), Some("defun"));
    }

    #[test]
    fn test_empty_module() {
        assert!(desugared("").is_empty());
    }

    #[test]
    fn test_second_sweep_changes_nothing() {
        let mut diagnostics = DiagnosticCollector::new();
        let module = desugar(parse("(defun (f a) (f (sum a 1)))"), &mut diagnostics).unwrap();
        let (again, rewrites) = sweep(module.clone(), &mut diagnostics).unwrap();
        assert_eq!(rewrites, 0);
        assert_eq!(again, module);
    }
}

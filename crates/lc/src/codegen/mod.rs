//! Lowering of the desugared tree into a [`TargetModule`].
//!
//! Generation runs in three steps:
//!
//! 1. every top-level function prototype is declared, so calls may refer to
//!    functions defined later in the file;
//! 2. every top-level function body is generated;
//! 3. the remaining top-level forms are generated in order inside the
//!    synthetic entry function, which returns the last value produced.
//!
//! Name resolution and call problems are recorded as recoverable errors and
//! produce no value for the offending expression. Misuse of the instruction
//! builder is an internal error and stops generation.

mod symbols;

pub use symbols::{Resolution, Scopes, SymbolTable, TempNames};

use std::collections::HashMap;

use log::{debug, info, trace};

use lc_core::{
    builder::{Builder, BuilderError},
    identifier::Id,
    ir::{TargetModule, Value},
};
use lc_parser::{
    Span, Spanned,
    ast::{BinaryOpKind, Expr, ExprKind, Module, Prototype},
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
};

use crate::config::CodegenConfig;

/// Value of an expression, or `None` when its generation failed and the
/// failure was recorded.
type Generated = Result<Option<Value>, Diagnostic>;

/// Walks a desugared [`Module`] and emits instructions.
struct CodeGenerator<'d> {
    builder: Builder,
    scopes: Scopes,
    temps: TempNames,
    entry_name: Id,
    diagnostics: &'d mut DiagnosticCollector,
}

impl<'d> CodeGenerator<'d> {
    fn new(config: &CodegenConfig, diagnostics: &'d mut DiagnosticCollector) -> Self {
        Self {
            builder: Builder::new(TargetModule::new(config.module_name())),
            scopes: Scopes::new(),
            temps: TempNames::new(),
            entry_name: Id::new(config.entry_name()),
            diagnostics,
        }
    }

    fn generate(mut self, module: &Module) -> Result<TargetModule, Diagnostic> {
        let functions: Vec<(&Prototype, &Expr)> = module
            .forms
            .iter()
            .filter_map(|form| match &form.kind {
                ExprKind::FuncDef { proto, body } => Some((proto, body.as_ref())),
                _ => None,
            })
            .filter(|(proto, _)| self.check_not_entry(proto))
            .collect();

        for (proto, _) in &functions {
            self.declare(proto);
        }

        let mut defined: HashMap<&str, Span> = HashMap::new();
        for (proto, body) in &functions {
            if let Some(first) = defined.get(proto.name.as_str()) {
                self.diagnostics.emit(
                    Diagnostic::error(format!("redefinition of function '{}'", proto.name))
                        .with_code(ErrorCode::E307)
                        .with_label(proto.name.span(), "defined again here")
                        .with_secondary_label(*first, "first defined here")
                        .with_help("rename one of the functions"),
                );
                continue;
            }
            defined.insert(proto.name.as_str(), proto.name.span());
            self.function(proto, body)?;
        }

        self.entry(module)?;

        let target = self.builder.finish();
        info!(
            functions = target.functions().count(),
            globals = self.scopes.globals().len();
            "Generated target module"
        );
        Ok(target)
    }

    /// Rejects user functions named like the entry function.
    fn check_not_entry(&mut self, proto: &Prototype) -> bool {
        if self.entry_name != proto.name.as_str() {
            return true;
        }
        self.diagnostics.emit(
            Diagnostic::error(format!(
                "function name '{}' is reserved for the entry point",
                proto.name
            ))
            .with_code(ErrorCode::E308)
            .with_label(proto.name.span(), "reserved name")
            .with_help("choose a different function name"),
        );
        false
    }

    /// Declares the function for `proto`, reusing an existing declaration.
    fn declare(&mut self, proto: &Prototype) -> Id {
        let name = Id::new(&proto.name);
        let params = proto.params.iter().map(|param| Id::new(param)).collect();
        let function = self.builder.declare_function(name, params);
        trace!(function:% = name, arity = function.arity(); "Declared prototype");
        name
    }

    fn function(&mut self, proto: &Prototype, body: &Expr) -> Result<(), Diagnostic> {
        let name = self.declare(proto);
        debug!(function:% = name; "Generating function");

        self.builder
            .append_block(name, Id::new("entry"))
            .map_err(|err| internal(err, proto.span))?;

        let params = self
            .builder
            .current_function()
            .map(|function| function.params().to_vec())
            .unwrap_or_default();
        self.scopes.enter_function(name, &params);

        let value = self.expr(body)?;
        let ret = value.unwrap_or_else(|| {
            debug!(function:% = name; "Function body produced no value");
            Value::Const(0.0)
        });
        self.builder
            .build_ret(ret)
            .map_err(|err| internal(err, body.span))?;

        self.scopes.leave_function();
        self.builder.clear_insert_point();
        Ok(())
    }

    /// Generates every non-function top-level form inside the entry function.
    fn entry(&mut self, module: &Module) -> Result<(), Diagnostic> {
        debug!(entry:% = self.entry_name; "Generating entry function");
        self.builder.create_entry(self.entry_name, Id::new("entry"));
        self.scopes.enter_function(self.entry_name, &[]);

        let mut last = None;
        for form in &module.forms {
            if matches!(form.kind, ExprKind::FuncDef { .. }) {
                continue;
            }
            if let Some(value) = self.expr(form)? {
                last = Some(value);
            }
        }

        let end = module.forms.last().map_or_else(Span::default, |form| form.span);
        self.builder
            .build_ret(last.unwrap_or(Value::Const(0.0)))
            .map_err(|err| internal(err, end))?;
        self.builder.clear_insert_point();
        Ok(())
    }

    fn expr(&mut self, expr: &Expr) -> Generated {
        match &expr.kind {
            ExprKind::NumberLiteral(value) => Ok(Some(Value::Const(*value as f64))),
            ExprKind::Identifier(name) => Ok(self.variable(name, expr.span)),
            ExprKind::BinaryOp { op, lhs, rhs } => self.binary_op(*op, lhs, rhs, expr.span),
            ExprKind::VarDef { name, init } => self.var_def(name, init),
            ExprKind::Call { callee, args } => self.call(callee, args, expr.span),
            ExprKind::StringLiteral(_) => {
                self.diagnostics.emit(
                    Diagnostic::error("string literal cannot be used as a value")
                        .with_code(ErrorCode::E303)
                        .with_label(expr.span, "only numbers have values"),
                );
                Ok(None)
            }
            ExprKind::SExpression(_) => {
                self.diagnostics.emit(
                    Diagnostic::error("list has no meaning here")
                        .with_code(ErrorCode::E304)
                        .with_label(expr.span, "not a call or special form")
                        .with_help("a list must start with the name of a function or special form"),
                );
                Ok(None)
            }
            ExprKind::FuncDef { proto, .. } => {
                self.diagnostics.emit(
                    Diagnostic::error(format!(
                        "function '{}' must be defined at top level",
                        proto.name
                    ))
                    .with_code(ErrorCode::E305)
                    .with_label(expr.span, "nested function definition")
                    .with_help("move the definition out of the enclosing form"),
                );
                Ok(None)
            }
        }
    }

    fn variable(&mut self, name: &str, span: Span) -> Option<Value> {
        match self.scopes.resolve(name) {
            Resolution::Value(value) => Some(value),
            Resolution::Unbound => {
                self.diagnostics.emit(
                    Diagnostic::error(format!("could not find named value '{name}'"))
                        .with_code(ErrorCode::E300)
                        .with_label(span, "not bound here")
                        .with_help(format!(
                            "bind it with `(defvar {name} ...)` before use, or add it to the prototype"
                        )),
                );
                None
            }
            Resolution::Foreign { owner } => {
                self.diagnostics.emit(
                    Diagnostic::error(format!(
                        "named value '{name}' was computed inside function '{owner}' and cannot be used here"
                    ))
                    .with_code(ErrorCode::E310)
                    .with_label(span, "used outside its function")
                    .with_help(format!(
                        "pass the value as an argument, or bind '{name}' to a constant"
                    )),
                );
                None
            }
        }
    }

    fn binary_op(&mut self, op: BinaryOpKind, lhs: &Expr, rhs: &Expr, span: Span) -> Generated {
        let lhs = self.expr(lhs)?;
        let rhs = self.expr(rhs)?;
        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            return Ok(None);
        };

        let dest = self.temps.next(op.as_str());
        let value = match op {
            BinaryOpKind::Sum => self.builder.build_fadd(lhs, rhs, dest),
            BinaryOpKind::Mul => self.builder.build_fmul(lhs, rhs, dest),
        }
        .map_err(|err| internal(err, span))?;
        Ok(Some(value))
    }

    /// Binds `name` globally, even inside a function body.
    fn var_def(&mut self, name: &Spanned<String>, init: &Expr) -> Generated {
        let Some(value) = self.expr(init)? else {
            return Ok(None);
        };
        self.scopes.bind_global(name, value);
        Ok(self.scopes.global(name))
    }

    fn call(&mut self, callee: &Spanned<String>, args: &[Expr], span: Span) -> Generated {
        let name = Id::new(callee);
        let Some(arity) = self.builder.module().function(name).map(|f| f.arity()) else {
            self.diagnostics.emit(
                Diagnostic::error(format!(
                    "could not find function '{callee}' at time of reference"
                ))
                .with_code(ErrorCode::E301)
                .with_label(callee.span(), "not defined in this module")
                .with_help(format!("define it with `(defun ({callee} ...) ...)`")),
            );
            return Ok(None);
        };

        if arity != args.len() {
            self.diagnostics.emit(
                Diagnostic::error(format!(
                    "argument mismatch for '{callee}'. got {} arguments, expected {arity}.",
                    args.len()
                ))
                .with_code(ErrorCode::E302)
                .with_label(span, format!("called with {} arguments", args.len())),
            );
            return Ok(None);
        }

        let mut values = Vec::with_capacity(args.len());
        for (index, arg) in args.iter().enumerate() {
            match self.expr(arg)? {
                Some(value) => values.push(value),
                None => {
                    self.diagnostics.emit(
                        Diagnostic::error(format!(
                            "failed to generate argument {} of call to '{callee}'",
                            index + 1
                        ))
                        .with_code(ErrorCode::E306)
                        .with_label(arg.span, "this argument has no value")
                        .with_secondary_label(callee.span(), "in this call"),
                    );
                    return Ok(None);
                }
            }
        }

        let dest = self.temps.next("call");
        let value = self
            .builder
            .build_call(name, values, dest)
            .map_err(|err| internal(err, span))?;
        Ok(Some(value))
    }
}

fn internal(err: BuilderError, span: Span) -> Diagnostic {
    Diagnostic::internal(format!("instruction builder failed: {err}"))
        .with_code(ErrorCode::E900)
        .with_label(span, "while generating this expression")
}

/// Generates the target module for a desugared `module`.
///
/// Recoverable problems are recorded in `diagnostics` and generation goes on
/// with the next expression, so the returned module is best effort whenever
/// `diagnostics` has errors.
///
/// # Errors
///
/// Returns an internal-error [`Diagnostic`] if the instruction builder is
/// misused.
pub fn generate(
    module: &Module,
    config: &CodegenConfig,
    diagnostics: &mut DiagnosticCollector,
) -> Result<TargetModule, Diagnostic> {
    debug!(forms = module.forms.len(); "Generating code");
    CodeGenerator::new(config, diagnostics).generate(module)
}

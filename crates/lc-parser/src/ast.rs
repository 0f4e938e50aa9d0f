//! Expression tree produced by the parser and refined by desugaring.
//!
//! The parser only produces atoms and [`ExprKind::SExpression`] lists.
//! [Desugaring](crate::desugar) rewrites every list whose head names a
//! special form or a function into one of the typed variants.

use std::fmt;

use crate::span::{Span, Spanned};

/// The two arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOpKind {
    Sum,
    Mul,
}

impl BinaryOpKind {
    /// Recognizes `sum`/`+` and `mul`/`*`.
    pub fn from_head(head: &str) -> Option<Self> {
        match head {
            "sum" | "+" => Some(Self::Sum),
            "mul" | "*" => Some(Self::Mul),
            _ => None,
        }
    }

    /// Prefix for temporaries holding the result of this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mul => "mul",
        }
    }
}

impl fmt::Display for BinaryOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A function prototype: its name and parameter names.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: Spanned<String>,
    pub params: Vec<Spanned<String>>,
    pub span: Span,
}

impl Prototype {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Identifier(String),
    NumberLiteral(i64),
    StringLiteral(String),
    /// A list that has not been given a meaning (yet).
    SExpression(Vec<Expr>),
    BinaryOp {
        op: BinaryOpKind,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    VarDef {
        name: Spanned<String>,
        init: Box<Expr>,
    },
    FuncDef {
        proto: Prototype,
        body: Box<Expr>,
    },
    Call {
        callee: Spanned<String>,
        args: Vec<Expr>,
    },
}

/// A node of the expression tree with its span in the original source.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns `true` for a list that desugaring has not rewritten.
    pub fn is_list(&self) -> bool {
        matches!(self.kind, ExprKind::SExpression(_))
    }

    /// The identifier name, if this is an identifier.
    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Short description used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match &self.kind {
            ExprKind::Identifier(_) => "identifier",
            ExprKind::NumberLiteral(_) => "number literal",
            ExprKind::StringLiteral(_) => "string literal",
            ExprKind::SExpression(_) => "list",
            ExprKind::BinaryOp { .. } => "arithmetic expression",
            ExprKind::VarDef { .. } => "variable definition",
            ExprKind::FuncDef { .. } => "function definition",
            ExprKind::Call { .. } => "call",
        }
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = depth * 2;
        let offset = self.span.start();
        match &self.kind {
            ExprKind::Identifier(name) => writeln!(f, "{:indent$}Identifier {name} @{offset}", ""),
            ExprKind::NumberLiteral(value) => {
                writeln!(f, "{:indent$}NumberLiteral {value} @{offset}", "")
            }
            ExprKind::StringLiteral(value) => {
                writeln!(f, "{:indent$}StringLiteral \"{value}\" @{offset}", "")
            }
            ExprKind::SExpression(children) => {
                writeln!(f, "{:indent$}SExpression @{offset}", "")?;
                children
                    .iter()
                    .try_for_each(|child| child.fmt_tree(f, depth + 1))
            }
            ExprKind::BinaryOp { op, lhs, rhs } => {
                writeln!(f, "{:indent$}BinaryOp {op} @{offset}", "")?;
                lhs.fmt_tree(f, depth + 1)?;
                rhs.fmt_tree(f, depth + 1)
            }
            ExprKind::VarDef { name, init } => {
                writeln!(f, "{:indent$}VarDef {name} @{offset}", "")?;
                init.fmt_tree(f, depth + 1)
            }
            ExprKind::FuncDef { proto, body } => {
                writeln!(f, "{:indent$}FuncDef @{offset}", "")?;
                let params: Vec<&str> = proto.params.iter().map(|p| p.as_str()).collect();
                writeln!(
                    f,
                    "{:width$}Prototype {}({}) @{}",
                    "",
                    proto.name,
                    params.join(", "),
                    proto.span.start(),
                    width = indent + 2
                )?;
                body.fmt_tree(f, depth + 1)
            }
            ExprKind::Call { callee, args } => {
                writeln!(f, "{:indent$}Call {callee} @{offset}", "")?;
                args.iter().try_for_each(|arg| arg.fmt_tree(f, depth + 1))
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

/// The ordered top-level forms of a program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub forms: Vec<Expr>,
}

impl Module {
    pub fn new(forms: Vec<Expr>) -> Self {
        Self { forms }
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Module ({} forms)", self.forms.len())?;
        self.forms
            .iter()
            .try_for_each(|form| form.fmt_tree(f, 1))
    }
}

//! The target intermediate form.
//!
//! A [`TargetModule`] is a named collection of [`Function`]s plus one
//! distinguished entry function. Every value is a floating-point scalar, and
//! the instruction set is limited to add, multiply, call and return; constants
//! appear directly as operands.
//!
//! The [`fmt::Display`] implementations render an LLVM-flavoured listing that
//! is meant for dumps and debugging:
//!
//! ```text
//! ; ModuleID = 'lisp compiler'
//!
//! define double @f(double %a, double %b) {
//! entry:
//!   %sum00 = fadd double %a, %b
//!   ret double %sum00
//! }
//! ```

use std::fmt;

use indexmap::IndexMap;

use crate::identifier::Id;

/// An operand of an instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// A floating-point constant.
    Const(f64),
    /// The `index`-th parameter of the enclosing function.
    Param { index: usize, name: Id },
    /// The result of an earlier instruction in the enclosing function.
    Temp(Id),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Const(value) => write!(f, "{value:?}"),
            Value::Param { name, .. } => write!(f, "%{name}"),
            Value::Temp(name) => write!(f, "%{name}"),
        }
    }
}

/// A single instruction inside a [`Block`].
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Floating-point addition.
    FAdd { dest: Id, lhs: Value, rhs: Value },
    /// Floating-point multiplication.
    FMul { dest: Id, lhs: Value, rhs: Value },
    /// Call of a function of the same module by name.
    Call {
        dest: Id,
        callee: Id,
        args: Vec<Value>,
    },
    /// Return from the enclosing function.
    Ret(Value),
}

impl Instruction {
    /// Returns the temporary defined by this instruction, if any.
    pub fn dest(&self) -> Option<Id> {
        match self {
            Instruction::FAdd { dest, .. }
            | Instruction::FMul { dest, .. }
            | Instruction::Call { dest, .. } => Some(*dest),
            Instruction::Ret(_) => None,
        }
    }

    /// Returns `true` for instructions that end a block.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Instruction::Ret(_))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::FAdd { dest, lhs, rhs } => {
                write!(f, "%{dest} = fadd double {lhs}, {rhs}")
            }
            Instruction::FMul { dest, lhs, rhs } => {
                write!(f, "%{dest} = fmul double {lhs}, {rhs}")
            }
            Instruction::Call { dest, callee, args } => {
                write!(f, "%{dest} = call double @{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "double {arg}")?;
                }
                write!(f, ")")
            }
            Instruction::Ret(value) => write!(f, "ret double {value}"),
        }
    }
}

/// A labelled straight-line sequence of instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    label: Id,
    instructions: Vec<Instruction>,
}

impl Block {
    /// Create an empty block.
    pub fn new(label: Id) -> Self {
        Self {
            label,
            instructions: Vec::new(),
        }
    }

    pub fn label(&self) -> Id {
        self.label
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Returns `true` once a terminator has been appended.
    pub fn is_terminated(&self) -> bool {
        self.instructions
            .last()
            .is_some_and(Instruction::is_terminator)
    }

    pub(crate) fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }
}

/// A function taking `params.len()` doubles and returning a double.
///
/// A function without blocks is a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    name: Id,
    params: Vec<Id>,
    blocks: Vec<Block>,
}

impl Function {
    /// Create a body-less function declaration.
    pub fn declare(name: Id, params: Vec<Id>) -> Self {
        Self {
            name,
            params,
            blocks: Vec::new(),
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    /// Parameter names in declaration order.
    pub fn params(&self) -> &[Id] {
        &self.params
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns `true` if the function has no body.
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns the value of the `index`-th parameter.
    pub fn param(&self, index: usize) -> Option<Value> {
        self.params
            .get(index)
            .map(|name| Value::Param { index, name: *name })
    }

    pub(crate) fn append_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub(crate) fn last_block_mut(&mut self) -> Option<&mut Block> {
        self.blocks.last_mut()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = if self.is_declaration() {
            "declare"
        } else {
            "define"
        };
        write!(f, "{keyword} double @{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "double %{param}")?;
        }
        write!(f, ")")?;

        if self.is_declaration() {
            return writeln!(f);
        }

        writeln!(f, " {{")?;
        for block in &self.blocks {
            writeln!(f, "{}:", block.label())?;
            for instruction in block.instructions() {
                writeln!(f, "  {instruction}")?;
            }
        }
        writeln!(f, "}}")
    }
}

/// The artifact handed to an emitter or to the [`Interpreter`](crate::eval::Interpreter).
#[derive(Debug, Clone, PartialEq)]
pub struct TargetModule {
    name: String,
    functions: IndexMap<Id, Function>,
    entry: Option<Function>,
}

impl TargetModule {
    /// Create an empty module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: IndexMap::new(),
            entry: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a user function by name.
    pub fn function(&self, name: Id) -> Option<&Function> {
        self.functions.get(&name)
    }

    /// User functions in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    /// The synthetic entry function, once it has been created.
    pub fn entry(&self) -> Option<&Function> {
        self.entry.as_ref()
    }

    /// Resolves a callee name, including the entry function.
    pub fn resolve(&self, name: Id) -> Option<&Function> {
        self.functions
            .get(&name)
            .or_else(|| self.entry.as_ref().filter(|entry| entry.name() == name))
    }

    pub(crate) fn function_mut(&mut self, name: Id) -> Option<&mut Function> {
        self.functions.get_mut(&name)
    }

    pub(crate) fn entry_mut(&mut self) -> Option<&mut Function> {
        self.entry.as_mut()
    }

    pub(crate) fn declare(&mut self, name: Id, params: Vec<Id>) -> &Function {
        self.functions
            .entry(name)
            .or_insert_with(|| Function::declare(name, params))
    }

    pub(crate) fn set_entry(&mut self, function: Function) {
        self.entry = Some(function);
    }
}

impl fmt::Display for TargetModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        for function in self.functions.values().chain(self.entry.iter()) {
            writeln!(f)?;
            write!(f, "{function}")?;
        }
        Ok(())
    }
}

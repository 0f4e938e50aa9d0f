//! Insertion-point based construction of a [`TargetModule`].
//!
//! The [`Builder`] owns the module while it is being generated. Functions are
//! declared by name, a block is opened to move the insertion point into a
//! function, and every `build_*` call appends one instruction at the current
//! insertion point.
//!
//! # Example
//!
//! ```
//! # use lc_core::{builder::Builder, identifier::Id, ir::{TargetModule, Value}};
//! let mut builder = Builder::new(TargetModule::new("demo"));
//!
//! builder.declare_function(Id::new("double_it"), vec![Id::new("x")]);
//! builder.append_block(Id::new("double_it"), Id::new("entry")).unwrap();
//!
//! let x = builder.module().function(Id::new("double_it")).unwrap().param(0).unwrap();
//! let product = builder.build_fmul(x, Value::Const(2.0), Id::new("mul00")).unwrap();
//! builder.build_ret(product).unwrap();
//!
//! let module = builder.finish();
//! assert!(!module.function(Id::new("double_it")).unwrap().is_declaration());
//! ```

use log::trace;
use thiserror::Error;

use crate::{
    identifier::Id,
    ir::{Block, Function, Instruction, TargetModule, Value},
};

/// Misuse of the [`Builder`] API.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuilderError {
    #[error("no insertion point is set")]
    NoInsertPoint,

    #[error("function `{0}` is not declared in the module")]
    UnknownFunction(Id),

    #[error("block `{0}` is already terminated")]
    BlockTerminated(Id),
}

/// Where the next instruction goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InsertPoint {
    Function(Id),
    Entry,
}

/// Builds a [`TargetModule`] instruction by instruction.
#[derive(Debug)]
pub struct Builder {
    module: TargetModule,
    insert_point: Option<InsertPoint>,
}

impl Builder {
    /// Start building into `module`.
    pub fn new(module: TargetModule) -> Self {
        Self {
            module,
            insert_point: None,
        }
    }

    /// Read access to the module built so far.
    pub fn module(&self) -> &TargetModule {
        &self.module
    }

    /// Consume the builder and return the module.
    pub fn finish(self) -> TargetModule {
        self.module
    }

    /// Declares `name` unless a function with that name already exists.
    ///
    /// Declarations are idempotent: an existing function is returned as is,
    /// even when its parameter list differs from `params`.
    pub fn declare_function(&mut self, name: Id, params: Vec<Id>) -> &Function {
        trace!(name:% = name, arity = params.len(); "Declaring function");
        self.module.declare(name, params)
    }

    /// Creates the synthetic entry function and positions the builder in its
    /// first block.
    pub fn create_entry(&mut self, name: Id, label: Id) {
        let mut entry = Function::declare(name, Vec::new());
        entry.append_block(Block::new(label));
        self.module.set_entry(entry);
        self.insert_point = Some(InsertPoint::Entry);
    }

    /// Appends a new block to `function` and moves the insertion point there.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::UnknownFunction`] if `function` was never declared.
    pub fn append_block(&mut self, function: Id, label: Id) -> Result<(), BuilderError> {
        let target = self
            .module
            .function_mut(function)
            .ok_or(BuilderError::UnknownFunction(function))?;
        target.append_block(Block::new(label));
        self.insert_point = Some(InsertPoint::Function(function));
        Ok(())
    }

    /// Clears the insertion point.
    pub fn clear_insert_point(&mut self) {
        self.insert_point = None;
    }

    /// Returns the function the builder currently appends to.
    pub fn current_function(&self) -> Option<&Function> {
        match self.insert_point? {
            InsertPoint::Function(name) => self.module.function(name),
            InsertPoint::Entry => self.module.entry(),
        }
    }

    /// Appends `dest = lhs + rhs`.
    pub fn build_fadd(&mut self, lhs: Value, rhs: Value, dest: Id) -> Result<Value, BuilderError> {
        self.push(Instruction::FAdd { dest, lhs, rhs })?;
        Ok(Value::Temp(dest))
    }

    /// Appends `dest = lhs * rhs`.
    pub fn build_fmul(&mut self, lhs: Value, rhs: Value, dest: Id) -> Result<Value, BuilderError> {
        self.push(Instruction::FMul { dest, lhs, rhs })?;
        Ok(Value::Temp(dest))
    }

    /// Appends `dest = call callee(args...)`.
    pub fn build_call(
        &mut self,
        callee: Id,
        args: Vec<Value>,
        dest: Id,
    ) -> Result<Value, BuilderError> {
        self.push(Instruction::Call { dest, callee, args })?;
        Ok(Value::Temp(dest))
    }

    /// Appends `ret value`, terminating the current block.
    pub fn build_ret(&mut self, value: Value) -> Result<(), BuilderError> {
        self.push(Instruction::Ret(value))
    }

    fn push(&mut self, instruction: Instruction) -> Result<(), BuilderError> {
        let function = match self.insert_point.ok_or(BuilderError::NoInsertPoint)? {
            InsertPoint::Function(name) => self
                .module
                .function_mut(name)
                .ok_or(BuilderError::UnknownFunction(name))?,
            InsertPoint::Entry => self.module.entry_mut().ok_or(BuilderError::NoInsertPoint)?,
        };
        let block = function
            .last_block_mut()
            .ok_or(BuilderError::NoInsertPoint)?;
        if block.is_terminated() {
            return Err(BuilderError::BlockTerminated(block.label()));
        }
        block.push(instruction);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> Builder {
        Builder::new(TargetModule::new("test"))
    }

    #[test]
    fn test_declare_is_idempotent() {
        let mut builder = builder();
        builder.declare_function(Id::new("f"), vec![Id::new("a"), Id::new("b")]);
        let again = builder.declare_function(Id::new("f"), vec![Id::new("z")]);

        assert_eq!(again.arity(), 2);
        assert_eq!(builder.module().functions().count(), 1);
    }

    #[test]
    fn test_build_without_insert_point() {
        let mut builder = builder();
        let result = builder.build_fadd(Value::Const(1.0), Value::Const(2.0), Id::new("sum00"));
        assert_eq!(result, Err(BuilderError::NoInsertPoint));
    }

    #[test]
    fn test_append_block_to_undeclared_function() {
        let mut builder = builder();
        let result = builder.append_block(Id::new("nope"), Id::new("entry"));
        assert_eq!(result, Err(BuilderError::UnknownFunction(Id::new("nope"))));
    }

    #[test]
    fn test_entry_function_body() {
        let mut builder = builder();
        builder.create_entry(Id::new("main"), Id::new("entry"));
        let sum = builder
            .build_fadd(Value::Const(2.0), Value::Const(3.0), Id::new("sum00"))
            .unwrap();
        builder.build_ret(sum).unwrap();

        let module = builder.finish();
        let entry = module.entry().unwrap();
        assert_eq!(entry.blocks().len(), 1);
        assert_eq!(entry.blocks()[0].instructions().len(), 2);
        assert!(entry.blocks()[0].is_terminated());
    }

    #[test]
    fn test_no_instructions_after_ret() {
        let mut builder = builder();
        builder.create_entry(Id::new("main"), Id::new("entry"));
        builder.build_ret(Value::Const(0.0)).unwrap();

        let result = builder.build_ret(Value::Const(1.0));
        assert_eq!(result, Err(BuilderError::BlockTerminated(Id::new("entry"))));
    }

    #[test]
    fn test_current_function_follows_insert_point() {
        let mut builder = builder();
        builder.declare_function(Id::new("f"), vec![]);
        assert!(builder.current_function().is_none());

        builder.append_block(Id::new("f"), Id::new("entry")).unwrap();
        assert_eq!(builder.current_function().unwrap().name(), "f");

        builder.clear_insert_point();
        assert!(builder.current_function().is_none());
    }
}

//! Reference interpreter for [`TargetModule`]s.
//!
//! The interpreter executes the entry function of a module directly, without
//! going through any native toolchain. It is used by `lc --run` and by the
//! test suites to check what generated code computes.
//!
//! The language has no conditionals, so every recursive function recurses
//! forever; [`EvalConfig::max_call_depth`] turns that into an
//! [`EvalError::CallDepthExceeded`] instead of a stack overflow.

use std::collections::HashMap;

use log::{debug, trace};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    identifier::Id,
    ir::{Function, Instruction, TargetModule, Value},
};

/// Errors raised while interpreting a module.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("module has no entry function")]
    NoEntry,

    #[error("function `{0}` is not defined in the module")]
    UnknownFunction(Id),

    #[error("function `{0}` is declared but has no body")]
    UndefinedFunction(Id),

    #[error("call to `{callee}` passes {got} arguments, expected {expected}")]
    ArityMismatch {
        callee: Id,
        got: usize,
        expected: usize,
    },

    #[error("value `%{0}` is not defined in the current function")]
    UnknownValue(Id),

    #[error("parameter {index} is out of range in function `{function}`")]
    ParamOutOfRange { function: Id, index: usize },

    #[error("function `{0}` ends without returning")]
    MissingReturn(Id),

    #[error("maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),
}

/// Interpreter limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EvalConfig {
    /// Maximum number of nested calls, the entry function included.
    #[serde(default = "default_max_call_depth")]
    max_call_depth: usize,
}

fn default_max_call_depth() -> usize {
    256
}

impl EvalConfig {
    /// Creates a configuration with the given call depth limit.
    pub fn new(max_call_depth: usize) -> Self {
        Self { max_call_depth }
    }

    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self::new(default_max_call_depth())
    }
}

/// Executes functions of a [`TargetModule`].
///
/// # Example
///
/// ```
/// # use lc_core::{builder::Builder, eval::Interpreter, identifier::Id, ir::{TargetModule, Value}};
/// let mut builder = Builder::new(TargetModule::new("demo"));
/// builder.create_entry(Id::new("main"), Id::new("entry"));
/// let sum = builder.build_fadd(Value::Const(2.0), Value::Const(3.0), Id::new("sum00")).unwrap();
/// builder.build_ret(sum).unwrap();
/// let module = builder.finish();
///
/// let result = Interpreter::new(&module).run_entry().unwrap();
/// assert_eq!(result, 5.0);
/// ```
#[derive(Debug)]
pub struct Interpreter<'m> {
    module: &'m TargetModule,
    config: EvalConfig,
}

impl<'m> Interpreter<'m> {
    /// Creates an interpreter with default limits.
    pub fn new(module: &'m TargetModule) -> Self {
        Self::with_config(module, EvalConfig::default())
    }

    pub fn with_config(module: &'m TargetModule, config: EvalConfig) -> Self {
        Self { module, config }
    }

    /// Runs the entry function and returns its result.
    pub fn run_entry(&self) -> Result<f64, EvalError> {
        let entry = self.module.entry().ok_or(EvalError::NoEntry)?;
        debug!(entry:% = entry.name(); "Interpreting entry function");
        self.execute(entry, &[], 1)
    }

    /// Calls the function `name` with `args`.
    pub fn call(&self, name: Id, args: &[f64]) -> Result<f64, EvalError> {
        self.invoke(name, args, 1)
    }

    fn invoke(&self, name: Id, args: &[f64], depth: usize) -> Result<f64, EvalError> {
        let function = self
            .module
            .resolve(name)
            .ok_or(EvalError::UnknownFunction(name))?;
        if function.arity() != args.len() {
            return Err(EvalError::ArityMismatch {
                callee: name,
                got: args.len(),
                expected: function.arity(),
            });
        }
        self.execute(function, args, depth)
    }

    fn execute(&self, function: &Function, args: &[f64], depth: usize) -> Result<f64, EvalError> {
        if depth > self.config.max_call_depth {
            return Err(EvalError::CallDepthExceeded(self.config.max_call_depth));
        }
        if function.is_declaration() {
            return Err(EvalError::UndefinedFunction(function.name()));
        }
        trace!(function:% = function.name(), depth; "Executing function");

        let mut frame = Frame {
            function: function.name(),
            args,
            temps: HashMap::new(),
        };

        for block in function.blocks() {
            for instruction in block.instructions() {
                match instruction {
                    Instruction::FAdd { dest, lhs, rhs } => {
                        let value = frame.read(*lhs)? + frame.read(*rhs)?;
                        frame.temps.insert(*dest, value);
                    }
                    Instruction::FMul { dest, lhs, rhs } => {
                        let value = frame.read(*lhs)? * frame.read(*rhs)?;
                        frame.temps.insert(*dest, value);
                    }
                    Instruction::Call { dest, callee, args } => {
                        let values = args
                            .iter()
                            .map(|arg| frame.read(*arg))
                            .collect::<Result<Vec<_>, _>>()?;
                        let value = self.invoke(*callee, &values, depth + 1)?;
                        frame.temps.insert(*dest, value);
                    }
                    Instruction::Ret(value) => return frame.read(*value),
                }
            }
        }

        Err(EvalError::MissingReturn(function.name()))
    }
}

/// Values visible while one function executes.
struct Frame<'a> {
    function: Id,
    args: &'a [f64],
    temps: HashMap<Id, f64>,
}

impl Frame<'_> {
    fn read(&self, value: Value) -> Result<f64, EvalError> {
        match value {
            Value::Const(constant) => Ok(constant),
            Value::Param { index, .. } => {
                self.args
                    .get(index)
                    .copied()
                    .ok_or(EvalError::ParamOutOfRange {
                        function: self.function,
                        index,
                    })
            }
            Value::Temp(name) => self
                .temps
                .get(&name)
                .copied()
                .ok_or(EvalError::UnknownValue(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::builder::Builder;

    /// `(defun (f a b) (sum a b))` with an entry calling `(f 4 5)`.
    fn adder_module() -> TargetModule {
        let mut builder = Builder::new(TargetModule::new("test"));
        let f = Id::new("f");
        builder.declare_function(f, vec![Id::new("a"), Id::new("b")]);
        builder.append_block(f, Id::new("entry")).unwrap();
        let (a, b) = {
            let function = builder.module().function(f).unwrap();
            (function.param(0).unwrap(), function.param(1).unwrap())
        };
        let sum = builder.build_fadd(a, b, Id::new("sum00")).unwrap();
        builder.build_ret(sum).unwrap();

        builder.create_entry(Id::new("main"), Id::new("entry"));
        let call = builder
            .build_call(
                f,
                vec![Value::Const(4.0), Value::Const(5.0)],
                Id::new("call01"),
            )
            .unwrap();
        builder.build_ret(call).unwrap();
        builder.finish()
    }

    #[test]
    fn test_run_entry_with_call() {
        let module = adder_module();
        let result = Interpreter::new(&module).run_entry().unwrap();
        assert_approx_eq!(f64, result, 9.0);
    }

    #[test]
    fn test_call_function_directly() {
        let module = adder_module();
        let result = Interpreter::new(&module)
            .call(Id::new("f"), &[1.5, 2.0])
            .unwrap();
        assert_approx_eq!(f64, result, 3.5);
    }

    #[test]
    fn test_call_arity_mismatch() {
        let module = adder_module();
        let err = Interpreter::new(&module)
            .call(Id::new("f"), &[1.0])
            .unwrap_err();
        assert_eq!(
            err,
            EvalError::ArityMismatch {
                callee: Id::new("f"),
                got: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn test_no_entry() {
        let module = TargetModule::new("empty");
        assert_eq!(
            Interpreter::new(&module).run_entry(),
            Err(EvalError::NoEntry)
        );
    }

    #[test]
    fn test_declared_only_function() {
        let mut builder = Builder::new(TargetModule::new("test"));
        builder.declare_function(Id::new("g"), vec![]);
        builder.create_entry(Id::new("main"), Id::new("entry"));
        let call = builder
            .build_call(Id::new("g"), vec![], Id::new("call00"))
            .unwrap();
        builder.build_ret(call).unwrap();
        let module = builder.finish();

        assert_eq!(
            Interpreter::new(&module).run_entry(),
            Err(EvalError::UndefinedFunction(Id::new("g")))
        );
    }

    #[test]
    fn test_unbounded_recursion_is_cut_off() {
        let mut builder = Builder::new(TargetModule::new("test"));
        let r = Id::new("r");
        builder.declare_function(r, vec![]);
        builder.append_block(r, Id::new("entry")).unwrap();
        let call = builder.build_call(r, vec![], Id::new("call00")).unwrap();
        builder.build_ret(call).unwrap();
        let module = builder.finish();

        let interpreter = Interpreter::with_config(&module, EvalConfig::new(8));
        assert_eq!(interpreter.call(r, &[]), Err(EvalError::CallDepthExceeded(8)));
    }

    #[test]
    fn test_unknown_temp() {
        let mut builder = Builder::new(TargetModule::new("test"));
        builder.create_entry(Id::new("main"), Id::new("entry"));
        builder.build_ret(Value::Temp(Id::new("ghost"))).unwrap();
        let module = builder.finish();

        assert_eq!(
            Interpreter::new(&module).run_entry(),
            Err(EvalError::UnknownValue(Id::new("ghost")))
        );
    }

    #[test]
    fn test_missing_return() {
        let mut builder = Builder::new(TargetModule::new("test"));
        builder.create_entry(Id::new("main"), Id::new("entry"));
        let module = builder.finish();

        assert_eq!(
            Interpreter::new(&module).run_entry(),
            Err(EvalError::MissingReturn(Id::new("main")))
        );
    }
}

//! Name bindings visible during code generation.

use indexmap::IndexMap;
use log::trace;

use lc_core::{identifier::Id, ir::Value};

/// A single tier of name to value bindings.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    bindings: IndexMap<String, Value>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name`, replacing any earlier binding.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Outcome of resolving a name in [`Scopes`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// The name is bound to a value usable in the current function.
    Value(Value),
    /// The name is not bound anywhere.
    Unbound,
    /// The name is a global holding a value computed inside `owner`, which
    /// has no meaning in any other function.
    Foreign { owner: Id },
}

/// The two lookup tiers: module globals and the locals of the function being
/// generated.
///
/// Locals are replaced wholesale when a function is entered, so a body never
/// sees the parameters of another function. A global bound to anything but a
/// constant remembers the function it was computed in and only resolves there.
#[derive(Debug, Default)]
pub struct Scopes {
    globals: SymbolTable,
    owners: IndexMap<String, Id>,
    locals: SymbolTable,
    current: Option<Id>,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `name`, locals first.
    pub fn resolve(&self, name: &str) -> Resolution {
        if let Some(value) = self.locals.lookup(name) {
            return Resolution::Value(value);
        }
        let Some(value) = self.globals.lookup(name) else {
            return Resolution::Unbound;
        };
        match self.owners.get(name) {
            Some(owner) if self.current != Some(*owner) => Resolution::Foreign { owner: *owner },
            _ => Resolution::Value(value),
        }
    }

    /// Resolves `name` to a value usable in the current function.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        match self.resolve(name) {
            Resolution::Value(value) => Some(value),
            Resolution::Unbound | Resolution::Foreign { .. } => None,
        }
    }

    /// Binds a module-global name.
    ///
    /// Parameters and temporaries are tied to the current function.
    pub fn bind_global(&mut self, name: &str, value: Value) {
        trace!(name, value:% = value, function:? = self.current; "Binding global");
        match (value, self.current) {
            (Value::Const(_), _) | (_, None) => {
                self.owners.shift_remove(name);
            }
            (Value::Param { .. } | Value::Temp(_), Some(current)) => {
                self.owners.insert(name.to_owned(), current);
            }
        }
        self.globals.bind(name, value);
    }

    /// The global bound to `name`, wherever it was computed.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.lookup(name)
    }

    /// Makes `function` current, with `params` as the only local bindings.
    pub fn enter_function(&mut self, function: Id, params: &[Id]) {
        let mut locals = SymbolTable::new();
        for (index, name) in params.iter().enumerate() {
            locals.bind(name.to_text(), Value::Param { index, name: *name });
        }
        self.locals = locals;
        self.current = Some(function);
    }

    /// Drops all local bindings.
    pub fn leave_function(&mut self) {
        self.locals = SymbolTable::new();
        self.current = None;
    }

    pub fn globals(&self) -> &SymbolTable {
        &self.globals
    }
}

/// Generator of unique temporary names for one compilation run.
///
/// Names are the operation prefix followed by an at least two-digit counter
/// shared by all prefixes: `sum00`, `mul01`, `call02`.
#[derive(Debug, Default)]
pub struct TempNames {
    next: usize,
}

impl TempNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, prefix: &str) -> Id {
        let name = format!("{prefix}{:02}", self.next);
        self.next += 1;
        Id::new(&name)
    }
}

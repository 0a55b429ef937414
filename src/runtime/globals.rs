use hashbrown::HashMap;

use crate::gc::{HeapVisitor, RootSource};

use super::Value;

/// Root source for a simple host runtime: named global bindings plus a value stack standing in for
/// the call stack of a virtual machine.
#[derive(Default)]
pub struct Globals {
    bindings: HashMap<String, Value>,
    stack: Vec<Value>,
}

impl Globals {
    pub fn new() -> Globals {
        Globals::default()
    }

    /// Bind a global, returning the previously bound value if one exists.
    pub fn define(&mut self, name: &str, value: Value) -> Option<Value> {
        self.bindings.insert(name.to_owned(), value)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).copied()
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.bindings.remove(name)
    }

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut [Value] {
        &mut self.stack
    }
}

impl RootSource for Globals {
    fn visit_roots(&mut self, visitor: &mut impl HeapVisitor) {
        for value in self.bindings.values_mut() {
            visitor.visit_value(value);
        }

        for value in &mut self.stack {
            visitor.visit_value(value);
        }
    }
}

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::array::{ArrayEntry, ArrayWrapper};
use crate::callable::{Block, Function, NativeFunction};
use crate::class::{Class, Instance};

/// Runtime value.  Scalars are held inline; everything with identity is
/// reference counted.
#[derive(Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Bool(bool),
    Nil,
    Function(Rc<Function>),
    Block(Rc<Block>),
    NativeFunction(Rc<NativeFunction>),
    Class(Rc<Class>),
    Instance(Rc<RefCell<Instance>>),
    Array(Rc<ArrayWrapper>),
    /// A single array slot, as handed out by `pop`.
    Cell(Rc<ArrayEntry>),
}

impl Value {
    /// `nil` and `NO` are false, everything else (including `0`) is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Cell(cell) => cell.get().is_truthy(),
            _ => true,
        }
    }

    /// Numbers and strings compare by value, `nil` only equals `nil`, and
    /// any other pair compares by truthiness.
    pub fn is_equal(&self, other: &Value) -> bool {
        match (self.resolved(), other.resolved()) {
            (Value::Nil, Value::Nil) => true,
            (Value::Nil, _) | (_, Value::Nil) => false,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (a, b) => a.is_truthy() == b.is_truthy(),
        }
    }

    /// Contents of a cell, or the value itself.
    pub fn resolved(&self) -> Value {
        match self {
            Value::Cell(cell) => cell.get(),
            other => other.clone(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.resolved() {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::Nil => "nil",
            Value::Function(_) => "function",
            Value::Block(_) => "block",
            Value::NativeFunction(_) => "native function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
            Value::Array(_) => "array",
            Value::Cell(cell) => cell.get().kind(),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Nil
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // 3.0 → "3", 0.5 → "0.5"
            Value::Number(n) => write!(f, "{}", n),

            Value::String(s) => write!(f, "{}", s),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Nil => write!(f, "nil"),

            Value::Function(function) => write!(f, "<function {}>", function.name()),

            Value::Block(_) => write!(f, "<block>"),

            Value::NativeFunction(native) => write!(f, "<native fn {}>", native.name),

            Value::Class(class) => write!(f, "{}", class.name),

            Value::Instance(instance) => write!(f, "{} instance", instance.borrow().class.name),

            Value::Array(_) => write!(f, "Array instance"),

            Value::Cell(cell) => write!(f, "{}", cell.get()),
        }
    }
}

// Environments can reach themselves through closures, so Debug stays shallow.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Number(n) => write!(f, "Number({})", n),
            other => write!(f, "{}", other),
        }
    }
}

/// Scalars compare by value, shared objects by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Block(a), Value::Block(b)) => Rc::ptr_eq(a, b),
            (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Cell(a), Value::Cell(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_empty_string_are_truthy() {
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::String(String::new()).is_truthy());
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
    }

    #[test]
    fn equality_is_narrow() {
        assert!(Value::Nil.is_equal(&Value::Nil));
        assert!(!Value::Nil.is_equal(&Value::Bool(false)));
        assert!(Value::Number(2.0).is_equal(&Value::Number(2.0)));
        assert!(!Value::Number(2.0).is_equal(&Value::Number(3.0)));
        // mixed kinds fall back to truthiness
        assert!(Value::String("1".into()).is_equal(&Value::Number(1.0)));
        assert!(Value::Bool(true).is_equal(&Value::Number(7.0)));
        assert!(!Value::Bool(false).is_equal(&Value::Number(0.0)));
    }

    #[test]
    fn numbers_display_without_trailing_zero() {
        assert_eq!(Value::Number(11.0).to_string(), "11");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-0.25).to_string(), "-0.25");
    }

    #[test]
    fn cells_read_through() {
        let cell = Rc::new(ArrayEntry::new(Value::Number(4.0)));
        let value = Value::Cell(Rc::clone(&cell));

        assert_eq!(value.to_string(), "4");
        assert_eq!(value.as_number(), Some(4.0));

        cell.set(Value::Nil);
        assert!(!value.is_truthy());
    }
}

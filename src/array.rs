//! Fixed-length arrays of individually mutable cells.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::value::Value;

/// One slot.  Shared, so a popped cell can still be written through.
#[derive(Default)]
pub struct ArrayEntry {
    value: RefCell<Value>,
}

impl ArrayEntry {
    pub fn new(value: Value) -> Self {
        Self {
            value: RefCell::new(value),
        }
    }

    pub fn get(&self) -> Value {
        self.value.borrow().clone()
    }

    pub fn set(&self, value: Value) {
        *self.value.borrow_mut() = value;
    }
}

pub struct ArrayWrapper {
    contents: RefCell<Vec<Rc<ArrayEntry>>>,
}

impl ArrayWrapper {
    /// `size` cells, all `nil`.
    pub fn with_size(size: usize) -> Self {
        debug!("allocating array of {} entries", size);

        Self {
            contents: RefCell::new((0..size).map(|_| Rc::new(ArrayEntry::default())).collect()),
        }
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            contents: RefCell::new(values.into_iter().map(|v| Rc::new(ArrayEntry::new(v))).collect()),
        }
    }

    pub fn count(&self) -> usize {
        self.contents.borrow().len()
    }

    /// Numeric in-range index → the cell there.
    pub fn entry(&self, index: &Value) -> Option<Rc<ArrayEntry>> {
        let slot: usize = index_of(index)?;

        self.contents.borrow().get(slot).cloned()
    }

    /// Out-of-range or non-numeric indices read as `nil`.
    pub fn get(&self, index: &Value) -> Value {
        self.entry(index).map(|entry| entry.get()).unwrap_or(Value::Nil)
    }

    /// Writes to a missing slot are dropped.
    pub fn set(&self, index: &Value, value: Value) {
        match self.entry(index) {
            Some(entry) => entry.set(value),
            None => debug!("array write out of range ignored"),
        }
    }

    /// Remove the last cell and hand it back.
    pub fn pop(&self) -> Option<Rc<ArrayEntry>> {
        self.contents.borrow_mut().pop()
    }
}

fn index_of(index: &Value) -> Option<usize> {
    let n: f64 = index.as_number()?;

    if n < 0.0 || !n.is_finite() {
        return None;
    }

    Some(n as usize)
}

//! Variable frames.
//!
//! Frames form a singly linked chain from the innermost scope out to the
//! global frame.  Every frame lives behind `Rc<RefCell<_>>` because closures
//! keep the frame they were created in alive after the call returns.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::value::Value;

#[derive(Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap a frame for sharing.
    pub fn shared(self) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(self))
    }

    /// A copy of this frame and its parents, up to `shared_from` (or the
    /// outermost frame), which stays shared.  Later writes to a copied frame
    /// and its source are not seen by the other.
    pub fn snapshot_until(&self, shared_from: &Rc<RefCell<Environment>>) -> Environment {
        let enclosing = self.enclosing.as_ref().map(|parent| {
            let stop = Rc::ptr_eq(parent, shared_from) || parent.borrow().enclosing.is_none();

            if stop {
                Rc::clone(parent)
            } else {
                parent.borrow().snapshot_until(shared_from).shared()
            }
        });

        Environment {
            values: self.values.clone(),
            enclosing,
        }
    }

    /// Always writes into this frame, replacing any existing binding.
    pub fn define(&mut self, name: &str, value: Value) {
        debug!("define '{}'", name);

        self.values.insert(name.to_string(), value);
    }

    /// Look a name up through the chain; unknown names read as `nil`.
    pub fn get(&self, name: &str) -> Value {
        if let Some(value) = self.values.get(name) {
            value.clone()
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Value::Nil
        }
    }

    /// Binding held directly by this frame, ignoring the chain.
    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    /// Update the nearest frame that declared `name`.  Returns `false` when
    /// no frame did; no binding is created in that case.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);
            true
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            debug!("assign to undeclared '{}' ignored", name);
            false
        }
    }

    /// The frame `distance` links up from `env`, if the chain is that long.
    pub fn ancestor(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
    ) -> Option<Rc<RefCell<Environment>>> {
        let mut current: Rc<RefCell<Environment>> = Rc::clone(env);

        for _ in 0..distance {
            let next: Rc<RefCell<Environment>> = current.borrow().enclosing.clone()?;
            current = next;
        }

        Some(current)
    }

    pub fn get_at(env: &Rc<RefCell<Environment>>, distance: usize, name: &str) -> Value {
        match Self::ancestor(env, distance) {
            Some(frame) => frame.borrow().get(name),
            None => Value::Nil,
        }
    }

    /// Writes straight into the frame `distance` links up.
    pub fn assign_at(env: &Rc<RefCell<Environment>>, distance: usize, name: &str, value: Value) {
        if let Some(frame) = Self::ancestor(env, distance) {
            frame.borrow_mut().define(name, value);
        }
    }
}

//! Everything a `Call` expression can invoke, except classes.
//!
//! Each call runs its body in a new frame whose parent is the closure, and
//! catches `return` at that boundary.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::ast::{BlockLiteral, FunctionDecl, Param};
use crate::class::{Class, Instance};
use crate::environment::Environment;
use crate::error::Result;
use crate::interpreter::{Flow, Interpreter};
use crate::value::Value;

pub trait Callable {
    fn arity(&self) -> usize;

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value>;
}

/// Signature of built-in functions.
pub type NativeFn = dyn Fn(&mut Interpreter, &[Value]) -> Result<Value>;

/// Free function or method.
pub struct Function {
    pub declaration: Rc<FunctionDecl>,
    pub closure: Rc<RefCell<Environment>>,
    pub is_static: bool,
}

impl Function {
    pub fn new(declaration: Rc<FunctionDecl>, closure: Rc<RefCell<Environment>>) -> Self {
        Self {
            is_static: declaration.is_static,
            declaration,
            closure,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    /// Specialise this method to `instance`.
    ///
    /// The result shares the declaration but closes over a new frame below
    /// the method's closure holding `self`, `super` (when there is one) and
    /// copies of the instance's methods and properties.
    pub fn bind(&self, instance: &Rc<RefCell<Instance>>, superclass: Option<Rc<Class>>) -> Function {
        let mut frame: Environment = Environment::with_enclosing(Rc::clone(&self.closure));

        frame.define("self", Value::Instance(Rc::clone(instance)));

        if let Some(superclass) = superclass {
            frame.define("super", Value::Class(superclass));
        }

        {
            let this = instance.borrow();

            for name in this.methods.keys() {
                let method: Value = match this.find_method(name) {
                    Some(method) => Value::Function(method),
                    None => Value::Nil,
                };
                frame.define(name, method);
            }

            for (name, value) in &this.properties {
                frame.define(name, value.clone());
            }
        }

        Function {
            declaration: Rc::clone(&self.declaration),
            closure: frame.shared(),
            is_static: self.is_static,
        }
    }
}

impl Callable for Function {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value> {
        debug!("calling function '{}'", self.name());

        let frame = bind_params(&self.closure, &self.declaration.params, arguments);

        match interpreter.execute_block(&self.declaration.body, frame)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

/// A block literal evaluated at runtime.  Its closure is a snapshot of the
/// frames it was created in, up to the built-ins, so later writes to those
/// frames go unseen.
pub struct Block {
    pub literal: Rc<BlockLiteral>,
    pub closure: Rc<RefCell<Environment>>,
}

impl Block {
    /// Every frame from `defining` out to `shared_from` is copied, so a
    /// loop variable is captured with the value it has now.
    pub fn new(
        literal: Rc<BlockLiteral>,
        defining: &Rc<RefCell<Environment>>,
        shared_from: &Rc<RefCell<Environment>>,
    ) -> Self {
        Self {
            literal,
            closure: defining.borrow().snapshot_until(shared_from).shared(),
        }
    }
}

impl Callable for Block {
    fn arity(&self) -> usize {
        self.literal.params.len()
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value> {
        debug!("calling block with {} arguments", arguments.len());

        let frame = bind_params(&self.closure, &self.literal.params, arguments);

        match interpreter.execute_block(&self.literal.body, frame)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub func: Rc<NativeFn>,
}

impl NativeFunction {
    pub fn new<F>(name: &str, arity: usize, func: F) -> Self
    where
        F: Fn(&mut Interpreter, &[Value]) -> Result<Value> + 'static,
    {
        Self {
            name: name.to_string(),
            arity,
            func: Rc::new(func),
        }
    }
}

impl Callable for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value> {
        debug!("calling native '{}'", self.name);

        (self.func)(interpreter, &arguments)
    }
}

/// New frame below `closure` with each parameter bound; missing arguments
/// are `nil` and extra ones are dropped.
fn bind_params(
    closure: &Rc<RefCell<Environment>>,
    params: &[Param],
    arguments: Vec<Value>,
) -> Rc<RefCell<Environment>> {
    let mut frame: Environment = Environment::with_enclosing(Rc::clone(closure));
    let mut arguments = arguments.into_iter();

    for param in params {
        frame.define(&param.name.lexeme, arguments.next().unwrap_or(Value::Nil));
    }

    frame.shared()
}

//! Classes and their instances.
//!
//! A class owns its property defaults and a method table.  The table is the
//! one piece of runtime state filled in after construction: `@interface`
//! creates the class and each `@implementation` merges bodies into it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::callable::{Function, NativeFunction};
use crate::value::Value;

pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<Class>>,
    /// Default value of every declared property, inherited ones included.
    pub properties: HashMap<String, Value>,
    methods: RefCell<HashMap<String, Rc<Function>>>,
}

impl Class {
    pub fn new(
        name: impl Into<String>,
        superclass: Option<Rc<Class>>,
        properties: HashMap<String, Value>,
    ) -> Self {
        Self {
            name: name.into(),
            superclass,
            properties,
            methods: RefCell::new(HashMap::new()),
        }
    }

    /// Last write wins.
    pub fn define_method(&self, name: &str, method: Rc<Function>) {
        debug!("{}: implementing method '{}'", self.name, name);

        self.methods.borrow_mut().insert(name.to_string(), method);
    }

    /// Walk up the superclass chain for `name`.
    ///
    /// Through a bare class reference only static methods are visible;
    /// lookups made for an instance or through `super` see every method.
    /// The second element is the superclass of the class that defines the
    /// method, which becomes `super` once the method is bound.
    pub fn find_method(
        &self,
        name: &str,
        from_instance: bool,
        from_super: bool,
    ) -> Option<(Rc<Function>, Option<Rc<Class>>)> {
        if let Some(method) = self.methods.borrow().get(name) {
            if method.is_static || from_instance || from_super {
                return Some((Rc::clone(method), self.superclass.clone()));
            }
        }

        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name, from_instance, from_super))
    }

    fn method_table(&self) -> HashMap<String, Rc<Function>> {
        self.methods.borrow().clone()
    }

    /// Static member access on the class itself.  `alloc` is always
    /// answered, falling back to a built-in allocator.
    pub fn get_static(class: &Rc<Class>, name: &str) -> Option<Value> {
        if let Some((method, _)) = class.find_method(name, false, false) {
            return Some(Value::Function(method));
        }

        if name == "alloc" {
            let class: Rc<Class> = Rc::clone(class);

            return Some(Value::NativeFunction(Rc::new(NativeFunction::new(
                "alloc",
                0,
                move |_, _| Ok(Value::Instance(Class::allocate(&class))),
            ))));
        }

        None
    }

    /// A fresh instance.  No initialiser runs.
    pub fn allocate(class: &Rc<Class>) -> Rc<RefCell<Instance>> {
        debug!("allocating instance of {}", class.name);

        Rc::new(RefCell::new(Instance::new(Rc::clone(class))))
    }
}

pub struct Instance {
    pub class: Rc<Class>,
    pub properties: HashMap<String, Value>,
    /// Seeded from the class table; may be overridden per instance.
    pub methods: HashMap<String, Rc<Function>>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Self {
            properties: class.properties.clone(),
            methods: class.method_table(),
            class,
        }
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.properties.insert(name.to_string(), value);
    }

    /// Whether `name` is a property or a method of this object.
    pub fn has_member(&self, name: &str) -> bool {
        self.properties.contains_key(name)
            || self.methods.contains_key(name)
            || self.class.find_method(name, true, false).is_some()
    }

    /// Unbound method visible to this instance.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        match self.class.find_method(name, true, false) {
            Some((method, _)) => Some(method),
            None => self.methods.get(name).cloned(),
        }
    }

    /// Property, then method bound to `this`, then the built-in `init`.
    pub fn get(this: &Rc<RefCell<Instance>>, name: &str) -> Option<Value> {
        let (class, own_method) = {
            let instance = this.borrow();

            if let Some(value) = instance.properties.get(name) {
                return Some(value.clone());
            }

            (Rc::clone(&instance.class), instance.methods.get(name).cloned())
        };

        if let Some((method, superclass)) = class.find_method(name, true, false) {
            // static methods already close over their own `self` frame
            if method.is_static {
                return Some(Value::Function(method));
            }
            return Some(Value::Function(Rc::new(method.bind(this, superclass))));
        }

        if let Some(method) = own_method {
            return Some(Value::Function(method));
        }

        if name == "init" {
            return Some(Instance::builtin_init(this));
        }

        None
    }

    /// `init` for classes that do not define one: answers the receiver.
    pub fn builtin_init(this: &Rc<RefCell<Instance>>) -> Value {
        let this: Rc<RefCell<Instance>> = Rc::clone(this);

        Value::NativeFunction(Rc::new(NativeFunction::new("init", 0, move |_, _| {
            Ok(Value::Instance(Rc::clone(&this)))
        })))
    }
}

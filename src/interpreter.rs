//! Tree-walking evaluator.
//!
//! The interpreter owns one "current environment" pointer, swapped on every
//! block entry and call and restored on every exit path.  `return` is not an
//! error: statement execution yields a [`Flow`] and the call boundaries in
//! `callable` turn `Flow::Return` into the call's value.  Everything that
//! does fail bubbles up as an [`ObjcError`] to [`Interpreter::interpret`],
//! which appends an error marker to the output and stops.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::mem;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::array::ArrayWrapper;
use crate::ast::{ClassDef, ClassImpl, Expr, ExprId, LiteralValue, Stmt, TypeAnnotation};
use crate::callable::{Block, Callable, Function, NativeFunction};
use crate::class::{Class, Instance};
use crate::environment::Environment;
use crate::error::{ObjcError, Result};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Appended to the output when a program fails.
pub const ERROR_MARKER: &str = "\nERROR";

/// How a statement finished.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Return(Value),
}

pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    /// Frame of the program's top-level declarations, just below `globals`.
    top_level: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
    printed: String,
    last_error: Option<ObjcError>,
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Interpreter whose `readLine` / `printLine` use the process stdio.
    pub fn new() -> Self {
        Self::with_io(
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        )
    }

    pub fn with_io(input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals = Environment::new().shared();
        define_builtins(&mut globals.borrow_mut());

        let top_level = Environment::with_enclosing(Rc::clone(&globals)).shared();

        Self {
            globals,
            environment: Rc::clone(&top_level),
            top_level,
            locals: HashMap::new(),
            printed: String::new(),
            last_error: None,
            input,
            output,
        }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Run a program.  The first failure (or a `return` outside any call)
    /// appends [`ERROR_MARKER`] to the output and ends the run.
    pub fn interpret(&mut self, statements: &[Stmt]) {
        info!("Interpreting {} statements", statements.len());

        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}

                Ok(Flow::Return(_)) => {
                    warn!("'return' outside of a function");
                    self.fail(ObjcError::Runtime(
                        "'return' used outside of a function".to_string(),
                    ));
                    return;
                }

                Err(err) => {
                    warn!("{}", err);
                    self.fail(err);
                    return;
                }
            }
        }

        info!("Interpretation completed successfully");
    }

    /// Record the binding depth of a variable reference.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Printed text so far, with the two-character `\n` turned into a line
    /// break.
    pub fn output(&self) -> String {
        self.printed.replace("\\n", "\n")
    }

    /// Like [`output`](Self::output) but empties the buffer.
    pub fn take_output(&mut self) -> String {
        mem::take(&mut self.printed).replace("\\n", "\n")
    }

    /// The failure that stopped the last `interpret` call, if any.
    pub fn last_error(&self) -> Option<&ObjcError> {
        self.last_error.as_ref()
    }

    /// A top-level binding or built-in, `nil` when there is none.
    pub fn global(&self, name: &str) -> Value {
        self.top_level.borrow().get(name)
    }

    /// Whether `name` is one of the built-ins every interpreter starts with.
    pub fn is_builtin(&self, name: &str) -> bool {
        self.globals.borrow().get_local(name).is_some()
    }

    fn fail(&mut self, err: ObjcError) {
        self.printed.push_str(ERROR_MARKER);
        self.last_error = Some(err);
    }

    // ──────────────────────── statements ──────────────────────────

    /// Run `statements` with `env` as the current environment, restoring
    /// the previous one however the block exits.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        env: Rc<RefCell<Environment>>,
    ) -> Result<Flow> {
        let previous = mem::replace(&mut self.environment, env);
        let result = self.execute_all(statements);
        self.environment = previous;

        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> Result<Flow> {
        for stmt in statements {
            if let Flow::Return(value) = self.execute(stmt)? {
                return Ok(Flow::Return(value));
            }
        }

        Ok(Flow::Normal)
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?.resolved();

                if !matches!(value, Value::Nil) {
                    debug!("print {}", value);
                    self.printed.push_str(&value.to_string());
                    self.printed.push('\n');
                }
            }

            Stmt::Var(decl) => {
                let value: Value = match &decl.initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}'", decl.name.lexeme);
                self.environment.borrow_mut().define(&decl.name.lexeme, value);
            }

            Stmt::Function(decl) => {
                debug!("Defining function '{}'", decl.name.lexeme);

                let function = Function::new(Rc::clone(decl), Rc::clone(&self.environment));
                self.environment
                    .borrow_mut()
                    .define(&decl.name.lexeme, Value::Function(Rc::new(function)));
            }

            Stmt::Block(statements) => {
                let env = Environment::with_enclosing(Rc::clone(&self.environment)).shared();

                return self.execute_block(statements, env);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch);
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }

            // The initializer's bindings live in the current frame for the
            // whole loop.
            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => {
                if let Some(init) = initializer {
                    if let Flow::Return(value) = self.execute(init)? {
                        return Ok(Flow::Return(value));
                    }
                }

                loop {
                    // no condition reads as nil, which ends the loop
                    let Some(condition) = condition else { break };
                    if !self.evaluate(condition)?.is_truthy() {
                        break;
                    }

                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }

                    if let Some(increment) = increment {
                        self.evaluate(increment)?;
                    }
                }
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                return Ok(Flow::Return(value));
            }

            Stmt::ClassDef(def) => self.define_class(def)?,

            Stmt::ClassImpl(imp) => self.implement_class(imp),

            Stmt::TypeDef { .. } => {}
        }

        Ok(Flow::Normal)
    }

    fn define_class(&mut self, def: &ClassDef) -> Result<()> {
        let superclass: Option<Rc<Class>> = match &def.superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                other => {
                    debug!("superclass of '{}' is {}, ignored", def.name.lexeme, other.kind());
                    None
                }
            },
            None => None,
        };

        let name: &str = &def.name.lexeme;
        self.environment.borrow_mut().define(name, Value::Nil);

        let mut properties: HashMap<String, Value> = superclass
            .as_ref()
            .map(|class| class.properties.clone())
            .unwrap_or_default();

        for property in &def.properties {
            let value: Value = match &property.initializer {
                Some(expr) => self.evaluate(expr)?,
                None => default_for_type(&property.ty),
            };
            properties.insert(property.name.lexeme.clone(), value);
        }

        info!(
            "Declared class '{}' with {} properties",
            name,
            properties.len()
        );

        let class = Class::new(name, superclass, properties);
        self.environment
            .borrow_mut()
            .assign(name, Value::Class(Rc::new(class)));

        Ok(())
    }

    /// Merge method bodies into the class declared earlier.  Instance
    /// methods close over the current frame (binding adds `self` later);
    /// static methods get a frame of their own holding `self` and `super`.
    fn implement_class(&mut self, imp: &ClassImpl) {
        let class: Rc<Class> = match self.environment.borrow().get(&imp.name.lexeme) {
            Value::Class(class) => class,
            _ => {
                warn!("@implementation of undeclared class '{}'", imp.name.lexeme);
                return;
            }
        };

        for method in &imp.methods {
            let closure: Rc<RefCell<Environment>> = if method.is_static {
                let mut frame = Environment::with_enclosing(Rc::clone(&self.environment));
                frame.define("self", Value::Class(Rc::clone(&class)));
                frame.define(
                    "super",
                    class.superclass.clone().map_or(Value::Nil, Value::Class),
                );
                frame.shared()
            } else {
                Rc::clone(&self.environment)
            };

            class.define_method(
                &method.name.lexeme,
                Rc::new(Function::new(Rc::clone(method), closure)),
            );
        }
    }

    // ──────────────────────── expressions ─────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right: Value = self.evaluate(right)?;

                match operator.token_type {
                    TokenType::MINUS => match right.as_number() {
                        Some(n) => Ok(Value::Number(-n)),
                        None => Err(ObjcError::type_mismatch(
                            operator.line,
                            "-",
                            right.kind(),
                        )),
                    },
                    _ => Ok(Value::Bool(!right.is_truthy())),
                }
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;
                let right: Value = self.evaluate(right)?;

                self.evaluate_binary(operator, left, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left: bool = self.evaluate(left)?.is_truthy();

                if operator.token_type == TokenType::OR && left {
                    return Ok(Value::Bool(true));
                }
                if operator.token_type == TokenType::AND && !left {
                    return Ok(Value::Bool(false));
                }

                Ok(Value::Bool(self.evaluate(right)?.is_truthy()))
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }

            Expr::Variable { id, name } => Ok(self.look_up_variable(*id, name)),

            Expr::Selfy { id, keyword } | Expr::Supery { id, keyword } => {
                Ok(self.look_up_variable(*id, keyword))
            }

            Expr::Assign {
                id,
                name,
                operator,
                value,
            } => {
                let value: Value = self.evaluate(value)?;

                let new_value: Value = if is_compound(operator) {
                    let current: Value = self.look_up_variable(*id, name);
                    plus(current, value, operator)?
                } else {
                    value
                };

                self.assign_variable(*id, name, new_value.clone());

                Ok(new_value)
            }

            Expr::Array(elements) => {
                let mut values: Vec<Value> = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }

                Ok(Value::Array(Rc::new(ArrayWrapper::from_values(values))))
            }

            Expr::ArrayGet { object, index } => {
                let object: Value = self.evaluate(object)?.resolved();
                let index: Value = self.evaluate(index)?;

                Ok(match object {
                    Value::Array(array) => array.get(&index),

                    Value::String(s) => index
                        .as_number()
                        .filter(|n| *n >= 0.0)
                        .and_then(|n| s.chars().nth(n as usize))
                        .map_or(Value::Nil, |c| Value::String(c.to_string())),

                    _ => Value::Nil,
                })
            }

            Expr::ArraySet {
                object,
                index,
                value,
                operator,
            } => {
                let Value::Array(array) = self.evaluate(object)?.resolved() else {
                    return Ok(Value::Nil);
                };

                let index: Value = self.evaluate(index)?;
                let value: Value = self.evaluate(value)?;

                let new_value: Value = if is_compound(operator) {
                    plus(array.get(&index), value, operator)?
                } else {
                    value
                };

                array.set(&index, new_value.clone());

                Ok(new_value)
            }

            Expr::Get { object, name } => {
                let from_super: bool = matches!(**object, Expr::Supery { .. });
                let object: Value = self.evaluate(object)?.resolved();

                Ok(self.get_member(object, &name.lexeme, from_super))
            }

            Expr::Set {
                object,
                name,
                value,
                operator,
            } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    let value: Value = self.evaluate(value)?;

                    let new_value: Value = if is_compound(operator) {
                        let current = Instance::get(&instance, &name.lexeme).unwrap_or(Value::Nil);
                        plus(current, value, operator)?
                    } else {
                        value
                    };

                    instance.borrow_mut().set(&name.lexeme, new_value.clone());

                    Ok(new_value)
                }

                Value::Cell(cell) => {
                    let value: Value = self.evaluate(value)?;
                    cell.set(value.clone());

                    Ok(value)
                }

                _ => Ok(Value::Nil),
            },

            Expr::Call {
                callee, arguments, ..
            } => {
                let callee: Value = self.evaluate(callee)?.resolved();

                let mut args: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                self.call_value(callee, args)
            }

            Expr::BlockLiteral(literal) => Ok(Value::Block(Rc::new(Block::new(
                Rc::clone(literal),
                &self.environment,
                &self.globals,
            )))),

            Expr::TypeAnnotation(_) | Expr::BlockSignature(_) => Ok(Value::Nil),
        }
    }

    fn evaluate_binary(&mut self, operator: &Token, left: Value, right: Value) -> Result<Value> {
        if operator.token_type == TokenType::PLUS {
            return plus(left, right, operator);
        }

        let numbers = |symbol: &str| -> Result<(f64, f64)> {
            match (left.as_number(), right.as_number()) {
                (Some(a), Some(b)) => Ok((a, b)),
                _ => Err(ObjcError::type_mismatch(
                    operator.line,
                    symbol,
                    format!("{} and {}", left.kind(), right.kind()),
                )),
            }
        };

        let result: Value = match operator.token_type {
            TokenType::MINUS => {
                let (a, b) = numbers("-")?;
                Value::Number(a - b)
            }
            TokenType::STAR => {
                let (a, b) = numbers("*")?;
                Value::Number(a * b)
            }
            TokenType::SLASH => {
                let (a, b) = numbers("/")?;
                Value::Number(a / b)
            }
            TokenType::PERCENT => {
                let (a, b) = numbers("%")?;
                Value::Number(a % b)
            }

            TokenType::GREATER => {
                let (a, b) = numbers(">")?;
                Value::Bool(a > b)
            }
            TokenType::GREATER_EQUAL => {
                let (a, b) = numbers(">=")?;
                Value::Bool(a >= b)
            }
            TokenType::LESS => {
                let (a, b) = numbers("<")?;
                Value::Bool(a < b)
            }
            TokenType::LESS_EQUAL => {
                let (a, b) = numbers("<=")?;
                Value::Bool(a <= b)
            }

            TokenType::EQUAL_EQUAL => Value::Bool(left.is_equal(&right)),
            TokenType::BANG_EQUAL => Value::Bool(!left.is_equal(&right)),

            _ => {
                return Err(ObjcError::Runtime(format!(
                    "[line {}] unknown binary operator '{}'",
                    operator.line, operator.lexeme
                )))
            }
        };

        Ok(result)
    }

    /// Member access on an evaluated receiver.
    fn get_member(&mut self, object: Value, name: &str, from_super: bool) -> Value {
        match object {
            Value::Instance(instance) => Instance::get(&instance, name).unwrap_or(Value::Nil),

            Value::Array(array) => array_member(&array, name),

            Value::Class(class) if from_super => {
                let receiver = match self.environment.borrow().get("self") {
                    Value::Instance(instance) => Some(instance),
                    _ => None,
                };

                match (class.find_method(name, false, true), receiver) {
                    (Some((method, _)), _) if method.is_static => Value::Function(method),
                    // rebind to the same receiver, one class further up
                    (Some((method, superclass)), Some(receiver)) => {
                        Value::Function(Rc::new(method.bind(&receiver, superclass)))
                    }
                    // an instance method needs an instance to bind to
                    (Some(_), None) => Value::Nil,
                    (None, Some(receiver)) if name == "init" => Instance::builtin_init(&receiver),
                    (None, _) => Class::get_static(&class, name).unwrap_or(Value::Nil),
                }
            }

            Value::Class(class) => Class::get_static(&class, name).unwrap_or(Value::Nil),

            other => {
                debug!("'{}' looked up on {}", name, other.kind());
                Value::Nil
            }
        }
    }

    /// Calling anything that is not callable yields `nil`.
    fn call_value(&mut self, callee: Value, args: Vec<Value>) -> Result<Value> {
        let arity: Option<usize> = match &callee {
            Value::Function(function) => Some(function.arity()),
            Value::Block(block) => Some(block.arity()),
            Value::NativeFunction(native) => Some(native.arity()),
            _ => None,
        };
        if let Some(arity) = arity.filter(|arity| *arity != args.len()) {
            debug!("expected {} arguments but got {}", arity, args.len());
        }

        match callee {
            Value::Function(function) => function.call(self, args),
            Value::Block(block) => block.call(self, args),
            Value::NativeFunction(native) => native.call(self, args),
            Value::Class(class) => Ok(Value::Instance(Class::allocate(&class))),
            other => {
                debug!("call on non-callable {}", other.kind());
                Ok(Value::Nil)
            }
        }
    }

    // ───────────────────────── variables ──────────────────────────

    /// The instance whose members are implicitly in scope in `frame`.
    fn receiver_in(frame: &Rc<RefCell<Environment>>, name: &str) -> Option<Rc<RefCell<Instance>>> {
        if name == "self" || name == "super" {
            return None;
        }

        match frame.borrow().get_local("self") {
            Some(Value::Instance(instance)) if instance.borrow().has_member(name) => Some(instance),
            _ => None,
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Value {
        // Unresolved names are globals, or top-level names used before
        // their declaration.
        let Some(&depth) = self.locals.get(&id) else {
            return self.top_level.borrow().get(&name.lexeme);
        };

        let Some(frame) = Environment::ancestor(&self.environment, depth) else {
            return Value::Nil;
        };

        if let Some(instance) = Self::receiver_in(&frame, &name.lexeme) {
            return Instance::get(&instance, &name.lexeme).unwrap_or(Value::Nil);
        }

        let value = frame.borrow().get(&name.lexeme);
        value
    }

    fn assign_variable(&mut self, id: ExprId, name: &Token, value: Value) {
        let Some(&depth) = self.locals.get(&id) else {
            self.top_level.borrow_mut().assign(&name.lexeme, value);
            return;
        };

        if let Some(frame) = Environment::ancestor(&self.environment, depth) {
            if let Some(instance) = Self::receiver_in(&frame, &name.lexeme) {
                if instance.borrow().properties.contains_key(&name.lexeme) {
                    instance.borrow_mut().set(&name.lexeme, value);
                    return;
                }
            }
        }

        Environment::assign_at(&self.environment, depth, &name.lexeme, value);
    }

    // ───────────────────────── built-in I/O ───────────────────────

    /// One line from the input without its terminator; `nil` at end of input.
    pub(crate) fn read_line(&mut self) -> Result<Value> {
        let mut bytes: Vec<u8> = Vec::new();

        if self.input.read_until(b'\n', &mut bytes)? == 0 {
            return Ok(Value::Nil);
        }

        let line: String = String::from_utf8(bytes)?;
        let trimmed: &str = line.trim_end_matches(['\n', '\r']);

        Ok(Value::String(trimmed.to_string()))
    }

    pub(crate) fn write_line(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        self.output.flush()?;

        Ok(())
    }
}

fn is_compound(operator: &Token) -> bool {
    matches!(
        operator.token_type,
        TokenType::PLUS_EQUAL | TokenType::PLUS_PLUS
    )
}

/// `+`: numbers add, strings concatenate, and a number next to a string is
/// rendered in its shortest form first.  `nil` takes part as `"nil"`.
fn plus(left: Value, right: Value, operator: &Token) -> Result<Value> {
    let nil_as_text = |value: Value| match value.resolved() {
        Value::Nil => Value::String("nil".to_string()),
        other => other,
    };

    match (nil_as_text(left), nil_as_text(right)) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

        (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),

        (Value::Number(a), Value::String(b)) => {
            Ok(Value::String(format!("{}{}", Value::Number(a), b)))
        }

        (Value::String(a), Value::Number(b)) => {
            Ok(Value::String(format!("{}{}", a, Value::Number(b))))
        }

        (a, b) => Err(ObjcError::type_mismatch(
            operator.line,
            "+",
            format!("{} and {}", a.kind(), b.kind()),
        )),
    }
}

/// Initial value of a property declared without an initializer.
fn default_for_type(ty: &TypeAnnotation) -> Value {
    let Some(token) = &ty.token else {
        return Value::Nil;
    };

    match token.token_type {
        TokenType::INT | TokenType::FLOAT | TokenType::DOUBLE => Value::Number(0.0),
        TokenType::STRING_TYPE => Value::String(String::new()),
        TokenType::CLASS_IDENTIFIER => match token.lexeme.as_str() {
            "NSString" | "NSMutableString" => Value::String(String::new()),
            "NSInteger" => Value::Number(0.0),
            _ => Value::Nil,
        },
        _ => Value::Nil,
    }
}

/// `count` and `pop` on arrays.
fn array_member(array: &Rc<ArrayWrapper>, name: &str) -> Value {
    let array: Rc<ArrayWrapper> = Rc::clone(array);

    match name {
        "count" => Value::NativeFunction(Rc::new(NativeFunction::new("count", 0, move |_, _| {
            Ok(Value::Number(array.count() as f64))
        }))),

        "pop" => Value::NativeFunction(Rc::new(NativeFunction::new("pop", 0, move |_, _| {
            Ok(array.pop().map_or(Value::Nil, Value::Cell))
        }))),

        _ => Value::Nil,
    }
}

fn define_builtins(globals: &mut Environment) {
    debug!("Defining built-in functions");

    globals.define(
        "clock",
        Value::NativeFunction(Rc::new(NativeFunction::new("clock", 0, |_, _| {
            let now = chrono::Utc::now();
            Ok(Value::Number(now.timestamp_millis() as f64 / 1000.0))
        }))),
    );

    globals.define(
        "array",
        Value::NativeFunction(Rc::new(NativeFunction::new("array", 1, |_, args| {
            let size: usize = args
                .first()
                .and_then(Value::as_number)
                .filter(|n| *n > 0.0)
                .map_or(0, |n| n as usize);

            Ok(Value::Array(Rc::new(ArrayWrapper::with_size(size))))
        }))),
    );

    globals.define(
        "readLine",
        Value::NativeFunction(Rc::new(NativeFunction::new("readLine", 0, |interpreter, _| {
            interpreter.read_line()
        }))),
    );

    globals.define(
        "printLine",
        Value::NativeFunction(Rc::new(NativeFunction::new("printLine", 1, |interpreter, args| {
            let text: String = match args.first().map(Value::resolved) {
                Some(Value::Nil) | None => String::new(),
                Some(value) => value.to_string().replace("\\n", "\n"),
            };

            interpreter.write_line(&text)?;

            Ok(Value::Nil)
        }))),
    );

    globals.define(
        "Int",
        Value::NativeFunction(Rc::new(NativeFunction::new("Int", 1, |_, args| {
            Ok(match args.first().map(Value::resolved) {
                Some(Value::String(s)) => s
                    .trim()
                    .parse::<f64>()
                    .map_or(Value::Nil, Value::Number),
                _ => Value::Number(0.0),
            })
        }))),
    );

    globals.define(
        "NSObject",
        Value::Class(Rc::new(Class::new("NSObject", None, HashMap::new()))),
    );
}

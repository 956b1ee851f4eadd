//! Static resolver pass.
//!
//! One walk over the AST that tracks a stack of lexical scopes and tells the
//! interpreter, for each variable reference, how many frames up its binding
//! lives.  References not found in any scope are left unrecorded and become
//! global lookups at runtime.  There is no error channel.
//!
//! Inside an `@implementation`, names that miss every method-local scope are
//! matched against the class's members (properties and methods, inherited
//! ones included) and recorded at the implementation scope.  At runtime that
//! scope corresponds to the frame built by `Function::bind`, so a bare
//! `count` in a method body means `self.count`.

use std::collections::{HashMap, HashSet};

use crate::ast::{ClassDef, ClassImpl, Expr, ExprId, FunctionDecl, Param, Stmt};
use crate::interpreter::Interpreter;
use crate::token::Token;
use log::{debug, info};

pub struct Resolver<'interp> {
    interpreter: &'interp mut Interpreter,
    scopes: Vec<HashSet<String>>,
    /// Class name → implicitly accessible member names.
    class_members: HashMap<String, HashSet<String>>,
    /// Class whose `@implementation` is being resolved, with the index of
    /// its scope.
    current_impl: Option<(String, usize)>,
}

impl<'interp> Resolver<'interp> {
    /// Create a resolver bound to `interpreter`.  The outermost scope stands
    /// for the interpreter's top-level frame.
    pub fn new(interpreter: &'interp mut Interpreter) -> Self {
        info!("Resolver instantiated");

        Resolver {
            interpreter,
            scopes: vec![HashSet::new()],
            class_members: HashMap::new(),
            current_impl: None,
        }
    }

    /// Walk all top-level statements.
    pub fn resolve(&mut self, statements: &[Stmt]) {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                for s in statements {
                    self.resolve_stmt(s);
                }
                self.end_scope();
            }

            Stmt::Var(decl) => {
                if let Some(expr) = &decl.initializer {
                    self.resolve_expr(expr);
                }
                self.define(&decl.name);
            }

            Stmt::Function(decl) => {
                // the name is visible inside its own body
                self.define(&decl.name);
                self.resolve_function(decl);
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expr(expr),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            // No scope of its own: the loop variable lives in the enclosing
            // frame and is shared by every iteration.
            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => {
                if let Some(init) = initializer {
                    self.resolve_stmt(init);
                }
                if let Some(cond) = condition {
                    self.resolve_expr(cond);
                }
                if let Some(inc) = increment {
                    self.resolve_expr(inc);
                }
                self.resolve_stmt(body);
            }

            Stmt::Return { value, .. } => {
                if let Some(expr) = value {
                    self.resolve_expr(expr);
                }
            }

            Stmt::ClassDef(def) => self.resolve_class_def(def),

            Stmt::ClassImpl(imp) => self.resolve_class_impl(imp),

            Stmt::TypeDef { .. } => {}
        }
    }

    fn resolve_class_def(&mut self, def: &ClassDef) {
        self.define(&def.name);

        let mut members: HashSet<String> = HashSet::new();

        if let Some(superclass) = &def.superclass {
            self.resolve_expr(superclass);

            if let Expr::Variable { name, .. } = superclass {
                if let Some(inherited) = self.class_members.get(&name.lexeme) {
                    members.extend(inherited.iter().cloned());
                }
            }
        }

        for property in &def.properties {
            if let Some(expr) = &property.initializer {
                self.resolve_expr(expr);
            }
            members.insert(property.name.lexeme.clone());
        }

        for method in &def.methods {
            members.insert(method.name.lexeme.clone());
        }

        debug!(
            "Class '{}' exposes {} implicit member(s)",
            def.name.lexeme,
            members.len()
        );

        self.class_members
            .entry(def.name.lexeme.clone())
            .or_default()
            .extend(members);
    }

    fn resolve_class_impl(&mut self, imp: &ClassImpl) {
        self.begin_scope();
        self.define_name("self");
        self.define_name("super");

        let members = self.class_members.entry(imp.name.lexeme.clone()).or_default();
        for method in &imp.methods {
            members.insert(method.name.lexeme.clone());
        }

        let enclosing = self
            .current_impl
            .replace((imp.name.lexeme.clone(), self.scopes.len() - 1));

        for method in &imp.methods {
            self.resolve_function(method);
        }

        self.current_impl = enclosing;
        self.end_scope();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) | Expr::TypeAnnotation(_) | Expr::BlockSignature(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner),

            Expr::Unary { right, .. } => self.resolve_expr(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_expr(then_branch);
                self.resolve_expr(else_branch);
            }

            Expr::Variable { id, name } => self.resolve_local(*id, name),

            Expr::Selfy { id, keyword } | Expr::Supery { id, keyword } => {
                self.resolve_local(*id, keyword)
            }

            Expr::Assign { id, name, value, .. } => {
                // First resolve RHS, then bind LHS
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }

            Expr::Array(elements) => {
                for element in elements {
                    self.resolve_expr(element);
                }
            }

            Expr::ArrayGet { object, index } => {
                self.resolve_expr(object);
                self.resolve_expr(index);
            }

            Expr::ArraySet {
                object,
                index,
                value,
                ..
            } => {
                self.resolve_expr(object);
                self.resolve_expr(index);
                self.resolve_expr(value);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }

            Expr::Get { object, .. } => self.resolve_expr(object),

            Expr::Set { object, value, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(value);
            }

            Expr::BlockLiteral(literal) => {
                self.resolve_body(&literal.params, &literal.body);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_function(&mut self, decl: &FunctionDecl) {
        self.resolve_body(&decl.params, &decl.body);
    }

    /// Enter a fresh scope for parameters + body.
    fn resolve_body(&mut self, params: &[Param], body: &[Stmt]) {
        self.begin_scope();
        for param in params {
            self.define(&param.name);
        }
        for stmt in body {
            self.resolve_stmt(stmt);
        }
        self.end_scope();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashSet::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    #[inline]
    fn define(&mut self, name: &Token) {
        self.define_name(&name.lexeme);
    }

    /// Idempotent.
    fn define_name(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            if !scope.contains(name) {
                scope.insert(name.to_string());
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding-distance helper
    // ─────────────────────────────────────────────────────────────────────────

    fn is_member(&self, class: &str, name: &str) -> bool {
        self.class_members
            .get(class)
            .is_some_and(|members| members.contains(name))
    }

    /// Record the distance to the innermost scope declaring `name`.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        let innermost: usize = self.scopes.len() - 1;

        for (index, scope) in self.scopes.iter().enumerate().rev() {
            let implicit_member: bool = match &self.current_impl {
                Some((class, impl_index)) if *impl_index == index => {
                    self.is_member(class, &name.lexeme)
                }
                _ => false,
            };

            if scope.contains(&name.lexeme) || implicit_member {
                let depth: usize = innermost - index;

                debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                self.interpreter.resolve(id, depth);

                return;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }
}

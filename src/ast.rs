//! Abstract syntax tree: two closed families, [`Expr`] and [`Stmt`].
//!
//! Nodes own their children outright and are never mutated after the parser
//! builds them.  Function and block bodies sit behind `Rc` so runtime
//! closures can share a declaration without cloning it.
//!
//! Nodes that can refer to a variable (`Assign`, `Variable`, `Selfy`,
//! `Supery`) carry an [`ExprId`]; the resolver's depth table is keyed by it.

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;

/// Identity of a variable-referencing expression node.
///
/// Two structurally identical nodes still get distinct ids.  Ids come from a
/// process-wide counter, so tables built for different parses never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(usize);

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

impl ExprId {
    pub fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A **literal constant** that appears directly in the source code.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal, always an `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// `YES`
    True,

    /// `NO`
    False,

    /// `nil`
    Nil,
}

/// A declared type: either a plain type token (`int`, `NSString`, a typedef
/// name) or a block-pointer signature.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeAnnotation {
    pub token: Option<Token>,
    pub signature: Option<Box<BlockSignature>>,
}

impl TypeAnnotation {
    pub fn simple(token: Token) -> Self {
        Self {
            token: Some(token),
            signature: None,
        }
    }

    pub fn block(signature: BlockSignature) -> Self {
        Self {
            token: None,
            signature: Some(Box::new(signature)),
        }
    }
}

/// `returnType (^name)(paramTypes...)`
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSignature {
    pub return_type: TypeAnnotation,
    pub name: Option<Token>,
    pub params: Vec<TypeAnnotation>,
}

/// A typed parameter of a function, method or block literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: TypeAnnotation,
    pub name: Token,
}

/// `^returnType(params) { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLiteral {
    pub return_type: Option<TypeAnnotation>,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `name = value`, `name += value`, `name++`
    Assign {
        id: ExprId,
        name: Token,
        /// `=`, `+=` or `++`
        operator: Token,
        value: Box<Expr>,
    },

    /// `condition ? then : else`
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    /// Short-circuiting `&&` / `||`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Infix operator expression, `a + b`, `x <= y`.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Prefix `!` / `-`.
    Unary { operator: Token, right: Box<Expr> },

    /// Parenthesised sub-expression.
    Grouping(Box<Expr>),

    Literal(LiteralValue),

    Variable { id: ExprId, name: Token },

    /// `@[a, b, c]`
    Array(Vec<Expr>),

    /// `object[index]`
    ArrayGet { object: Box<Expr>, index: Box<Expr> },

    /// `object[index] = value`
    ArraySet {
        object: Box<Expr>,
        index: Box<Expr>,
        value: Box<Expr>,
        operator: Token,
    },

    /// `object.name`, and the receiver/selector half of a message send.
    Get { object: Box<Expr>, name: Token },

    /// `object.name = value`
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
        operator: Token,
    },

    /// `callee(arguments...)`, and every desugared `[receiver selector: ...]`.
    Call {
        callee: Box<Expr>,
        /// Closing `)` or `]`, retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    Selfy { id: ExprId, keyword: Token },

    Supery { id: ExprId, keyword: Token },

    TypeAnnotation(TypeAnnotation),

    BlockSignature(BlockSignature),

    BlockLiteral(Rc<BlockLiteral>),
}

impl Expr {
    pub fn variable(name: Token) -> Self {
        Expr::Variable {
            id: ExprId::fresh(),
            name,
        }
    }

    pub fn assign(name: Token, operator: Token, value: Expr) -> Self {
        Expr::Assign {
            id: ExprId::fresh(),
            name,
            operator,
            value: Box::new(value),
        }
    }
}

/// `type name = initializer;`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub ty: TypeAnnotation,
    pub name: Token,
    pub initializer: Option<Expr>,
}

/// Free function or method.  An empty body on a prototype or an interface
/// method declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    /// `+` methods.
    pub is_static: bool,
}

/// `@interface Name : Super ... @end`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: Token,
    pub superclass: Option<Expr>,
    pub methods: Vec<Rc<FunctionDecl>>,
    pub properties: Vec<VarDecl>,
}

/// `@implementation Name ... @end`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassImpl {
    pub name: Token,
    pub methods: Vec<Rc<FunctionDecl>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    For {
        initializer: Option<Box<Stmt>>,
        condition: Option<Expr>,
        increment: Option<Expr>,
        body: Box<Stmt>,
    },

    Return {
        keyword: Token,
        value: Option<Expr>,
    },

    /// Stand-alone expression.
    Expression(Expr),

    Var(VarDecl),

    Function(Rc<FunctionDecl>),

    Print(Expr),

    ClassDef(ClassDef),

    ClassImpl(ClassImpl),

    TypeDef {
        name: Token,
        ty: TypeAnnotation,
    },
}

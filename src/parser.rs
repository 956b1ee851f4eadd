/*!
Recursive-descent parser for the Objective-C flavoured teaching language.

### Failure policy

The parser never returns an error.  When an expected token is missing it sets
`had_error`, substitutes a placeholder token or node and keeps going; every
loop also checks the flag, so the top-level loop stops at the next statement
boundary.  After the stream is exhausted [`Parser::diagnostics`] reports the
tokens that were left unconsumed.

### Logging Policy

| Location                     | Level  | Purpose                                   |
|------------------------------|--------|-------------------------------------------|
| `Parser::new`, `parse`       | `info` | Lifecycle milestones.                     |
| `declaration`, `statement`   | `debug`| High-level descent into grammar branches. |
| Error paths (`consume`, etc.)| `warn` | Recovered syntax errors.                  |

--------------------------------------------------------------------------------
Grammar (EBNF, condensed)
--------------------------------------------------------

```text
program        → declaration* EOF ;
declaration    → DIRECTIVE | type IDENT ( funRest | varRest ) | statement ;
funRest        → "(" params? ")" ( ";" | "{" declaration* "}" ) ;
varRest        → ( "=" expression )? ";" ;
type           → ( valueType | typedefName ) "*"? blockType? ;
blockType      → "(" "^" ( blockType | IDENT? ) ")" "(" types? ")" ;
statement      → block | ifStmt | returnStmt | whileStmt | forStmt
               | printStmt | interface | implementation | typedef
               | exprStmt ;
interface      → "interface" CLASS ( ":" CLASS )?
                 ( method | "property" attrs? type IDENT varRest )* "end" ;
implementation → "implementation" CLASS ( "(" IDENT? ")" )? method* "end" ;
method         → ( "-" | "+" ) "(" type ")" IDENT
                 ( ":" "(" type ")" IDENT ( IDENT ":" "(" type ")" IDENT )* )?
                 ( ";" | "{" declaration* "}" ) ;
expression     → assignment ( "?" expression ":" expression )? ;
assignment     → plusPlus ( ( "=" | "+=" ) assignment )? ;
plusPlus       → logic_or "++"? ;
logic_or       → logic_and ( "||" logic_and )* ;
logic_and      → equality ( "&&" equality )* ;
equality       → comparison ( ( "!=" | "==" ) comparison )* ;
comparison     → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
term           → factor ( ( "-" | "+" ) factor )* ;
factor         → index ( ( "/" | "*" | "%" ) index )* ;
index          → unary ( "[" expression "]" )* ;
unary          → ( "!" | "-" | "++" ) unary | blockLiteral ;
blockLiteral   → "^" type? ( "(" params? ")" )? "{" declaration* "}" | call ;
call           → message ( "(" arguments? ")" | "." IDENT )* ;
message        → "[" factor IDENT ( ":" expression ( IDENT ":" expression )* )? "]"
               | primary ;
primary        → NUMBER | STRING | "YES" | "NO" | "nil" | "self" | "super"
               | IDENT | CLASS | "(" expression ")" | "@[" arguments? "]" ;
```
*/

use std::collections::HashSet;
use std::rc::Rc;

use crate::ast::{
    BlockLiteral, BlockSignature, ClassDef, ClassImpl, Expr, FunctionDecl, LiteralValue, Param,
    Stmt, TypeAnnotation, VarDecl,
};
use crate::error::ObjcError;
use crate::token::{Token, TokenType};

use log::{debug, info, warn};

static EOF_TOKEN: Token = Token {
    token_type: TokenType::EOF,
    lexeme: String::new(),
    line: 0,
};

/// A block-pointer type whose parameter list has not been closed yet.
#[derive(Default)]
struct PendingBlockType {
    name: Option<Token>,
    params: Vec<TypeAnnotation>,
}

/// Top-level parser over an immutable slice of tokens.
pub struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
    had_error: bool,
    errors: Vec<ObjcError>,
    /// Names introduced by `typedef`; only valid after their definition.
    typedefs: HashSet<String>,
}

impl<'a> Parser<'a> {
    /// Construct a new parser.  `tokens` should end with an `EOF` token.
    pub fn new(tokens: &'a [Token]) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        Self {
            tokens,
            current: 0,
            had_error: false,
            errors: Vec::new(),
            typedefs: HashSet::new(),
        }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program and return its statement list.
    pub fn parse(&mut self) -> Vec<Stmt> {
        info!("Beginning parse phase");

        let mut statements: Vec<Stmt> = Vec::new();

        while !self.is_at_end() && !self.had_error {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        if let Some(report) = self.diagnostics() {
            warn!("{}", report);
        }

        info!("Parsed {} top-level statements", statements.len());

        statements
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    /// Every syntax error recorded, in source order.
    pub fn errors(&self) -> &[ObjcError] {
        &self.errors
    }

    /// The tokens left unconsumed when parsing stopped on an error.
    pub fn diagnostics(&self) -> Option<String> {
        if !self.had_error {
            return None;
        }

        let mut report = String::from("Remaining tokens after error...\n");

        for token in self.tokens.iter().skip(self.current) {
            report.push_str(&format!("[{}: {}], ", token.token_type.name(), token.lexeme));
        }

        Some(report)
    }

    // ──────────────────────── declaration rules ───────────────────

    fn declaration(&mut self) -> Option<Stmt> {
        debug!("Entering declaration at {:?}", self.peek().token_type);

        if self.peek().token_type.is_directive() {
            debug!("Skipping directive '{}'", self.peek().lexeme);
            self.advance();

            return None;
        }

        if let Some(ty) = self.parse_type(true) {
            return Some(self.typed_declaration(ty));
        }

        Some(self.statement())
    }

    fn typed_declaration(&mut self, ty: TypeAnnotation) -> Stmt {
        let name: Token = match signature_name(&ty) {
            Some(name) => name,
            None => self.consume(TokenType::IDENTIFIER, "Expected declaration name"),
        };

        if self.matches(TokenType::LEFT_PAREN) {
            self.function_declaration(name)
        } else {
            Stmt::Var(self.var_declaration(ty, name))
        }
    }

    fn function_declaration(&mut self, name: Token) -> Stmt {
        let mut params: Vec<Param> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if let Some(param) = self.function_param() {
                    params.push(param);
                }

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after parameters");

        // A prototype has no body.
        let body: Vec<Stmt> = if self.matches(TokenType::SEMICOLON) {
            Vec::new()
        } else {
            self.consume(TokenType::LEFT_BRACE, "Expected '{' before function body");
            self.block_statements()
        };

        Stmt::Function(Rc::new(FunctionDecl {
            name,
            params,
            body,
            is_static: false,
        }))
    }

    fn var_declaration(&mut self, ty: TypeAnnotation, name: Token) -> VarDecl {
        let initializer: Option<Expr> = if self.matches(TokenType::EQUAL) {
            Some(self.expression())
        } else {
            None
        };

        self.consume(
            TokenType::SEMICOLON,
            "Expected ';' after variable declaration",
        );

        VarDecl {
            ty,
            name,
            initializer,
        }
    }

    /// `type name`, where a block-pointer type carries its own name.  A bare
    /// type such as `(void)` yields no parameter.
    fn function_param(&mut self) -> Option<Param> {
        let ty: TypeAnnotation = self.parse_type(false)?;

        let name: Token = match signature_name(&ty) {
            Some(name) => name,
            None => self.maybe_consume(TokenType::IDENTIFIER)?,
        };

        Some(Param { ty, name })
    }

    // ─────────────────────────── types ────────────────────────────

    /// Attempt to parse a type.  At a statement boundary (`statement_start`)
    /// a class name only counts as a type when a declarator follows it.
    fn parse_type(&mut self, statement_start: bool) -> Option<TypeAnnotation> {
        if !self.at_type(statement_start) {
            return None;
        }

        let token: Token = self.advance().clone();

        // If a pointer
        self.matches(TokenType::STAR);

        if self.check(TokenType::LEFT_PAREN) && self.check_next(TokenType::CARET) {
            return Some(self.block_type(TypeAnnotation::simple(token)));
        }

        Some(TypeAnnotation::simple(token))
    }

    fn at_type(&self, statement_start: bool) -> bool {
        let token: &Token = self.peek();

        match token.token_type {
            TokenType::CLASS_IDENTIFIER => {
                !statement_start
                    || self.check_next(TokenType::STAR)
                    || self.check_next(TokenType::IDENTIFIER)
            }
            ref tt if tt.is_value_type() => true,
            TokenType::IDENTIFIER => self.typedefs.contains(&token.lexeme),
            _ => false,
        }
    }

    /// Block-pointer type syntax, possibly nested:
    /// `int (^(^makeAdder)(int))(int)`.
    ///
    /// Each `(^` opens a pending record; a `)` followed by a parameter list
    /// closes the innermost open one.  Records are then folded in opening
    /// order, each one becoming the return type of the next.
    fn block_type(&mut self, outer_return: TypeAnnotation) -> TypeAnnotation {
        let mut records: Vec<PendingBlockType> = vec![PendingBlockType::default()];
        let mut open: Vec<usize> = vec![0];

        self.consume(TokenType::LEFT_PAREN, "Expected '(' in block type");
        self.consume(TokenType::CARET, "Expected '^' in block type");

        while !open.is_empty() && !self.had_error && !self.is_at_end() {
            let mut progressed: bool = false;

            if self.check(TokenType::LEFT_PAREN) && self.check_next(TokenType::CARET) {
                self.advance();
                self.advance();
                records.push(PendingBlockType::default());
                open.push(records.len() - 1);
                progressed = true;
            }

            let name: Option<Token> = self.maybe_consume(TokenType::IDENTIFIER);
            progressed |= name.is_some();

            if self.matches(TokenType::RIGHT_PAREN) {
                self.consume(TokenType::LEFT_PAREN, "Expected '(' before block parameter types");

                let mut params: Vec<TypeAnnotation> = Vec::new();
                if !self.check(TokenType::RIGHT_PAREN) {
                    loop {
                        if let Some(param) = self.parse_type(false) {
                            params.push(param);
                        }
                        // parameter names are allowed and ignored
                        self.maybe_consume(TokenType::IDENTIFIER);

                        if !self.matches(TokenType::COMMA) {
                            break;
                        }
                    }
                }

                self.consume(TokenType::RIGHT_PAREN, "Expected ')' after block parameter types");

                if let Some(idx) = open.pop() {
                    records[idx].name = name;
                    records[idx].params = params;
                }
                progressed = true;
            }

            if !progressed {
                self.error("Malformed block type");
            }
        }

        let mut records = records.into_iter();
        let mut ty: TypeAnnotation = outer_return;

        if let Some(first) = records.next() {
            ty = TypeAnnotation::block(BlockSignature {
                return_type: ty,
                name: first.name,
                params: first.params,
            });
        }

        for record in records {
            ty = TypeAnnotation::block(BlockSignature {
                return_type: ty,
                name: record.name,
                params: record.params,
            });
        }

        ty
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> Stmt {
        debug!("Entering statement at {:?}", self.peek().token_type);

        if self.matches(TokenType::LEFT_BRACE) {
            self.block()
        } else if self.matches(TokenType::IF) {
            self.if_statement()
        } else if self.matches(TokenType::RETURN) {
            self.return_statement()
        } else if self.matches(TokenType::WHILE) {
            self.while_statement()
        } else if self.matches(TokenType::FOR) {
            self.for_statement()
        } else if self.matches(TokenType::PRINT) {
            self.print_statement()
        } else if self.matches(TokenType::INTERFACE) {
            self.class_declaration()
        } else if self.matches(TokenType::IMPLEMENTATION) {
            self.class_implementation()
        } else if self.matches(TokenType::TYPEDEF) {
            self.typedef()
        } else {
            self.expression_statement()
        }
    }

    fn typedef(&mut self) -> Stmt {
        let Some(ty) = self.parse_type(false) else {
            self.error("Expected type after 'typedef'");
            return Stmt::TypeDef {
                name: Token::placeholder(self.peek().line),
                ty: TypeAnnotation::default(),
            };
        };

        let name: Token = match signature_name(&ty) {
            Some(name) => name,
            None => self.consume(TokenType::IDENTIFIER, "Expected typedef name"),
        };

        self.consume(TokenType::SEMICOLON, "Expected ';' after typedef");

        debug!("Registered typedef '{}'", name.lexeme);
        self.typedefs.insert(name.lexeme.clone());

        Stmt::TypeDef { name, ty }
    }

    fn class_declaration(&mut self) -> Stmt {
        let name: Token = self.consume(TokenType::CLASS_IDENTIFIER, "Expected class name");

        // Category
        if self.matches(TokenType::LEFT_PAREN) {
            self.skip_past(TokenType::RIGHT_PAREN);
        }

        // Inheritance
        let superclass: Option<Expr> = if self.matches(TokenType::COLON) {
            Some(Expr::variable(
                self.consume(TokenType::CLASS_IDENTIFIER, "Expected superclass name"),
            ))
        } else {
            None
        };

        // Protocol list
        if self.matches(TokenType::LESS) {
            self.skip_past(TokenType::GREATER);
        }

        let mut methods: Vec<Rc<FunctionDecl>> = Vec::new();
        let mut properties: Vec<VarDecl> = Vec::new();

        while !self.check(TokenType::END) && !self.is_at_end() && !self.had_error {
            if self.matches(TokenType::MINUS) || self.matches(TokenType::PLUS) {
                methods.push(Rc::new(self.class_method()));
            } else if self.matches(TokenType::PROPERTY) {
                properties.push(self.property_declaration());
            } else if self.matches(TokenType::LEFT_BRACE) {
                // instance variable section
                while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() && !self.had_error {
                    properties.push(self.property_declaration());
                }
                self.consume(TokenType::RIGHT_BRACE, "Expected '}' after instance variables");
            } else {
                self.error("Unexpected token in @interface");
            }
        }

        self.consume(TokenType::END, "Expected '@end' after @interface");

        Stmt::ClassDef(ClassDef {
            name,
            superclass,
            methods,
            properties,
        })
    }

    fn class_implementation(&mut self) -> Stmt {
        let name: Token = self.consume(TokenType::CLASS_IDENTIFIER, "Expected class name");

        // Extension / category
        if self.matches(TokenType::LEFT_PAREN) {
            self.maybe_consume(TokenType::IDENTIFIER);
            self.maybe_consume(TokenType::CLASS_IDENTIFIER);
            self.consume(TokenType::RIGHT_PAREN, "Expected ')' after category name");
        }

        let mut methods: Vec<Rc<FunctionDecl>> = Vec::new();

        while !self.check(TokenType::END) && !self.is_at_end() && !self.had_error {
            if self.matches(TokenType::MINUS) || self.matches(TokenType::PLUS) {
                methods.push(Rc::new(self.class_method()));
            } else {
                self.error("Unexpected token in @implementation");
            }
        }

        self.consume(TokenType::END, "Expected '@end' after @implementation");

        Stmt::ClassImpl(ClassImpl { name, methods })
    }

    /// `- (type)name:(type)a key:(type)b { ... }`.  Only the first selector
    /// keyword names the method; later keywords are syntax.
    fn class_method(&mut self) -> FunctionDecl {
        let is_static: bool = self.previous().token_type == TokenType::PLUS;
        let name: Token = self.typed_name().name;
        let mut params: Vec<Param> = Vec::new();

        if self.matches(TokenType::COLON) {
            params.push(self.typed_name());

            while self.matches(TokenType::IDENTIFIER) {
                self.consume(TokenType::COLON, "Expected ':' after selector keyword");
                params.push(self.typed_name());
            }
        }

        let body: Vec<Stmt> = if self.matches(TokenType::LEFT_BRACE) {
            self.block_statements()
        } else {
            self.consume(TokenType::SEMICOLON, "Expected ';' after method declaration");
            Vec::new()
        };

        debug!("Parsed method '{}' (static: {})", name.lexeme, is_static);

        FunctionDecl {
            name,
            params,
            body,
            is_static,
        }
    }

    /// `(type) name`
    fn typed_name(&mut self) -> Param {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' before type");

        let ty: TypeAnnotation = match self.parse_type(false) {
            Some(ty) => ty,
            // `instancetype` and other unknown names
            None => match self.maybe_consume(TokenType::IDENTIFIER) {
                Some(token) => TypeAnnotation::simple(token),
                None => {
                    self.error("Expected type");
                    TypeAnnotation::default()
                }
            },
        };

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after type");
        let name: Token = self.consume(TokenType::IDENTIFIER, "Expected name after type");

        Param { ty, name }
    }

    fn property_declaration(&mut self) -> VarDecl {
        // Attributes such as (nonatomic, weak)
        if self.matches(TokenType::LEFT_PAREN) {
            self.skip_past(TokenType::RIGHT_PAREN);
        }

        let ty: TypeAnnotation = self.parse_type(false).unwrap_or_else(|| {
            self.error("Expected property type");
            TypeAnnotation::default()
        });

        let name: Token = self.consume_any(
            &[TokenType::IDENTIFIER, TokenType::CLASS_IDENTIFIER],
            "Expected property name",
        );

        self.var_declaration(ty, name)
    }

    /// Note: the `{` has already been consumed.
    fn block(&mut self) -> Stmt {
        let statements: Vec<Stmt> = self.block_statements();
        // `;` may or may not terminate the block.
        self.maybe_consume(TokenType::SEMICOLON);

        Stmt::Block(statements)
    }

    fn block_statements(&mut self) -> Vec<Stmt> {
        let mut statements: Vec<Stmt> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() && !self.had_error {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(TokenType::RIGHT_BRACE, "Expected '}' after block");

        statements
    }

    /// Body of `if` / `else` / `while` / `for`.
    fn branch(&mut self) -> Stmt {
        if self.matches(TokenType::LEFT_BRACE) {
            self.block()
        } else {
            self.statement()
        }
    }

    fn if_statement(&mut self) -> Stmt {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'if'");
        let condition: Expr = self.expression();
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after condition");

        let then_branch: Box<Stmt> = Box::new(self.branch());

        // `else if` chains by recursing into statement()
        let else_branch: Option<Box<Stmt>> = if self.matches(TokenType::ELSE) {
            Some(Box::new(self.branch()))
        } else {
            None
        };

        Stmt::If {
            condition,
            then_branch,
            else_branch,
        }
    }

    fn return_statement(&mut self) -> Stmt {
        let keyword: Token = self.previous().clone();
        let value: Option<Expr> = if !self.check(TokenType::SEMICOLON) {
            Some(self.expression())
        } else {
            None
        };

        self.consume(TokenType::SEMICOLON, "Expected ';' after return value");

        Stmt::Return { keyword, value }
    }

    fn while_statement(&mut self) -> Stmt {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'while'");
        let condition: Expr = self.expression();
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after condition");
        let body: Box<Stmt> = Box::new(self.branch());

        Stmt::While { condition, body }
    }

    fn for_statement(&mut self) -> Stmt {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'for'");

        let initializer: Option<Box<Stmt>> = if self.matches(TokenType::SEMICOLON) {
            None
        } else if let Some(ty) = self.parse_type(true) {
            Some(Box::new(self.typed_declaration(ty)))
        } else {
            Some(Box::new(self.expression_statement()))
        };

        let condition: Option<Expr> = if self.matches(TokenType::SEMICOLON) {
            None
        } else {
            let condition: Expr = self.expression();
            self.consume(TokenType::SEMICOLON, "Expected ';' after loop condition");
            Some(condition)
        };

        let increment: Option<Expr> = if !self.check(TokenType::RIGHT_PAREN) {
            Some(self.expression())
        } else {
            None
        };

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after for clauses");

        let body: Box<Stmt> = Box::new(self.branch());

        Stmt::For {
            initializer,
            condition,
            increment,
            body,
        }
    }

    fn print_statement(&mut self) -> Stmt {
        let value: Expr = self.expression();

        self.consume(TokenType::SEMICOLON, "Expected ';' after value");

        Stmt::Print(value)
    }

    fn expression_statement(&mut self) -> Stmt {
        let expr: Expr = self.expression();
        // Consume the statement terminating `;` when present
        self.maybe_consume(TokenType::SEMICOLON);

        Stmt::Expression(expr)
    }

    // ─────────────────────── expression rules ─────────────────────

    fn expression(&mut self) -> Expr {
        let expr: Expr = self.assignment();

        if self.matches(TokenType::QUESTION) {
            let then_branch: Expr = self.expression();
            self.consume(TokenType::COLON, "Expected ':' in ternary expression");
            let else_branch: Expr = self.expression();

            return Expr::Ternary {
                condition: Box::new(expr),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            };
        }

        expr
    }

    fn assignment(&mut self) -> Expr {
        let expr: Expr = self.plus_plus();

        if self.matches(TokenType::EQUAL) || self.matches(TokenType::PLUS_EQUAL) {
            let operator: Token = self.previous().clone();
            let value: Expr = self.assignment();

            return match expr {
                Expr::Variable { name, .. } => Expr::assign(name, operator, value),

                Expr::Selfy { keyword, .. } => Expr::assign(keyword, operator, value),

                Expr::Get { object, name } => Expr::Set {
                    object,
                    name,
                    value: Box::new(value),
                    operator,
                },

                Expr::ArrayGet { object, index } => Expr::ArraySet {
                    object,
                    index,
                    value: Box::new(value),
                    operator,
                },

                _ => {
                    self.error("Invalid assignment target");
                    Expr::Literal(LiteralValue::Str("ERROR".to_string()))
                }
            };
        }

        expr
    }

    fn plus_plus(&mut self) -> Expr {
        let expr: Expr = self.logical_or();

        if self.matches(TokenType::PLUS_PLUS) {
            let operator: Token = self.previous().clone();

            return increment(expr, operator);
        }

        expr
    }

    fn logical_or(&mut self) -> Expr {
        let mut expr: Expr = self.logical_and();

        while self.matches(TokenType::OR) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.logical_and();

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        expr
    }

    fn logical_and(&mut self) -> Expr {
        let mut expr: Expr = self.equality();

        while self.matches(TokenType::AND) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.equality();

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        expr
    }

    fn equality(&mut self) -> Expr {
        let mut expr: Expr = self.comparison();

        while self.matches(TokenType::BANG_EQUAL) || self.matches(TokenType::EQUAL_EQUAL) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.comparison();

            expr = binary(expr, operator, right);
        }

        expr
    }

    fn comparison(&mut self) -> Expr {
        let mut expr: Expr = self.term();

        while self.matches(TokenType::GREATER)
            || self.matches(TokenType::GREATER_EQUAL)
            || self.matches(TokenType::LESS)
            || self.matches(TokenType::LESS_EQUAL)
        {
            let operator: Token = self.previous().clone();
            let right: Expr = self.term();

            expr = binary(expr, operator, right);
        }

        expr
    }

    fn term(&mut self) -> Expr {
        let mut expr: Expr = self.factor();

        while self.matches(TokenType::MINUS) || self.matches(TokenType::PLUS) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.factor();

            expr = binary(expr, operator, right);
        }

        expr
    }

    fn factor(&mut self) -> Expr {
        let mut expr: Expr = self.index();

        while self.matches(TokenType::STAR)
            || self.matches(TokenType::SLASH)
            || self.matches(TokenType::PERCENT)
        {
            let operator: Token = self.previous().clone();
            let right: Expr = self.index();

            expr = binary(expr, operator, right);
        }

        expr
    }

    /// `a[i][j]` nests left-associatively.
    fn index(&mut self) -> Expr {
        let mut expr: Expr = self.unary();

        while self.matches(TokenType::LEFT_SQUARE) {
            let index: Expr = self.expression();
            self.consume(TokenType::RIGHT_SQUARE, "Expected ']' after index");

            expr = Expr::ArrayGet {
                object: Box::new(expr),
                index: Box::new(index),
            };
        }

        expr
    }

    fn unary(&mut self) -> Expr {
        if self.matches(TokenType::BANG) || self.matches(TokenType::MINUS) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.unary();

            return Expr::Unary {
                operator,
                right: Box::new(right),
            };
        }

        if self.matches(TokenType::PLUS_PLUS) {
            let operator: Token = self.previous().clone();
            let operand: Expr = self.unary();

            return increment(operand, operator);
        }

        self.block_literal()
    }

    fn block_literal(&mut self) -> Expr {
        if !self.matches(TokenType::CARET) {
            return self.call();
        }

        let return_type: Option<TypeAnnotation> = self.parse_type(false);
        let mut params: Vec<Param> = Vec::new();

        if self.matches(TokenType::LEFT_PAREN) {
            if !self.check(TokenType::RIGHT_PAREN) {
                loop {
                    if let Some(param) = self.function_param() {
                        params.push(param);
                    }

                    if !self.matches(TokenType::COMMA) {
                        break;
                    }
                }
            }

            self.consume(TokenType::RIGHT_PAREN, "Expected ')' after block parameters");
        }

        self.consume(TokenType::LEFT_BRACE, "Expected '{' before block body");
        let body: Vec<Stmt> = self.block_statements();

        Expr::BlockLiteral(Rc::new(BlockLiteral {
            return_type,
            params,
            body,
        }))
    }

    fn call(&mut self) -> Expr {
        let mut expr: Expr = self.message_send();

        loop {
            if self.matches(TokenType::LEFT_PAREN) {
                expr = self.finish_call(expr);
            } else if self.matches(TokenType::DOT) {
                let name: Token =
                    self.consume(TokenType::IDENTIFIER, "Expected property name after '.'");

                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }

        expr
    }

    /// `[receiver selector: a key: b]` → `receiver.selector(a, b)`.
    fn message_send(&mut self) -> Expr {
        if !self.matches(TokenType::LEFT_SQUARE) {
            return self.primary();
        }

        let receiver: Expr = self.factor();
        let selector: Token = self.consume(TokenType::IDENTIFIER, "Expected selector in message");

        let mut arguments: Vec<Expr> = Vec::new();

        if self.matches(TokenType::COLON) {
            arguments.push(self.expression());

            while !self.check(TokenType::RIGHT_SQUARE) && !self.is_at_end() && !self.had_error {
                self.consume(TokenType::IDENTIFIER, "Expected selector keyword");
                self.consume(TokenType::COLON, "Expected ':' after selector keyword");
                arguments.push(self.expression());
            }
        }

        let paren: Token = self.consume(TokenType::RIGHT_SQUARE, "Expected ']' after message");

        Expr::Call {
            callee: Box::new(Expr::Get {
                object: Box::new(receiver),
                name: selector,
            }),
            paren,
            arguments,
        }
    }

    fn finish_call(&mut self, callee: Expr) -> Expr {
        let mut arguments: Vec<Expr> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                arguments.push(self.expression());

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        let paren: Token = self.consume(TokenType::RIGHT_PAREN, "Expected ')' after arguments");

        Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        }
    }

    fn primary(&mut self) -> Expr {
        if let TokenType::NUMBER(n) = self.peek().token_type {
            self.advance();
            return Expr::Literal(LiteralValue::Number(n));
        }

        if let TokenType::STRING(ref s) = self.peek().token_type {
            let s: String = s.clone();
            self.advance();
            return Expr::Literal(LiteralValue::Str(s));
        }

        if self.matches(TokenType::LEFT_PAREN) {
            let expr: Expr = self.expression();
            self.consume(TokenType::RIGHT_PAREN, "Expected ')' after expression");

            return Expr::Grouping(Box::new(expr));
        }

        if self.matches(TokenType::ARRAY_START) {
            return self.array_literal();
        }

        if self.matches(TokenType::YES) {
            return Expr::Literal(LiteralValue::True);
        }
        if self.matches(TokenType::NO) {
            return Expr::Literal(LiteralValue::False);
        }
        if self.matches(TokenType::NIL) {
            return Expr::Literal(LiteralValue::Nil);
        }

        if self.matches(TokenType::IDENTIFIER) || self.matches(TokenType::CLASS_IDENTIFIER) {
            return Expr::variable(self.previous().clone());
        }

        if self.matches(TokenType::SELF) {
            return Expr::Selfy {
                id: crate::ast::ExprId::fresh(),
                keyword: self.previous().clone(),
            };
        }

        if self.matches(TokenType::SUPER) {
            return Expr::Supery {
                id: crate::ast::ExprId::fresh(),
                keyword: self.previous().clone(),
            };
        }

        self.error("Expected expression");
        self.advance();

        Expr::Literal(LiteralValue::Nil)
    }

    fn array_literal(&mut self) -> Expr {
        let mut contents: Vec<Expr> = Vec::new();

        if !self.check(TokenType::RIGHT_SQUARE) {
            loop {
                contents.push(self.expression());

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_SQUARE, "Expected ']' after array literal");

        Expr::Array(contents)
    }

    // ────────────────────── utility helpers ───────────────────────

    fn error(&mut self, message: &str) {
        let token: &Token = self.peek();

        warn!(
            "[line {}] Parse error at '{}': {}",
            token.line, token.lexeme, message
        );

        self.errors.push(ObjcError::parse(
            token.line,
            format!("at '{}': {}", token.lexeme, message),
        ));
        self.had_error = true;
    }

    #[inline(always)]
    fn matches(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();

            return true;
        }

        false
    }

    /// Consume the expected token or flag an error and hand back a
    /// placeholder without moving.
    fn consume(&mut self, ttype: TokenType, message: &str) -> Token {
        if self.check(ttype) {
            return self.advance().clone();
        }

        self.error(message);

        Token::placeholder(self.peek().line)
    }

    fn consume_any(&mut self, ttypes: &[TokenType], message: &str) -> Token {
        for ttype in ttypes {
            if self.check(ttype.clone()) {
                return self.advance().clone();
            }
        }

        self.error(message);

        Token::placeholder(self.peek().line)
    }

    fn maybe_consume(&mut self, ttype: TokenType) -> Option<Token> {
        if self.check(ttype) {
            Some(self.advance().clone())
        } else {
            None
        }
    }

    /// Discard tokens up to and including `ttype`.
    fn skip_past(&mut self, ttype: TokenType) {
        while !self.check(ttype.clone()) && !self.is_at_end() {
            self.advance();
        }

        self.consume(ttype, "Unterminated list");
    }

    #[inline(always)]
    fn check(&self, ttype: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().token_type == ttype
    }

    /// Second token of lookahead.
    #[inline(always)]
    fn check_next(&self, ttype: TokenType) -> bool {
        self.tokens
            .get(self.current + 1)
            .is_some_and(|token| token.token_type == ttype)
    }

    #[inline(always)]
    fn advance(&mut self) -> &'a Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::EOF)
    }

    #[inline(always)]
    fn peek(&self) -> &'a Token {
        self.tokens.get(self.current).unwrap_or(&EOF_TOKEN)
    }

    #[inline(always)]
    fn previous(&self) -> &'a Token {
        match self.current.checked_sub(1) {
            Some(idx) => self.tokens.get(idx).unwrap_or(&EOF_TOKEN),
            None => &EOF_TOKEN,
        }
    }
}

fn binary(left: Expr, operator: Token, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }
}

/// `x++`, `++x`, `o.p++` and `a[i]++` become compound assignments of `1`.
/// Any other operand is left as it was.
fn increment(target: Expr, operator: Token) -> Expr {
    let one = || Box::new(Expr::Literal(LiteralValue::Number(1.0)));

    match target {
        Expr::Variable { name, .. } => Expr::assign(name, operator, *one()),

        Expr::Get { object, name } => Expr::Set {
            object,
            name,
            value: one(),
            operator,
        },

        Expr::ArrayGet { object, index } => Expr::ArraySet {
            object,
            index,
            value: one(),
            operator,
        },

        other => other,
    }
}

fn signature_name(ty: &TypeAnnotation) -> Option<Token> {
    ty.signature.as_ref().and_then(|sig| sig.name.clone())
}

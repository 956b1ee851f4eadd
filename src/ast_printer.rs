use crate::ast::{
    BlockSignature, Expr, FunctionDecl, LiteralValue, Param, Stmt, TypeAnnotation, VarDecl,
};

/// Renders the AST in a parenthesised prefix form.  The output reflects the
/// tree's shape, not the source formatting, and is deterministic: printing
/// the same tree twice gives the same text.
pub struct AstPrinter;

impl AstPrinter {
    /// One line per top-level statement.
    pub fn print_program(statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(Self::print_stmt)
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn print(expr: &Expr) -> String {
        match expr {
            // ── literals ────────────────────────────────────────────────
            Expr::Literal(lit) => match lit {
                LiteralValue::True => "YES".into(),

                LiteralValue::False => "NO".into(),

                LiteralValue::Nil => "nil".into(),

                LiteralValue::Str(s) => format!("\"{}\"", s),

                // 3.0 → 3
                LiteralValue::Number(n) => n.to_string(),
            },

            Expr::Grouping(inner) => format!("(group {})", Self::print(inner)),

            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, Self::print(right))
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                Self::print(left),
                Self::print(right)
            ),

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => format!(
                "(ternary {} {} {})",
                Self::print(condition),
                Self::print(then_branch),
                Self::print(else_branch)
            ),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Selfy { .. } => "self".into(),

            Expr::Supery { .. } => "super".into(),

            Expr::Assign {
                name,
                operator,
                value,
                ..
            } => format!(
                "(assign {} {} {})",
                name.lexeme,
                operator.lexeme,
                Self::print(value)
            ),

            Expr::Array(elements) => parenthesize("array", elements.iter().map(Self::print)),

            Expr::ArrayGet { object, index } => format!(
                "(arrayGet {} {})",
                Self::print(object),
                Self::print(index)
            ),

            Expr::ArraySet {
                object,
                index,
                value,
                operator,
            } => format!(
                "(arraySet {} {} {} {})",
                Self::print(object),
                Self::print(index),
                operator.lexeme,
                Self::print(value)
            ),

            Expr::Get { object, name } => format!("(get {} {})", name.lexeme, Self::print(object)),

            Expr::Set {
                object,
                name,
                value,
                operator,
            } => format!(
                "(set {} {} {} {})",
                name.lexeme,
                operator.lexeme,
                Self::print(object),
                Self::print(value)
            ),

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut s = format!("(call {}", Self::print(callee));
                for arg in arguments {
                    s.push(' ');
                    s.push_str(&Self::print(arg));
                }
                s.push(')');
                s
            }

            Expr::TypeAnnotation(ty) => print_type(ty),

            Expr::BlockSignature(signature) => print_signature(signature),

            Expr::BlockLiteral(literal) => {
                let return_type: String = literal
                    .return_type
                    .as_ref()
                    .map_or_else(|| "_".to_string(), print_type);

                parenthesize(
                    "blockExpr",
                    [return_type, print_params(&literal.params)]
                        .into_iter()
                        .chain(literal.body.iter().map(Self::print_stmt)),
                )
            }
        }
    }

    pub fn print_stmt(stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => Self::print(expr),

            Stmt::Print(expr) => format!("(print {})", Self::print(expr)),

            Stmt::Var(decl) => print_var(decl),

            Stmt::Block(statements) => {
                parenthesize("block", statements.iter().map(Self::print_stmt))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut s = format!(
                    "(if {} {}",
                    Self::print(condition),
                    Self::print_stmt(then_branch)
                );
                if let Some(else_branch) = else_branch {
                    s.push(' ');
                    s.push_str(&Self::print_stmt(else_branch));
                }
                s.push(')');
                s
            }

            Stmt::While { condition, body } => format!(
                "(while {} {})",
                Self::print(condition),
                Self::print_stmt(body)
            ),

            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => format!(
                "(for {} {} {} {})",
                initializer
                    .as_deref()
                    .map_or_else(|| "_".to_string(), Self::print_stmt),
                condition.as_ref().map_or_else(|| "_".to_string(), Self::print),
                increment.as_ref().map_or_else(|| "_".to_string(), Self::print),
                Self::print_stmt(body)
            ),

            Stmt::Return { value, .. } => match value {
                Some(value) => format!("(return {})", Self::print(value)),
                None => "(return)".into(),
            },

            Stmt::Function(decl) => print_function(decl),

            Stmt::ClassDef(def) => {
                let mut head: String = def.name.lexeme.clone();
                if let Some(superclass) = &def.superclass {
                    head.push_str(" : ");
                    head.push_str(&Self::print(superclass));
                }

                let methods = parenthesize(
                    "methods",
                    def.methods.iter().map(|m| m.name.lexeme.clone()),
                );
                let properties = parenthesize("properties", def.properties.iter().map(print_var));

                format!("(define {} {} {})", head, methods, properties)
            }

            Stmt::ClassImpl(imp) => parenthesize(
                "implement",
                std::iter::once(imp.name.lexeme.clone())
                    .chain(imp.methods.iter().map(|m| print_function(m))),
            ),

            Stmt::TypeDef { name, ty } => {
                format!("(typedef {} {})", name.lexeme, print_type(ty))
            }
        }
    }
}

fn parenthesize<I>(head: &str, parts: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut s = format!("({}", head);
    for part in parts {
        s.push(' ');
        s.push_str(&part);
    }
    s.push(')');
    s
}

fn print_type(ty: &TypeAnnotation) -> String {
    match (&ty.token, &ty.signature) {
        (_, Some(signature)) => print_signature(signature),
        (Some(token), None) => token.lexeme.clone(),
        (None, None) => "_".into(),
    }
}

fn print_signature(signature: &BlockSignature) -> String {
    parenthesize(
        "blockType",
        [
            print_type(&signature.return_type),
            format!(
                "({})",
                signature
                    .params
                    .iter()
                    .map(print_type)
                    .collect::<Vec<String>>()
                    .join(" ")
            ),
        ],
    )
}

fn print_params(params: &[Param]) -> String {
    let names: Vec<&str> = params.iter().map(|p| p.name.lexeme.as_str()).collect();

    format!("({})", names.join(" "))
}

fn print_var(decl: &VarDecl) -> String {
    let mut s = format!("(varStmt {} {}", print_type(&decl.ty), decl.name.lexeme);
    if let Some(init) = &decl.initializer {
        s.push(' ');
        s.push_str(&AstPrinter::print(init));
    }
    s.push(')');
    s
}

fn print_function(decl: &FunctionDecl) -> String {
    let name: String = if decl.is_static {
        format!("+{}", decl.name.lexeme)
    } else {
        decl.name.lexeme.clone()
    };

    parenthesize(
        "function",
        [name, print_params(&decl.params)]
            .into_iter()
            .chain(decl.body.iter().map(AstPrinter::print_stmt)),
    )
}

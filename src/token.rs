use log::debug;
use serde::Serialize;
use std::fmt;
use std::mem;

/// The different kinds of tokens recognized by the scanner.
///
/// Variants without data represent punctuation, keyword or directive tokens.
/// `STRING(String)` and `NUMBER(f64)` carry their literal values.
/// `IDENTIFIER` is used for user-defined names and `CLASS_IDENTIFIER` for
/// names the scanner's post-pass recognised as class names.
/// `EOF` marks the end of input.
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Serialize)]
pub enum TokenType {
    /// '('
    LEFT_PAREN,

    /// ')'
    RIGHT_PAREN,

    /// '{'
    LEFT_BRACE,

    /// '}'
    RIGHT_BRACE,

    /// '['
    LEFT_SQUARE,

    /// ']'
    RIGHT_SQUARE,

    /// ','
    COMMA,

    /// '.'
    DOT,

    /// ';'
    SEMICOLON,

    /// ':'
    COLON,

    /// '?'
    QUESTION,

    /// '*'
    STAR,

    /// '-'
    MINUS,

    /// '+'
    PLUS,

    /// '/'
    SLASH,

    /// '%'
    PERCENT,

    /// '^'
    CARET,

    /// '&'
    AMPER,

    /// '|'
    PIPE,

    /// '@' not followed by a name, string or '['
    AT,

    /// '_'
    UNDERSCORE,

    /// '!'
    BANG,

    /// '!='
    BANG_EQUAL,

    /// '='
    EQUAL,

    /// '=='
    EQUAL_EQUAL,

    /// '<'
    LESS,

    /// '<='
    LESS_EQUAL,

    /// '>'
    GREATER,

    /// '>='
    GREATER_EQUAL,

    /// '&&'
    AND,

    /// '||'
    OR,

    /// '+='
    PLUS_EQUAL,

    /// '++'
    PLUS_PLUS,

    /// '@['
    ARRAY_START,

    /// A user-defined identifier
    IDENTIFIER,

    /// An identifier known to name a class
    CLASS_IDENTIFIER,

    /// A string literal (contents without quotes)
    STRING(String),

    /// A numeric literal
    #[serde(rename = "NUMBER")]
    NUMBER(f64),

    // ── keywords ──────────────────────────────────────────────────────────
    INT,
    FLOAT,
    DOUBLE,
    BOOL,
    VOID,
    /// the `string` type keyword
    STRING_TYPE,
    ID,
    IF,
    ELSE,
    RETURN,
    WHILE,
    FOR,
    PRINT,
    INTERFACE,
    IMPLEMENTATION,
    PROPERTY,
    END,
    YES,
    NO,
    NIL,
    SELF,
    SUPER,
    WEAK,
    TYPEDEF,

    // ── preprocessor directives ───────────────────────────────────────────
    INCLUDE,
    DEFINE,
    UNDEF,
    IFDEF,
    ELSE_DIRECTIVE,
    ENDIF,
    ELSEIF_DIRECTIVE,
    PRAGMA,
    ERROR,
    WARNING,
    IMPORT,

    /// End-of-file marker
    EOF,
}

impl PartialEq for TokenType {
    /// Two TokenTypes are equal if they share the same variant
    /// (ignoring any inner data). Uses `mem::discriminant` to compare.
    fn eq(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

impl TokenType {
    /// Keywords and names that may start a declaration.
    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            TokenType::INT
                | TokenType::FLOAT
                | TokenType::DOUBLE
                | TokenType::BOOL
                | TokenType::VOID
                | TokenType::STRING_TYPE
                | TokenType::CLASS_IDENTIFIER
                | TokenType::ID
        )
    }

    pub fn is_directive(&self) -> bool {
        matches!(
            self,
            TokenType::INCLUDE
                | TokenType::DEFINE
                | TokenType::UNDEF
                | TokenType::IFDEF
                | TokenType::ELSE_DIRECTIVE
                | TokenType::ENDIF
                | TokenType::ELSEIF_DIRECTIVE
                | TokenType::PRAGMA
                | TokenType::ERROR
                | TokenType::WARNING
                | TokenType::IMPORT
        )
    }

    /// Variant name without payload, as shown by the `tokenize` command.
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::LEFT_PAREN => "LEFT_PAREN",
            TokenType::RIGHT_PAREN => "RIGHT_PAREN",
            TokenType::LEFT_BRACE => "LEFT_BRACE",
            TokenType::RIGHT_BRACE => "RIGHT_BRACE",
            TokenType::LEFT_SQUARE => "LEFT_SQUARE",
            TokenType::RIGHT_SQUARE => "RIGHT_SQUARE",
            TokenType::COMMA => "COMMA",
            TokenType::DOT => "DOT",
            TokenType::SEMICOLON => "SEMICOLON",
            TokenType::COLON => "COLON",
            TokenType::QUESTION => "QUESTION",
            TokenType::STAR => "STAR",
            TokenType::MINUS => "MINUS",
            TokenType::PLUS => "PLUS",
            TokenType::SLASH => "SLASH",
            TokenType::PERCENT => "PERCENT",
            TokenType::CARET => "CARET",
            TokenType::AMPER => "AMPER",
            TokenType::PIPE => "PIPE",
            TokenType::AT => "AT",
            TokenType::UNDERSCORE => "UNDERSCORE",
            TokenType::BANG => "BANG",
            TokenType::BANG_EQUAL => "BANG_EQUAL",
            TokenType::EQUAL => "EQUAL",
            TokenType::EQUAL_EQUAL => "EQUAL_EQUAL",
            TokenType::LESS => "LESS",
            TokenType::LESS_EQUAL => "LESS_EQUAL",
            TokenType::GREATER => "GREATER",
            TokenType::GREATER_EQUAL => "GREATER_EQUAL",
            TokenType::AND => "AND",
            TokenType::OR => "OR",
            TokenType::PLUS_EQUAL => "PLUS_EQUAL",
            TokenType::PLUS_PLUS => "PLUS_PLUS",
            TokenType::ARRAY_START => "ARRAY_START",
            TokenType::IDENTIFIER => "IDENTIFIER",
            TokenType::CLASS_IDENTIFIER => "CLASS_IDENTIFIER",
            TokenType::STRING(_) => "STRING",
            TokenType::NUMBER(_) => "NUMBER",
            TokenType::INT => "INT",
            TokenType::FLOAT => "FLOAT",
            TokenType::DOUBLE => "DOUBLE",
            TokenType::BOOL => "BOOL",
            TokenType::VOID => "VOID",
            TokenType::STRING_TYPE => "STRING_TYPE",
            TokenType::ID => "ID",
            TokenType::IF => "IF",
            TokenType::ELSE => "ELSE",
            TokenType::RETURN => "RETURN",
            TokenType::WHILE => "WHILE",
            TokenType::FOR => "FOR",
            TokenType::PRINT => "PRINT",
            TokenType::INTERFACE => "INTERFACE",
            TokenType::IMPLEMENTATION => "IMPLEMENTATION",
            TokenType::PROPERTY => "PROPERTY",
            TokenType::END => "END",
            TokenType::YES => "YES",
            TokenType::NO => "NO",
            TokenType::NIL => "NIL",
            TokenType::SELF => "SELF",
            TokenType::SUPER => "SUPER",
            TokenType::WEAK => "WEAK",
            TokenType::TYPEDEF => "TYPEDEF",
            TokenType::INCLUDE => "INCLUDE",
            TokenType::DEFINE => "DEFINE",
            TokenType::UNDEF => "UNDEF",
            TokenType::IFDEF => "IFDEF",
            TokenType::ELSE_DIRECTIVE => "ELSE_DIRECTIVE",
            TokenType::ENDIF => "ENDIF",
            TokenType::ELSEIF_DIRECTIVE => "ELSEIF_DIRECTIVE",
            TokenType::PRAGMA => "PRAGMA",
            TokenType::ERROR => "ERROR",
            TokenType::WARNING => "WARNING",
            TokenType::IMPORT => "IMPORT",
            TokenType::EOF => "EOF",
        }
    }
}

/// A scanned token, including its type, the source lexeme,
/// and the line number where it was found.
///
/// Tokens own their text so the AST can outlive the source buffer; closures
/// keep function bodies alive long after scanning is over.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token {
    /// The category of this token.
    pub token_type: TokenType,

    /// The exact text from the source that produced this token.  For string
    /// literals this is the contents without the quotes.
    pub lexeme: String,

    /// 1-based line number in the source.
    pub line: usize,
}

impl Token {
    /// Create a new Token with the given type, lexeme, and line.
    pub fn new<S: Into<String>>(token_type: TokenType, lexeme: S, line: usize) -> Self {
        let lexeme: String = lexeme.into();

        debug!(
            "Creating new token: type={:?}, lexeme={}, line={}",
            token_type, lexeme, line
        );

        Self {
            token_type,
            lexeme,
            line,
        }
    }

    /// Stand-in token used by the parser when an expected token is missing.
    pub fn placeholder(line: usize) -> Self {
        Self::new(TokenType::IDENTIFIER, "ERROR", line)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token_type {
            TokenType::STRING(s) => write!(f, "STRING \"{}\" {}", self.lexeme, s),

            TokenType::NUMBER(n) => {
                // 3 → "3.0", 3.14 → "3.14"
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    let mut buf: itoa::Buffer = itoa::Buffer::new();
                    write!(f, "NUMBER {} {}.0", self.lexeme, buf.format(*n as i64))
                } else {
                    write!(f, "NUMBER {} {}", self.lexeme, n)
                }
            }

            other => write!(f, "{} {} null", other.name(), self.lexeme),
        }
    }
}

//! Module `scanner` implements a one-pass, streaming lexer for the
//! Objective-C flavoured teaching language.
//!
//! It transforms a byte slice (`&[u8]`) into a sequence of [`Token`]s, skipping
//! whitespace and comments, and emitting exactly one `EOF` token at the end.
//! Designed as a `FusedIterator`, it can be chained safely with other iterator
//! adapters.
//!
//! # Public API
//!
//! - `Scanner::new(src: &[u8]) -> Scanner<'_>`
//!   Create a new lexer over the input buffer.
//!
//! - `impl Iterator for Scanner<'a>`
//!   Yields `Result<Token, ObjcError>` on each `.next()`.  An `Err` reports an
//!   unrecognised character; scanning carries on with the next byte.
//!
//! - `scan_tokens(src: &str) -> ScanOutput`
//!   Drains a scanner, collects the unhandled input on the side and runs the
//!   class-name post-pass.  This is what the parser consumes.
//!
//! # Token Recognition
//!
//! - Single-character punctuators: `( ) { } [ ] , . ; : ? * - % ^`.
//! - Two-character operators: `!= == <= >= && || += ++`.
//! - `@` prefixes: `@"..."` strings, `@[` array literals, `@name` keywords.
//! - String literals: `"..."` (multi-line allowed, escapes kept verbatim).
//! - Numeric literals: integer and optional fractional part.
//! - Identifiers/keywords resolved via a perfect-hash `KEYWORDS` map.
//! - `#directive` lines resolved via the `DIRECTIVES` map.
//!
//! # Performance
//!
//! - Bulk comment skipping via `memchr` / `memmem`.
//! - `#[inline(always)]` on hot path helpers.

use crate::error::{ObjcError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::{memchr, memchr_iter, memmem};
use phf::phf_map;
use std::collections::HashSet;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword maps (compile-time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"int"            => TokenType::INT,
    b"float"          => TokenType::FLOAT,
    b"double"         => TokenType::DOUBLE,
    b"BOOL"           => TokenType::BOOL,
    b"void"           => TokenType::VOID,
    b"string"         => TokenType::STRING_TYPE,
    b"id"             => TokenType::ID,
    b"if"             => TokenType::IF,
    b"else"           => TokenType::ELSE,
    b"return"         => TokenType::RETURN,
    b"while"          => TokenType::WHILE,
    b"for"            => TokenType::FOR,
    b"print"          => TokenType::PRINT,
    b"interface"      => TokenType::INTERFACE,
    b"implementation" => TokenType::IMPLEMENTATION,
    b"property"       => TokenType::PROPERTY,
    b"end"            => TokenType::END,
    b"YES"            => TokenType::YES,
    b"NO"             => TokenType::NO,
    b"nil"            => TokenType::NIL,
    b"self"           => TokenType::SELF,
    b"super"          => TokenType::SUPER,
    b"weak"           => TokenType::WEAK,
    b"typedef"        => TokenType::TYPEDEF,
};

static DIRECTIVES: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"include" => TokenType::INCLUDE,
    b"define"  => TokenType::DEFINE,
    b"undef"   => TokenType::UNDEF,
    b"ifdef"   => TokenType::IFDEF,
    b"else"    => TokenType::ELSE_DIRECTIVE,
    b"endif"   => TokenType::ENDIF,
    b"elseif"  => TokenType::ELSEIF_DIRECTIVE,
    b"pragma"  => TokenType::PRAGMA,
    b"error"   => TokenType::ERROR,
    b"warning" => TokenType::WARNING,
    b"import"  => TokenType::IMPORT,
};

/// `__block`, `__weak` and friends, without the underscores.
const ARC_QUALIFIERS: [&[u8]; 5] = [
    b"block",
    b"weak",
    b"strong",
    b"unsafe_unretained",
    b"autoreleasing",
];

/// Foundation names that are class names without ever being declared.
pub const KNOWN_CLASS_NAMES: [&str; 5] = [
    "NSString",
    "NSInteger",
    "NSObject",
    "NSArray",
    "NSMutableString",
];

/// A single pass **scanner / lexer** that converts raw UTF-8 bytes into a
/// sequence of [`Token`]s.
pub struct Scanner<'a> {
    src: &'a [u8],              // entire source file
    start: usize,               // index of the *first* byte of the current lexeme
    curr: usize,                // index *one past* the last byte examined
    line: usize,                // 1-based line counter (\n increments)
    pending: Option<TokenType>, // recognised token kind waiting to be emitted
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `src`.
    #[inline]
    pub fn new(src: &'a [u8]) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
        }
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    const fn len(&self) -> usize {
        self.src.len()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.len()
    }

    /// Advance one byte and return it.  Callers guard with [`is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.src[self.curr];
        self.curr += 1;
        b
    }

    /// Peek at the current byte without consuming it.  Returns `0` past EOF.
    #[inline(always)]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.src[self.curr]
        }
    }

    #[inline(always)]
    fn peek_next(&self) -> u8 {
        if self.curr + 1 >= self.len() {
            0
        } else {
            self.src[self.curr + 1]
        }
    }

    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    #[inline(always)]
    fn text(&self, from: usize, to: usize) -> String {
        String::from_utf8_lossy(&self.src[from..to]).into_owned()
    }

    /// Pick between a one- and two-byte operator.
    #[inline(always)]
    fn either(&mut self, second: u8, double: TokenType, single: TokenType) {
        self.pending = Some(if self.match_byte(second) { double } else { single });
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan a *single* token starting at `self.curr`.  If the lexeme produces an
    /// actual token the kind is stored in `self.pending`.  Whitespace and
    /// comments are skipped by returning `Ok(())` with `pending = None`.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        match b {
            // ── single-character punctuators ──────────────────────────────
            b'(' => self.pending = Some(TokenType::LEFT_PAREN),
            b')' => self.pending = Some(TokenType::RIGHT_PAREN),
            b'{' => self.pending = Some(TokenType::LEFT_BRACE),
            b'}' => self.pending = Some(TokenType::RIGHT_BRACE),
            b'[' => self.pending = Some(TokenType::LEFT_SQUARE),
            b']' => self.pending = Some(TokenType::RIGHT_SQUARE),
            b',' => self.pending = Some(TokenType::COMMA),
            b'.' => self.pending = Some(TokenType::DOT),
            b';' => self.pending = Some(TokenType::SEMICOLON),
            b':' => self.pending = Some(TokenType::COLON),
            b'?' => self.pending = Some(TokenType::QUESTION),
            b'*' => self.pending = Some(TokenType::STAR),
            b'-' => self.pending = Some(TokenType::MINUS),
            b'%' => self.pending = Some(TokenType::PERCENT),
            b'^' => self.pending = Some(TokenType::CARET),

            // ── one- or two-character operators ──────────────────────────
            b'+' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::PLUS_EQUAL
                } else if self.match_byte(b'+') {
                    TokenType::PLUS_PLUS
                } else {
                    TokenType::PLUS
                };

                self.pending = Some(tt);
            }

            b'&' => self.either(b'&', TokenType::AND, TokenType::AMPER),
            b'|' => self.either(b'|', TokenType::OR, TokenType::PIPE),
            b'!' => self.either(b'=', TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.either(b'=', TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.either(b'=', TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.either(b'=', TokenType::GREATER_EQUAL, TokenType::GREATER),

            // ── whitespace / newline ─────────────────────────────────────
            b' ' | b'\r' | b'\t' => {
                return Ok(());
            }

            b'\n' => {
                self.line += 1;

                return Ok(());
            }

            // ── comments (// … and /* … */) ──────────────────────────────
            b'/' => {
                if self.match_byte(b'/') {
                    if let Some(pos) = memchr(b'\n', &self.src[self.curr..]) {
                        self.curr += pos;
                    } else {
                        self.curr = self.len();
                    }

                    return Ok(());
                }

                if self.match_byte(b'*') {
                    return self.skip_block_comment();
                }

                self.pending = Some(TokenType::SLASH);
            }

            // ── '@' prefixed forms ───────────────────────────────────────
            b'@' => {
                if self.match_byte(b'"') {
                    return self.parse_string(self.curr);
                } else if self.match_byte(b'[') {
                    self.pending = Some(TokenType::ARRAY_START);
                } else if self.peek().is_ascii_alphabetic() {
                    // `@interface` scans as the keyword `interface`
                    self.start = self.curr;
                    self.parse_identifier();
                } else {
                    self.pending = Some(TokenType::AT);
                }
            }

            // ── underscores: `_name`, ARC `__qualifier`, bare `_` ───────────
            b'_' => {
                if self.peek() == b'_' {
                    self.advance();

                    if self.peek().is_ascii_alphabetic() {
                        self.start = self.curr;
                        self.parse_identifier();

                        // ownership qualifiers carry no meaning here
                        let word: &[u8] = &self.src[self.start..self.curr];
                        if ARC_QUALIFIERS.iter().any(|q| *q == word) {
                            self.pending = None;
                        }
                    } else {
                        self.pending = Some(TokenType::UNDERSCORE);
                    }
                } else if self.peek().is_ascii_alphanumeric() {
                    self.parse_identifier();
                } else {
                    self.pending = Some(TokenType::UNDERSCORE);
                }
            }

            // ── preprocessor directive ───────────────────────────────────
            b'#' => {
                return self.parse_directive();
            }

            // ── string literal " … " ─────────────────────────────────────
            b'"' => {
                return self.parse_string(self.curr);
            }

            // ── number literal (digit-leading) ───────────────────────────
            b'0'..=b'9' => {
                self.parse_number();
            }

            // ── identifiers / keywords ───────────────────────────────────
            b'a'..=b'z' | b'A'..=b'Z' => {
                self.parse_identifier();
            }

            // ── unexpected character ─────────────────────────────────────
            _ => {
                // swallow the rest of a multi-byte UTF-8 sequence
                while self.peek() & 0b1100_0000 == 0b1000_0000 {
                    self.advance();
                }

                return Err(ObjcError::lex(
                    self.line,
                    format!("Unexpected character: {}", self.text(self.start, self.curr)),
                ));
            }
        }

        Ok(())
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let rest: &[u8] = &self.src[self.curr..];

        match memmem::find(rest, b"*/") {
            Some(pos) => {
                self.line += memchr_iter(b'\n', &rest[..pos]).count();
                self.curr += pos + 2;

                Ok(())
            }

            None => {
                self.line += memchr_iter(b'\n', rest).count();
                self.curr = self.len();

                Err(ObjcError::lex(self.line, "Unterminated block comment."))
            }
        }
    }

    /// Parse a double-quoted string literal whose contents start at `from`.
    /// When we return, `self.curr` points **past** the closing `"`.
    fn parse_string(&mut self, from: usize) -> Result<()> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(ObjcError::lex(self.line, "Unterminated string."));
        }

        self.advance(); // consume closing quote

        let s: String = self.text(from, self.curr - 1);

        // The token's lexeme is the contents, not the quotes.
        self.start = from;
        self.pending = Some(TokenType::STRING(s));

        Ok(())
    }

    /// Parse a numeric literal (`123`, `3.14`).  Fractions are optional.
    fn parse_number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume "."

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let s: String = self.text(self.start, self.curr);
        let n: f64 = match s.parse::<f64>() {
            Ok(n) => n,
            Err(e) => {
                debug!("number literal '{}' not parsed: {}", s, e);
                0.0
            }
        };
        self.pending = Some(TokenType::NUMBER(n));
    }

    /// Parse an identifier and decide if it is a **keyword** or a generic
    /// `IDENTIFIER` token.
    fn parse_identifier(&mut self) {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphanumeric() || c == b'_'
        } {
            self.advance();
        }

        let slice: &[u8] = &self.src[self.start..self.curr];

        let tt: TokenType = KEYWORDS
            .get(slice)
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER);

        self.pending = Some(tt);
    }

    /// `#import <Foundation/Foundation.h>` → one directive token spanning the
    /// whole line.
    fn parse_directive(&mut self) -> Result<()> {
        let word_start = self.curr;

        while self.peek().is_ascii_alphabetic() {
            self.advance();
        }

        let word: &[u8] = &self.src[word_start..self.curr];

        match DIRECTIVES.get(word).cloned() {
            Some(tt) => {
                if let Some(pos) = memchr(b'\n', &self.src[self.curr..]) {
                    self.curr += pos;
                } else {
                    self.curr = self.len();
                }

                self.pending = Some(tt);

                Ok(())
            }

            None => Err(ObjcError::lex(
                self.line,
                format!(
                    "Unknown directive: #{}",
                    String::from_utf8_lossy(word)
                ),
            )),
        }
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl Iterator for Scanner<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.curr <= self.len() {
            // 1. EOF guard – emit exactly one EOF then terminate.
            if self.curr == self.len() {
                self.curr += 1; // ensure fused semantics
                return Some(Ok(Token::new(TokenType::EOF, "", self.line)));
            }

            // 2. Reset per-token state.
            self.start = self.curr;
            self.pending = None;

            // 3. Attempt to scan a token.
            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            // 4. If a real token was recognised, build and return it.
            if let Some(tt) = self.pending.take() {
                let lex: String = match &tt {
                    TokenType::STRING(s) => s.clone(),
                    _ => self.text(self.start, self.curr),
                };
                debug!("Scanned token ({:?}) on line {}", tt, self.line);

                return Some(Ok(Token::new(tt, lex, self.line)));
            }
            // Otherwise it was whitespace / comment → continue loop.
        }

        None // already yielded EOF
    }
}

impl FusedIterator for Scanner<'_> {}

// ───────────────────────── whole-source helper ─────────────────────────────

/// Result of scanning a complete source text.
#[derive(Debug, Default)]
pub struct ScanOutput {
    /// Token stream terminated by exactly one `EOF`.
    pub tokens: Vec<Token>,

    /// Input the scanner could not classify.  Scanning never stops on these.
    pub unhandled: Vec<ObjcError>,
}

/// Scan `src` completely and reclassify class names.
pub fn scan_tokens(src: &str) -> ScanOutput {
    let mut output = ScanOutput::default();

    for result in Scanner::new(src.as_bytes()) {
        match result {
            Ok(token) => output.tokens.push(token),
            Err(e) => {
                debug!("Unhandled input: {}", e);
                output.unhandled.push(e);
            }
        }
    }

    mark_class_names(&mut output.tokens);

    info!(
        "Scanned {} tokens ({} unhandled)",
        output.tokens.len(),
        output.unhandled.len()
    );

    output
}

/// Post-pass: every identifier that names a class anywhere in the stream
/// becomes a `CLASS_IDENTIFIER`.  A name is a class name when it follows
/// `interface` / `implementation`, when it sits in a `(Name *)` cast-like
/// position, or when it is a known Foundation class.
pub fn mark_class_names(tokens: &mut [Token]) {
    let mut names: HashSet<String> = KNOWN_CLASS_NAMES.iter().map(|s| s.to_string()).collect();

    for i in 1..tokens.len().saturating_sub(1) {
        let prev = &tokens[i - 1].token_type;
        let this = &tokens[i];
        let next = &tokens[i + 1].token_type;

        if this.token_type == TokenType::IDENTIFIER
            && matches!(prev, TokenType::INTERFACE | TokenType::IMPLEMENTATION)
        {
            names.insert(this.lexeme.clone());
        }

        if this.token_type == TokenType::STAR
            && *next == TokenType::RIGHT_PAREN
            && *prev == TokenType::IDENTIFIER
        {
            names.insert(tokens[i - 1].lexeme.clone());
        }
    }

    for token in tokens.iter_mut() {
        if token.token_type == TokenType::IDENTIFIER && names.contains(&token.lexeme) {
            token.token_type = TokenType::CLASS_IDENTIFIER;
        }
    }
}

//! Centralised error hierarchy for the **Objective-C flavoured interpreter**.
//!
//! The scanner and parser never fail hard (they collect unhandled input and
//! set an error flag instead), so in practice the variants below are raised by
//! the runtime and by the CLI.  Every failure funnels into one `Result<T>`
//! alias that inter-operates with `anyhow` in the binary.
//!
//! The module **does not** print diagnostics itself.

use std::io;
use thiserror::Error;

use log::info;

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ObjcError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human-readable description.
        message: String,

        /// 1-based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error: {message}")]
    Parse { message: String, line: usize },

    /// An operator received operands it cannot work with.
    #[error("[line {line}] Type mismatch: operator '{operator}' cannot be applied to {operands}")]
    TypeMismatch {
        operator: String,
        operands: String,
        line: usize,
    },

    /// Any other runtime evaluation failure.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF-8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl ObjcError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        ObjcError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", line, message);

        ObjcError::Parse { message, line }
    }

    /// Helper constructor for operand kind failures in the **interpreter**.
    pub fn type_mismatch<S: Into<String>, O: Into<String>>(
        line: usize,
        operator: S,
        operands: O,
    ) -> Self {
        let operator: String = operator.into();
        let operands: String = operands.into();

        info!(
            "Creating TypeMismatch error: line={}, op={}, operands={}",
            line, operator, operands
        );

        ObjcError::TypeMismatch {
            operator,
            operands,
            line,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ObjcError>;

pub mod array;
pub mod ast;
pub mod ast_printer;
pub mod callable;
pub mod class;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;

/// Scan, parse, resolve and run `src` on a fresh interpreter, returning the
/// printed output.
pub fn interpret_source(src: &str) -> String {
    let scanned = scanner::scan_tokens(src);
    let statements = Parser::new(&scanned.tokens).parse();

    let mut interpreter = Interpreter::new();
    Resolver::new(&mut interpreter).resolve(&statements);
    interpreter.interpret(&statements);

    interpreter.take_output()
}

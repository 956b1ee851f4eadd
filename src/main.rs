use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info, LevelFilter};

use objc_interpreter as objc;

use objc::ast_printer::AstPrinter;
use objc::interpreter::{Interpreter, ERROR_MARKER};
use objc::parser::Parser;
use objc::resolver::Resolver;
use objc::scanner::scan_tokens;

/// Exit status for malformed input (scanner or parser).
const EXIT_DATA_ERR: u8 = 65;

/// Exit status for a program that stopped on a runtime failure.
const EXIT_SOFTWARE: u8 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Objective-C flavoured teaching language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes a source file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the token list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parses a source file and prints its AST
    Parse { filename: PathBuf },

    /// Runs a source file as a program
    Run { filename: PathBuf },
}

fn read_source(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let src = fs::read_to_string(filename)
        .with_context(|| format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", src.len(), filename);

    Ok(src)
}

/// `--log` sends everything from `debug` up to app.log; `RUST_LOG` still
/// overrides the level.
fn init_logger(enabled: bool) -> Result<()> {
    if !enabled {
        Builder::new().filter_level(LevelFilter::Off).init();
        return Ok(());
    }

    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let path: &str = record.module_path().unwrap_or("<unnamed>");
            let module: &str = path.strip_prefix("objc_interpreter::").unwrap_or(path);

            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, LevelFilter::Debug)
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");

    Ok(())
}

fn tokenize(filename: &Path, json: bool) -> Result<ExitCode> {
    let src = read_source(filename)?;
    let scanned = scan_tokens(&src);

    if json {
        let rendered = serde_json::to_string_pretty(&scanned.tokens)
            .context("Failed to serialize tokens")?;
        println!("{}", rendered);
    } else {
        for token in &scanned.tokens {
            println!("{}", token);
        }
    }

    if scanned.unhandled.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    for e in &scanned.unhandled {
        eprintln!("{}", e);
    }
    debug!("Tokenization failed, exiting with code {}", EXIT_DATA_ERR);

    Ok(ExitCode::from(EXIT_DATA_ERR))
}

fn parse(filename: &Path) -> Result<ExitCode> {
    let src = read_source(filename)?;
    let scanned = scan_tokens(&src);

    let mut parser = Parser::new(&scanned.tokens);
    let statements = parser.parse();

    println!("{}", AstPrinter::print_program(&statements));

    match parser.diagnostics() {
        Some(report) => {
            for e in parser.errors() {
                eprintln!("{}", e);
            }
            eprintln!("{}", report);

            Ok(ExitCode::from(EXIT_DATA_ERR))
        }
        None => Ok(ExitCode::SUCCESS),
    }
}

fn run(filename: &Path) -> Result<ExitCode> {
    let src = read_source(filename)?;
    let scanned = scan_tokens(&src);

    for e in &scanned.unhandled {
        eprintln!("{}", e);
    }

    let mut parser = Parser::new(&scanned.tokens);
    let statements = parser.parse();

    // a broken parse still runs, as far as it got
    for e in parser.errors() {
        eprintln!("{}", e);
    }

    let mut interpreter = Interpreter::new();
    Resolver::new(&mut interpreter).resolve(&statements);
    interpreter.interpret(&statements);

    let output = interpreter.take_output();
    print!("{}", output);
    std::io::stdout().flush().context("Failed to flush stdout")?;

    if let Some(e) = interpreter.last_error() {
        eprintln!("{}", e);
    }

    if output.ends_with(ERROR_MARKER) {
        return Ok(ExitCode::from(EXIT_SOFTWARE));
    }

    info!("Program executed successfully");

    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let args: Cli = Cli::parse();

    init_logger(args.log)?;

    info!("CLI arguments: {:?}", args);

    match &args.commands {
        Commands::Tokenize { filename, json } => tokenize(filename, *json),
        Commands::Parse { filename } => parse(filename),
        Commands::Run { filename } => run(filename),
    }
}

//! Command line entry point.
//!
//! Lexes the source files on one thread, parses on another, and generates code
//! on the main thread. Depending on the flags and the output extension the
//! result is dumped, evaluated, or written to disk.
//!
//! ```bash
//! # Evaluate top-level expressions
//! kaleidoscope -e demos/fib.k
//!
//! # Optimized IR for every function
//! kaleidoscope -d -O 1 demos/fib.k
//!
//! # Object file, or a linked executable when the output has no extension
//! kaleidoscope -o fib.o demos/fib.k
//! kaleidoscope demos/fib.k
//! ```

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    process::Command,
    thread::JoinHandle,
};

use anyhow::{anyhow, bail, Context as _, Result};
use clap::Parser;
use inkwell::context::Context;
use tracing::info;

use kaleidoscope::{
    compiler::{compiler::Compiler, target::Runtime},
    config::{Artifact, Config},
    display_error,
    driver::driver::{dump_nodes, dump_tokens, Driver, EmitOptions},
    errors::errors::Error,
    lexer::lexer::spawn_lexer,
    logs::init_tracing,
    parser::parser::spawn_parser,
    runtime::RUNTIME_SOURCE,
};

#[derive(Parser)]
#[command(name = "kaleidoscope", about = "Kaleidoscope compiler and JIT", version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Dump the LLVM IR
    #[arg(short = 'd')]
    dump_ir: bool,

    /// Evaluate the code
    #[arg(short = 'e')]
    execute: bool,

    /// Optimization level; any level above 0 enables the pass pipeline
    #[arg(short = 'O', default_value_t = 0)]
    optimization_level: u32,

    /// Output file; the extension selects what is written
    #[arg(short = 'o')]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short = 'v')]
    verbose: bool,

    /// Source files, processed in order
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::new(
        cli.files,
        cli.output,
        cli.dump_ir,
        cli.execute,
        cli.optimization_level,
        cli.verbose,
    );

    init_tracing(config.verbose);

    if config.files.is_empty() {
        return Ok(());
    }

    run(&config)
}

fn run(config: &Config) -> Result<()> {
    let runtime = Runtime::initialize(config.verbose)?;

    let (tokens, lexer) = spawn_lexer(config.files.clone());

    if let Some(Artifact::Tokens(path)) = &config.artifact {
        let mut writer = create_output(path)?;
        let count = dump_tokens(tokens, &mut writer)?;
        writer.flush()?;
        info!(tokens = count, path = %path.display(), "wrote token dump");

        return join_lexer(lexer);
    }

    let (nodes, parser) = spawn_parser(tokens);

    if let Some(Artifact::Ast(path)) = &config.artifact {
        let mut writer = create_output(path)?;
        let count = dump_nodes(nodes, &mut writer)?;
        writer.flush()?;
        info!(nodes = count, path = %path.display(), "wrote AST dump");

        join_parser(parser);
        return join_lexer(lexer);
    }

    let context = Context::create();
    let mut compiler = Compiler::new(&context, &config.module_name(), config.optimize());
    let options = EmitOptions {
        dump_ir: config.dump_ir,
        execute: config.execute,
    };

    let mut driver = Driver::new(&mut compiler, &runtime, options, io::stdout().lock());
    driver.run(nodes)?;

    join_parser(parser);
    join_lexer(lexer)?;

    match &config.artifact {
        Some(Artifact::Bitcode(path)) => {
            let mut writer = create_output(path)?;
            driver.emit_bitcode(&mut writer)?;
            writer.flush()?;
        }
        Some(Artifact::Ir(path)) => {
            let mut writer = create_output(path)?;
            driver.emit_ir(&mut writer)?;
            writer.flush()?;
        }
        Some(Artifact::Object(path)) => {
            fs::write(path, driver.emit_object()?)
                .with_context(|| format!("write to file failure: {}", path.display()))?;
        }
        Some(Artifact::Executable { object, executable }) => {
            fs::write(object, driver.emit_object()?)
                .with_context(|| format!("write to file failure: {}", object.display()))?;
            link_executable(object, executable)?;
        }
        Some(Artifact::Tokens(_)) | Some(Artifact::Ast(_)) | None => {}
    }

    Ok(())
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("can not open the file: {}", path.display()))?;

    Ok(BufWriter::new(file))
}

/// Waits for the lexer stage. A file that could not be read or tokenized
/// fails the run.
fn join_lexer(lexer: JoinHandle<Result<(), Error>>) -> Result<()> {
    let result = lexer.join().map_err(|_| anyhow!("lexer thread panicked"))?;

    if let Err(error) = result {
        display_error(&error);
        return Err(error.into());
    }

    Ok(())
}

/// Waits for the parser stage. Parse errors were already reported as they
/// happened.
fn join_parser(parser: JoinHandle<usize>) {
    match parser.join() {
        Ok(0) => {}
        Ok(errors) => info!(errors, "parser reported errors"),
        Err(_) => eprintln!("Error: parser thread panicked"),
    }
}

/// Compiles the runtime builtins and links them with `object` into
/// `executable`, then marks it executable.
fn link_executable(object: &Path, executable: &Path) -> Result<()> {
    let mut runtime_source = tempfile::Builder::new()
        .prefix("kaleidoscope-runtime")
        .suffix(".c")
        .tempfile()?;
    runtime_source.write_all(RUNTIME_SOURCE.as_bytes())?;
    runtime_source.flush()?;

    let status = Command::new("clang")
        .arg("-o")
        .arg(executable)
        .arg(runtime_source.path())
        .arg(object)
        .status()
        .context("build failure: could not run clang")?;

    if !status.success() {
        bail!("build failure: clang exited with {}", status);
    }

    set_executable(executable)?;
    info!(executable = %executable.display(), "linked executable");

    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;

    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

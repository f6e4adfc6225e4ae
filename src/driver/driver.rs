//! Emission driver.
//!
//! Pulls top-level nodes one at a time, generates each into the shared module
//! and, depending on the options, dumps the IR of every generated function or
//! evaluates top-level expressions through the JIT. Whole-module artifacts
//! (object code, bitcode, textual IR) are emitted after the stream ends.

use std::{fmt::Debug, io::Write};

use inkwell::values::AnyValue;
use tracing::{debug, info};

use crate::{
    ast::ast::Node,
    compiler::{
        compiler::Compiler,
        function::gen_node,
        target::{Jit, Runtime},
    },
    display_error,
    errors::errors::Error,
    lexer::tokens::Token,
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EmitOptions {
    /// Print the module once up front, then every generated function
    pub dump_ir: bool,
    /// JIT-evaluate top-level expressions and print their values
    pub execute: bool,
}

/// Outcome of a [`Driver::run`] pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub generated: usize,
    pub failed: usize,
    pub evaluated: Vec<f64>,
}

pub struct Driver<'a, 'ctx, W: Write> {
    compiler: &'a mut Compiler<'ctx>,
    runtime: &'a Runtime,
    /// Created on the first evaluation
    jit: Option<Jit<'ctx>>,
    options: EmitOptions,
    out: W,
}

impl<'a, 'ctx, W: Write> Driver<'a, 'ctx, W> {
    /// Creates a driver writing dumps and results to `out`.
    ///
    /// The compiler's module is configured for the runtime's target.
    pub fn new(
        compiler: &'a mut Compiler<'ctx>,
        runtime: &'a Runtime,
        options: EmitOptions,
        out: W,
    ) -> Self {
        runtime.configure_module(&compiler.module);

        Driver {
            compiler,
            runtime,
            jit: None,
            options,
            out,
        }
    }

    /// Generates every node in order.
    ///
    /// A node that fails to generate is reported on stderr and skipped.
    /// Evaluation and write failures end the run.
    pub fn run<I>(&mut self, nodes: I) -> Result<Report, Error>
    where
        I: IntoIterator<Item = Node>,
    {
        let mut report = Report::default();

        if self.options.dump_ir {
            writeln!(self.out, "{}", self.compiler.module_ir())?;
        }

        for node in nodes {
            let function = match gen_node(self.compiler, &node) {
                Ok(function) => function,
                Err(error) => {
                    display_error(&error);
                    eprintln!("Error: Codegen failed; skipping.");
                    report.failed += 1;
                    continue;
                }
            };
            report.generated += 1;

            if self.options.dump_ir {
                write!(self.out, "{}", function.print_to_string().to_string())?;
            }

            if self.options.execute && node.is_top_level_expression() {
                let name = function.get_name().to_string_lossy().into_owned();
                let value = self.evaluate(&name)?;

                writeln!(self.out, "Evaluated to: {}", value)?;
                report.evaluated.push(value);
            }
        }

        info!(
            generated = report.generated,
            failed = report.failed,
            "code generation finished"
        );

        Ok(report)
    }

    fn evaluate(&mut self, name: &str) -> Result<f64, Error> {
        let jit = match &mut self.jit {
            Some(jit) => jit,
            jit @ None => jit.insert(self.runtime.create_jit(self.compiler.context)?),
        };

        jit.evaluate(&self.compiler.module, name)
    }

    /// Native object code for everything generated so far.
    pub fn emit_object(&self) -> Result<Vec<u8>, Error> {
        self.runtime.emit_object(&self.compiler.module)
    }

    pub fn emit_bitcode<O: Write>(&self, writer: &mut O) -> Result<(), Error> {
        let buffer = self.compiler.module.write_bitcode_to_memory();
        writer.write_all(buffer.as_slice())?;
        debug!(bytes = buffer.get_size(), "wrote bitcode");

        Ok(())
    }

    pub fn emit_ir<O: Write>(&self, writer: &mut O) -> Result<(), Error> {
        writer.write_all(self.compiler.module_ir().as_bytes())?;

        Ok(())
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

/// Writes a pretty debug dump of every token. Returns the token count.
pub fn dump_tokens<I, O>(tokens: I, writer: &mut O) -> Result<usize, Error>
where
    I: IntoIterator<Item = Token>,
    O: Write,
{
    dump_debug(tokens, writer)
}

/// Writes a pretty debug dump of every node. Returns the node count.
pub fn dump_nodes<I, O>(nodes: I, writer: &mut O) -> Result<usize, Error>
where
    I: IntoIterator<Item = Node>,
    O: Write,
{
    dump_debug(nodes, writer)
}

fn dump_debug<T, I, O>(items: I, writer: &mut O) -> Result<usize, Error>
where
    T: Debug,
    I: IntoIterator<Item = T>,
    O: Write,
{
    let mut count = 0;
    for item in items {
        writeln!(writer, "{:#?}", item)?;
        count += 1;
    }

    Ok(count)
}

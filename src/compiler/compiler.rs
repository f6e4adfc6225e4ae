//! Main compiler module.
//!
//! This module contains the core Compiler structure shared by every code
//! generator. It bundles the LLVM context, the destination module, the IR
//! builder, the symbol table and the optional per-function optimizer.

use inkwell::{
    builder::Builder,
    context::Context,
    module::Module,
    types::FloatType,
    values::{FunctionValue, PointerValue},
};

use crate::errors::errors::{Error, ErrorImpl};

use super::{
    optimizer::Optimizer,
    scope::{Binding, Scope},
};

/// The main compiler structure that holds the state of the compilation process.
///
/// One instance lives for a whole compilation run. Every generated function
/// ends up in `module`.
///
/// # Type Parameters
///
/// * `'ctx` - Lifetime of the LLVM context
pub struct Compiler<'ctx> {
    /// Function pass manager, present when optimization is enabled.
    /// Declared before `module` so it is dropped first.
    pub optimizer: Option<Optimizer<'ctx>>,

    /// Reference to the LLVM context
    pub context: &'ctx Context,
    /// The LLVM module being built
    pub module: Module<'ctx>,
    /// The LLVM IR builder
    pub builder: Builder<'ctx>,

    /// Names visible in the function body being generated
    pub scope: Scope<Binding<'ctx>>,

    /// Counter used to name top-level expressions
    anonymous_count: usize,
}

impl<'ctx> Compiler<'ctx> {
    /// Creates a new Compiler instance.
    ///
    /// # Arguments
    ///
    /// * `context` - Reference to the LLVM context
    /// * `module_name` - Name of the LLVM module
    /// * `optimize` - Whether to run the per-function pass pipeline
    pub fn new(context: &'ctx Context, module_name: &str, optimize: bool) -> Self {
        let module = context.create_module(module_name);
        let optimizer = optimize.then(|| Optimizer::new(&module));

        Compiler {
            optimizer,
            context,
            module,
            builder: context.create_builder(),
            scope: Scope::new(),
            anonymous_count: 0,
        }
    }

    pub fn f64_type(&self) -> FloatType<'ctx> {
        self.context.f64_type()
    }

    /// Runs `f` inside a fresh binding frame.
    ///
    /// The frame is popped whether `f` succeeds or fails.
    pub fn scoped<T, F>(&mut self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Self) -> Result<T, Error>,
    {
        self.scope.enter();
        let result = f(self);
        self.scope.exit();

        result
    }

    /// The function that owns the builder's current insertion block.
    pub fn current_function(&self) -> Result<FunctionValue<'ctx>, Error> {
        self.builder
            .get_insert_block()
            .and_then(|block| block.get_parent())
            .ok_or_else(|| Error::from(ErrorImpl::NoInsertionPoint))
    }

    /// Allocates a `double` slot at the top of the current function's entry
    /// block, so the promote-to-register pass can see it.
    pub fn create_entry_block_alloca(&self, name: &str) -> Result<PointerValue<'ctx>, Error> {
        let function = self.current_function()?;
        let entry = function
            .get_first_basic_block()
            .ok_or_else(|| Error::from(ErrorImpl::NoInsertionPoint))?;

        let builder = self.context.create_builder();
        match entry.get_first_instruction() {
            Some(instruction) => builder.position_before(&instruction),
            None => builder.position_at_end(entry),
        }

        Ok(builder.build_alloca(self.f64_type(), name)?)
    }

    /// Fresh module-unique name for a top-level expression.
    pub fn next_anonymous_name(&mut self) -> String {
        let name = format!("__anon_expr{}", self.anonymous_count);
        self.anonymous_count += 1;

        name
    }

    /// Textual IR of the whole module.
    pub fn module_ir(&self) -> String {
        self.module.print_to_string().to_string()
    }
}

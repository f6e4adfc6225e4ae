//! Native target setup, JIT evaluation and object emission.

use std::collections::HashSet;

use inkwell::{
    context::Context,
    execution_engine::ExecutionEngine,
    module::Module,
    targets::{CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine},
    OptimizationLevel,
};
use lazy_static::lazy_static;
use tracing::{debug, info};

use crate::{
    errors::errors::{Error, ErrorImpl},
    runtime::builtins,
};

use super::function::into_declaration;

lazy_static! {
    /// Native target initialization, done once per process.
    static ref NATIVE_TARGET: Result<(), String> = {
        ExecutionEngine::link_in_mc_jit();
        Target::initialize_native(&InitializationConfig::default())
    };
}

/// Signature of every top-level expression once compiled.
type TopLevelFunction = unsafe extern "C" fn() -> f64;

/// Host target machine plus the settings used for JIT engines.
pub struct Runtime {
    pub target_machine: TargetMachine,
    jit_level: OptimizationLevel,
}

impl Runtime {
    /// Initializes the native target and builds a machine for the host.
    ///
    /// With `verbose` set, the triple, target description and data layout are
    /// logged.
    pub fn initialize(verbose: bool) -> Result<Self, Error> {
        (*NATIVE_TARGET)
            .clone()
            .map_err(|message| ErrorImpl::TargetInitialization { message })?;

        let triple = TargetMachine::get_default_triple();
        let target = Target::from_triple(&triple).map_err(|message| {
            ErrorImpl::TargetInitialization {
                message: message.to_string(),
            }
        })?;

        let target_machine = target
            .create_target_machine(
                &triple,
                "",
                "",
                OptimizationLevel::None,
                RelocMode::Default,
                CodeModel::Small,
            )
            .ok_or_else(|| ErrorImpl::TargetInitialization {
                message: format!(
                    "could not create a target machine for {}",
                    triple.as_str().to_string_lossy()
                ),
            })?;

        if verbose {
            info!(triple = %triple.as_str().to_string_lossy(), "target triple");
            info!(
                description = %target.get_description().to_string_lossy(),
                "target"
            );
            info!(
                layout = %target_machine
                    .get_target_data()
                    .get_data_layout()
                    .as_str()
                    .to_string_lossy(),
                "data layout"
            );
        }

        Ok(Runtime {
            target_machine,
            jit_level: OptimizationLevel::Default,
        })
    }

    /// Stamps the host triple and data layout onto `module`.
    pub fn configure_module(&self, module: &Module) {
        module.set_triple(&self.target_machine.get_triple());
        module.set_data_layout(&self.target_machine.get_target_data().get_data_layout());
    }

    /// Native object code for the whole module.
    pub fn emit_object(&self, module: &Module) -> Result<Vec<u8>, Error> {
        let buffer = self
            .target_machine
            .write_to_memory_buffer(module, FileType::Object)
            .map_err(|message| ErrorImpl::Emission {
                message: message.to_string(),
            })?;

        Ok(buffer.as_slice().to_vec())
    }

    /// Creates a JIT session bound to `context`.
    ///
    /// The engine starts out owning an empty module configured for the host.
    pub fn create_jit<'ctx>(&self, context: &'ctx Context) -> Result<Jit<'ctx>, Error> {
        let root = context.create_module("__jit");
        self.configure_module(&root);

        let engine = root
            .create_jit_execution_engine(self.jit_level)
            .map_err(|message| ErrorImpl::ExecutionEngine {
                message: message.to_string(),
            })?;

        Ok(Jit {
            engine,
            modules: vec![root],
            compiled: HashSet::new(),
        })
    }
}

/// MCJIT session fed from a module that keeps growing.
///
/// The engine takes ownership of every module handed to it, so each
/// evaluation adds a copy of the live module. Functions compiled by an earlier
/// copy are reduced to declarations first and resolve to the existing code.
pub struct Jit<'ctx> {
    engine: ExecutionEngine<'ctx>,
    modules: Vec<Module<'ctx>>,
    /// Names of every function the engine already has code for
    compiled: HashSet<String>,
}

impl<'ctx> Jit<'ctx> {
    /// Runs the zero-argument function `name` from `module` and returns its
    /// result.
    pub fn evaluate(&mut self, module: &Module<'ctx>, name: &str) -> Result<f64, Error> {
        module.verify().map_err(|message| ErrorImpl::ExecutionEngine {
            message: message.to_string(),
        })?;

        let snapshot = module.clone();
        let mut defined = Vec::new();

        for function in snapshot.get_functions().collect::<Vec<_>>() {
            if function.count_basic_blocks() == 0 {
                continue;
            }

            let symbol = function.get_name().to_string_lossy().into_owned();
            if self.compiled.contains(&symbol) {
                into_declaration(&snapshot, function);
            } else {
                defined.push(symbol);
            }
        }

        self.engine
            .add_module(&snapshot)
            .map_err(|()| ErrorImpl::ExecutionEngine {
                message: String::from("module is already owned by an execution engine"),
            })?;

        for (builtin, address) in builtins() {
            if let Some(declaration) = snapshot.get_function(builtin) {
                if declaration.count_basic_blocks() == 0 {
                    self.engine.add_global_mapping(&declaration, address);
                }
            }
        }

        debug!(functions = defined.len(), "added module to the JIT");
        self.compiled.extend(defined);
        self.modules.push(snapshot);

        let function = unsafe { self.engine.get_function::<TopLevelFunction>(name) }.map_err(
            |error| ErrorImpl::ExecutionEngine {
                message: format!("{:?}: {}", error, name),
            },
        )?;

        let value = unsafe { function.call() };
        debug!(function = name, value, "evaluated");

        Ok(value)
    }

    /// Modules owned by the engine, oldest first. The first one is empty.
    pub fn modules(&self) -> &[Module<'ctx>] {
        &self.modules
    }

    pub fn is_compiled(&self, name: &str) -> bool {
        self.compiled.contains(name)
    }
}

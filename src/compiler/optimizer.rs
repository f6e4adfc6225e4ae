use inkwell::{module::Module, passes::PassManager, values::FunctionValue};
use tracing::debug;

/// Per-function pass pipeline, run on every function right after it has been
/// verified.
pub struct Optimizer<'ctx> {
    passes: PassManager<FunctionValue<'ctx>>,
}

impl<'ctx> Optimizer<'ctx> {
    pub fn new(module: &Module<'ctx>) -> Self {
        let passes = PassManager::create(module);

        passes.add_promote_memory_to_register_pass(); // Promote stack slots to SSA registers
        passes.add_instruction_combining_pass();
        passes.add_reassociate_pass(); // Reorder expressions to enable better optimizations
        passes.add_gvn_pass(); // Eliminate redundant calculations
        passes.add_cfg_simplification_pass(); // Simplify the control flow graph

        passes.initialize();

        Optimizer { passes }
    }

    /// Returns whether any pass changed the function.
    pub fn run(&self, function: &FunctionValue<'ctx>) -> bool {
        let changed = self.passes.run_on(function);
        debug!(
            function = %function.get_name().to_string_lossy(),
            changed,
            "optimized function"
        );

        changed
    }
}

use inkwell::{
    module::{Linkage, Module},
    types::BasicMetadataTypeEnum,
    values::FunctionValue,
};
use tracing::debug;

use crate::{
    ast::ast::{Function, Node, Prototype},
    errors::errors::{Error, ErrorImpl},
};

use super::{compiler::Compiler, expr::gen_expression, scope::Binding};

/// Generates the function for one top-level node.
pub fn gen_node<'ctx>(
    compiler: &mut Compiler<'ctx>,
    node: &Node,
) -> Result<FunctionValue<'ctx>, Error> {
    match node {
        Node::Prototype(prototype) => gen_prototype(compiler, prototype),
        Node::Function(function) => gen_function(compiler, function),
    }
}

/// Declares `double name(double, ...)`, or reuses an earlier declaration of
/// the same name.
///
/// Reuse fails if the earlier function already has a body, or if it takes a
/// different number of parameters. Each parameter is named and bound in the
/// current scope.
pub fn gen_prototype<'ctx>(
    compiler: &mut Compiler<'ctx>,
    prototype: &Prototype,
) -> Result<FunctionValue<'ctx>, Error> {
    declare(compiler, prototype).map(|(function, _)| function)
}

/// Like [`gen_prototype`], also reporting whether an existing declaration
/// was reused.
fn declare<'ctx>(
    compiler: &mut Compiler<'ctx>,
    prototype: &Prototype,
) -> Result<(FunctionValue<'ctx>, bool), Error> {
    let name = if prototype.is_anonymous() {
        compiler.next_anonymous_name()
    } else {
        prototype.name.clone()
    };

    let (function, reused) = match compiler.module.get_function(&name) {
        Some(function) => {
            if function.count_basic_blocks() > 0 {
                return Err(ErrorImpl::FunctionRedefinition { function: name }.into());
            }

            let expected = function.count_params() as usize;
            if expected != prototype.arity() {
                return Err(ErrorImpl::ArityRedefinition {
                    function: name,
                    expected,
                    received: prototype.arity(),
                }
                .into());
            }

            (function, true)
        }
        None => {
            let param_types: Vec<BasicMetadataTypeEnum<'ctx>> =
                vec![compiler.f64_type().into(); prototype.arity()];
            let function_type = compiler.f64_type().fn_type(&param_types, false);

            let function = compiler
                .module
                .add_function(&name, function_type, Some(Linkage::External));

            (function, false)
        }
    };

    for (param, arg) in function.get_param_iter().zip(&prototype.args) {
        let value = param.into_float_value();
        value.set_name(arg);
        compiler.scope.bind(arg, Binding::Param(value));
    }

    Ok((function, reused))
}

/// Generates a function definition.
///
/// On any failure the half-built function is discarded, so a later
/// definition of the same name starts clean. A function that was declared
/// earlier goes back to being a declaration, keeping its callers valid; one
/// created here is removed from the module.
pub fn gen_function<'ctx>(
    compiler: &mut Compiler<'ctx>,
    function: &Function,
) -> Result<FunctionValue<'ctx>, Error> {
    compiler.scope.clear();

    let (value, reused) = declare(compiler, &function.prototype)?;
    let name = value.get_name().to_string_lossy().into_owned();

    let entry = compiler.context.append_basic_block(value, "entry");
    compiler.builder.position_at_end(entry);

    if let Err(cause) = gen_body(compiler, value, function) {
        discard(compiler, value, reused);

        return Err(ErrorImpl::FunctionBody {
            function: name,
            cause: Box::new(cause),
        }
        .into());
    }

    if !value.verify(true) {
        discard(compiler, value, reused);

        return Err(ErrorImpl::VerificationFailed { function: name }.into());
    }

    if let Some(optimizer) = &compiler.optimizer {
        optimizer.run(&value);
    }

    debug!(function = %name, "generated function");

    Ok(value)
}

fn gen_body<'ctx>(
    compiler: &mut Compiler<'ctx>,
    value: FunctionValue<'ctx>,
    function: &Function,
) -> Result<(), Error> {
    // Spill every parameter so the body can assign to it
    for (param, arg) in value.get_param_iter().zip(&function.prototype.args) {
        let slot = compiler.create_entry_block_alloca(arg)?;
        compiler.builder.build_store(slot, param.into_float_value())?;
        compiler.scope.bind(arg, Binding::Slot(slot));
    }

    let body = gen_expression(compiler, &function.body)?;
    compiler.builder.build_return(Some(&body))?;

    Ok(())
}

fn discard<'ctx>(compiler: &mut Compiler<'ctx>, value: FunctionValue<'ctx>, reused: bool) {
    compiler.builder.clear_insertion_position();

    if reused {
        into_declaration(&compiler.module, value);
    } else {
        unsafe { value.delete() };
    }
}

/// Replaces `function` with a body-less declaration of the same name and
/// type.
///
/// Every use of the old function is moved onto the declaration before the old
/// one is deleted.
pub fn into_declaration<'ctx>(
    module: &Module<'ctx>,
    function: FunctionValue<'ctx>,
) -> FunctionValue<'ctx> {
    let name = function.get_name().to_string_lossy().into_owned();

    // Added under a suffixed name while `function` still holds `name`
    let declaration = module.add_function(&name, function.get_type(), Some(Linkage::External));
    function.replace_all_uses_with(declaration);
    unsafe { function.delete() };
    declaration.as_global_value().set_name(&name);

    declaration
}

use inkwell::{
    basic_block::BasicBlock,
    values::{BasicMetadataValueEnum, FloatValue, FunctionValue},
    FloatPredicate,
};

use crate::{
    ast::ast::Expr,
    errors::errors::{Error, ErrorImpl},
};

use super::{compiler::Compiler, scope::Binding};

/// Generates LLVM IR for the given expression.
pub fn gen_expression<'ctx>(
    compiler: &mut Compiler<'ctx>,
    expression: &Expr,
) -> Result<FloatValue<'ctx>, Error> {
    match expression {
        Expr::Number(value) => Ok(compiler.f64_type().const_float(*value)),
        Expr::Variable(name) => gen_variable(compiler, name),
        Expr::Binary {
            operator: '=',
            left,
            right,
        } => gen_assignment(compiler, left, right),
        Expr::Binary {
            operator,
            left,
            right,
        } => gen_binary(compiler, *operator, left, right),
        Expr::Unary { operator, operand } => gen_unary(compiler, *operator, operand),
        Expr::If {
            condition,
            then_branch,
            else_branch,
        } => gen_if(compiler, condition, then_branch, else_branch),
        Expr::For {
            counter,
            start,
            test,
            step,
            body,
        } => gen_for(compiler, counter, start, test, step.as_deref(), body),
        Expr::Var { bindings, body } => gen_var(compiler, bindings, body),
        Expr::Call { callee, arguments } => gen_call(compiler, callee, arguments),
    }
}

fn gen_variable<'ctx>(compiler: &Compiler<'ctx>, name: &str) -> Result<FloatValue<'ctx>, Error> {
    match compiler.scope.get(name) {
        Some(Binding::Slot(slot)) => Ok(compiler
            .builder
            .build_load(*slot, name)?
            .into_float_value()),
        Some(Binding::Param(value)) => Ok(*value),
        None => Err(ErrorImpl::UnknownVariable {
            variable: String::from(name),
        }
        .into()),
    }
}

fn gen_assignment<'ctx>(
    compiler: &mut Compiler<'ctx>,
    left: &Expr,
    right: &Expr,
) -> Result<FloatValue<'ctx>, Error> {
    let Expr::Variable(name) = left else {
        return Err(ErrorImpl::InvalidAssignmentTarget.into());
    };

    let value = gen_expression(compiler, right)?;

    match compiler.scope.get(name) {
        Some(Binding::Slot(slot)) => {
            compiler.builder.build_store(*slot, value)?;
            Ok(value)
        }
        // Parameters are spilled to slots before the body runs, so this only
        // happens for code generated outside a function definition.
        Some(Binding::Param(_)) => Err(ErrorImpl::InvalidAssignmentTarget.into()),
        None => Err(ErrorImpl::UnknownVariable {
            variable: name.clone(),
        }
        .into()),
    }
}

fn gen_binary<'ctx>(
    compiler: &mut Compiler<'ctx>,
    operator: char,
    left: &Expr,
    right: &Expr,
) -> Result<FloatValue<'ctx>, Error> {
    let lhs = gen_expression(compiler, left)?;
    let rhs = gen_expression(compiler, right)?;

    let builder = &compiler.builder;
    let value = match operator {
        '+' => builder.build_float_add(lhs, rhs, "addtmp")?,
        '-' => builder.build_float_sub(lhs, rhs, "subtmp")?,
        '*' => builder.build_float_mul(lhs, rhs, "multmp")?,
        '/' => builder.build_float_div(lhs, rhs, "divtmp")?,
        '<' => {
            let comparison = builder.build_float_compare(FloatPredicate::OLT, lhs, rhs, "cmptmp")?;
            builder.build_unsigned_int_to_float(comparison, compiler.f64_type(), "booltmp")?
        }
        _ => {
            let Some(function) = compiler.module.get_function(&format!("binary{}", operator))
            else {
                return Err(ErrorImpl::InvalidBinaryOperator { operator }.into());
            };

            build_float_call(compiler, function, &[lhs, rhs], "binop")?
        }
    };

    Ok(value)
}

fn gen_unary<'ctx>(
    compiler: &mut Compiler<'ctx>,
    operator: char,
    operand: &Expr,
) -> Result<FloatValue<'ctx>, Error> {
    let operand = gen_expression(compiler, operand)?;

    let Some(function) = compiler.module.get_function(&format!("unary{}", operator)) else {
        return Err(ErrorImpl::UnknownUnaryOperator { operator }.into());
    };

    build_float_call(compiler, function, &[operand], "unop")
}

fn gen_if<'ctx>(
    compiler: &mut Compiler<'ctx>,
    condition: &Expr,
    then_branch: &Expr,
    else_branch: &Expr,
) -> Result<FloatValue<'ctx>, Error> {
    let condition = gen_expression(compiler, condition)?;
    let zero = compiler.f64_type().const_float(0.0);
    let condition = compiler.builder.build_float_compare(
        FloatPredicate::ONE,
        condition,
        zero,
        "ifcond",
    )?;

    let parent_function = compiler.current_function()?;
    let then_block = compiler.context.append_basic_block(parent_function, "then");
    let else_block = compiler.context.append_basic_block(parent_function, "else");
    let merge_block = compiler.context.append_basic_block(parent_function, "ifcont");

    compiler
        .builder
        .build_conditional_branch(condition, then_block, else_block)?;

    // Either branch may add blocks of its own, so the phi takes its incoming
    // edge from wherever the branch ended up.
    compiler.builder.position_at_end(then_block);
    let then_value = gen_expression(compiler, then_branch)?;
    compiler.builder.build_unconditional_branch(merge_block)?;
    let then_end = current_block(compiler)?;

    compiler.builder.position_at_end(else_block);
    let else_value = gen_expression(compiler, else_branch)?;
    compiler.builder.build_unconditional_branch(merge_block)?;
    let else_end = current_block(compiler)?;

    compiler.builder.position_at_end(merge_block);
    let phi = compiler.builder.build_phi(compiler.f64_type(), "iftmp")?;
    phi.add_incoming(&[(&then_value, then_end), (&else_value, else_end)]);

    Ok(phi.as_basic_value().into_float_value())
}

/// `for counter = start, test, step in body`
///
/// The body always runs at least once. The counter is advanced before the
/// test is evaluated, so `for i = 0, i < 5 in ...` runs the body five times.
fn gen_for<'ctx>(
    compiler: &mut Compiler<'ctx>,
    counter: &str,
    start: &Expr,
    test: &Expr,
    step: Option<&Expr>,
    body: &Expr,
) -> Result<FloatValue<'ctx>, Error> {
    let slot = compiler.create_entry_block_alloca(counter)?;
    let start = gen_expression(compiler, start)?;
    compiler.builder.build_store(slot, start)?;

    let parent_function = compiler.current_function()?;
    let loop_block = compiler.context.append_basic_block(parent_function, "loop");
    compiler.builder.build_unconditional_branch(loop_block)?;
    compiler.builder.position_at_end(loop_block);

    compiler.scoped(|compiler| {
        compiler.scope.bind(counter, Binding::Slot(slot));

        gen_expression(compiler, body)?;

        let step = match step {
            Some(step) => gen_expression(compiler, step)?,
            None => compiler.f64_type().const_float(1.0),
        };
        let current = compiler
            .builder
            .build_load(slot, counter)?
            .into_float_value();
        let next = compiler.builder.build_float_add(current, step, "nextvar")?;
        compiler.builder.build_store(slot, next)?;

        let test = gen_expression(compiler, test)?;
        let zero = compiler.f64_type().const_float(0.0);
        let keep_going = compiler.builder.build_float_compare(
            FloatPredicate::ONE,
            test,
            zero,
            "loopcond",
        )?;

        let after_block = compiler
            .context
            .append_basic_block(parent_function, "afterloop");
        compiler
            .builder
            .build_conditional_branch(keep_going, loop_block, after_block)?;
        compiler.builder.position_at_end(after_block);

        Ok(())
    })?;

    Ok(compiler.f64_type().const_zero())
}

/// `var a = 1, b in body`
///
/// Each initializer sees the bindings before it, but not its own name.
fn gen_var<'ctx>(
    compiler: &mut Compiler<'ctx>,
    bindings: &[(String, Option<Expr>)],
    body: &Expr,
) -> Result<FloatValue<'ctx>, Error> {
    compiler.scoped(|compiler| {
        for (name, initializer) in bindings {
            let value = match initializer {
                Some(initializer) => gen_expression(compiler, initializer)?,
                None => compiler.f64_type().const_float(0.0),
            };

            let slot = compiler.create_entry_block_alloca(name)?;
            compiler.builder.build_store(slot, value)?;
            compiler.scope.bind(name, Binding::Slot(slot));
        }

        gen_expression(compiler, body)
    })
}

fn gen_call<'ctx>(
    compiler: &mut Compiler<'ctx>,
    callee: &str,
    arguments: &[Expr],
) -> Result<FloatValue<'ctx>, Error> {
    let Some(function) = compiler.module.get_function(callee) else {
        return Err(ErrorImpl::UnknownFunction {
            function: String::from(callee),
        }
        .into());
    };

    let expected = function.count_params() as usize;
    if expected != arguments.len() {
        return Err(ErrorImpl::IncorrectArgumentCount {
            function: String::from(callee),
            expected,
            received: arguments.len(),
        }
        .into());
    }

    let mut values = Vec::with_capacity(arguments.len());
    for argument in arguments {
        values.push(gen_expression(compiler, argument)?);
    }

    build_float_call(compiler, function, &values, "calltmp")
}

fn build_float_call<'ctx>(
    compiler: &Compiler<'ctx>,
    function: FunctionValue<'ctx>,
    arguments: &[FloatValue<'ctx>],
    name: &str,
) -> Result<FloatValue<'ctx>, Error> {
    let arguments: Vec<BasicMetadataValueEnum<'ctx>> =
        arguments.iter().map(|argument| (*argument).into()).collect();

    let value = compiler
        .builder
        .build_call(function, &arguments, name)?
        .try_as_basic_value()
        .left()
        .ok_or_else(|| ErrorImpl::Builder {
            message: format!(
                "call to {:?} produced no value",
                function.get_name().to_string_lossy()
            ),
        })?;

    Ok(value.into_float_value())
}

fn current_block<'ctx>(compiler: &Compiler<'ctx>) -> Result<BasicBlock<'ctx>, Error> {
    compiler
        .builder
        .get_insert_block()
        .ok_or_else(|| Error::from(ErrorImpl::NoInsertionPoint))
}

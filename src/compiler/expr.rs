use crate::{
    ast::ast::Expr,
    errors::errors::{Error, ErrorImpl},
};

use super::{backend::Backend, compiler::Compiler};

/// Lowers `expression` into the backend and returns its value.
pub fn gen_expression<B: Backend>(
    compiler: &mut Compiler<'_, B>,
    expression: &Expr,
) -> Result<B::Value, Error> {
    match expression {
        Expr::NumberLiteral { value } => compiler.backend.emit_constant(*value),
        Expr::VariableRef { name } => {
            let storage = compiler.lookup_variable(name).cloned().ok_or_else(|| {
                Error::lowering(ErrorImpl::UnknownVariable { name: name.clone() })
            })?;

            compiler.backend.emit_load(&storage, name)
        }
        Expr::BinaryOp { op, left, right } => {
            let left = gen_expression(compiler, left)?;
            let right = gen_expression(compiler, right)?;

            let backend = &mut *compiler.backend;
            match op {
                '+' => backend.emit_add(&left, &right),
                '-' => backend.emit_sub(&left, &right),
                '*' => backend.emit_mul(&left, &right),
                '<' => {
                    let compared = backend.emit_compare_less_than(&left, &right)?;
                    backend.emit_convert_bool_to_number(&compared)
                }
                _ => Err(Error::lowering(ErrorImpl::InvalidBinaryOperator {
                    operator: *op,
                })),
            }
        }
        Expr::Call { callee, args } => gen_call(compiler, callee, args),
        Expr::VarBlock { bindings, body } => gen_var_block(compiler, bindings, body),
    }
}

fn gen_call<B: Backend>(
    compiler: &mut Compiler<'_, B>,
    callee: &str,
    args: &[Expr],
) -> Result<B::Value, Error> {
    let function = compiler.backend.lookup_function(callee).ok_or_else(|| {
        Error::lowering(ErrorImpl::UnknownFunction {
            name: String::from(callee),
        })
    })?;

    let expected = compiler.backend.param_count(&function);
    if expected != args.len() {
        return Err(Error::lowering(ErrorImpl::IncorrectArgumentCount {
            function: String::from(callee),
            expected,
            received: args.len(),
        }));
    }

    let values = args
        .iter()
        .map(|arg| gen_expression(compiler, arg))
        .collect::<Result<Vec<B::Value>, Error>>()?;

    compiler.backend.emit_call(&function, &values)
}

/// Installs each binding in order, lowers the body, then puts back whatever the
/// names meant before, whether or not lowering succeeded.
fn gen_var_block<B: Backend>(
    compiler: &mut Compiler<'_, B>,
    bindings: &[(String, Option<Expr>)],
    body: &Expr,
) -> Result<B::Value, Error> {
    let mut shadowed = Vec::with_capacity(bindings.len());

    let result = install_bindings(compiler, bindings, &mut shadowed)
        .and_then(|_| gen_expression(compiler, body));

    for (name, previous) in shadowed.into_iter().rev() {
        compiler.restore_variable(name, previous);
    }

    result
}

fn install_bindings<B: Backend>(
    compiler: &mut Compiler<'_, B>,
    bindings: &[(String, Option<Expr>)],
    shadowed: &mut Vec<(String, Option<B::Storage>)>,
) -> Result<(), Error> {
    for (name, initializer) in bindings {
        // The initializer runs before `name` is bound, so it sees the outer binding
        let value = match initializer {
            Some(initializer) => gen_expression(compiler, initializer)?,
            None => compiler.backend.emit_constant(0.0)?,
        };

        let storage = compiler.backend.allocate_local(name)?;
        compiler.backend.emit_store(&value, &storage)?;

        let previous = compiler.bind_variable(name.clone(), storage);
        shadowed.push((name.clone(), previous));
    }

    Ok(())
}

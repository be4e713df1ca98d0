//! LLVM backend built on inkwell.
//!
//! Every value is an `f64`. Locals are `alloca`s placed at the top of the
//! function's entry block, and comparisons produce an `i1` that is widened back
//! to a double with `uitofp`.

use std::{fmt::Display, path::PathBuf};

use inkwell::{
    builder::Builder,
    context::Context,
    module::Module,
    types::BasicMetadataTypeEnum,
    values::{
        AnyValue, BasicMetadataValueEnum, BasicValueEnum, FloatValue, FunctionValue, IntValue,
        PointerValue,
    },
    FloatPredicate,
};

use crate::{
    ast::declarations::Prototype,
    errors::errors::{Error, ErrorImpl},
};

use super::backend::Backend;

/// LLVM code generation state for one module.
///
/// # Type Parameters
///
/// * `'ctx` - Lifetime of the LLVM context
pub struct LlvmBackend<'ctx> {
    /// Reference to the LLVM context
    pub context: &'ctx Context,
    /// The LLVM module being built
    pub module: Module<'ctx>,
    /// The LLVM IR builder
    pub builder: Builder<'ctx>,
    /// The function whose body is being emitted
    current_function: Option<FunctionValue<'ctx>>,
}

impl<'ctx> LlvmBackend<'ctx> {
    pub fn new(context: &'ctx Context, module_name: &str) -> Self {
        LlvmBackend {
            context,
            module: context.create_module(module_name),
            builder: context.create_builder(),
            current_function: None,
        }
    }

    /// Textual IR of the whole module.
    pub fn print_to_string(&self) -> String {
        self.module.print_to_string().to_string()
    }

    /// Textual IR of one function, if it exists.
    pub fn print_function(&self, name: &str) -> Option<String> {
        self.module
            .get_function(name)
            .map(|function| function.print_to_string().to_string())
    }

    /// Saves the module's IR to a file.
    pub fn save_module_to_file(&self, output_file: PathBuf) -> Result<(), Error> {
        self.module
            .print_to_file(output_file)
            .map_err(|error| backend_error(error.to_string()))
    }

    fn as_float(value: &BasicValueEnum<'ctx>) -> Result<FloatValue<'ctx>, Error> {
        match value {
            BasicValueEnum::FloatValue(value) => Ok(*value),
            other => Err(backend_error(format!("expected a double, found {:?}", other))),
        }
    }

    fn as_bool(value: &BasicValueEnum<'ctx>) -> Result<IntValue<'ctx>, Error> {
        match value {
            BasicValueEnum::IntValue(value) => Ok(*value),
            other => Err(backend_error(format!("expected an i1, found {:?}", other))),
        }
    }

    /// Creates a builder positioned at the top of the current function's entry block.
    fn entry_block_builder(&self) -> Result<Builder<'ctx>, Error> {
        let function = self
            .current_function
            .ok_or_else(|| backend_error("no function is being built"))?;
        let entry = function
            .get_first_basic_block()
            .ok_or_else(|| backend_error("function has no entry block"))?;

        let builder = self.context.create_builder();
        match entry.get_first_instruction() {
            Some(first) => builder.position_before(&first),
            None => builder.position_at_end(entry),
        }

        Ok(builder)
    }
}

fn backend_error<E: Display>(error: E) -> Error {
    Error::lowering(ErrorImpl::Backend {
        message: error.to_string(),
    })
}

impl<'ctx> Backend for LlvmBackend<'ctx> {
    type Value = BasicValueEnum<'ctx>;
    type Storage = PointerValue<'ctx>;
    type Function = FunctionValue<'ctx>;

    fn emit_constant(&mut self, value: f64) -> Result<Self::Value, Error> {
        Ok(self.context.f64_type().const_float(value).into())
    }

    fn emit_load(&mut self, storage: &Self::Storage, name: &str) -> Result<Self::Value, Error> {
        self.builder.build_load(*storage, name).map_err(backend_error)
    }

    fn emit_store(&mut self, value: &Self::Value, storage: &Self::Storage) -> Result<(), Error> {
        self.builder
            .build_store(*storage, *value)
            .map(|_| ())
            .map_err(backend_error)
    }

    fn emit_add(&mut self, lhs: &Self::Value, rhs: &Self::Value) -> Result<Self::Value, Error> {
        self.builder
            .build_float_add(Self::as_float(lhs)?, Self::as_float(rhs)?, "addtmp")
            .map(Into::into)
            .map_err(backend_error)
    }

    fn emit_sub(&mut self, lhs: &Self::Value, rhs: &Self::Value) -> Result<Self::Value, Error> {
        self.builder
            .build_float_sub(Self::as_float(lhs)?, Self::as_float(rhs)?, "subtmp")
            .map(Into::into)
            .map_err(backend_error)
    }

    fn emit_mul(&mut self, lhs: &Self::Value, rhs: &Self::Value) -> Result<Self::Value, Error> {
        self.builder
            .build_float_mul(Self::as_float(lhs)?, Self::as_float(rhs)?, "multmp")
            .map(Into::into)
            .map_err(backend_error)
    }

    fn emit_compare_less_than(
        &mut self,
        lhs: &Self::Value,
        rhs: &Self::Value,
    ) -> Result<Self::Value, Error> {
        self.builder
            .build_float_compare(
                FloatPredicate::ULT,
                Self::as_float(lhs)?,
                Self::as_float(rhs)?,
                "cmptmp",
            )
            .map(Into::into)
            .map_err(backend_error)
    }

    fn emit_convert_bool_to_number(&mut self, value: &Self::Value) -> Result<Self::Value, Error> {
        self.builder
            .build_unsigned_int_to_float(Self::as_bool(value)?, self.context.f64_type(), "booltmp")
            .map(Into::into)
            .map_err(backend_error)
    }

    fn declare_function(&mut self, proto: &Prototype) -> Result<Self::Function, Error> {
        if let Some(function) = self.module.get_function(&proto.name) {
            return Ok(function);
        }

        let f64_type = self.context.f64_type();
        let params: Vec<BasicMetadataTypeEnum<'ctx>> =
            proto.params.iter().map(|_| f64_type.into()).collect();
        let function_type = f64_type.fn_type(params.as_slice(), false);

        let function = self.module.add_function(&proto.name, function_type, None);
        for (param, name) in function.get_param_iter().zip(proto.params.iter()) {
            param.into_float_value().set_name(name);
        }

        Ok(function)
    }

    fn lookup_function(&self, name: &str) -> Option<Self::Function> {
        self.module.get_function(name)
    }

    fn param_count(&self, function: &Self::Function) -> usize {
        function.count_params() as usize
    }

    fn has_body(&self, function: &Self::Function) -> bool {
        function.count_basic_blocks() > 0
    }

    fn emit_call(
        &mut self,
        function: &Self::Function,
        args: &[Self::Value],
    ) -> Result<Self::Value, Error> {
        let args: Vec<BasicMetadataValueEnum<'ctx>> =
            args.iter().map(|arg| (*arg).into()).collect();

        self.builder
            .build_call(*function, &args[..], "calltmp")
            .map_err(backend_error)?
            .try_as_basic_value()
            .left()
            .ok_or_else(|| backend_error("call did not produce a value"))
    }

    fn allocate_local(&mut self, name: &str) -> Result<Self::Storage, Error> {
        self.entry_block_builder()?
            .build_alloca(self.context.f64_type(), name)
            .map_err(backend_error)
    }

    fn begin_function_body(
        &mut self,
        function: &Self::Function,
        proto: &Prototype,
    ) -> Result<Vec<(String, Self::Value)>, Error> {
        let entry = self.context.append_basic_block(*function, "entry");
        self.builder.position_at_end(entry);
        self.current_function = Some(*function);

        let mut params = vec![];
        for (param, name) in function.get_param_iter().zip(proto.params.iter()) {
            // A definition names its parameters, even if an extern named them differently
            Self::as_float(&param)?.set_name(name);
            params.push((name.clone(), param));
        }

        Ok(params)
    }

    fn finalize_function(
        &mut self,
        function: &Self::Function,
        return_value: &Self::Value,
    ) -> Result<(), Error> {
        self.builder
            .build_return(Some(return_value))
            .map_err(backend_error)?;
        self.current_function = None;

        if function.verify(false) {
            Ok(())
        } else {
            Err(Error::lowering(ErrorImpl::VerificationFailed {
                function: function.get_name().to_string_lossy().to_string(),
            }))
        }
    }

    fn discard_body(&mut self, function: &Self::Function) {
        if self.current_function == Some(*function) {
            self.current_function = None;
        }
        self.builder.clear_insertion_position();

        // Blocks go in reverse so no block outlives one it branches to
        for block in function.get_basic_blocks().into_iter().rev() {
            // SAFETY: the blocks belong to `function` and nothing outside it refers to them
            let _ = unsafe { block.delete() };
        }
    }

    fn discard_function(&mut self, function: &Self::Function) {
        if self.current_function == Some(*function) {
            self.current_function = None;
        }
        self.builder.clear_insertion_position();

        // SAFETY: lowering only discards functions it created itself, so no other
        // function holds a call to this one
        unsafe {
            function.delete();
        }
    }
}

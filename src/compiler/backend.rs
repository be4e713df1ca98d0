//! The code generation surface lowering emits into.
//!
//! A backend hands out opaque handles for values, local storage slots and
//! functions. Lowering never looks inside a handle; it only passes handles
//! back into the backend that created them.

use crate::{ast::declarations::Prototype, errors::errors::Error};

pub trait Backend {
    /// An SSA-style value produced by an emit operation.
    type Value: Clone;
    /// A mutable slot holding one local variable.
    type Storage: Clone;
    /// A declared (and possibly defined) function.
    type Function: Clone;

    fn emit_constant(&mut self, value: f64) -> Result<Self::Value, Error>;
    fn emit_load(&mut self, storage: &Self::Storage, name: &str) -> Result<Self::Value, Error>;
    fn emit_store(&mut self, value: &Self::Value, storage: &Self::Storage) -> Result<(), Error>;

    fn emit_add(&mut self, lhs: &Self::Value, rhs: &Self::Value) -> Result<Self::Value, Error>;
    fn emit_sub(&mut self, lhs: &Self::Value, rhs: &Self::Value) -> Result<Self::Value, Error>;
    fn emit_mul(&mut self, lhs: &Self::Value, rhs: &Self::Value) -> Result<Self::Value, Error>;
    fn emit_compare_less_than(
        &mut self,
        lhs: &Self::Value,
        rhs: &Self::Value,
    ) -> Result<Self::Value, Error>;
    fn emit_convert_bool_to_number(&mut self, value: &Self::Value) -> Result<Self::Value, Error>;

    /// Returns the function named by `proto`, declaring it first if needed.
    fn declare_function(&mut self, proto: &Prototype) -> Result<Self::Function, Error>;
    fn lookup_function(&self, name: &str) -> Option<Self::Function>;
    fn param_count(&self, function: &Self::Function) -> usize;
    fn has_body(&self, function: &Self::Function) -> bool;
    fn emit_call(
        &mut self,
        function: &Self::Function,
        args: &[Self::Value],
    ) -> Result<Self::Value, Error>;

    /// Allocates a slot in the function currently being built.
    fn allocate_local(&mut self, name: &str) -> Result<Self::Storage, Error>;

    /// Opens the body of `function`, naming its parameters after `proto`.
    ///
    /// Returns each parameter name with the value the caller passed for it.
    fn begin_function_body(
        &mut self,
        function: &Self::Function,
        proto: &Prototype,
    ) -> Result<Vec<(String, Self::Value)>, Error>;

    /// Returns `value` from the function and verifies it.
    fn finalize_function(
        &mut self,
        function: &Self::Function,
        return_value: &Self::Value,
    ) -> Result<(), Error>;

    /// Drops the partial body of a function that was declared before the
    /// failed definition began. The declaration stays callable.
    fn discard_body(&mut self, function: &Self::Function);

    /// Removes a function, declaration included, that the failed definition
    /// created.
    fn discard_function(&mut self, function: &Self::Function);
}

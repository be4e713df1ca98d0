//! A backend that records operations instead of generating code.
//!
//! Every emit call is appended to an operation list, and straight-line values
//! are folded to numbers where their inputs are known. Parameters and call
//! results are unknown.

use crate::{
    ast::declarations::Prototype,
    errors::errors::{Error, ErrorImpl},
};

use super::backend::Backend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Constant { result: ValueId, value: f64 },
    Param { result: ValueId, name: String },
    Load { result: ValueId, slot: SlotId, name: String },
    Store { value: ValueId, slot: SlotId },
    Add { result: ValueId, lhs: ValueId, rhs: ValueId },
    Sub { result: ValueId, lhs: ValueId, rhs: ValueId },
    Mul { result: ValueId, lhs: ValueId, rhs: ValueId },
    CompareLessThan { result: ValueId, lhs: ValueId, rhs: ValueId },
    BoolToNumber { result: ValueId, value: ValueId },
    Call { result: ValueId, function: String, args: Vec<ValueId> },
    Alloca { slot: SlotId, name: String },
    Declare { function: String, params: Vec<String> },
    BeginBody { function: String },
    Return { function: String, value: ValueId },
    DiscardBody { function: String },
    Discard { function: String },
}

#[derive(Debug, Clone)]
struct TraceFunction {
    name: String,
    params: Vec<String>,
    has_body: bool,
    discarded: bool,
    returned: Option<ValueId>,
}

#[derive(Debug, Default)]
pub struct TraceBackend {
    ops: Vec<Op>,
    values: Vec<Option<f64>>,
    slots: Vec<Option<f64>>,
    functions: Vec<TraceFunction>,
    current_function: Option<FunctionId>,
}

impl TraceBackend {
    pub fn new() -> Self {
        TraceBackend::default()
    }

    pub fn get_ops(&self) -> &[Op] {
        &self.ops
    }

    /// The folded number behind `value`, if every input to it was known.
    pub fn value_of(&self, value: ValueId) -> Option<f64> {
        self.values.get(value.0).copied().flatten()
    }

    /// The folded return value of a finished, live function.
    pub fn returned_value(&self, name: &str) -> Option<f64> {
        let id = self.lookup_function(name)?;
        let returned = self.functions[id.0].returned?;
        self.value_of(returned)
    }

    /// Names of declared functions that have not been discarded, in declaration order.
    pub fn function_names(&self) -> Vec<String> {
        self.functions
            .iter()
            .filter(|function| !function.discarded)
            .map(|function| function.name.clone())
            .collect()
    }

    fn new_value(&mut self, folded: Option<f64>) -> ValueId {
        self.values.push(folded);
        ValueId(self.values.len() - 1)
    }

    fn fold(&self, lhs: &ValueId, rhs: &ValueId, op: fn(f64, f64) -> f64) -> Option<f64> {
        Some(op(self.value_of(*lhs)?, self.value_of(*rhs)?))
    }

    fn check_value(&self, value: &ValueId) -> Result<(), Error> {
        if value.0 < self.values.len() {
            Ok(())
        } else {
            Err(Error::lowering(ErrorImpl::Backend {
                message: format!("unknown value %{}", value.0),
            }))
        }
    }

    fn check_slot(&self, slot: &SlotId) -> Result<(), Error> {
        if slot.0 < self.slots.len() {
            Ok(())
        } else {
            Err(Error::lowering(ErrorImpl::Backend {
                message: format!("unknown slot #{}", slot.0),
            }))
        }
    }
}

impl Backend for TraceBackend {
    type Value = ValueId;
    type Storage = SlotId;
    type Function = FunctionId;

    fn emit_constant(&mut self, value: f64) -> Result<ValueId, Error> {
        let result = self.new_value(Some(value));
        self.ops.push(Op::Constant { result, value });
        Ok(result)
    }

    fn emit_load(&mut self, storage: &SlotId, name: &str) -> Result<ValueId, Error> {
        self.check_slot(storage)?;

        let folded = self.slots[storage.0];
        let result = self.new_value(folded);
        self.ops.push(Op::Load {
            result,
            slot: *storage,
            name: String::from(name),
        });
        Ok(result)
    }

    fn emit_store(&mut self, value: &ValueId, storage: &SlotId) -> Result<(), Error> {
        self.check_value(value)?;
        self.check_slot(storage)?;

        self.slots[storage.0] = self.value_of(*value);
        self.ops.push(Op::Store {
            value: *value,
            slot: *storage,
        });
        Ok(())
    }

    fn emit_add(&mut self, lhs: &ValueId, rhs: &ValueId) -> Result<ValueId, Error> {
        let folded = self.fold(lhs, rhs, |a, b| a + b);
        let result = self.new_value(folded);
        self.ops.push(Op::Add {
            result,
            lhs: *lhs,
            rhs: *rhs,
        });
        Ok(result)
    }

    fn emit_sub(&mut self, lhs: &ValueId, rhs: &ValueId) -> Result<ValueId, Error> {
        let folded = self.fold(lhs, rhs, |a, b| a - b);
        let result = self.new_value(folded);
        self.ops.push(Op::Sub {
            result,
            lhs: *lhs,
            rhs: *rhs,
        });
        Ok(result)
    }

    fn emit_mul(&mut self, lhs: &ValueId, rhs: &ValueId) -> Result<ValueId, Error> {
        let folded = self.fold(lhs, rhs, |a, b| a * b);
        let result = self.new_value(folded);
        self.ops.push(Op::Mul {
            result,
            lhs: *lhs,
            rhs: *rhs,
        });
        Ok(result)
    }

    fn emit_compare_less_than(&mut self, lhs: &ValueId, rhs: &ValueId) -> Result<ValueId, Error> {
        // Unordered less-than: NaN on either side compares true
        let folded = self.fold(lhs, rhs, |a, b| {
            if a < b || a.is_nan() || b.is_nan() {
                1.0
            } else {
                0.0
            }
        });
        let result = self.new_value(folded);
        self.ops.push(Op::CompareLessThan {
            result,
            lhs: *lhs,
            rhs: *rhs,
        });
        Ok(result)
    }

    fn emit_convert_bool_to_number(&mut self, value: &ValueId) -> Result<ValueId, Error> {
        self.check_value(value)?;

        let folded = self.value_of(*value);
        let result = self.new_value(folded);
        self.ops.push(Op::BoolToNumber {
            result,
            value: *value,
        });
        Ok(result)
    }

    fn declare_function(&mut self, proto: &Prototype) -> Result<FunctionId, Error> {
        if let Some(existing) = self.lookup_function(&proto.name) {
            return Ok(existing);
        }

        self.functions.push(TraceFunction {
            name: proto.name.clone(),
            params: proto.params.clone(),
            has_body: false,
            discarded: false,
            returned: None,
        });
        self.ops.push(Op::Declare {
            function: proto.name.clone(),
            params: proto.params.clone(),
        });
        Ok(FunctionId(self.functions.len() - 1))
    }

    fn lookup_function(&self, name: &str) -> Option<FunctionId> {
        self.functions
            .iter()
            .position(|function| !function.discarded && function.name == name)
            .map(FunctionId)
    }

    fn param_count(&self, function: &FunctionId) -> usize {
        self.functions[function.0].params.len()
    }

    fn has_body(&self, function: &FunctionId) -> bool {
        self.functions[function.0].has_body
    }

    fn emit_call(&mut self, function: &FunctionId, args: &[ValueId]) -> Result<ValueId, Error> {
        for arg in args {
            self.check_value(arg)?;
        }

        let result = self.new_value(None);
        self.ops.push(Op::Call {
            result,
            function: self.functions[function.0].name.clone(),
            args: args.to_vec(),
        });
        Ok(result)
    }

    fn allocate_local(&mut self, name: &str) -> Result<SlotId, Error> {
        if self.current_function.is_none() {
            return Err(Error::lowering(ErrorImpl::Backend {
                message: format!("no function to allocate {:?} in", name),
            }));
        }

        self.slots.push(None);
        let slot = SlotId(self.slots.len() - 1);
        self.ops.push(Op::Alloca {
            slot,
            name: String::from(name),
        });
        Ok(slot)
    }

    fn begin_function_body(
        &mut self,
        function: &FunctionId,
        proto: &Prototype,
    ) -> Result<Vec<(String, ValueId)>, Error> {
        let entry = &mut self.functions[function.0];
        entry.params = proto.params.clone();
        entry.has_body = true;
        let name = entry.name.clone();

        self.current_function = Some(*function);
        self.ops.push(Op::BeginBody { function: name });

        let mut params = vec![];
        for param in &proto.params {
            let result = self.new_value(None);
            self.ops.push(Op::Param {
                result,
                name: param.clone(),
            });
            params.push((param.clone(), result));
        }

        Ok(params)
    }

    fn finalize_function(
        &mut self,
        function: &FunctionId,
        return_value: &ValueId,
    ) -> Result<(), Error> {
        let name = self.functions[function.0].name.clone();

        if self.current_function != Some(*function) || self.check_value(return_value).is_err() {
            return Err(Error::lowering(ErrorImpl::VerificationFailed { function: name }));
        }

        self.functions[function.0].returned = Some(*return_value);
        self.current_function = None;
        self.ops.push(Op::Return {
            function: name,
            value: *return_value,
        });
        Ok(())
    }

    fn discard_body(&mut self, function: &FunctionId) {
        let entry = &mut self.functions[function.0];
        entry.has_body = false;
        entry.returned = None;
        let name = entry.name.clone();

        if self.current_function == Some(*function) {
            self.current_function = None;
        }
        self.ops.push(Op::DiscardBody { function: name });
    }

    fn discard_function(&mut self, function: &FunctionId) {
        let entry = &mut self.functions[function.0];
        entry.discarded = true;
        let name = entry.name.clone();

        if self.current_function == Some(*function) {
            self.current_function = None;
        }
        self.ops.push(Op::Discard { function: name });
    }
}

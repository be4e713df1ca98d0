//! Main lowering module.
//!
//! This module contains the Compiler structure that walks the AST and emits
//! operations into a [`Backend`]. It owns the variable environment: a map from
//! each visible name to the storage slot currently bound to it.

use std::collections::HashMap;

use crate::{
    ast::{
        ast::Expr,
        declarations::{FunctionDef, Prototype},
    },
    errors::errors::{Error, ErrorImpl},
};

use super::{backend::Backend, expr::gen_expression};

/// Name prefix of the functions that wrap top-level expressions.
pub const ANONYMOUS_FUNCTION_PREFIX: &str = "__anon_expr";

/// The lowering state for one compilation unit.
///
/// # Type Parameters
///
/// * `'b` - Lifetime of the borrowed backend
/// * `B` - The backend receiving emitted operations
pub struct Compiler<'b, B: Backend> {
    /// The backend receiving emitted operations
    pub backend: &'b mut B,
    /// Map of visible variable names to their storage slots
    named_values: HashMap<String, B::Storage>,
    /// Number of top-level expressions lowered so far
    anonymous_count: usize,
}

impl<'b, B: Backend> Compiler<'b, B> {
    pub fn new(backend: &'b mut B) -> Self {
        Compiler {
            backend,
            named_values: HashMap::new(),
            anonymous_count: 0,
        }
    }

    pub fn get_backend(&self) -> &B {
        &*self.backend
    }

    pub fn lookup_variable(&self, name: &str) -> Option<&B::Storage> {
        self.named_values.get(name)
    }

    pub fn environment_is_empty(&self) -> bool {
        self.named_values.is_empty()
    }

    /// Binds `name` to `storage` and returns the binding it shadows.
    pub fn bind_variable(&mut self, name: String, storage: B::Storage) -> Option<B::Storage> {
        self.named_values.insert(name, storage)
    }

    /// Reinstates a binding returned by [`Compiler::bind_variable`].
    pub fn restore_variable(&mut self, name: String, previous: Option<B::Storage>) {
        match previous {
            Some(storage) => {
                self.named_values.insert(name, storage);
            }
            None => {
                self.named_values.remove(&name);
            }
        }
    }

    pub fn lower_expr(&mut self, expression: &Expr) -> Result<B::Value, Error> {
        gen_expression(self, expression)
    }

    /// Declares an `extern` function.
    pub fn lower_prototype(&mut self, proto: &Prototype) -> Result<B::Function, Error> {
        if let Some(existing) = self.backend.lookup_function(&proto.name) {
            self.check_arity(&existing, proto)?;
            return Ok(existing);
        }

        self.backend.declare_function(proto)
    }

    /// Lowers a function definition.
    ///
    /// On failure the environment is left empty and the partial function is
    /// dropped. A function first declared by an earlier `extern` keeps that
    /// declaration, since other functions may already call it.
    pub fn lower_function(&mut self, function: &FunctionDef) -> Result<B::Function, Error> {
        let proto = &function.proto;

        let (handle, declared_before) = match self.backend.lookup_function(&proto.name) {
            Some(existing) => {
                if self.backend.has_body(&existing) {
                    return Err(Error::lowering(ErrorImpl::FunctionRedefinition {
                        function: proto.name.clone(),
                    }));
                }
                self.check_arity(&existing, proto)?;
                (existing, true)
            }
            None => (self.backend.declare_function(proto)?, false),
        };

        let params = match self.backend.begin_function_body(&handle, proto) {
            Ok(params) => params,
            Err(error) => {
                self.discard(&handle, declared_before);
                return Err(error);
            }
        };

        self.named_values.clear();
        let body = self
            .bind_parameters(params)
            .and_then(|_| gen_expression(self, &function.body));
        self.named_values.clear();

        let finalized = body.and_then(|value| self.backend.finalize_function(&handle, &value));

        match finalized {
            Ok(()) => Ok(handle),
            Err(error) => {
                self.discard(&handle, declared_before);
                Err(error)
            }
        }
    }

    /// Wraps a top-level expression in a fresh zero-parameter function.
    pub fn lower_top_level_expr(&mut self, expression: Expr) -> Result<B::Function, Error> {
        let name = format!("{}{}", ANONYMOUS_FUNCTION_PREFIX, self.anonymous_count);
        self.anonymous_count += 1;

        self.lower_function(&FunctionDef {
            proto: Prototype {
                name,
                params: vec![],
            },
            body: expression,
        })
    }

    /// Parameters live in their own slots so they can be treated like `var` bindings.
    fn bind_parameters(&mut self, params: Vec<(String, B::Value)>) -> Result<(), Error> {
        for (name, value) in params {
            let storage = self.backend.allocate_local(&name)?;
            self.backend.emit_store(&value, &storage)?;
            self.named_values.insert(name, storage);
        }

        Ok(())
    }

    fn discard(&mut self, handle: &B::Function, declared_before: bool) {
        if declared_before {
            self.backend.discard_body(handle);
        } else {
            self.backend.discard_function(handle);
        }
    }

    fn check_arity(&self, existing: &B::Function, proto: &Prototype) -> Result<(), Error> {
        let expected = self.backend.param_count(existing);

        if expected != proto.arity() {
            return Err(Error::lowering(ErrorImpl::PrototypeMismatch {
                function: proto.name.clone(),
                expected,
                received: proto.arity(),
            }));
        }

        Ok(())
    }
}

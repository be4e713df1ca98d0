//! Lowering module.
//!
//! This module walks the AST and emits operations into a code generation
//! backend. It handles:
//!
//! - Lowering of expressions, calls and `var` blocks
//! - Function definitions and extern declarations
//! - The variable environment with shadow and restore across scopes
//! - Backends: LLVM through inkwell, and an operation recorder

pub mod backend;
pub mod compiler;
pub mod expr;
#[cfg(feature = "llvm")]
pub mod llvm;
pub mod trace;

#[cfg(test)]
mod tests;

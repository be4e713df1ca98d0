//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms the lexer's token stream
//! into an Abstract Syntax Tree. It uses precedence climbing for binary
//! operators with a configurable precedence table and handles:
//!
//! - Function definitions and extern declarations
//! - Expression parsing (binary ops, calls, `var` blocks, literals)
//! - Error reporting with the position of the offending token

pub mod decl;
pub mod expr;
pub mod lookups;
pub mod parser;

//! Error types and error handling for the front end.
//!
//! This module defines the error types used by parsing and lowering.
//! It includes:
//!
//! - Error structures with source position information
//! - Specific error variants for the parsing and lowering phases
//! - Helpful error messages and suggestions
//!
//! Lexing is total, so there is no lexer error.

pub mod errors;

#[cfg(test)]
mod tests;

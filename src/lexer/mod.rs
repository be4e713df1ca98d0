//! Lexical analysis module.
//!
//! This module contains the lexer that converts source text into tokens
//! on demand, one token per call. It handles:
//!
//! - Recognition of keywords, identifiers and numeric literals
//! - Single character punctuation and operators
//! - `#` line comments and whitespace
//! - Token position tracking for error reporting

pub mod lexer;
pub mod tokens;

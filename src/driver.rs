//! Top-level loop tying the parser to the lowering pass.
//!
//! The driver pulls one top-level item at a time, lowers it, and reports what
//! happened. A parse error drops the offending token so the next step can make
//! progress; a lowering error leaves the parser where it was, since the item
//! has already been consumed.

use crate::{
    ast::declarations::TopLevelItem,
    compiler::{backend::Backend, compiler::Compiler},
    errors::errors::Error,
    parser::parser::Parser,
};

/// Result of handling one top-level item.
#[derive(Debug)]
pub enum Outcome<F> {
    /// A `def` was lowered into a function with a body
    Defined { name: String, function: F },
    /// An `extern` was declared
    Declared { name: String, function: F },
    /// A bare expression was wrapped in an anonymous function
    Evaluated { function: F },
    Failed(Error),
}

impl<F> Outcome<F> {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn get_error(&self) -> Option<&Error> {
        match self {
            Outcome::Failed(error) => Some(error),
            _ => None,
        }
    }
}

pub struct Driver<'b, B: Backend> {
    parser: Parser,
    compiler: Compiler<'b, B>,
}

impl<'b, B: Backend> Driver<'b, B> {
    pub fn new(parser: Parser, backend: &'b mut B) -> Self {
        Driver {
            parser,
            compiler: Compiler::new(backend),
        }
    }

    pub fn from_source(source: &str, file: Option<String>, backend: &'b mut B) -> Self {
        Driver::new(Parser::from_source(source, file), backend)
    }

    pub fn get_parser_mut(&mut self) -> &mut Parser {
        &mut self.parser
    }

    /// Handles the next top-level item. Returns `None` once input is exhausted.
    pub fn step(&mut self) -> Option<Outcome<B::Function>> {
        let item = match self.parser.next_top_level_item() {
            Ok(item) => item,
            Err(error) => {
                self.parser.skip_token();
                return Some(Outcome::Failed(error));
            }
        };

        let outcome = match item {
            TopLevelItem::EndOfInput => return None,
            TopLevelItem::Definition(function) => {
                match self.compiler.lower_function(&function) {
                    Ok(handle) => Outcome::Defined {
                        name: function.proto.name,
                        function: handle,
                    },
                    Err(error) => Outcome::Failed(error),
                }
            }
            TopLevelItem::Extern(proto) => match self.compiler.lower_prototype(&proto) {
                Ok(handle) => Outcome::Declared {
                    name: proto.name,
                    function: handle,
                },
                Err(error) => Outcome::Failed(error),
            },
            TopLevelItem::Expression(expression) => {
                match self.compiler.lower_top_level_expr(expression) {
                    Ok(handle) => Outcome::Evaluated { function: handle },
                    Err(error) => Outcome::Failed(error),
                }
            }
        };

        Some(outcome)
    }

    /// Runs until end of input, collecting every outcome.
    pub fn run(&mut self) -> Vec<Outcome<B::Function>> {
        let mut outcomes = vec![];

        while let Some(outcome) = self.step() {
            outcomes.push(outcome);
        }

        outcomes
    }
}

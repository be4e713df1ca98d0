use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    /// Errors raised while lowering have no source location.
    pub fn lowering(error_impl: ErrorImpl) -> Self {
        Error::new(error_impl, Position::null())
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(
            self.internal_error,
            ErrorImpl::ExpectedCloseParen
                | ErrorImpl::UnknownToken { .. }
                | ErrorImpl::ExpectedArgumentDelimiter { .. }
                | ErrorImpl::ExpectedIdentifier { .. }
                | ErrorImpl::ExpectedIn { .. }
                | ErrorImpl::ExpectedFunctionName { .. }
                | ErrorImpl::ExpectedPrototypeOpenParen { .. }
                | ErrorImpl::ExpectedPrototypeCloseParen { .. }
                | ErrorImpl::DuplicateParameter { .. }
        )
    }

    pub fn is_lowering_error(&self) -> bool {
        !self.is_parse_error()
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::ExpectedCloseParen => "ExpectedCloseParen",
            ErrorImpl::UnknownToken { .. } => "UnknownToken",
            ErrorImpl::ExpectedArgumentDelimiter { .. } => "ExpectedArgumentDelimiter",
            ErrorImpl::ExpectedIdentifier { .. } => "ExpectedIdentifier",
            ErrorImpl::ExpectedIn { .. } => "ExpectedIn",
            ErrorImpl::ExpectedFunctionName { .. } => "ExpectedFunctionName",
            ErrorImpl::ExpectedPrototypeOpenParen { .. } => "ExpectedPrototypeOpenParen",
            ErrorImpl::ExpectedPrototypeCloseParen { .. } => "ExpectedPrototypeCloseParen",
            ErrorImpl::DuplicateParameter { .. } => "DuplicateParameter",
            ErrorImpl::UnknownVariable { .. } => "UnknownVariable",
            ErrorImpl::InvalidBinaryOperator { .. } => "InvalidBinaryOperator",
            ErrorImpl::UnknownFunction { .. } => "UnknownFunction",
            ErrorImpl::IncorrectArgumentCount { .. } => "IncorrectArgumentCount",
            ErrorImpl::PrototypeMismatch { .. } => "PrototypeMismatch",
            ErrorImpl::FunctionRedefinition { .. } => "FunctionRedefinition",
            ErrorImpl::VerificationFailed { .. } => "VerificationFailed",
            ErrorImpl::Backend { .. } => "Backend",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::ExpectedCloseParen => {
                ErrorTip::Suggestion(String::from("Did you forget to close a parenthesis?"))
            }
            ErrorImpl::UnknownToken { token } => ErrorTip::Suggestion(format!(
                "`{}` cannot start an expression, is it a registered binary operator?",
                token
            )),
            ErrorImpl::ExpectedArgumentDelimiter { token } => ErrorTip::Suggestion(format!(
                "Unexpected token `{}` in argument list, separate arguments with `,`",
                token
            )),
            ErrorImpl::ExpectedIdentifier { context, .. } => {
                ErrorTip::Suggestion(format!("Expected a name {}", context))
            }
            ErrorImpl::ExpectedIn { .. } => ErrorTip::Suggestion(String::from(
                "A `var` block needs `in <expression>` after its bindings",
            )),
            ErrorImpl::ExpectedFunctionName { .. } => ErrorTip::None,
            ErrorImpl::ExpectedPrototypeOpenParen { .. } => ErrorTip::None,
            ErrorImpl::ExpectedPrototypeCloseParen { .. } => ErrorTip::Suggestion(String::from(
                "Parameters are plain names without commas: `def f(a b)`",
            )),
            ErrorImpl::DuplicateParameter { name } => {
                ErrorTip::Suggestion(format!("Parameter `{}` is declared twice", name))
            }
            ErrorImpl::UnknownVariable { name } => {
                ErrorTip::Suggestion(format!("Variable `{}` is not in scope", name))
            }
            ErrorImpl::InvalidBinaryOperator { operator } => ErrorTip::Suggestion(format!(
                "Operator `{}` has a precedence but no code generation",
                operator
            )),
            ErrorImpl::UnknownFunction { name } => ErrorTip::Suggestion(format!(
                "Function `{}` must be defined or declared with `extern` first",
                name
            )),
            ErrorImpl::IncorrectArgumentCount {
                expected, received, ..
            } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::PrototypeMismatch {
                expected, received, ..
            } => ErrorTip::Suggestion(format!(
                "Previously declared with {} parameters, now {}",
                expected, received
            )),
            ErrorImpl::FunctionRedefinition { function } => {
                ErrorTip::Suggestion(format!("Function `{}` already has a body", function))
            }
            ErrorImpl::VerificationFailed { .. } => ErrorTip::None,
            ErrorImpl::Backend { .. } => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Parsing
    #[error("expected ')'")]
    ExpectedCloseParen,
    #[error("unknown token when expecting an expression: {token:?}")]
    UnknownToken { token: String },
    #[error("expected ')' or ',' in argument list, found {token:?}")]
    ExpectedArgumentDelimiter { token: String },
    #[error("expected identifier {context}, found {token:?}")]
    ExpectedIdentifier { token: String, context: String },
    #[error("expected 'in' keyword after 'var', found {token:?}")]
    ExpectedIn { token: String },
    #[error("expected function name in prototype, found {token:?}")]
    ExpectedFunctionName { token: String },
    #[error("expected '(' in prototype, found {token:?}")]
    ExpectedPrototypeOpenParen { token: String },
    #[error("expected ')' in prototype, found {token:?}")]
    ExpectedPrototypeCloseParen { token: String },
    #[error("duplicate parameter {name:?} in prototype")]
    DuplicateParameter { name: String },

    // Lowering
    #[error("unknown variable name: {name:?}")]
    UnknownVariable { name: String },
    #[error("invalid binary operator: {operator:?}")]
    InvalidBinaryOperator { operator: char },
    #[error("unknown function referenced: {name:?}")]
    UnknownFunction { name: String },
    #[error("incorrect number of arguments passed to {function:?}: expected {expected}, received {received}")]
    IncorrectArgumentCount {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("function {function:?} redeclared with {received} parameters, previously {expected}")]
    PrototypeMismatch {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("function {function:?} cannot be redefined")]
    FunctionRedefinition { function: String },
    #[error("function {function:?} failed verification")]
    VerificationFailed { function: String },
    #[error("backend error: {message}")]
    Backend { message: String },
}

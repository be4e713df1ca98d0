//! Unit tests for error handling.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::Position;
use std::rc::Rc;

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnknownToken {
            token: "$".to_string(),
        },
        Position(10, Rc::new("test.ks".to_string())),
    );

    assert_eq!(error.get_error_name(), "UnknownToken");
    assert_eq!(error.get_position().0, 10);
}

#[test]
fn test_canonical_parse_messages() {
    let error = Error::new(ErrorImpl::ExpectedCloseParen, Position::null());
    assert_eq!(error.to_string(), "expected ')'");

    let error = Error::new(
        ErrorImpl::UnknownToken {
            token: ")".to_string(),
        },
        Position::null(),
    );
    assert!(error
        .to_string()
        .starts_with("unknown token when expecting an expression"));

    let error = Error::new(
        ErrorImpl::ExpectedArgumentDelimiter {
            token: "EOF".to_string(),
        },
        Position::null(),
    );
    assert!(error.to_string().contains("')' or ','"));
}

#[test]
fn test_canonical_lowering_messages() {
    let error = Error::lowering(ErrorImpl::UnknownVariable {
        name: "x".to_string(),
    });
    assert!(error.to_string().starts_with("unknown variable name"));
    assert_eq!(error.get_position(), &Position::null());

    let error = Error::lowering(ErrorImpl::InvalidBinaryOperator { operator: '/' });
    assert!(error.to_string().starts_with("invalid binary operator"));
}

#[test]
fn test_error_classification() {
    let parse = Error::new(
        ErrorImpl::DuplicateParameter {
            name: "a".to_string(),
        },
        Position::null(),
    );
    assert!(parse.is_parse_error());
    assert!(!parse.is_lowering_error());

    let lowering = Error::lowering(ErrorImpl::PrototypeMismatch {
        function: "f".to_string(),
        expected: 1,
        received: 2,
    });
    assert!(lowering.is_lowering_error());
    assert!(!lowering.is_parse_error());
}

#[test]
fn test_error_tip_none() {
    let error = Error::lowering(ErrorImpl::Backend {
        message: "builder is not positioned".to_string(),
    });

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_suggestion() {
    let error = Error::lowering(ErrorImpl::IncorrectArgumentCount {
        function: "f".to_string(),
        expected: 2,
        received: 3,
    });

    match error.get_tip() {
        ErrorTip::Suggestion(tip) => assert_eq!(tip, "Expected 2 arguments, received 3"),
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

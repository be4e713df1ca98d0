use crate::{
    ast::declarations::{FunctionDef, Prototype},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{expr::parse_expr, parser::Parser};

/// prototype ::= id '(' id* ')'
pub fn parse_prototype(parser: &mut Parser) -> Result<Prototype, Error> {
    let name = match parser.current_token_kind() {
        TokenKind::Identifier(name) => name.clone(),
        _ => {
            return Err(Error::new(
                ErrorImpl::ExpectedFunctionName {
                    token: parser.current_token().to_string(),
                },
                parser.get_position(),
            ))
        }
    };
    parser.advance();

    if !parser.is_punct('(') {
        return Err(Error::new(
            ErrorImpl::ExpectedPrototypeOpenParen {
                token: parser.current_token().to_string(),
            },
            parser.get_position(),
        ));
    }
    parser.advance();

    let mut params: Vec<String> = vec![];
    while let TokenKind::Identifier(param) = parser.current_token_kind() {
        if params.contains(param) {
            return Err(Error::new(
                ErrorImpl::DuplicateParameter {
                    name: param.clone(),
                },
                parser.get_position(),
            ));
        }

        params.push(param.clone());
        parser.advance();
    }

    if !parser.is_punct(')') {
        return Err(Error::new(
            ErrorImpl::ExpectedPrototypeCloseParen {
                token: parser.current_token().to_string(),
            },
            parser.get_position(),
        ));
    }
    parser.advance();

    Ok(Prototype { name, params })
}

/// definition ::= 'def' prototype expression
pub fn parse_definition(parser: &mut Parser) -> Result<FunctionDef, Error> {
    parser.advance();

    let proto = parse_prototype(parser)?;
    let body = parse_expr(parser)?;

    Ok(FunctionDef { proto, body })
}

/// external ::= 'extern' prototype
pub fn parse_extern(parser: &mut Parser) -> Result<Prototype, Error> {
    parser.advance();
    parse_prototype(parser)
}

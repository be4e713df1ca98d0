use crate::{
    ast::ast::Expr,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

/// expression ::= primary binoprhs
pub fn parse_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let lhs = parse_primary_expr(parser)?;
    parse_binary_rhs(parser, 0, lhs)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    match parser.current_token_kind() {
        TokenKind::Number(_) => parse_number_expr(parser),
        TokenKind::Punct('(') => parse_grouping_expr(parser),
        TokenKind::Identifier(_) => parse_identifier_expr(parser),
        TokenKind::Var => parse_var_expr(parser),
        _ => Err(Error::new(
            ErrorImpl::UnknownToken {
                token: parser.current_token().to_string(),
            },
            parser.get_position(),
        )),
    }
}

pub fn parse_number_expr(parser: &mut Parser) -> Result<Expr, Error> {
    match parser.advance().kind {
        TokenKind::Number(value) => Ok(Expr::NumberLiteral { value }),
        other => Err(Error::new(
            ErrorImpl::UnknownToken {
                token: other.to_string(),
            },
            parser.get_position(),
        )),
    }
}

/// `( expression )`
pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser)?;

    if !parser.is_punct(')') {
        return Err(Error::new(
            ErrorImpl::ExpectedCloseParen,
            parser.get_position(),
        ));
    }
    parser.advance();

    Ok(expr)
}

/// `name` or `name ( expression, ... )`
pub fn parse_identifier_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let position = parser.get_position();
    let name = match parser.advance().kind {
        TokenKind::Identifier(name) => name,
        other => {
            return Err(Error::new(
                ErrorImpl::ExpectedIdentifier {
                    token: other.to_string(),
                    context: String::from("in expression"),
                },
                position,
            ))
        }
    };

    if !parser.is_punct('(') {
        return Ok(Expr::VariableRef { name });
    }
    parser.advance();

    let mut args = vec![];
    if !parser.is_punct(')') {
        loop {
            args.push(parse_expr(parser)?);

            if parser.is_punct(')') {
                break;
            }

            if !parser.is_punct(',') {
                return Err(Error::new(
                    ErrorImpl::ExpectedArgumentDelimiter {
                        token: parser.current_token().to_string(),
                    },
                    parser.get_position(),
                ));
            }
            parser.advance();
        }
    }
    parser.advance();

    Ok(Expr::Call { callee: name, args })
}

/// `var name (= expression)?, ... in expression`
pub fn parse_var_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();

    let mut bindings = vec![];
    let mut context = "after 'var'";

    loop {
        let name = expect_identifier(parser, context)?;

        let initializer = if parser.is_punct('=') {
            parser.advance();
            Some(parse_expr(parser)?)
        } else {
            None
        };

        bindings.push((name, initializer));

        if !parser.is_punct(',') {
            break;
        }
        parser.advance();
        context = "in 'var' list after ','";
    }

    // `in` is matched by text, it is not a reserved word
    match parser.current_token_kind() {
        TokenKind::Identifier(keyword) if keyword == "in" => {
            parser.advance();
        }
        _ => {
            return Err(Error::new(
                ErrorImpl::ExpectedIn {
                    token: parser.current_token().to_string(),
                },
                parser.get_position(),
            ))
        }
    }

    let body = parse_expr(parser)?;

    Ok(Expr::VarBlock {
        bindings,
        body: Box::new(body),
    })
}

/// Precedence climbing over `lhs (op primary)*`.
///
/// Consumes operators whose precedence is at least `min_precedence`. Equal
/// precedences fold to the left; a tighter operator after the right operand is
/// absorbed into that operand first.
pub fn parse_binary_rhs(
    parser: &mut Parser,
    min_precedence: i32,
    lhs: Expr,
) -> Result<Expr, Error> {
    let mut lhs = lhs;

    loop {
        let (op, precedence) = match parser.current_operator() {
            Some((op, precedence)) if precedence >= min_precedence => (op, precedence),
            _ => return Ok(lhs),
        };
        parser.advance();

        let mut rhs = parse_primary_expr(parser)?;

        if let Some((_, next_precedence)) = parser.current_operator() {
            if next_precedence > precedence {
                rhs = parse_binary_rhs(parser, precedence + 1, rhs)?;
            }
        }

        lhs = Expr::binary(op, lhs, rhs);
    }
}

fn expect_identifier(parser: &mut Parser, context: &str) -> Result<String, Error> {
    if let TokenKind::Identifier(name) = parser.current_token_kind() {
        let name = name.clone();
        parser.advance();
        return Ok(name);
    }

    Err(Error::new(
        ErrorImpl::ExpectedIdentifier {
            token: parser.current_token().to_string(),
            context: String::from(context),
        },
        parser.get_position(),
    ))
}

//! Parser implementation for building the Abstract Syntax Tree.
//!
//! This module contains the main Parser struct. The parser pulls tokens from
//! its lexer one at a time and always holds exactly one token of lookahead.
//! Expressions are parsed by recursive descent for primaries and precedence
//! climbing for binary operators, driven by a mutable precedence table.

use std::{mem, rc::Rc};

use crate::{
    ast::declarations::TopLevelItem,
    errors::errors::Error,
    lexer::{
        lexer::Lexer,
        tokens::{Token, TokenKind},
    },
    Position,
};

use super::{
    decl::{parse_definition, parse_extern},
    expr::parse_expr,
    lookups::PrecedenceTable,
};

/// The main parser structure that maintains parsing state.
pub struct Parser {
    /// Source of tokens
    lexer: Lexer,
    /// The lookahead token
    current: Token,
    /// Binary operator precedences consulted while climbing
    precedence: PrecedenceTable,
}

impl Parser {
    /// Creates a parser with the default operator precedences and reads the
    /// first token.
    pub fn new(lexer: Lexer) -> Self {
        Parser::with_precedence(lexer, PrecedenceTable::default())
    }

    pub fn with_precedence(mut lexer: Lexer, precedence: PrecedenceTable) -> Self {
        let current = lexer.next_token();

        Parser {
            lexer,
            current,
            precedence,
        }
    }

    pub fn from_source(source: &str, file: Option<String>) -> Self {
        Parser::new(Lexer::new(String::from(source), file))
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.current
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> &TokenKind {
        &self.current.kind
    }

    /// Advances to the next token and returns the previous token.
    pub fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        mem::replace(&mut self.current, next)
    }

    /// Returns true if the current token is the punctuation `c`.
    pub fn is_punct(&self, c: char) -> bool {
        self.current.kind.is_punct(c)
    }

    /// Returns the current token as a binary operator with its precedence, if it is one.
    pub fn current_operator(&self) -> Option<(char, i32)> {
        match self.current.kind {
            TokenKind::Punct(op) => self.precedence.get(op).map(|precedence| (op, precedence)),
            _ => None,
        }
    }

    /// Registers a binary operator for the rest of the parse.
    pub fn install_binary_operator(&mut self, op: char, precedence: i32) {
        self.precedence.install(op, precedence);
    }

    pub fn get_precedence_table(&self) -> &PrecedenceTable {
        &self.precedence
    }

    /// Position of the current token in the source.
    pub fn get_position(&self) -> Position {
        Position(self.current.span.start.0, Rc::clone(&self.current.span.start.1))
    }

    /// Drops the current token. Used to resynchronise after a parse error.
    pub fn skip_token(&mut self) {
        self.advance();
    }

    /// Parses the next definition, extern declaration or bare expression.
    ///
    /// Stray `;` separators are skipped. On error the offending token is left
    /// as the current token.
    pub fn next_top_level_item(&mut self) -> Result<TopLevelItem, Error> {
        while self.is_punct(';') {
            self.advance();
        }

        match self.current_token_kind() {
            TokenKind::EOF => Ok(TopLevelItem::EndOfInput),
            TokenKind::Def => Ok(TopLevelItem::Definition(parse_definition(self)?)),
            TokenKind::Extern => Ok(TopLevelItem::Extern(parse_extern(self)?)),
            _ => Ok(TopLevelItem::Expression(parse_expr(self)?)),
        }
    }
}

/// Parses every top-level item of `source`, stopping at the first error.
pub fn parse(source: &str, file: Option<String>) -> (Parser, Result<Vec<TopLevelItem>, Error>) {
    let mut parser = Parser::from_source(source, file);
    let mut items = vec![];

    loop {
        match parser.next_top_level_item() {
            Ok(TopLevelItem::EndOfInput) => return (parser, Ok(items)),
            Ok(item) => items.push(item),
            Err(error) => return (parser, Err(error)),
        }
    }
}

use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{Position, Span, MK_SPAN, MK_TOKEN};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

/// Builds a token from the text matched at the lexer position, or `None` to skip it.
pub type RegexHandler = fn(&mut Lexer, &str) -> Option<Token>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

lazy_static! {
    // Order matters: the first pattern that matches at the current position wins.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new(r"^\s+").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^#[^\n\r]*").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^[a-zA-Z][a-zA-Z0-9]*").unwrap(), handler: symbol_handler },
        RegexPattern { regex: Regex::new(r"^[0-9.]+").unwrap(), handler: number_handler },
    ];
}

/// Produces tokens on demand from an owned source.
///
/// Each instance carries its own read position, so independent lexers never
/// share state.
#[derive(Clone)]
pub struct Lexer {
    source: String,
    pos: usize,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            source,
            pos: 0,
            file: file_name,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Returns the next token. Once the source is exhausted every call yields `EOF`.
    pub fn next_token(&mut self) -> Token {
        'scan: while !self.at_eof() {
            for pattern in PATTERNS.iter() {
                let matched = match pattern.regex.find(self.remainder()) {
                    Some(matched) => matched.as_str().to_string(),
                    None => continue,
                };

                match (pattern.handler)(self, &matched) {
                    Some(token) => return token,
                    None => continue 'scan,
                }
            }

            return punct_handler(self);
        }

        MK_TOKEN!(TokenKind::EOF, MK_SPAN!(self, self.pos, self.pos))
    }
}

fn skip_handler(lexer: &mut Lexer, matched: &str) -> Option<Token> {
    lexer.advance_n(matched.len());
    None
}

fn symbol_handler(lexer: &mut Lexer, matched: &str) -> Option<Token> {
    let start = lexer.pos;
    lexer.advance_n(matched.len());

    let kind = match RESERVED_LOOKUP.get(matched) {
        Some(kind) => kind.clone(),
        None => TokenKind::Identifier(String::from(matched)),
    };

    Some(MK_TOKEN!(kind, MK_SPAN!(lexer, start, lexer.pos)))
}

fn number_handler(lexer: &mut Lexer, matched: &str) -> Option<Token> {
    let start = lexer.pos;
    lexer.advance_n(matched.len());

    Some(MK_TOKEN!(
        TokenKind::Number(parse_number_prefix(matched)),
        MK_SPAN!(lexer, start, lexer.pos)
    ))
}

fn punct_handler(lexer: &mut Lexer) -> Token {
    let start = lexer.pos;
    // The caller checked for EOF, so there is at least one char left
    let c = lexer.remainder().chars().next().unwrap_or('\0');
    lexer.advance_n(c.len_utf8());

    MK_TOKEN!(TokenKind::Punct(c), MK_SPAN!(lexer, start, lexer.pos))
}

/// Value of the longest prefix of a digit/dot run that is a valid float.
///
/// `"1.2.3"` reads as `1.2`; a run with no numeric prefix such as `"."` reads as `0`.
pub fn parse_number_prefix(text: &str) -> f64 {
    (1..=text.len())
        .rev()
        .find_map(|end| text[..end].parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Drains a fresh lexer over `source` into a token list ending with `EOF`.
pub fn tokenize(source: String, file: Option<String>) -> Vec<Token> {
    let mut lex = Lexer::new(source, file);
    let mut tokens = vec![];

    loop {
        let token = lex.next_token();
        let done = token.kind == TokenKind::EOF;
        tokens.push(token);

        if done {
            return tokens;
        }
    }
}

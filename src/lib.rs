#![allow(clippy::module_inception)]

use std::rc::Rc;

pub mod ast;
pub mod compiler;
pub mod driver;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;

extern crate regex;

/// Byte offset into a source, tagged with the source's name.
#[derive(Debug, Clone, PartialEq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Finds the line containing `position`.
///
/// Returns the 1-based line number, the line text and the offset of `position`
/// inside that line. Offsets at or past the end of the source map onto the last
/// line, so end-of-input errors still have something to point at.
pub fn get_line_at_position(source: &str, position: u32) -> Option<(usize, String, usize)> {
    if source.is_empty() {
        return None;
    }

    let pos = (position as usize).min(source.len());
    let mut start = 0;
    let mut last = None;

    for (index, line) in source.split_inclusive('\n').enumerate() {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return Some((index + 1, line.to_string(), pos - start));
        }

        last = Some((index + 1, line.to_string(), line.len()));
        start = end;
    }

    last
}

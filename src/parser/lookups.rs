use std::collections::HashMap;

/// Binding strength of each binary operator character. Higher binds tighter.
///
/// Only positive precedences make a character an operator; anything else ends
/// a binary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecedenceTable {
    precedences: HashMap<char, i32>,
}

impl PrecedenceTable {
    /// A table with no operators at all.
    pub fn empty() -> Self {
        PrecedenceTable {
            precedences: HashMap::new(),
        }
    }

    /// Registers `op`, replacing any earlier precedence.
    pub fn install(&mut self, op: char, precedence: i32) {
        self.precedences.insert(op, precedence);
    }

    pub fn remove(&mut self, op: char) -> Option<i32> {
        self.precedences.remove(&op)
    }

    pub fn get(&self, op: char) -> Option<i32> {
        self.precedences
            .get(&op)
            .copied()
            .filter(|precedence| *precedence > 0)
    }
}

impl Default for PrecedenceTable {
    fn default() -> Self {
        let mut table = PrecedenceTable::empty();
        table.install('<', 10);
        table.install('+', 20);
        table.install('-', 20);
        table.install('*', 40);
        table
    }
}

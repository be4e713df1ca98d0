use super::ast::Expr;

/// Function Prototype
///
/// The name and parameter names of a function. Parameter names are unique;
/// the parser rejects duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
}

impl Prototype {
    pub fn new(name: &str, params: &[&str]) -> Self {
        Prototype {
            name: String::from(name),
            params: params.iter().map(|param| String::from(*param)).collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Function Definition
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub proto: Prototype,
    pub body: Expr,
}

/// One construct read at the top level of a source.
#[derive(Debug, Clone, PartialEq)]
pub enum TopLevelItem {
    Definition(FunctionDef),
    Extern(Prototype),
    Expression(Expr),
    EndOfInput,
}

use std::fmt::Display;

/// Expression Node
///
/// The closed set of expression kinds. Children are owned by their parent and
/// nodes are never mutated after the parser builds them.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    NumberLiteral {
        value: f64,
    },
    VariableRef {
        name: String,
    },
    BinaryOp {
        op: char,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    /// `var a = 1, b in body`. Bindings are kept in declaration order.
    VarBlock {
        bindings: Vec<(String, Option<Expr>)>,
        body: Box<Expr>,
    },
}

impl Expr {
    pub fn number(value: f64) -> Self {
        Expr::NumberLiteral { value }
    }

    pub fn variable(name: &str) -> Self {
        Expr::VariableRef {
            name: String::from(name),
        }
    }

    pub fn binary(op: char, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(callee: &str, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: String::from(callee),
            args,
        }
    }
}

/// Prints the expression as an s-expression, e.g. `(+ 1 (* 2 3))`.
impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::NumberLiteral { value } => write!(f, "{}", value),
            Expr::VariableRef { name } => write!(f, "{}", name),
            Expr::BinaryOp { op, left, right } => write!(f, "({} {} {})", op, left, right),
            Expr::Call { callee, args } => {
                write!(f, "({}", callee)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
            Expr::VarBlock { bindings, body } => {
                write!(f, "(var (")?;
                for (index, (name, initializer)) in bindings.iter().enumerate() {
                    if index > 0 {
                        write!(f, " ")?;
                    }
                    match initializer {
                        Some(initializer) => write!(f, "[{} {}]", name, initializer)?,
                        None => write!(f, "[{}]", name)?,
                    }
                }
                write!(f, ") {})", body)
            }
        }
    }
}

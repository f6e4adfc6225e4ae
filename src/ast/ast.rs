/// Expression nodes.
///
/// Every expression evaluates to a single `f64`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    /// Includes assignment, which is `=` with a variable on the left.
    Binary {
        operator: char,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        operator: char,
        operand: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// `for counter = start, test[, step] in body`
    For {
        counter: String,
        start: Box<Expr>,
        test: Box<Expr>,
        step: Option<Box<Expr>>,
        body: Box<Expr>,
    },
    /// `var a = 1, b in body`
    Var {
        bindings: Vec<(String, Option<Expr>)>,
        body: Box<Expr>,
    },
    Call {
        callee: String,
        arguments: Vec<Expr>,
    },
}

impl Expr {
    pub fn binary(operator: char, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn variable(name: &str) -> Self {
        Expr::Variable(String::from(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperatorKind {
    Unary,
    Binary { precedence: u32 },
}

/// Function signature: a name and the names of its parameters.
///
/// Operator definitions are named `unary<op>` / `binary<op>`, which is how the
/// code generator finds them again.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub args: Vec<String>,
    pub operator: Option<OperatorKind>,
}

impl Prototype {
    pub fn new(name: &str, args: &[&str]) -> Self {
        Prototype {
            name: String::from(name),
            args: args.iter().map(|arg| String::from(*arg)).collect(),
            operator: None,
        }
    }

    /// A top-level expression is wrapped in a function with no name.
    pub fn anonymous() -> Self {
        Prototype::new("", &[])
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    /// The character of an operator definition.
    pub fn operator_char(&self) -> Option<char> {
        self.operator?;
        self.name.chars().last()
    }

    pub fn binary_precedence(&self) -> Option<u32> {
        match self.operator {
            Some(OperatorKind::Binary { precedence }) => Some(precedence),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub prototype: Prototype,
    pub body: Expr,
}

/// Top-level unit produced by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// `extern name(args)`
    Prototype(Prototype),
    /// `def name(args) body`, or a top-level expression.
    Function(Function),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Prototype(prototype) => &prototype.name,
            Node::Function(function) => &function.prototype.name,
        }
    }

    /// Top-level expressions are the functions the driver evaluates: those
    /// without a name, and `main`.
    pub fn is_top_level_expression(&self) -> bool {
        match self {
            Node::Function(function) => {
                function.prototype.is_anonymous() || function.prototype.name == "main"
            }
            Node::Prototype(_) => false,
        }
    }
}

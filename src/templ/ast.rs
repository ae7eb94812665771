use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Len,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "or" => BinaryOp::Or,
            "and" => BinaryOp::And,
            "==" => BinaryOp::Eq,
            "~=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            ".." => BinaryOp::Concat,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            _ => return None,
        };

        Some(op)
    }

    pub fn is_right_assoc(&self) -> bool {
        matches!(self, BinaryOp::Concat)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Const(Value),
    Name(String),
    Field(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    /// `object:name(args)`
    Method(Box<Expr>, String, Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

/// How a generic `for` loop walks its table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Iteration {
    /// `ipairs(t)`: the list part, in order.
    Ipairs,
    /// `pairs(t)`: every entry.
    Pairs,
}

/// A single statement as written inside a statement tag.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    If(Expr),
    ElseIf(Expr),
    Else,
    End,
    ForIn { key: String, value: Option<String>, iteration: Iteration, table: Expr },
    ForNum { var: String, start: Expr, limit: Expr, step: Option<Expr> },
    Local { name: String, value: Option<Expr> },
    Assign { name: String, value: Expr },
    Call(Expr),
}

/// The block structure of a compiled template.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Text(String),
    Emit { line: u32, expr: Expr },
    If { arms: Vec<(u32, Expr, Vec<Node>)>, otherwise: Option<Vec<Node>> },
    ForIn { line: u32, key: String, value: Option<String>, iteration: Iteration, table: Expr, body: Vec<Node> },
    ForNum { line: u32, var: String, start: Expr, limit: Expr, step: Option<Expr>, body: Vec<Node> },
    Local { line: u32, name: String, value: Option<Expr> },
    Assign { line: u32, name: String, value: Expr },
    /// A call whose result is dropped.
    Eval { line: u32, expr: Expr },
}

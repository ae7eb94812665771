use std::mem::take;

use crate::lex::cached_lexer::CachedLexer;
use crate::templ::ast::{ BinaryOp, Expr, Iteration, Node, Stmt, UnaryOp };
use crate::templ::code::{ CodeLexer, CodeToken, Lexeme };
use crate::templ::{ Error, Result };
use crate::value::Value;

/*
 * *** Template code grammar ***
 *
 * expression_tag
 *     : expr EOF
 *     ;
 *
 * statement_tag
 *     : stmt* EOF
 *     ;
 *
 * stmt: IF expr THEN
 *     | ELSEIF expr THEN
 *     | ELSE
 *     | END
 *     | FOR NAME (COMMA NAME)? IN (IPAIRS | PAIRS) LPAREN expr RPAREN DO
 *     | FOR NAME ASSIGN expr COMMA expr (COMMA expr)? DO
 *     | LOCAL NAME (ASSIGN expr)?
 *     | NAME ASSIGN expr
 *     | call_expr
 *     ;
 *
 * primary_expr
 *     : NIL | TRUE | FALSE | NUMBER | STRING
 *     | NAME
 *     | LPAREN expr RPAREN
 *     ;
 *
 * postfix_expr
 *     : primary_expr (DOT NAME | LBRACKET expr RBRACKET | args | COLON NAME args)*
 *     ;
 *
 * args: LPAREN (expr (COMMA expr)*)? RPAREN
 *     ;
 *
 * unary_expr
 *     : (NOT | MINUS | HASH) unary_expr
 *     | postfix_expr
 *     ;
 *
 * binary operators, loosest first:
 *     OR
 *     AND
 *     LT GT LE GE NE EQ
 *     CONCAT (right associative)
 *     PLUS MINUS
 *     STAR SLASH PERCENT
 */
pub struct Parser<'c> {
    lexer: CachedLexer<CodeLexer<'c>>,
    chunk: &'c str,
    prec_table: BinOpPrec,
}

impl<'c> Parser<'c> {
    /// `line` is the line the tag starts on.
    pub fn new(code: &'c str, line: u32, chunk: &'c str) -> Self {
        Parser {
            lexer: CachedLexer::new(CodeLexer::new(code, line)),
            chunk,
            prec_table: BinOpPrec::new(),
        }
    }

    fn peek(&mut self) -> Result<Lexeme<'c>> {
        self.peekn(0)
    }

    fn peekn(&mut self, n: usize) -> Result<Lexeme<'c>> {
        let chunk = self.chunk;
        self.lexer.peekn(n).cloned().map_err(|(line, message)| Error::new(chunk, line, message))
    }

    fn lex(&mut self) -> Result<Lexeme<'c>> {
        let chunk = self.chunk;
        self.lexer.lex().map_err(|(line, message)| Error::new(chunk, line, message))
    }

    fn unexpected(&self, tok: &Lexeme<'c>) -> Error {
        Error::new(self.chunk, tok.line, format!("unexpected symbol near {}", tok.describe()))
    }

    fn expected(&mut self, what: &str) -> Error {
        match self.peek() {
            Ok(tok) => Error::new(self.chunk, tok.line, format!("{} expected near {}", what, tok.describe())),
            Err(err) => err,
        }
    }

    fn expect_symbol(&mut self, symbol: &str) -> Result<()> {
        if !self.peek()?.is_symbol(symbol) {
            return Err(self.expected(&format!("'{}'", symbol)));
        }

        self.lex()?;
        Ok(())
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if !self.peek()?.is_keyword(keyword) {
            return Err(self.expected(&format!("'{}'", keyword)));
        }

        self.lex()?;
        Ok(())
    }

    fn expect_name(&mut self) -> Result<String> {
        match self.peek()?.token {
            CodeToken::Name(name) => {
                self.lex()?;
                Ok(name.to_string())
            }

            _ => Err(self.expected("<name>")),
        }
    }

    fn expect_eof(&mut self) -> Result<()> {
        if self.peek()?.token != CodeToken::Eof {
            return Err(self.expected("<eof>"));
        }

        Ok(())
    }

    pub fn parse_expression_tag(&mut self) -> Result<Expr> {
        let expr = self.parse_expr()?;
        self.expect_eof()?;
        Ok(expr)
    }

    /// Every statement in the tag, each with the line it starts on.
    pub fn parse_statement_tag(&mut self) -> Result<Vec<(u32, Stmt)>> {
        let mut stmts = Vec::new();

        loop {
            let tok = self.peek()?;

            if tok.token == CodeToken::Eof {
                return Ok(stmts);
            }

            stmts.push((tok.line, self.parse_stmt()?));
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        let tok = self.peek()?;

        match tok.token {
            CodeToken::Keyword("if") => {
                self.lex()?;
                let cond = self.parse_expr()?;
                self.expect_keyword("then")?;
                Ok(Stmt::If(cond))
            }

            CodeToken::Keyword("elseif") => {
                self.lex()?;
                let cond = self.parse_expr()?;
                self.expect_keyword("then")?;
                Ok(Stmt::ElseIf(cond))
            }

            CodeToken::Keyword("else") => {
                self.lex()?;
                Ok(Stmt::Else)
            }

            CodeToken::Keyword("end") => {
                self.lex()?;
                Ok(Stmt::End)
            }

            CodeToken::Keyword("for") => {
                self.lex()?;
                self.parse_for()
            }

            CodeToken::Keyword("local") => {
                self.lex()?;
                let name = self.expect_name()?;
                let mut value = None;

                if self.peek()?.is_symbol("=") {
                    self.lex()?;
                    value = Some(self.parse_expr()?);
                }

                Ok(Stmt::Local { name, value })
            }

            CodeToken::Name(name) if self.peekn(1)?.is_symbol("=") => {
                self.lex()?;
                self.lex()?;
                let value = self.parse_expr()?;
                Ok(Stmt::Assign { name: name.to_string(), value })
            }

            CodeToken::Name(_) | CodeToken::Symbol("(") => {
                let expr = self.parse_postfix_expr()?;

                if !matches!(expr, Expr::Call(..) | Expr::Method(..)) {
                    let near = self.peek()?;
                    return Err(Error::new(self.chunk, near.line, format!("syntax error near {}", near.describe())));
                }

                Ok(Stmt::Call(expr))
            }

            _ => Err(self.unexpected(&tok)),
        }
    }

    // after FOR
    fn parse_for(&mut self) -> Result<Stmt> {
        let var = self.expect_name()?;

        if self.peek()?.is_symbol("=") {
            self.lex()?;
            let start = self.parse_expr()?;
            self.expect_symbol(",")?;
            let limit = self.parse_expr()?;
            let mut step = None;

            if self.peek()?.is_symbol(",") {
                self.lex()?;
                step = Some(self.parse_expr()?);
            }

            self.expect_keyword("do")?;
            return Ok(Stmt::ForNum { var, start, limit, step });
        }

        let mut value = None;

        if self.peek()?.is_symbol(",") {
            self.lex()?;
            value = Some(self.expect_name()?);
        }

        self.expect_keyword("in")?;

        let iteration = match self.peek()?.token {
            CodeToken::Name("ipairs") => Iteration::Ipairs,
            CodeToken::Name("pairs") => Iteration::Pairs,
            _ => return Err(self.expected("'ipairs' or 'pairs'")),
        };

        self.lex()?;
        self.expect_symbol("(")?;
        let table = self.parse_expr()?;
        self.expect_symbol(")")?;
        self.expect_keyword("do")?;

        Ok(Stmt::ForIn { key: var, value, iteration, table })
    }

    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_binary_expr(0)
    }

    fn peek_binary_op(&mut self) -> Result<Option<BinaryOp>> {
        match self.peek()?.token {
            CodeToken::Symbol(s) | CodeToken::Keyword(s) => Ok(BinaryOp::from_symbol(s)),
            _ => Ok(None),
        }
    }

    fn parse_binary_expr(&mut self, prec: usize) -> Result<Expr> {
        let parse_next_prec = |this: &mut Self| {
            if prec == this.prec_table.max_prec() {
                this.parse_unary_expr()
            }
            else {
                this.parse_binary_expr(prec + 1)
            }
        };

        let mut lhs = parse_next_prec(self)?;

        while let Some(op) = self.peek_binary_op()? {
            if !self.prec_table.ops_with_prec(prec).contains(&op) {
                break;
            }

            self.lex()?;

            let rhs = if op.is_right_assoc() {
                self.parse_binary_expr(prec)?
            }
            else {
                parse_next_prec(self)?
            };

            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }

        Ok(lhs)
    }

    fn parse_unary_expr(&mut self) -> Result<Expr> {
        let op = match self.peek()?.token {
            CodeToken::Keyword("not") => Some(UnaryOp::Not),
            CodeToken::Symbol("-") => Some(UnaryOp::Neg),
            CodeToken::Symbol("#") => Some(UnaryOp::Len),
            _ => None,
        };

        match op {
            Some(op) => {
                self.lex()?;
                let operand = self.parse_unary_expr()?;
                Ok(Expr::Unary(op, Box::new(operand)))
            }

            None => self.parse_postfix_expr(),
        }
    }

    fn parse_postfix_expr(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary_expr()?;

        loop {
            let tok = self.peek()?;

            if tok.is_symbol(".") {
                self.lex()?;
                let field = self.expect_name()?;
                expr = Expr::Field(Box::new(expr), field);
            }
            else if tok.is_symbol("[") {
                self.lex()?;
                let index = self.parse_expr()?;
                self.expect_symbol("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            }
            else if tok.is_symbol("(") {
                let args = self.parse_args()?;
                expr = Expr::Call(Box::new(expr), args);
            }
            else if tok.is_symbol(":") {
                self.lex()?;
                let method = self.expect_name()?;
                let args = self.parse_args()?;
                expr = Expr::Method(Box::new(expr), method, args);
            }
            else {
                return Ok(expr);
            }
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>> {
        self.expect_symbol("(")?;
        let mut args = Vec::new();

        if self.peek()?.is_symbol(")") {
            self.lex()?;
            return Ok(args);
        }

        loop {
            args.push(self.parse_expr()?);

            if self.peek()?.is_symbol(",") {
                self.lex()?;
            }
            else {
                self.expect_symbol(")")?;
                return Ok(args);
            }
        }
    }

    fn parse_primary_expr(&mut self) -> Result<Expr> {
        let tok = self.lex()?;

        match tok.token {
            CodeToken::Keyword("nil") => Ok(Expr::Const(Value::Nil)),
            CodeToken::Keyword("true") => Ok(Expr::Const(Value::Boolean(true))),
            CodeToken::Keyword("false") => Ok(Expr::Const(Value::Boolean(false))),
            CodeToken::Number(n) => Ok(Expr::Const(n)),
            CodeToken::Str(s) => Ok(Expr::Const(Value::String(s))),
            CodeToken::Name(name) => Ok(Expr::Name(name.to_string())),

            CodeToken::Symbol("(") => {
                let expr = self.parse_expr()?;
                self.expect_symbol(")")?;
                Ok(expr)
            }

            _ => Err(self.unexpected(&tok)),
        }
    }
}

struct BinOpPrec {
    prec_table: Vec<Vec<BinaryOp>>,
}

impl BinOpPrec {
    pub fn new() -> Self {
        let table = vec![
            vec![BinaryOp::Or],
            vec![BinaryOp::And],
            vec![BinaryOp::Lt, BinaryOp::Gt, BinaryOp::Le, BinaryOp::Ge, BinaryOp::Ne, BinaryOp::Eq],
            vec![BinaryOp::Concat],
            vec![BinaryOp::Add, BinaryOp::Sub],
            vec![BinaryOp::Mul, BinaryOp::Div, BinaryOp::Mod],
        ];

        Self { prec_table: table }
    }

    pub fn ops_with_prec(&self, prec: usize) -> &Vec<BinaryOp> {
        &self.prec_table[prec]
    }

    pub fn max_prec(&self) -> usize {
        self.prec_table.len() - 1
    }
}

/// Turns the flat sequence of text, expressions and statements into nested
/// [`Node`]s, matching every block with its `end`.
pub struct Builder<'c> {
    chunk: &'c str,
    root: Vec<Node>,
    open: Vec<Open>,
}

struct Open {
    line: u32,
    block: OpenBlock,
    body: Vec<Node>,
}

enum OpenBlock {
    // the body of the arm being built lives in `Open::body`
    If { arms: Vec<(u32, Expr, Vec<Node>)>, in_else: bool },
    ForIn { key: String, value: Option<String>, iteration: Iteration, table: Expr },
    ForNum { var: String, start: Expr, limit: Expr, step: Option<Expr> },
}

impl OpenBlock {
    fn name(&self) -> &'static str {
        match self {
            OpenBlock::If { .. } => "if",
            OpenBlock::ForIn { .. } | OpenBlock::ForNum { .. } => "for",
        }
    }
}

impl<'c> Builder<'c> {
    pub fn new(chunk: &'c str) -> Self {
        Builder { chunk, root: Vec::new(), open: Vec::new() }
    }

    fn current(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(open) => &mut open.body,
            None => &mut self.root,
        }
    }

    pub fn text(&mut self, text: &str) {
        self.current().push(Node::Text(text.to_string()));
    }

    pub fn emit(&mut self, line: u32, expr: Expr) {
        self.current().push(Node::Emit { line, expr });
    }

    pub fn statement(&mut self, line: u32, stmt: Stmt) -> Result<()> {
        match stmt {
            Stmt::If(cond) => {
                self.open.push(Open {
                    line,
                    block: OpenBlock::If { arms: vec![(line, cond, Vec::new())], in_else: false },
                    body: Vec::new(),
                });
            }

            Stmt::ElseIf(cond) => match self.open.last_mut() {
                Some(Open { block: OpenBlock::If { arms, in_else: false }, body, .. }) => {
                    if let Some(arm) = arms.last_mut() {
                        arm.2 = take(body);
                    }

                    arms.push((line, cond, Vec::new()));
                }

                _ => return Err(Error::new(self.chunk, line, "'elseif' without a matching 'if'")),
            },

            Stmt::Else => match self.open.last_mut() {
                Some(Open { block: OpenBlock::If { arms, in_else }, body, .. }) if !*in_else => {
                    if let Some(arm) = arms.last_mut() {
                        arm.2 = take(body);
                    }

                    *in_else = true;
                }

                _ => return Err(Error::new(self.chunk, line, "'else' without a matching 'if'")),
            },

            Stmt::End => {
                let Some(open) = self.open.pop() else {
                    return Err(Error::new(self.chunk, line, "'end' without an open block"));
                };

                let node = match open.block {
                    OpenBlock::If { mut arms, in_else } => {
                        let mut otherwise = None;

                        if in_else {
                            otherwise = Some(open.body);
                        }
                        else if let Some(arm) = arms.last_mut() {
                            arm.2 = open.body;
                        }

                        Node::If { arms, otherwise }
                    }

                    OpenBlock::ForIn { key, value, iteration, table } =>
                        Node::ForIn { line: open.line, key, value, iteration, table, body: open.body },

                    OpenBlock::ForNum { var, start, limit, step } =>
                        Node::ForNum { line: open.line, var, start, limit, step, body: open.body },
                };

                self.current().push(node);
            }

            Stmt::ForIn { key, value, iteration, table } => {
                self.open.push(Open {
                    line,
                    block: OpenBlock::ForIn { key, value, iteration, table },
                    body: Vec::new(),
                });
            }

            Stmt::ForNum { var, start, limit, step } => {
                self.open.push(Open {
                    line,
                    block: OpenBlock::ForNum { var, start, limit, step },
                    body: Vec::new(),
                });
            }

            Stmt::Local { name, value } => self.current().push(Node::Local { line, name, value }),
            Stmt::Assign { name, value } => self.current().push(Node::Assign { line, name, value }),
            Stmt::Call(expr) => self.current().push(Node::Eval { line, expr }),
        }

        Ok(())
    }

    pub fn finish(self) -> Result<Vec<Node>> {
        if let Some(open) = self.open.last() {
            let message = format!("'end' expected to close '{}' at line {}", open.block.name(), open.line);
            return Err(Error::new(self.chunk, open.line, message));
        }

        Ok(self.root)
    }
}

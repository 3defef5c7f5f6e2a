//! Plixy expression lexer, AST, parser, and evaluator.
//!
//! Expressions are evaluated in two stages.  First every identifier or
//! dotted path bound in the [`VarStore`] is replaced by its rendered text
//! (see [`VarStore::substitute`]).  The result is then parsed with a small
//! closed grammar:
//!
//! ```text
//! expr     := additive [ ("==" | "!=" | "<" | "<=" | ">" | ">=") additive ]
//! additive := term { ("+" | "-") term }
//! term     := unary { ("*" | "/" | "%") unary }
//! unary    := ("-" | "+") unary | primary
//! primary  := number | string | "(" expr ")"
//! ```
//!
//! Identifiers, calls and anything else are outside the grammar.  When the
//! text does not parse or evaluate, [`evaluate`] falls back to returning it as
//! a string (with one pair of surrounding quotes stripped).

use log::debug;

use crate::var::VarStore;
use super::value::{EvalError, Value};

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),

    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    Eq, // ==
    Ne, // !=
    Lt,
    Le,
    Gt,
    Ge,

    LParen,
    RParen,
    Eof,
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

struct Lexer {
    src: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(src: &str) -> Self {
        Lexer {
            src: src.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    fn peek2(&self) -> Option<char> {
        self.src.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn take_digits(&mut self, s: &mut String) {
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            s.push(c);
            self.pos += 1;
        }
    }

    fn read_number(&mut self, first: char) -> Result<Token, EvalError> {
        let mut s = String::new();
        s.push(first);
        let mut is_float = first == '.';

        self.take_digits(&mut s);
        if !is_float && self.peek() == Some('.') {
            is_float = true;
            s.push('.');
            self.pos += 1;
            self.take_digits(&mut s);
        }
        if matches!(self.peek(), Some('e' | 'E'))
            && (self.peek2().is_some_and(|c| c.is_ascii_digit())
                || (matches!(self.peek2(), Some('+' | '-'))
                    && self.src.get(self.pos + 2).is_some_and(char::is_ascii_digit)))
        {
            is_float = true;
            s.push('e');
            self.pos += 1;
            if let Some(sign) = self.peek().filter(|c| matches!(*c, '+' | '-')) {
                s.push(sign);
                self.pos += 1;
            }
            self.take_digits(&mut s);
        }

        if is_float {
            s.parse()
                .map(Token::Float)
                .map_err(|_| EvalError::Lex(format!("bad number {s:?}")))
        } else {
            s.parse()
                .map(Token::Int)
                .map_err(|_| EvalError::Lex(format!("integer literal {s} out of range")))
        }
    }

    fn read_string(&mut self, quote: char) -> Result<Token, EvalError> {
        let mut s = String::new();
        loop {
            match self.advance() {
                None => return Err(EvalError::Lex("unterminated string".into())),
                Some('\\') => match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some(c) => s.push(c),
                    None => return Err(EvalError::Lex("unterminated string".into())),
                },
                Some(c) if c == quote => return Ok(Token::Str(s)),
                Some(c) => s.push(c),
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, EvalError> {
        self.skip_ws();
        let ch = match self.advance() {
            None => return Ok(Token::Eof),
            Some(c) => c,
        };

        let tok = match ch {
            '0'..='9' => return self.read_number(ch),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => return self.read_number(ch),
            '"' | '\'' => return self.read_string(ch),
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '=' if self.eat('=') => Token::Eq,
            '!' if self.eat('=') => Token::Ne,
            '<' => {
                if self.eat('=') {
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            c => return Err(EvalError::Lex(format!("unexpected character {c:?}"))),
        };
        Ok(tok)
    }

    fn tokenize(mut self) -> Result<Vec<Token>, EvalError> {
        let mut tokens = Vec::new();
        loop {
            let t = self.next_token()?;
            let done = matches!(t, Token::Eof);
            tokens.push(t);
            if done {
                return Ok(tokens);
            }
        }
    }
}

// ── AST ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Neg,
    Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

// ── Parser ────────────────────────────────────────────────────────────────────

/// Deepest nesting of parentheses and unary operators the parser accepts.
const MAX_DEPTH: usize = 128;

/// Most binary operators in one expression.
const MAX_OPERATORS: usize = 1024;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    operators: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0, depth: 0, operators: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        t
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn enter(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::Syntax("expression nested too deeply".into()));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // Binary chains build left-deep trees; evaluation recurses through them.
    fn binary(&mut self, op: BinOp, lhs: Expr, rhs: Expr) -> Result<Expr, EvalError> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(EvalError::Syntax("expression has too many operators".into()));
        }
        Ok(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))
    }

    // ── Grammar ───────────────────────────────────────────────────────────────

    fn parse_expr(&mut self) -> Result<Expr, EvalError> {
        self.parse_comparison()
    }

    // Comparisons do not chain: `1 < 2 < 3` is a syntax error.
    fn parse_comparison(&mut self) -> Result<Expr, EvalError> {
        let lhs = self.parse_additive()?;
        let op = match self.peek() {
            Token::Eq => BinOp::Eq,
            Token::Ne => BinOp::Ne,
            Token::Lt => BinOp::Lt,
            Token::Le => BinOp::Le,
            Token::Gt => BinOp::Gt,
            Token::Ge => BinOp::Ge,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.parse_additive()?;
        self.binary(op, lhs, rhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_multiplicative()?;
            lhs = self.binary(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Rem,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = self.binary(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, EvalError> {
        let op = match self.peek() {
            Token::Minus => UnaryOp::Neg,
            Token::Plus => UnaryOp::Pos,
            _ => return self.parse_primary(),
        };
        self.pos += 1;
        self.enter()?;
        let operand = self.parse_unary()?;
        self.leave();
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Token::Int(n) => Ok(Expr::Literal(Value::Int(n))),
            Token::Float(x) => Ok(Expr::Literal(Value::Float(x))),
            Token::Str(s) => Ok(Expr::Literal(Value::Str(s))),
            Token::LParen => {
                self.enter()?;
                let inner = self.parse_expr()?;
                self.leave();
                if !self.eat(&Token::RParen) {
                    return Err(EvalError::Syntax("expected ')'".into()));
                }
                Ok(inner)
            }
            other => Err(EvalError::Syntax(format!("unexpected token {other:?}"))),
        }
    }
}

/// Parse an expression string into an AST.  Trailing tokens are an error.
pub fn parse_expr(src: &str) -> Result<Expr, EvalError> {
    let tokens = Lexer::new(src).tokenize()?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr()?;
    match parser.peek() {
        Token::Eof => Ok(expr),
        other => Err(EvalError::Syntax(format!("unexpected trailing token {other:?}"))),
    }
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

/// Evaluate an [`Expr`] AST node.
pub fn eval_expr(expr: &Expr) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Unary(op, inner) => {
            let v = eval_expr(inner)?;
            match op {
                UnaryOp::Neg => v.arith_neg(),
                UnaryOp::Pos => v.arith_pos(),
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            let l = eval_expr(lhs)?;
            let r = eval_expr(rhs)?;
            eval_binop(*op, &l, &r)
        }
    }
}

fn eval_binop(op: BinOp, l: &Value, r: &Value) -> Result<Value, EvalError> {
    use std::cmp::Ordering;
    match op {
        BinOp::Add => l.arith_add(r),
        BinOp::Sub => l.arith_sub(r),
        BinOp::Mul => l.arith_mul(r),
        BinOp::Div => l.arith_div(r),
        BinOp::Rem => l.arith_rem(r),
        BinOp::Eq => Ok(Value::Bool(l.loose_eq(r))),
        BinOp::Ne => Ok(Value::Bool(!l.loose_eq(r))),
        BinOp::Lt => Ok(Value::Bool(l.cmp_value(r)? == Ordering::Less)),
        BinOp::Le => Ok(Value::Bool(l.cmp_value(r)? != Ordering::Greater)),
        BinOp::Gt => Ok(Value::Bool(l.cmp_value(r)? == Ordering::Greater)),
        BinOp::Ge => Ok(Value::Bool(l.cmp_value(r)? != Ordering::Less)),
    }
}

/// Parse and evaluate `src` with no variable substitution.
pub fn eval_str(src: &str) -> Result<Value, EvalError> {
    let expr = parse_expr(src)?;
    eval_expr(&expr)
}

/// Evaluate free-form expression text against `vars`.
///
/// Never fails: text that is not a valid expression comes back as a string.
pub fn evaluate(src: &str, vars: &VarStore) -> Value {
    let substituted = vars.substitute(src);
    match eval_str(&substituted) {
        Ok(v) => v,
        Err(e) => {
            debug!("evaluate {substituted:?}: {e}; using text");
            Value::Str(unquote(substituted.trim()).to_owned())
        }
    }
}

/// Strip one matching pair of surrounding `"` or `'`.
fn unquote(s: &str) -> &str {
    for q in ['"', '\''] {
        if s.starts_with(q) && s.ends_with(q) {
            // A lone quote character unquotes to the empty string.
            return s.get(1..s.len() - 1).unwrap_or_default();
        }
    }
    s
}

// ── Tests ─────────────────────────────────────────────────────────────────────

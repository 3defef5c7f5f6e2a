//! Runtime value type for Plixy scripts.
//!
//! Values are produced by the expression evaluator and stored in the
//! [`VarStore`](crate::var::VarStore).  A `Map` only ever appears as an
//! intermediate node of a dotted path (`a.b.c`).

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A Plixy runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Map(BTreeMap<String, Value>),
}

/// Error raised while evaluating an expression.
///
/// None of these escape [`evaluate`](super::expr::evaluate): every failure
/// falls back to treating the text as a plain string.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A character that is not part of the expression grammar.
    Lex(String),
    /// Tokens that do not form an expression.
    Syntax(String),
    /// Operator applied to operands it does not accept.
    Type(String),
    DivisionByZero,
    Overflow,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Lex(msg) => write!(f, "lex error: {msg}"),
            EvalError::Syntax(msg) => write!(f, "syntax error: {msg}"),
            EvalError::Type(msg) => write!(f, "type error: {msg}"),
            EvalError::DivisionByZero => f.write_str("division by zero"),
            EvalError::Overflow => f.write_str("integer overflow"),
        }
    }
}

impl std::error::Error for EvalError {}

impl Default for Value {
    fn default() -> Self {
        Value::Str(String::new())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => {
                // Whole floats keep one fractional digit so `4 / 2` reads `2.0`.
                if x.fract() == 0.0 && x.abs() < 1e15 {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{x}")
                }
            }
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Str(s) => f.write_str(s),
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

// Numeric view of a value; booleans count as 0/1.
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(x) => x,
        }
    }
}

impl Value {
    /// An empty map node.
    pub fn empty_map() -> Self {
        Value::Map(BTreeMap::new())
    }

    /// Name of the type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::Map(_) => "map",
        }
    }

    fn as_num(&self) -> Option<Num> {
        match self {
            Value::Int(n) => Some(Num::Int(*n)),
            Value::Float(x) => Some(Num::Float(*x)),
            Value::Bool(b) => Some(Num::Int(i64::from(*b))),
            Value::Str(_) | Value::Map(_) => None,
        }
    }

    fn operands(&self, rhs: &Value, op: &str) -> Result<(Num, Num), EvalError> {
        match (self.as_num(), rhs.as_num()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(EvalError::Type(format!(
                "unsupported operand types for {op}: {} and {}",
                self.type_name(),
                rhs.type_name()
            ))),
        }
    }

    // ── Arithmetic ────────────────────────────────────────────────────────────

    /// `+`: numeric addition, or concatenation of two strings.
    pub fn arith_add(&self, rhs: &Value) -> Result<Value, EvalError> {
        if let (Value::Str(a), Value::Str(b)) = (self, rhs) {
            return Ok(Value::Str(format!("{a}{b}")));
        }
        match self.operands(rhs, "+")? {
            (Num::Int(a), Num::Int(b)) => a.checked_add(b).map(Value::Int).ok_or(EvalError::Overflow),
            (a, b) => Ok(Value::Float(a.as_f64() + b.as_f64())),
        }
    }

    pub fn arith_sub(&self, rhs: &Value) -> Result<Value, EvalError> {
        match self.operands(rhs, "-")? {
            (Num::Int(a), Num::Int(b)) => a.checked_sub(b).map(Value::Int).ok_or(EvalError::Overflow),
            (a, b) => Ok(Value::Float(a.as_f64() - b.as_f64())),
        }
    }

    pub fn arith_mul(&self, rhs: &Value) -> Result<Value, EvalError> {
        match self.operands(rhs, "*")? {
            (Num::Int(a), Num::Int(b)) => a.checked_mul(b).map(Value::Int).ok_or(EvalError::Overflow),
            (a, b) => Ok(Value::Float(a.as_f64() * b.as_f64())),
        }
    }

    /// `/` is true division: the result is always a float.
    pub fn arith_div(&self, rhs: &Value) -> Result<Value, EvalError> {
        let (a, b) = self.operands(rhs, "/")?;
        if b.as_f64() == 0.0 {
            return Err(EvalError::DivisionByZero);
        }
        Ok(Value::Float(a.as_f64() / b.as_f64()))
    }

    /// `%` takes the sign of the divisor.
    pub fn arith_rem(&self, rhs: &Value) -> Result<Value, EvalError> {
        match self.operands(rhs, "%")? {
            (Num::Int(_), Num::Int(0)) => Err(EvalError::DivisionByZero),
            (Num::Int(a), Num::Int(b)) => {
                let r = a.checked_rem(b).ok_or(EvalError::Overflow)?;
                Ok(Value::Int(if r != 0 && (r < 0) != (b < 0) { r + b } else { r }))
            }
            (a, b) => {
                let (a, b) = (a.as_f64(), b.as_f64());
                if b == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                let r = a % b;
                Ok(Value::Float(if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r }))
            }
        }
    }

    pub fn arith_neg(&self) -> Result<Value, EvalError> {
        match self.as_num() {
            Some(Num::Int(n)) => n.checked_neg().map(Value::Int).ok_or(EvalError::Overflow),
            Some(Num::Float(x)) => Ok(Value::Float(-x)),
            None => Err(EvalError::Type(format!("bad operand type for unary -: {}", self.type_name()))),
        }
    }

    pub fn arith_pos(&self) -> Result<Value, EvalError> {
        match self.as_num() {
            Some(Num::Int(n)) => Ok(Value::Int(n)),
            Some(Num::Float(x)) => Ok(Value::Float(x)),
            None => Err(EvalError::Type(format!("bad operand type for unary +: {}", self.type_name()))),
        }
    }

    // ── Comparison ────────────────────────────────────────────────────────────

    /// Equality: numbers compare by value, strings by content, anything else
    /// is unequal.
    pub fn loose_eq(&self, rhs: &Value) -> bool {
        match (self.as_num(), rhs.as_num()) {
            (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
            _ => self == rhs,
        }
    }

    /// Ordering between two numbers or two strings.
    pub fn cmp_value(&self, rhs: &Value) -> Result<Ordering, EvalError> {
        if let (Value::Str(a), Value::Str(b)) = (self, rhs) {
            return Ok(a.cmp(b));
        }
        let (a, b) = self.operands(rhs, "comparison")?;
        if let (Num::Int(a), Num::Int(b)) = (a, b) {
            return Ok(a.cmp(&b));
        }
        a.as_f64()
            .partial_cmp(&b.as_f64())
            .ok_or_else(|| EvalError::Type("comparison with NaN".into()))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Sandboxed arithmetic expressions for user supplied hash formulas
//!
//! Hash formulas are written over two parameters, the key and the table size.
//! Both have a shorthand (`k`, `n`) and a full name (`key`, `tableSize`); the
//! parser rewrites either spelling into the same [`Param`]. The accepted
//! grammar is deliberately small:
//!
//! ```text
//! expr    := sum ('^' sum)*
//! sum     := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := ('-' | '+') unary | primary
//! primary := NUMBER | IDENT | '(' expr ')'
//! ```
//!
//! `^` is bitwise XOR on the operands wrapped to 32-bit signed integers and
//! binds looser than `+`/`-`, so `k * 31 ^ k % n` reads as
//! `(k * 31) ^ (k % n)`. `/` is real division and `%` is the truncated
//! remainder. Integer arithmetic stays exact while it fits in an `i64`; any
//! other value is carried as `f64`, so results can be fractional, negative or
//! non-finite. Callers normalize the value before using it as an index.
//!
//! Formulas are capped at [`MAX_TOKENS`] tokens, which also bounds the depth
//! of the tree that evaluation walks.

use crate::error::{HashVizError, Result};
use std::fmt;

/// Maximum parenthesis / unary nesting accepted by the parser.
const MAX_DEPTH: usize = 64;

/// Maximum number of tokens in one formula.
pub const MAX_TOKENS: usize = 1024;

/// Named parameter of a hash formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// The key being hashed (`k` or `key`)
    Key,
    /// The table size (`n` or `tableSize`)
    TableSize,
}

impl Param {
    fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "k" | "key" => Some(Param::Key),
            "n" | "tableSize" => Some(Param::TableSize),
            _ => None,
        }
    }

    /// Full parameter name
    pub fn name(&self) -> &'static str {
        match self {
            Param::Key => "key",
            Param::TableSize => "tableSize",
        }
    }
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `^`
    Xor,
}

impl BinaryOp {
    fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Xor => "^",
        }
    }

    fn apply(&self, lhs: Value, rhs: Value) -> Value {
        if let (Value::Int(a), Value::Int(b)) = (lhs, rhs) {
            let exact = match self {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Sub => a.checked_sub(b),
                BinaryOp::Mul => a.checked_mul(b),
                BinaryOp::Div if a.checked_rem(b) == Some(0) => a.checked_div(b),
                BinaryOp::Div => None,
                BinaryOp::Rem => a.checked_rem(b),
                BinaryOp::Xor => Some(i64::from((a as i32) ^ (b as i32))),
            };
            if let Some(value) = exact {
                return Value::Int(value);
            }
        }

        let (a, b) = (lhs.to_f64(), rhs.to_f64());
        Value::Real(match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Rem => a % b,
            BinaryOp::Xor => f64::from(to_int32(a) ^ to_int32(b)),
        })
    }
}

/// Wrap a number to a signed 32-bit integer; non-finite values become 0
pub fn to_int32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let wrapped = value.trunc().rem_euclid(4_294_967_296.0);
    wrapped as u32 as i32
}

/// Intermediate value during evaluation
#[derive(Debug, Clone, Copy)]
enum Value {
    Int(i64),
    Real(f64),
}

impl Value {
    /// Largest magnitude below which every integer is an exact `f64`
    const EXACT_F64: f64 = 9_007_199_254_740_992.0;

    fn from_f64(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < Self::EXACT_F64 {
            Value::Int(value as i64)
        } else {
            Value::Real(value)
        }
    }

    fn to_f64(self) -> f64 {
        match self {
            Value::Int(value) => value as f64,
            Value::Real(value) => value,
        }
    }

    fn negate(self) -> Self {
        match self {
            Value::Int(value) => match value.checked_neg() {
                Some(negated) => Value::Int(negated),
                None => Value::Real(-(value as f64)),
            },
            Value::Real(value) => Value::Real(-value),
        }
    }
}

/// Abstract syntax tree of a hash formula
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// Reference to a parameter
    Param(Param),
    /// Unary negation
    Neg(Box<Expr>),
    /// Binary operation
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        lhs: Box<Expr>,
        /// Right operand
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Parse a formula into an expression tree
    pub fn parse(source: &str) -> Result<Self> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            source,
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.parse_expr()?;
        match parser.peek() {
            None => Ok(expr),
            Some(token) => Err(parser.error(format!("unexpected {}", token.kind))),
        }
    }

    /// Evaluate the expression for a key and table size
    pub fn eval(&self, key: i64, table_size: usize) -> f64 {
        self.value(key, table_size).to_f64()
    }

    fn value(&self, key: i64, table_size: usize) -> Value {
        match self {
            Expr::Number(value) => Value::from_f64(*value),
            Expr::Param(Param::Key) => Value::Int(key),
            Expr::Param(Param::TableSize) => match i64::try_from(table_size) {
                Ok(size) => Value::Int(size),
                Err(_) => Value::Real(table_size as f64),
            },
            Expr::Neg(inner) => inner.value(key, table_size).negate(),
            Expr::Binary { op, lhs, rhs } => {
                op.apply(lhs.value(key, table_size), rhs.value(key, table_size))
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(value) => write!(f, "{}", value),
            Expr::Param(param) => f.write_str(param.name()),
            Expr::Neg(inner) => write!(f, "-{}", inner),
            Expr::Binary { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Ident(String),
    Op(BinaryOp),
    LParen,
    RParen,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(value) => write!(f, "number {}", value),
            TokenKind::Ident(name) => write!(f, "identifier '{}'", name),
            TokenKind::Op(op) => write!(f, "operator '{}'", op.symbol()),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if tokens.len() == MAX_TOKENS {
            return Err(HashVizError::invalid_expression(
                source,
                format!("more than {} tokens", MAX_TOKENS),
            ));
        }

        let kind = match c {
            b'0'..=b'9' | b'.' => {
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                let text = &source[start..i];
                let value = text.parse::<f64>().map_err(|_| {
                    HashVizError::invalid_expression(
                        source,
                        format!("malformed number '{}' at offset {}", text, start),
                    )
                })?;
                TokenKind::Number(value)
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                TokenKind::Ident(source[start..i].to_string())
            }
            _ => {
                i += 1;
                match c {
                    b'+' => TokenKind::Op(BinaryOp::Add),
                    b'-' => TokenKind::Op(BinaryOp::Sub),
                    b'*' => TokenKind::Op(BinaryOp::Mul),
                    b'/' => TokenKind::Op(BinaryOp::Div),
                    b'%' => TokenKind::Op(BinaryOp::Rem),
                    b'^' => TokenKind::Op(BinaryOp::Xor),
                    b'(' => TokenKind::LParen,
                    b')' => TokenKind::RParen,
                    _ => {
                        let ch = source[start..].chars().next().unwrap_or('?');
                        return Err(HashVizError::invalid_expression(
                            source,
                            format!("unexpected character '{}' at offset {}", ch, start),
                        ));
                    }
                }
            }
        };
        tokens.push(Token { kind, offset: start });
    }

    Ok(tokens)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_op(&self) -> Option<BinaryOp> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Op(op),
                ..
            }) => Some(*op),
            _ => None,
        }
    }

    fn error(&self, message: String) -> HashVizError {
        let location = match self.peek() {
            Some(token) => format!(" at offset {}", token.offset),
            None => String::new(),
        };
        HashVizError::invalid_expression(self.source, format!("{}{}", message, location))
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error(format!("nesting deeper than {}", MAX_DEPTH)));
        }
        Ok(())
    }

    /// Left-associative chain of `operand (op operand)*` for the operators in `ops`
    fn parse_chain(
        &mut self,
        ops: &[BinaryOp],
        operand: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let mut lhs = operand(self)?;
        while let Some(op) = self.peek_op().filter(|op| ops.contains(op)) {
            self.pos += 1;
            let rhs = operand(self)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_chain(&[BinaryOp::Xor], Self::parse_sum)
    }

    fn parse_sum(&mut self) -> Result<Expr> {
        self.parse_chain(&[BinaryOp::Add, BinaryOp::Sub], Self::parse_term)
    }

    fn parse_term(&mut self) -> Result<Expr> {
        self.parse_chain(
            &[BinaryOp::Mul, BinaryOp::Div, BinaryOp::Rem],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        match self.peek_op() {
            Some(op @ (BinaryOp::Sub | BinaryOp::Add)) => {
                self.pos += 1;
                self.enter()?;
                let inner = self.parse_unary()?;
                self.depth -= 1;
                Ok(match op {
                    BinaryOp::Sub => Expr::Neg(Box::new(inner)),
                    _ => inner,
                })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let token = match self.next() {
            Some(token) => token,
            None => return Err(self.error("unexpected end of expression".to_string())),
        };

        match token.kind {
            TokenKind::Number(value) => Ok(Expr::Number(value)),
            TokenKind::Ident(name) => match Param::from_ident(&name) {
                Some(param) => Ok(Expr::Param(param)),
                None => Err(HashVizError::invalid_expression(
                    self.source,
                    format!("unknown identifier '{}' at offset {}", name, token.offset),
                )),
            },
            TokenKind::LParen => {
                self.enter()?;
                let inner = self.parse_expr()?;
                self.depth -= 1;
                match self.next() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(HashVizError::invalid_expression(
                        self.source,
                        format!("expected ')' but found {} at offset {}", other.kind, other.offset),
                    )),
                    None => Err(self.error("missing ')'".to_string())),
                }
            }
            other => Err(HashVizError::invalid_expression(
                self.source,
                format!("unexpected {} at offset {}", other, token.offset),
            )),
        }
    }
}

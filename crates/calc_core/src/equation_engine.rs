use crate::config::{AngleMode, EngineConfig};
use crate::format::format_number;
use crate::traits::MathEngine;
use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub mod derivative;
pub mod functions;

/// Variable bindings used while evaluating an expression, e.g. `{x: 1}`.
pub type Scope = HashMap<String, f64>;

/// Builds a `Scope` from `(name, value)` pairs.
pub fn scope<'a>(bindings: impl IntoIterator<Item = (&'a str, f64)>) -> Scope {
    bindings
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

// --- Parse tree ---

/// Parse tree node.
///
/// `Operator` carries one argument for unary and two for binary operators.
/// Trees are never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Constant { value: f64 },
    Symbol { name: String },
    Parenthesis { content: Box<Node> },
    Operator { op: char, args: Vec<Node> },
    Function { name: String, args: Vec<Node> },
}

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_UNARY: u8 = 3;
const PREC_POW: u8 = 4;
const PREC_ATOM: u8 = 5;

impl Node {
    pub fn constant(value: f64) -> Self {
        Node::Constant { value }
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Node::Symbol { name: name.into() }
    }

    pub fn parenthesis(content: Node) -> Self {
        Node::Parenthesis {
            content: Box::new(content),
        }
    }

    pub fn unary(op: char, operand: Node) -> Self {
        Node::Operator {
            op,
            args: vec![operand],
        }
    }

    pub fn binary(left: Node, op: char, right: Node) -> Self {
        Node::Operator {
            op,
            args: vec![left, right],
        }
    }

    pub fn function(name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Function {
            name: name.into(),
            args,
        }
    }

    /// Numeric value when this node is a literal constant.
    pub fn as_constant(&self) -> Option<f64> {
        match self {
            Node::Constant { value } => Some(*value),
            _ => None,
        }
    }

    /// Binding strength used when rendering without explicit parenthesis nodes.
    fn precedence(&self) -> u8 {
        match self {
            Node::Constant { value } if value.is_sign_negative() && *value != 0.0 => PREC_UNARY,
            Node::Operator { op, args } => match (args.len(), op) {
                (1, _) => PREC_UNARY,
                (2, '+' | '-') => PREC_ADD,
                (2, '*' | '/' | '%') => PREC_MUL,
                (2, '^') => PREC_POW,
                _ => PREC_ATOM,
            },
            _ => PREC_ATOM,
        }
    }
}

struct Grouped<'a>(&'a Node, bool);

impl fmt::Display for Grouped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.1 {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, args: &[Node]) -> fmt::Result {
    for (idx, arg) in args.iter().enumerate() {
        if idx > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{arg}")?;
    }
    Ok(())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Constant { value } => write!(f, "{}", format_number(*value)),
            Node::Symbol { name } => write!(f, "{name}"),
            Node::Parenthesis { content } => write!(f, "({content})"),
            Node::Operator { op, args } => match args.as_slice() {
                [operand] => {
                    let grouped = operand.precedence() < PREC_UNARY;
                    write!(f, "{op}{}", Grouped(operand, grouped))
                }
                [left, right] => {
                    let prec = self.precedence();
                    let left_prec = left.precedence();
                    let right_prec = right.precedence();
                    let group_left = left_prec < prec || (*op == '^' && left_prec == prec);
                    let group_right = right_prec != PREC_UNARY
                        && (right_prec < prec || (right_prec == prec && *op != '^'));
                    write!(
                        f,
                        "{} {op} {}",
                        Grouped(left, group_left),
                        Grouped(right, group_right)
                    )
                }
                _ => {
                    write!(f, "{op}(")?;
                    write_joined(f, args)?;
                    write!(f, ")")
                }
            },
            Node::Function { name, args } => {
                write!(f, "{name}(")?;
                write_joined(f, args)?;
                write!(f, ")")
            }
        }
    }
}

// --- Tokenizer & Parser ---

/// Parses a string expression into a tree.
pub fn parse(input: &str) -> Result<Node> {
    if input.trim().is_empty() {
        bail!("Empty expression");
    }
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let node = parser.parse_expression()?;
    if let Some(token) = parser.peek() {
        bail!("Unexpected {} at token {}", token, parser.pos + 1);
    }
    Ok(node)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Percent,
    Comma,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", format_number(*n)),
            Token::Identifier(name) => write!(f, "identifier \"{name}\""),
            Token::Plus => write!(f, "operator \"+\""),
            Token::Minus => write!(f, "operator \"-\""),
            Token::Star => write!(f, "operator \"*\""),
            Token::Slash => write!(f, "operator \"/\""),
            Token::Caret => write!(f, "operator \"^\""),
            Token::Percent => write!(f, "operator \"%\""),
            Token::Comma => write!(f, "\",\""),
            Token::LParen => write!(f, "\"(\""),
            Token::RParen => write!(f, "\")\""),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() || c == '.' {
            let mut num_str = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    num_str.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            // Exponent part only when a digit follows (`2e` is not a number).
            if matches!(chars.peek(), Some('e' | 'E')) {
                let mut lookahead = chars.clone();
                lookahead.next();
                let mut exponent = String::from("e");
                if let Some(&sign @ ('+' | '-')) = lookahead.peek() {
                    exponent.push(sign);
                    lookahead.next();
                }
                if lookahead.peek().is_some_and(|d| d.is_ascii_digit()) {
                    while let Some(&d) = lookahead.peek() {
                        if !d.is_ascii_digit() {
                            break;
                        }
                        exponent.push(d);
                        lookahead.next();
                    }
                    num_str.push_str(&exponent);
                    chars = lookahead;
                }
            }
            let value = num_str
                .parse::<f64>()
                .map_err(|_| anyhow!("Invalid number \"{num_str}\""))?;
            tokens.push(Token::Number(value));
        } else if c.is_alphabetic() || c == '_' {
            let mut ident = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    ident.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Identifier(ident));
        } else {
            let token = match c {
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,
                '^' => Token::Caret,
                '%' => Token::Percent,
                ',' => Token::Comma,
                '(' => Token::LParen,
                ')' => Token::RParen,
                other => bail!("Unexpected character \"{other}\""),
            };
            tokens.push(token);
            chars.next();
        }
    }
    Ok(tokens)
}

/// Bound on nested sub-expressions (parentheses, function arguments, signs,
/// exponents). The parser and every tree walker recurse once per level.
const MAX_DEPTH: usize = 256;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect_rparen(&mut self) -> Result<()> {
        match self.consume() {
            Some(Token::RParen) => Ok(()),
            Some(token) => bail!("Expected \")\" but found {token}"),
            None => bail!("Expected \")\" but reached end of expression"),
        }
    }

    fn parse_expression(&mut self) -> Result<Node> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> Result<Node> {
        let mut left = self.parse_multiplicative()?;

        while let Some(token) = self.peek() {
            let op = match token {
                Token::Plus => '+',
                Token::Minus => '-',
                _ => break,
            };
            self.consume();
            let right = self.parse_multiplicative()?;
            left = Node::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Node> {
        let mut left = self.parse_unary()?;

        while let Some(token) = self.peek() {
            let op = match token {
                Token::Star => '*',
                Token::Slash => '/',
                Token::Percent => '%',
                _ => break,
            };
            self.consume();
            let right = self.parse_unary()?;
            left = Node::binary(left, op, right);
        }
        Ok(left)
    }

    // Every nesting path (parentheses, arguments, signs, exponents) re-enters here.
    fn parse_unary(&mut self) -> Result<Node> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            bail!("Expression nested too deeply (limit {MAX_DEPTH})");
        }
        let node = match self.peek() {
            Some(Token::Minus) | Some(Token::Plus) => {
                let op = if let Some(Token::Minus) = self.consume() {
                    '-'
                } else {
                    '+'
                };
                Node::unary(op, self.parse_unary()?)
            }
            _ => self.parse_power()?,
        };
        self.depth -= 1;
        Ok(node)
    }

    /// `^` is right-associative and binds tighter than a leading minus: `-2^2 = -4`.
    fn parse_power(&mut self) -> Result<Node> {
        let base = self.parse_primary()?;
        if let Some(Token::Caret) = self.peek() {
            self.consume();
            let exponent = self.parse_unary()?;
            return Ok(Node::binary(base, '^', exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Node> {
        match self.consume() {
            Some(Token::Number(n)) => Ok(Node::constant(n)),
            Some(Token::Identifier(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.consume(); // eat '('
                    let args = self.parse_arguments()?;
                    Ok(Node::function(name, args))
                } else {
                    Ok(Node::symbol(name))
                }
            }
            Some(Token::LParen) => {
                let content = self.parse_expression()?;
                self.expect_rparen()?;
                Ok(Node::parenthesis(content))
            }
            Some(token) => bail!("Unexpected {token}"),
            None => bail!("Unexpected end of expression"),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Node>> {
        let mut args = Vec::new();
        if let Some(Token::RParen) = self.peek() {
            self.consume();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            match self.consume() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => break,
                Some(token) => bail!("Expected \",\" or \")\" but found {token}"),
                None => bail!("Expected \")\" but reached end of expression"),
            }
        }
        Ok(args)
    }
}

// --- Engine ---

/// Built-in `MathEngine`: IEEE-754 `f64` arithmetic over the tree above.
///
/// The angle unit is part of the value, so two engines with different
/// configurations can coexist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn set_angle_mode(&mut self, angles: AngleMode) {
        self.config.angles = angles;
    }

    /// Evaluates an already parsed tree.
    pub fn evaluate_node(&self, node: &Node, scope: &Scope) -> Result<f64> {
        match node {
            Node::Constant { value } => Ok(*value),
            Node::Symbol { name } => scope
                .get(name)
                .copied()
                .or_else(|| functions::constant(name))
                .ok_or_else(|| anyhow!("Undefined symbol {name}")),
            Node::Parenthesis { content } => self.evaluate_node(content, scope),
            Node::Operator { op, args } => match args.as_slice() {
                [operand] => {
                    let value = self.evaluate_node(operand, scope)?;
                    match op {
                        '-' => Ok(-value),
                        '+' => Ok(value),
                        _ => bail!("Unknown unary operator \"{op}\""),
                    }
                }
                [left, right] => {
                    let a = self.evaluate_node(left, scope)?;
                    let b = self.evaluate_node(right, scope)?;
                    apply_binary(*op, a, b)
                }
                _ => bail!(
                    "Operator \"{op}\" expects 1 or 2 operands, got {}",
                    args.len()
                ),
            },
            Node::Function { name, args } => {
                let values = args
                    .iter()
                    .map(|arg| self.evaluate_node(arg, scope))
                    .collect::<Result<Vec<_>>>()?;
                functions::call(name, &values, self.config.angles)
                    .unwrap_or_else(|| Err(anyhow!("Undefined function {name}")))
            }
        }
    }
}

fn apply_binary(op: char, a: f64, b: f64) -> Result<f64> {
    match op {
        '+' => Ok(a + b),
        '-' => Ok(a - b),
        '*' => Ok(a * b),
        '/' => Ok(a / b),
        '^' => Ok(a.powf(b)),
        '%' => Ok(functions::modulo(a, b)),
        _ => bail!("Unknown binary operator \"{op}\""),
    }
}

impl MathEngine for Engine {
    fn evaluate(&self, expression: &str, scope: &Scope) -> Result<f64> {
        let node = parse(expression)?;
        self.evaluate_node(&node, scope)
    }

    fn parse(&self, expression: &str) -> Result<Node> {
        parse(expression)
    }

    fn derivative(&self, expression: &str, variable: &str) -> Result<Node> {
        let node = parse(expression)?;
        derivative::differentiate(&node, variable, self.config.angles)
    }

    fn call_function(&self, name: &str, args: &[f64]) -> Option<Result<f64>> {
        functions::call(name, args, self.config.angles)
    }

    fn angle_mode(&self) -> AngleMode {
        self.config.angles
    }
}

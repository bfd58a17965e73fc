//! Task filters.
//!
//! A filter is a boolean expression over one task, bound to the name `t`:
//!
//! ```text
//! t.stage == "todo" and not "wontfix" in t.tags
//! t.due_date <= "next friday" or (t.estimate > 3 and "backend" in t.tags)
//! "assignee" in t
//! ```
//!
//! Filters are parsed once into an expression tree and evaluated against
//! each task. Comparisons against attributes a task lacks are false, never
//! errors. `not` binds tighter than `and`, which binds tighter than `or`;
//! both connectives short-circuit left to right. An empty filter matches
//! everything.

use crate::libs::attributes::{AttributeValue, CompareOp};
use crate::libs::error::{Error, Result};
use crate::libs::task::Task;
use std::fmt;
use std::str::FromStr;

/// Name the task is bound to inside a filter.
pub const TASK_VARIABLE: &str = "t";

const KEYWORDS: [&str; 6] = ["and", "or", "not", "in", "true", "false"];

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// The task itself, as in `"assignee" in t`.
    Task,
    Attribute(String),
    Literal(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(bool),
    Truthy(Operand),
    Compare(Operand, CompareOp, Operand),
    In { needle: Operand, haystack: Operand, negated: bool },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Number(String),
    Op(CompareOp),
    Dot,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) | Token::Number(s) => write!(f, "{}", s),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::Op(op) => write!(f, "{:?}", op),
            Token::Dot => write!(f, "."),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

fn filter_error(position: usize, message: impl Into<String>) -> Error {
    Error::FilterParse {
        position,
        message: message.into(),
    }
}

fn tokenize(source: &str) -> Result<Vec<(usize, Token)>> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' | ')' | '.' => {
                chars.next();
                tokens.push((
                    pos,
                    match c {
                        '(' => Token::LParen,
                        ')' => Token::RParen,
                        _ => Token::Dot,
                    },
                ));
            }
            '"' | '\'' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, ch)) = chars.next() {
                    match ch {
                        '\\' => {
                            if let Some((_, escaped)) = chars.next() {
                                value.push(escaped);
                            }
                        }
                        ch if ch == c => {
                            closed = true;
                            break;
                        }
                        ch => value.push(ch),
                    }
                }
                if !closed {
                    return Err(filter_error(pos, "unterminated string"));
                }
                tokens.push((pos, Token::Str(value)));
            }
            '=' | '!' | '<' | '>' => {
                chars.next();
                let followed_by_eq = chars.next_if(|&(_, ch)| ch == '=').is_some();
                let op = match (c, followed_by_eq) {
                    ('=', true) => CompareOp::Eq,
                    ('!', true) => CompareOp::Ne,
                    ('<', false) => CompareOp::Lt,
                    ('<', true) => CompareOp::Le,
                    ('>', false) => CompareOp::Gt,
                    ('>', true) => CompareOp::Ge,
                    _ => return Err(filter_error(pos, format!("unexpected \"{}\", comparisons use == and !=", c))),
                };
                tokens.push((pos, Token::Op(op)));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut number = String::new();
                while let Some((_, ch)) = chars.next_if(|&(_, ch)| ch.is_ascii_digit() || ch == '.' || ch == '-') {
                    number.push(ch);
                }
                if number.parse::<f64>().is_err() {
                    return Err(filter_error(pos, format!("\"{}\" is not a number", number)));
                }
                tokens.push((pos, Token::Number(number)));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some((_, ch)) = chars.next_if(|&(_, ch)| ch.is_alphanumeric() || ch == '_') {
                    ident.push(ch);
                }
                tokens.push((pos, Token::Ident(ident)));
            }
            other => return Err(filter_error(pos, format!("unexpected character \"{}\"", other))),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|(_, t)| t)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(p, _)| *p)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        self.pos += 1;
        token
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(word)) if word == keyword)
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_and()?;
        while self.at_keyword("or") {
            self.next();
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_not()?;
        while self.at_keyword("and") {
            self.next();
            let rhs = self.parse_not()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr> {
        if self.at_keyword("not") {
            self.next();
            return Ok(Expr::Not(Box::new(self.parse_not()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::LParen) => {
                self.next();
                let expr = self.parse_or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(expr),
                    _ => Err(filter_error(self.position(), "expected \")\"")),
                }
            }
            Some(Token::Ident(word)) if word == "true" || word == "false" => {
                let value = word == "true";
                self.next();
                Ok(Expr::Const(value))
            }
            _ => {
                let lhs = self.parse_operand()?;
                match self.peek() {
                    Some(Token::Op(op)) => {
                        let op = *op;
                        self.next();
                        let rhs = self.parse_operand()?;
                        Ok(Expr::Compare(lhs, op, rhs))
                    }
                    Some(Token::Ident(word)) if word == "in" => {
                        self.next();
                        let haystack = self.parse_operand()?;
                        Ok(Expr::In {
                            needle: lhs,
                            haystack,
                            negated: false,
                        })
                    }
                    Some(Token::Ident(word)) if word == "not" && matches!(self.peek_at(1), Some(Token::Ident(w)) if w == "in") => {
                        self.next();
                        self.next();
                        let haystack = self.parse_operand()?;
                        Ok(Expr::In {
                            needle: lhs,
                            haystack,
                            negated: true,
                        })
                    }
                    _ => Ok(Expr::Truthy(lhs)),
                }
            }
        }
    }

    fn parse_operand(&mut self) -> Result<Operand> {
        let position = self.position();
        match self.next() {
            Some(Token::Ident(name)) if name == TASK_VARIABLE => {
                if self.peek() != Some(&Token::Dot) {
                    return Ok(Operand::Task);
                }
                self.next();
                match self.next() {
                    Some(Token::Ident(attribute)) => Ok(Operand::Attribute(attribute)),
                    _ => Err(filter_error(position, "expected an attribute name after \"t.\"")),
                }
            }
            Some(Token::Ident(word)) if KEYWORDS.contains(&word.as_str()) => {
                Err(filter_error(position, format!("unexpected keyword \"{}\"", word)))
            }
            Some(Token::Ident(word)) => Ok(Operand::Literal(word)),
            Some(Token::Str(value)) | Some(Token::Number(value)) => Ok(Operand::Literal(value)),
            Some(other) => Err(filter_error(position, format!("expected an attribute or a value, found {}", other))),
            None => Err(filter_error(position, "unexpected end of filter")),
        }
    }
}

/// A parsed filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    source: String,
    expr: Expr,
}

impl Filter {
    /// A filter that matches every task.
    pub fn always() -> Self {
        Filter {
            source: String::new(),
            expr: Expr::Const(true),
        }
    }

    pub fn parse(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Filter::always());
        }

        let mut parser = Parser {
            tokens: tokenize(source)?,
            pos: 0,
            end: source.len(),
        };
        let expr = parser.parse_or()?;
        if let Some(token) = parser.peek() {
            return Err(filter_error(parser.position(), format!("unexpected {}", token)));
        }

        Ok(Filter {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn matches(&self, task: &Task) -> bool {
        evaluate(&self.expr, task)
    }
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Filter::parse(s)
    }
}

fn evaluate(expr: &Expr, task: &Task) -> bool {
    match expr {
        Expr::Const(value) => *value,
        Expr::Truthy(Operand::Task) => true,
        Expr::Truthy(Operand::Attribute(key)) => task.get(key).is_truthy(),
        Expr::Truthy(Operand::Literal(value)) => !value.is_empty(),
        Expr::Compare(lhs, op, rhs) => compare(task, lhs, *op, rhs),
        Expr::In {
            needle,
            haystack,
            negated,
        } => match contains(task, needle, haystack) {
            Some(found) => found != *negated,
            None => false,
        },
        Expr::Not(inner) => !evaluate(inner, task),
        Expr::And(lhs, rhs) => evaluate(lhs, task) && evaluate(rhs, task),
        Expr::Or(lhs, rhs) => evaluate(lhs, task) || evaluate(rhs, task),
    }
}

fn rendered(task: &Task, key: &str) -> Option<String> {
    task.get(key).value().map(AttributeValue::to_string)
}

fn compare(task: &Task, lhs: &Operand, op: CompareOp, rhs: &Operand) -> bool {
    match (lhs, rhs) {
        (Operand::Attribute(key), Operand::Literal(value)) => task.get(key).compare(op, value),
        (Operand::Literal(value), Operand::Attribute(key)) => task.get(key).compare(op.flip(), value),
        (Operand::Attribute(left), Operand::Attribute(right)) => {
            rendered(task, right).is_some_and(|value| task.get(left).compare(op, &value))
        }
        (Operand::Literal(a), Operand::Literal(b)) => {
            let ordering = match (a.parse::<f64>(), b.parse::<f64>()) {
                (Ok(x), Ok(y)) => x.partial_cmp(&y),
                _ => Some(a.cmp(b)),
            };
            ordering.is_some_and(|o| op.holds(o))
        }
        _ => false,
    }
}

/// `None` when the haystack is a missing attribute, so `not in` stays false too.
fn contains(task: &Task, needle: &Operand, haystack: &Operand) -> Option<bool> {
    let needle = match needle {
        Operand::Literal(value) => value.clone(),
        Operand::Attribute(key) => rendered(task, key)?,
        Operand::Task => return Some(false),
    };

    match haystack {
        Operand::Task => Some(task.attributes.contains_key(&needle)),
        Operand::Attribute(key) => {
            let lookup = task.get(key);
            if lookup.is_incomparable() {
                return None;
            }
            Some(lookup.contains(&needle))
        }
        Operand::Literal(list) => Some(list.split(',').map(str::trim).any(|item| item == needle)),
    }
}

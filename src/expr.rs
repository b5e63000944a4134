//! Capability expressions.
//!
//! An expression combines capability names with `&` (and), `|` (or), `!`
//! (not) and parentheses, e.g. `"(LEAD_VIEW|LEAD_EDIT)&!COMPANY_SUBSCRIPTION_TRIAL"`.
//! Whitespace is ignored. `&&` and `||` are accepted as spellings of `&` and
//! `|`. Precedence is `!`, then `&`, then `|`.
//!
//! Evaluation asks the ability about each distinct operand exactly once and
//! then walks the parsed tree over those answers. Nothing is ever executed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::ability::{Can, READ};
use crate::error::{AclError, Result};
use crate::registry::is_capability_name;

pub const DEFAULT_ACTION: &str = READ;
pub const DEFAULT_SUBJECT: &str = "all";

/// Maximum nesting of `(` and `!`
pub const MAX_NESTING: usize = 64;

/// Longest accepted expression, in bytes
pub const MAX_EXPRESSION_LEN: usize = 1 << 20;

/// Action/subject pair attached to a route or UI element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclObject {
    pub action: String,
    pub subject: String,
}

impl AclObject {
    pub fn new(action: impl Into<String>, subject: impl Into<String>) -> Self {
        AclObject { action: action.into(), subject: subject.into() }
    }
}

impl Default for AclObject {
    fn default() -> Self {
        AclObject::new(DEFAULT_ACTION, DEFAULT_SUBJECT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tok {
    Ident(usize),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

/// Parsed boolean tree. `Operand` indexes [`Expression::operands`].
///
/// Chains of the same operator are one flat node, so tree depth is bounded
/// by [`MAX_NESTING`] however long the expression is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Operand(usize),
    Not(Box<Node>),
    And(Vec<Node>),
    Or(Vec<Node>),
}

impl Node {
    fn eval(&self, values: &[bool]) -> bool {
        match self {
            Node::Operand(i) => values[*i],
            Node::Not(n) => !n.eval(values),
            Node::And(terms) => terms.iter().all(|t| t.eval(values)),
            Node::Or(terms) => terms.iter().any(|t| t.eval(values)),
        }
    }
}

/// A parsed capability expression, reusable across evaluations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    source: String,
    operands: Vec<String>,
    root: Node,
}

impl Expression {
    /// Parse `expr`; empty (after removing whitespace) means `read`
    pub fn parse(expr: &str) -> Result<Self> {
        Self::parse_with_default(expr, DEFAULT_ACTION)
    }

    /// Parse `expr`, substituting `default_action` when it is empty
    pub fn parse_with_default(expr: &str, default_action: &str) -> Result<Self> {
        if expr.len() > MAX_EXPRESSION_LEN {
            return Err(invalid(expr, MAX_EXPRESSION_LEN, format!("longer than {MAX_EXPRESSION_LEN} bytes")));
        }
        let mut text = String::with_capacity(expr.len());
        let mut offsets = Vec::with_capacity(expr.len());
        for (at, c) in expr.char_indices().filter(|(_, c)| !c.is_whitespace()) {
            text.push(c);
            offsets.extend(at..at + c.len_utf8());
        }
        if text.is_empty() {
            text.push_str(default_action);
        }
        let src = Source { text: expr, offsets: &offsets };
        let (toks, operands) = tokenize(&src, &text)?;
        let root = Parser { src: &src, end: text.len(), toks: &toks, pos: 0, depth: 0 }.parse()?;
        Ok(Expression { source: expr.to_string(), operands, root })
    }

    /// Distinct operand names in first-seen order
    pub fn operands(&self) -> &[String] {
        &self.operands
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Evaluate against `ability`; each operand is checked once
    pub fn eval(&self, ability: &dyn Can, subject: &str) -> bool {
        let values: Vec<bool> = self.operands.iter().map(|o| ability.can(o, subject)).collect();
        self.root.eval(&values)
    }
}

fn invalid(expr: &str, position: usize, reason: impl Into<String>) -> AclError {
    AclError::InvalidExpression {
        expression: expr.to_string(),
        position,
        reason: reason.into(),
    }
}

/// The caller's text and, for each byte of the whitespace-free text, its
/// offset in the caller's text
struct Source<'a> {
    text: &'a str,
    offsets: &'a [usize],
}

impl Source<'_> {
    /// Error at byte `at` of the whitespace-free text
    fn err(&self, at: usize, reason: impl Into<String>) -> AclError {
        let position = self.offsets.get(at).copied().unwrap_or_else(|| self.text.trim_end().len());
        invalid(self.text, position, reason)
    }
}

fn is_op(c: char) -> bool {
    matches!(c, '&' | '|' | '!' | '(' | ')')
}

/// Positions are byte offsets into the whitespace-free text
fn tokenize(src: &Source<'_>, text: &str) -> Result<(Vec<(Tok, usize)>, Vec<String>)> {
    let mut toks = Vec::new();
    let mut operands: Vec<String> = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < text.len() {
        let start = i;
        let tok = match bytes[i] {
            b'&' => {
                if bytes.get(i + 1) == Some(&b'&') { i += 1; }
                Tok::And
            }
            b'|' => {
                if bytes.get(i + 1) == Some(&b'|') { i += 1; }
                Tok::Or
            }
            b'!' => Tok::Not,
            b'(' => Tok::LParen,
            b')' => Tok::RParen,
            _ => {
                let end = text[start..].find(is_op).map_or(text.len(), |n| start + n);
                let name = &text[start..end];
                if !is_capability_name(name) {
                    return Err(src.err(start, format!("invalid operand {name:?}")));
                }
                let idx = *seen.entry(name).or_insert_with(|| {
                    operands.push(name.to_string());
                    operands.len() - 1
                });
                toks.push((Tok::Ident(idx), start));
                i = end;
                continue;
            }
        };
        toks.push((tok, start));
        i += 1;
    }
    Ok((toks, operands))
}

struct Parser<'a> {
    src: &'a Source<'a>,
    /// Length of the whitespace-free text
    end: usize,
    toks: &'a [(Tok, usize)],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn parse(mut self) -> Result<Node> {
        let node = self.or()?;
        match self.toks.get(self.pos) {
            None => Ok(node),
            Some((Tok::RParen, at)) => Err(self.src.err(*at, "unmatched ')'")),
            Some((_, at)) => Err(self.src.err(*at, "expected operator")),
        }
    }

    fn peek(&self) -> Option<Tok> {
        self.toks.get(self.pos).map(|(t, _)| *t)
    }

    fn at(&self) -> usize {
        match self.toks.get(self.pos) {
            Some((_, p)) => *p,
            None => self.end,
        }
    }

    fn or(&mut self) -> Result<Node> {
        let mut terms = vec![self.and()?];
        while self.peek() == Some(Tok::Or) {
            self.pos += 1;
            terms.push(self.and()?);
        }
        Ok(if terms.len() == 1 { terms.swap_remove(0) } else { Node::Or(terms) })
    }

    fn and(&mut self) -> Result<Node> {
        let mut terms = vec![self.unary()?];
        while self.peek() == Some(Tok::And) {
            self.pos += 1;
            terms.push(self.unary()?);
        }
        Ok(if terms.len() == 1 { terms.swap_remove(0) } else { Node::And(terms) })
    }

    fn nest(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.src.err(self.at(), "nesting too deep"));
        }
        Ok(())
    }

    fn unary(&mut self) -> Result<Node> {
        if self.peek() == Some(Tok::Not) {
            self.pos += 1;
            self.nest()?;
            let inner = self.unary()?;
            self.depth -= 1;
            return Ok(Node::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Node> {
        let at = self.at();
        match self.peek() {
            Some(Tok::Ident(i)) => {
                self.pos += 1;
                Ok(Node::Operand(i))
            }
            Some(Tok::LParen) => {
                self.pos += 1;
                self.nest()?;
                let inner = self.or()?;
                if self.peek() != Some(Tok::RParen) {
                    return Err(self.src.err(self.at(), "unclosed '('"));
                }
                self.pos += 1;
                self.depth -= 1;
                Ok(inner)
            }
            Some(Tok::RParen) => Err(self.src.err(at, "missing operand before ')'")),
            Some(Tok::And) | Some(Tok::Or) => Err(self.src.err(at, "missing operand before operator")),
            Some(Tok::Not) => Err(self.src.err(at, "unexpected '!'")),
            None => Err(self.src.err(at, "missing operand at end of expression")),
        }
    }
}

fn subject_or_default(subject: Option<&str>) -> &str {
    match subject {
        Some(s) if !s.is_empty() => s,
        _ => DEFAULT_SUBJECT,
    }
}

/// Evaluate `expression` and report why a check could not be made.
///
/// A missing expression means `read`, a missing subject means `all`.
pub fn try_evaluate(expression: Option<&str>, ability: Option<&dyn Can>, subject: Option<&str>) -> Result<bool> {
    let expr = Expression::parse(expression.unwrap_or(""))?;
    let ability = ability.ok_or(AclError::MissingAbility)?;
    let subject = subject_or_default(subject);
    let allowed = expr.eval(ability, subject);
    trace!(expression = expr.source(), subject, allowed, "evaluated capability expression");
    Ok(allowed)
}

/// Evaluate `expression`, denying on any error.
pub fn evaluate(expression: Option<&str>, ability: Option<&dyn Can>, subject: Option<&str>) -> bool {
    deny_on_error(try_evaluate(expression, ability, subject))
}

pub(crate) fn deny_on_error(r: Result<bool>) -> bool {
    match r {
        Ok(allowed) => allowed,
        Err(AclError::MissingAbility) => false,
        Err(e) => {
            warn!(error = %e, "denying malformed capability expression");
            false
        }
    }
}

/// Evaluate an [`AclObject`] against an ability
pub fn can_access(acl: &AclObject, ability: Option<&dyn Can>) -> bool {
    evaluate(Some(acl.action.as_str()), ability, Some(acl.subject.as_str()))
}

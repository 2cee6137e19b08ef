//! Inference rules.
//!
//! A rule is written `head:premise;premise;...` where every statement is a
//! verb applied to terms, e.g.
//!
//! ```text
//! inside(p,b):Box(b);Position(p);isGe(p,b/min);isGe(b/max,p)
//! ```
//!
//! Terms are either numeric literals or variables with an optional property
//! path (`b/min`, `p/fragment/state`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Term {
    Number(f64),
    Var { name: String, path: Vec<String> },
}

impl Term {
    fn parse(rule: &str, text: &str) -> Result<Self> {
        if let Ok(n) = text.parse::<f64>() {
            return Ok(Term::Number(n));
        }
        let mut parts = text.split('/');
        let name = parts.next().unwrap_or_default();
        let path: Vec<String> = parts.map(str::to_owned).collect();
        for part in std::iter::once(name).chain(path.iter().map(String::as_str)) {
            if !is_identifier(part) {
                return Err(syntax(rule, format!("invalid term '{text}'")));
            }
        }
        Ok(Term::Var { name: name.to_owned(), path })
    }

    pub fn var(&self) -> Option<&str> {
        match self {
            Term::Var { name, .. } => Some(name),
            Term::Number(_) => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Number(n) => write!(f, "{n}"),
            Term::Var { name, path } => {
                write!(f, "{name}")?;
                for p in path {
                    write!(f, "/{p}")?;
                }
                Ok(())
            }
        }
    }
}

/// `verb(term, term, ...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub verb: String,
    pub terms: Vec<Term>,
}

impl Statement {
    pub fn parse(rule: &str, text: &str) -> Result<Self> {
        let text = text.trim();
        let (verb, rest) = text
            .split_once('(')
            .ok_or_else(|| syntax(rule, format!("statement '{text}' lacks '('")))?;
        let args = rest
            .strip_suffix(')')
            .ok_or_else(|| syntax(rule, format!("statement '{text}' lacks closing ')'")))?;
        let verb = verb.trim();
        if !is_identifier(verb) {
            return Err(syntax(rule, format!("invalid verb '{verb}'")));
        }
        if args.trim().is_empty() {
            return Err(syntax(rule, format!("statement '{text}' has no terms")));
        }
        let terms = args
            .split(',')
            .map(|t| Term::parse(rule, t.trim()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { verb: verb.to_owned(), terms })
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.verb)?;
        for (i, t) in self.terms.iter().enumerate() {
            if i > 0 { write!(f, ",")?; }
            write!(f, "{t}")?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: u64,
    /// Source text as given.
    pub statement: String,
    pub head: Statement,
    pub body: Vec<Statement>,
    /// Concept the rule is attached to.
    pub concept: String,
}

impl Rule {
    pub fn parse(id: u64, statement: &str, concept: impl Into<String>) -> Result<Self> {
        let (head, body) = statement
            .split_once(':')
            .ok_or_else(|| syntax(statement, "missing ':' between head and premises".into()))?;
        let head = Statement::parse(statement, head)?;
        let body = body
            .split(';')
            .filter(|s| !s.trim().is_empty())
            .map(|s| Statement::parse(statement, s))
            .collect::<Result<Vec<_>>>()?;
        if body.is_empty() {
            return Err(syntax(statement, "rule has no premises".into()));
        }
        Ok(Self { id, statement: statement.to_owned(), head, body, concept: concept.into() })
    }

    /// Distinct variable names in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut vars: Vec<&str> = Vec::new();
        for s in std::iter::once(&self.head).chain(&self.body) {
            for v in s.terms.iter().filter_map(Term::var) {
                if !vars.contains(&v) {
                    vars.push(v);
                }
            }
        }
        vars
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.head)?;
        for (i, s) in self.body.iter().enumerate() {
            if i > 0 { write!(f, ";")?; }
            write!(f, "{s}")?;
        }
        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn syntax(rule: &str, message: String) -> Error {
    Error::RuleSyntax { rule: rule.to_owned(), message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_box_rule() {
        let r = Rule::parse(0, "inside(p,b):Box(b);Position(p);isGe(p,b/min);isGe(b/max,p)", "Box").unwrap();
        assert_eq!(r.head.verb, "inside");
        assert_eq!(r.body.len(), 4);
        assert_eq!(
            r.body[2].terms[1],
            Term::Var { name: "b".into(), path: vec!["min".into()] }
        );
        assert_eq!(r.variables(), vec!["p", "b"]);
    }

    #[test]
    fn test_numeric_terms() {
        let r = Rule::parse(1, "is(p/state,1):Process(p);is_not(p/state,1)", "Process").unwrap();
        assert_eq!(r.head.terms[1], Term::Number(1.0));
        assert_eq!(r.to_string(), "is(p/state,1):Process(p);is_not(p/state,1)");
    }

    #[test]
    fn test_whitespace_is_tolerated() {
        let r = Rule::parse(2, "a(x) : B(x) ; C( x )", "B").unwrap();
        assert_eq!(r.to_string(), "a(x):B(x);C(x)");
    }

    #[test]
    fn test_malformed_rules() {
        for bad in ["noseparator(x)", "a(x):", "a(x):B(x", "a():B(x)", "a(x):B(x/)", "(x):B(x)"] {
            assert!(
                matches!(Rule::parse(0, bad, "X"), Err(Error::RuleSyntax { .. })),
                "accepted {bad}"
            );
        }
    }
}

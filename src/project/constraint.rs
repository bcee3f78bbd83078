//! Build constraints: `//go:build` expressions and legacy `// +build` lines.

use smol_str::SmolStr;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid build constraint: {message}")]
pub struct ConstraintError {
    pub message: String,
}

impl ConstraintError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A parsed build constraint expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constraint {
    Tag(SmolStr),
    Not(Box<Constraint>),
    And(Box<Constraint>, Box<Constraint>),
    Or(Box<Constraint>, Box<Constraint>),
}

impl Constraint {
    /// Evaluate with `has_tag` deciding whether a single tag is satisfied.
    pub fn eval(&self, has_tag: &impl Fn(&str) -> bool) -> bool {
        match self {
            Constraint::Tag(tag) => has_tag(tag),
            Constraint::Not(inner) => !inner.eval(has_tag),
            Constraint::And(lhs, rhs) => lhs.eval(has_tag) && rhs.eval(has_tag),
            Constraint::Or(lhs, rhs) => lhs.eval(has_tag) || rhs.eval(has_tag),
        }
    }

    /// Parse the expression of a `//go:build` line.
    pub fn parse(expr: &str) -> Result<Self, ConstraintError> {
        let tokens = lex(expr)?;
        let mut parser = ExprParser { tokens, pos: 0 };
        let constraint = parser.or()?;
        if parser.pos != parser.tokens.len() {
            return Err(ConstraintError::new(format!("unexpected token in {expr:?}")));
        }
        Ok(constraint)
    }

    /// Parse the arguments of one `// +build` line.
    ///
    /// Space-separated options are OR'ed, comma-separated terms AND'ed and a
    /// leading `!` negates a term.
    pub fn parse_plus_build(args: &str) -> Result<Self, ConstraintError> {
        let mut line: Option<Constraint> = None;
        for option in args.split_whitespace() {
            let mut clause: Option<Constraint> = None;
            for term in option.split(',') {
                let (negated, tag) = match term.strip_prefix('!') {
                    Some(tag) => (true, tag),
                    None => (false, term),
                };
                if !is_valid_tag(tag) || tag.starts_with('!') {
                    return Err(ConstraintError::new(format!("invalid tag {term:?}")));
                }
                let mut atom = Constraint::Tag(tag.into());
                if negated {
                    atom = Constraint::Not(Box::new(atom));
                }
                clause = Some(and(clause, atom));
            }
            if let Some(clause) = clause {
                line = Some(or(line, clause));
            }
        }
        line.ok_or_else(|| ConstraintError::new("empty +build line"))
    }
}

fn and(lhs: Option<Constraint>, rhs: Constraint) -> Constraint {
    match lhs {
        Some(lhs) => Constraint::And(Box::new(lhs), Box::new(rhs)),
        None => rhs,
    }
}

fn or(lhs: Option<Constraint>, rhs: Constraint) -> Constraint {
    match lhs {
        Some(lhs) => Constraint::Or(Box::new(lhs), Box::new(rhs)),
        None => rhs,
    }
}

fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

/// Extract the constraint that governs a Go file.
///
/// Only the file header counts: the leading run of blank lines and `//`
/// comments before the package clause. A `//go:build` line takes
/// precedence; otherwise every `// +build` line followed by a blank line is
/// AND'ed together. Returns `None` for an unconstrained file.
pub fn file_constraint(text: &str) -> Result<Option<Constraint>, ConstraintError> {
    let mut go_build: Option<Constraint> = None;
    let mut plus_build: Option<Constraint> = None;
    let mut pending: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            for args in pending.drain(..) {
                plus_build = Some(and(plus_build, Constraint::parse_plus_build(args)?));
            }
            continue;
        }
        let Some(comment) = line.strip_prefix("//") else {
            break;
        };
        if let Some(expr) = comment.strip_prefix("go:build") {
            if !expr.is_empty() && !expr.starts_with(char::is_whitespace) {
                continue;
            }
            if go_build.is_some() {
                return Err(ConstraintError::new("multiple //go:build lines"));
            }
            go_build = Some(Constraint::parse(expr.trim())?);
        } else if let Some(args) = comment.trim_start().strip_prefix("+build") {
            if args.is_empty() || args.starts_with(char::is_whitespace) {
                pending.push(args);
            }
        }
    }

    Ok(go_build.or(plus_build))
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ExprToken {
    LParen,
    RParen,
    Not,
    And,
    Or,
    Tag(SmolStr),
}

fn lex(expr: &str) -> Result<Vec<ExprToken>, ConstraintError> {
    let mut tokens = Vec::new();
    let mut rest = expr;
    while let Some(c) = rest.chars().next() {
        if c.is_whitespace() {
            rest = &rest[c.len_utf8()..];
            continue;
        }
        let (token, len) = match c {
            '(' => (ExprToken::LParen, 1),
            ')' => (ExprToken::RParen, 1),
            '!' => (ExprToken::Not, 1),
            '&' if rest.starts_with("&&") => (ExprToken::And, 2),
            '|' if rest.starts_with("||") => (ExprToken::Or, 2),
            _ => {
                let len = rest
                    .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
                    .unwrap_or(rest.len());
                if len == 0 {
                    return Err(ConstraintError::new(format!("unexpected {c:?} in {expr:?}")));
                }
                (ExprToken::Tag(SmolStr::new(&rest[..len])), len)
            }
        };
        tokens.push(token);
        rest = &rest[len..];
    }
    Ok(tokens)
}

/// `or  := and ("||" and)*`, `and := not ("&&" not)*`, `not := "!" not | atom`.
struct ExprParser {
    tokens: Vec<ExprToken>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&ExprToken> {
        self.tokens.get(self.pos)
    }

    fn or(&mut self) -> Result<Constraint, ConstraintError> {
        let mut lhs = self.and()?;
        while self.peek() == Some(&ExprToken::Or) {
            self.pos += 1;
            lhs = Constraint::Or(Box::new(lhs), Box::new(self.and()?));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Constraint, ConstraintError> {
        let mut lhs = self.not()?;
        while self.peek() == Some(&ExprToken::And) {
            self.pos += 1;
            lhs = Constraint::And(Box::new(lhs), Box::new(self.not()?));
        }
        Ok(lhs)
    }

    fn not(&mut self) -> Result<Constraint, ConstraintError> {
        if self.peek() == Some(&ExprToken::Not) {
            self.pos += 1;
            return Ok(Constraint::Not(Box::new(self.not()?)));
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Constraint, ConstraintError> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        match token {
            Some(ExprToken::Tag(tag)) => Ok(Constraint::Tag(tag)),
            Some(ExprToken::LParen) => {
                let inner = self.or()?;
                if self.peek() != Some(&ExprToken::RParen) {
                    return Err(ConstraintError::new("missing )"));
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(other) => Err(ConstraintError::new(format!("unexpected {other:?}"))),
            None => Err(ConstraintError::new("unexpected end of expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tags(set: &'static [&'static str]) -> impl Fn(&str) -> bool {
        move |tag: &str| set.contains(&tag)
    }

    #[rstest]
    #[case("linux", true)]
    #[case("windows", false)]
    #[case("linux && amd64", true)]
    #[case("linux && !cgo", true)]
    #[case("darwin || (linux && amd64)", true)]
    #[case("!(linux || darwin)", false)]
    #[case("go1.18 && !purego", true)]
    fn test_go_build_eval(#[case] expr: &str, #[case] expected: bool) {
        let constraint = Constraint::parse(expr).unwrap();
        assert_eq!(constraint.eval(&tags(&["linux", "amd64", "go1.18"])), expected);
    }

    #[rstest]
    #[case("linux &&")]
    #[case("(linux")]
    #[case("linux & amd64")]
    #[case("")]
    fn test_go_build_malformed(#[case] expr: &str) {
        assert!(Constraint::parse(expr).is_err());
    }

    #[test]
    fn test_plus_build_line() {
        let constraint = Constraint::parse_plus_build(" linux,386 darwin,!cgo").unwrap();

        assert!(constraint.eval(&tags(&["linux", "386"])));
        assert!(constraint.eval(&tags(&["darwin"])));
        assert!(!constraint.eval(&tags(&["darwin", "cgo"])));
        assert!(!constraint.eval(&tags(&["linux"])));
    }

    #[test]
    fn test_file_constraint_prefers_go_build() {
        let text = "//go:build windows\n// +build linux\n\npackage p\n";
        let constraint = file_constraint(text).unwrap().unwrap();

        assert!(constraint.eval(&tags(&["windows"])));
        assert!(!constraint.eval(&tags(&["linux"])));
    }

    #[test]
    fn test_plus_build_needs_blank_line() {
        assert!(file_constraint("// +build ignore\npackage p\n").unwrap().is_none());
        assert!(file_constraint("// +build ignore\n\npackage p\n").unwrap().is_some());
    }

    #[test]
    fn test_constraint_after_package_clause_is_ignored() {
        let text = "package p\n\n//go:build ignore\n";
        assert!(file_constraint(text).unwrap().is_none());
    }
}

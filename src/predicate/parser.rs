//! Parser for the textual predicate language.
//!
//! ```text
//! expr     := [ ident "=>" ] or
//! or       := and ( "||" and )*
//! and      := cmp ( "&&" cmp )*
//! cmp      := primary ( ("==" | "!=" | ">" | ">=" | "<" | "<=") primary )?
//! primary  := "(" or ")" | member | literal
//! member   := ident ( "." ident )*
//! literal  := number | 'string' | "string" | true | false | null | dt'<rfc3339>'
//! ```
//!
//! With a lambda parameter (`o => o.IsActive == true`) member paths starting
//! with the parameter name have it stripped.

use std::iter::Peekable;
use std::str::CharIndices;

use chrono::{DateTime, Utc};

use crate::error::CompileError;
use crate::filter::FilterValue;
use crate::predicate::expr::{CompareOp, Expr};

/// Parse a textual predicate into an expression tree.
pub fn parse_predicate(input: &str) -> Result<Expr, CompileError> {
    let mut parser = PredicateParser::new(input);
    parser.parse()
}

/// Internal parser over the predicate text.
struct PredicateParser<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    parameter: Option<String>,
}

impl<'a> PredicateParser<'a> {
    fn new(input: &'a str) -> Self {
        PredicateParser {
            input,
            chars: input.char_indices().peekable(),
            parameter: None,
        }
    }

    fn parse(&mut self) -> Result<Expr, CompileError> {
        self.parse_parameter();
        let expr = self.parse_or()?;
        self.skip_whitespace();
        match self.chars.peek() {
            None => Ok(expr),
            Some(&(pos, c)) => Err(CompileError::syntax(pos, format!("unexpected '{c}'"))),
        }
    }

    /// Consume a leading `ident =>` if present.
    fn parse_parameter(&mut self) {
        let rest = self.input.trim_start();
        let ident_len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if ident_len == 0 {
            return;
        }
        let (ident, after) = rest.split_at(ident_len);
        if !after.trim_start().starts_with("=>") {
            return;
        }

        let offset = self.input.len() - after.trim_start().len() + 2;
        while self.chars.peek().is_some_and(|&(pos, _)| pos < offset) {
            self.chars.next();
        }
        self.parameter = Some(ident.to_string());
    }

    fn position(&mut self) -> usize {
        self.chars.peek().map(|&(pos, _)| pos).unwrap_or(self.input.len())
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|(_, c)| c.is_whitespace()) {
            self.chars.next();
        }
    }

    /// Consume `token` if the remaining input starts with it.
    fn eat(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        let pos = self.position();
        if self.input[pos..].starts_with(token) {
            for _ in token.chars() {
                self.chars.next();
            }
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_and()?;
        while self.eat("||") {
            let right = self.parse_and()?;
            left = left.or(right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_comparison()?;
        while self.eat("&&") {
            let right = self.parse_comparison()?;
            left = left.and(right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, CompileError> {
        let left = self.parse_primary()?;

        // Two-character operators first so `>=` is not read as `>`.
        let op = [
            ("==", CompareOp::Eq),
            ("!=", CompareOp::Ne),
            (">=", CompareOp::Ge),
            ("<=", CompareOp::Le),
            (">", CompareOp::Gt),
            ("<", CompareOp::Lt),
        ]
        .into_iter()
        .find(|(token, _)| self.eat(token))
        .map(|(_, op)| op);

        match op {
            Some(op) => {
                let right = self.parse_primary()?;
                Ok(Expr::Compare {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            None => Ok(left),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, CompileError> {
        self.skip_whitespace();
        let Some(&(pos, c)) = self.chars.peek() else {
            return Err(CompileError::syntax(self.input.len(), "unexpected end of input"));
        };

        match c {
            '(' => {
                self.chars.next();
                let expr = self.parse_or()?;
                if !self.eat(")") {
                    let pos = self.position();
                    return Err(CompileError::syntax(pos, "expected ')'"));
                }
                Ok(expr)
            }
            '\'' | '"' => Ok(Expr::Constant(FilterValue::String(self.parse_quoted()?))),
            '-' | '0'..='9' => self.parse_number(),
            c if c.is_alphabetic() || c == '_' => self.parse_word(),
            c => Err(CompileError::syntax(pos, format!("unexpected '{c}'"))),
        }
    }

    fn parse_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                ident.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        ident
    }

    /// Keywords, date literals and member paths.
    fn parse_word(&mut self) -> Result<Expr, CompileError> {
        let start = self.position();
        let ident = self.parse_identifier();

        match ident.as_str() {
            "true" => return Ok(Expr::Constant(FilterValue::Bool(true))),
            "false" => return Ok(Expr::Constant(FilterValue::Bool(false))),
            "null" => return Ok(Expr::Constant(FilterValue::Null)),
            "dt" if matches!(self.chars.peek(), Some((_, '\'' | '"'))) => {
                let text = self.parse_quoted()?;
                let dt = DateTime::parse_from_rfc3339(&text).map_err(|e| {
                    CompileError::syntax(start, format!("invalid date-time '{text}': {e}"))
                })?;
                return Ok(Expr::Constant(FilterValue::DateTime(dt.with_timezone(&Utc))));
            }
            _ => {}
        }

        let mut segments = vec![ident];
        while matches!(self.chars.peek(), Some((_, '.'))) {
            self.chars.next();
            let pos = self.position();
            let segment = self.parse_identifier();
            if segment.is_empty() {
                return Err(CompileError::syntax(pos, "expected a member name after '.'"));
            }
            segments.push(segment);
        }

        if segments.len() > 1 && self.parameter.as_deref() == Some(segments[0].as_str()) {
            segments.remove(0);
        }

        Ok(Expr::Member(segments.join(".")))
    }

    /// A quoted string; the opening quote decides the closing one and `\` escapes.
    fn parse_quoted(&mut self) -> Result<String, CompileError> {
        let Some((start, quote)) = self.chars.next() else {
            return Err(CompileError::syntax(self.input.len(), "expected a string"));
        };

        let mut text = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => return Ok(text),
                Some((pos, '\\')) => match self.chars.next() {
                    Some((_, escaped)) => text.push(escaped),
                    None => return Err(CompileError::syntax(pos, "unterminated escape")),
                },
                Some((_, c)) => text.push(c),
                None => return Err(CompileError::syntax(start, "unterminated string")),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Expr, CompileError> {
        let start = self.position();
        let mut text = String::new();

        if let Some(&(_, '-')) = self.chars.peek() {
            text.push('-');
            self.chars.next();
        }
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                text.push(c);
                self.chars.next();
            } else {
                break;
            }
        }

        let value = if text.contains('.') {
            text.parse().map(FilterValue::Double).ok()
        } else {
            text.parse().map(FilterValue::Int).ok()
        };

        value
            .map(Expr::Constant)
            .ok_or_else(|| CompileError::syntax(start, format!("invalid number '{text}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterLogic;

    fn comparison(expr: &Expr) -> (&str, CompareOp, &FilterValue) {
        match expr {
            Expr::Compare { op, left, right } => match (left.as_ref(), right.as_ref()) {
                (Expr::Member(path), Expr::Constant(value)) => (path.as_str(), *op, value),
                other => panic!("unexpected operands {other:?}"),
            },
            other => panic!("expected comparison, found {other:?}"),
        }
    }

    #[test]
    fn test_simple_comparison() {
        let expr = parse_predicate("IsActive == true").unwrap();
        assert_eq!(comparison(&expr), ("IsActive", CompareOp::Eq, &FilterValue::Bool(true)));

        let expr = parse_predicate("Price>=10.5").unwrap();
        assert_eq!(comparison(&expr), ("Price", CompareOp::Ge, &FilterValue::Double(10.5)));

        let expr = parse_predicate("Count < -3").unwrap();
        assert_eq!(comparison(&expr), ("Count", CompareOp::Lt, &FilterValue::Int(-3)));
    }

    #[test]
    fn test_literals() {
        let expr = parse_predicate(r#"Name != 'O\'Brien'"#).unwrap();
        assert_eq!(comparison(&expr).2, &FilterValue::from("O'Brien"));

        let expr = parse_predicate(r#"Name == "a b""#).unwrap();
        assert_eq!(comparison(&expr).2, &FilterValue::from("a b"));

        let expr = parse_predicate("Deleted == null").unwrap();
        assert_eq!(comparison(&expr).2, &FilterValue::Null);

        let expr = parse_predicate("Created > dt'2020-01-02T03:04:05Z'").unwrap();
        assert!(matches!(comparison(&expr).2, FilterValue::DateTime(_)));
    }

    #[test]
    fn test_precedence_and_grouping() {
        let expr = parse_predicate("A == 1 || B == 2 && C == 3").unwrap();
        match expr {
            Expr::Logical { logic, right, .. } => {
                assert_eq!(logic, FilterLogic::Or);
                assert!(matches!(*right, Expr::Logical { logic: FilterLogic::And, .. }));
            }
            other => panic!("unexpected {other:?}"),
        }

        let expr = parse_predicate("(A == 1 || B == 2) && C == 3").unwrap();
        match expr {
            Expr::Logical { logic, left, .. } => {
                assert_eq!(logic, FilterLogic::And);
                assert!(matches!(*left, Expr::Logical { logic: FilterLogic::Or, .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_lambda_parameter_and_paths() {
        let expr = parse_predicate("o => o.Items.Count > 2").unwrap();
        assert_eq!(comparison(&expr).0, "Items.Count");

        let expr = parse_predicate("Items.Count > 2").unwrap();
        assert_eq!(comparison(&expr).0, "Items.Count");
    }

    #[test]
    fn test_syntax_errors() {
        let err = parse_predicate("A == ").unwrap_err();
        assert!(matches!(err, CompileError::Syntax { position: 5, .. }));

        let err = parse_predicate("(A == 1").unwrap_err();
        assert!(matches!(err, CompileError::Syntax { .. }));

        let err = parse_predicate("A == 'open").unwrap_err();
        assert!(matches!(err, CompileError::Syntax { position: 5, .. }));

        let err = parse_predicate("A == 1 B").unwrap_err();
        assert!(matches!(err, CompileError::Syntax { position: 7, .. }));

        assert!(parse_predicate("A. == 1").is_err());
        assert!(parse_predicate("A == dt'yesterday'").is_err());
        assert!(parse_predicate("A == 1.2.3").is_err());
        assert!(parse_predicate("A == #").is_err());
    }
}

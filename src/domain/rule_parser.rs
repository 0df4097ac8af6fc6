//! Rule text parser.
//!
//! Recursive descent parser for the rule grammar:
//!
//! ```text
//! rule      := AND(rule, ...) | OR(rule, ...) | condition
//! condition := operand op operand
//! op        := < | > | <= | >=
//! operand   := number | bar field | indicator column name
//! ```
//!
//! Converts text to AST with error messages carrying the character offset and
//! the expected/found tokens.

use crate::domain::error::ParseError;
use crate::domain::ohlcv::BarField;
use crate::domain::rule::{Comparison, Operand, Rule};

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error(&self, message: String) -> ParseError {
        ParseError {
            message,
            position: self.pos,
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(self.error(format!("expected '{}', found '{}'", expected, ch))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    /// A combinator keyword is only recognised when an opening paren follows.
    fn peek_combinator(&self, keyword: &str) -> bool {
        self.remaining()
            .strip_prefix(keyword)
            .is_some_and(|rest| rest.trim_start().starts_with('('))
    }

    fn peek_word(&self) -> String {
        let word: String = self
            .remaining()
            .chars()
            .take_while(|ch| is_ident_char(*ch))
            .collect();
        if word.is_empty() {
            self.peek()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "end of input".to_string())
        } else {
            word
        }
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        if self.peek() == Some('-') {
            self.advance();
        }

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(ParseError {
                message: "expected number".to_string(),
                position: start,
            });
        }

        let num_str = &self.input[start..self.pos];
        num_str.parse::<f64>().map_err(|_| ParseError {
            message: format!("invalid number: {}", num_str),
            position: start,
        })
    }

    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        self.skip_whitespace();

        if self
            .peek()
            .is_some_and(|ch| ch.is_ascii_digit() || ch == '-' || ch == '.')
        {
            let num = self.parse_number()?;
            return Ok(Operand::Constant(num));
        }

        let word = self.peek_word();
        if !word.starts_with(is_ident_start) {
            return Err(self.error(format!("expected operand, found '{}'", word)));
        }
        self.pos += word.len();

        Ok(match word.parse::<BarField>() {
            Ok(field) => Operand::Field(field),
            Err(()) => Operand::Indicator(word),
        })
    }

    fn parse_comparison(&mut self) -> Result<Comparison, ParseError> {
        self.skip_whitespace();
        let rest = self.remaining();
        let (op, len) = if rest.starts_with("<=") {
            (Comparison::Le, 2)
        } else if rest.starts_with(">=") {
            (Comparison::Ge, 2)
        } else if rest.starts_with('<') {
            (Comparison::Lt, 1)
        } else if rest.starts_with('>') {
            (Comparison::Gt, 1)
        } else {
            let found = self.peek_word();
            return Err(self.error(format!(
                "expected comparison operator (<, >, <=, >=), found '{}'",
                found
            )));
        };
        self.pos += len;
        Ok(op)
    }

    fn parse_condition(&mut self) -> Result<Rule, ParseError> {
        let left = self.parse_operand()?;
        let op = self.parse_comparison()?;
        let right = self.parse_operand()?;
        Ok(Rule::cmp(left, op, right))
    }

    fn parse_rule(&mut self) -> Result<Rule, ParseError> {
        self.skip_whitespace();

        if self.peek_combinator("AND") {
            return Ok(Rule::And(self.parse_children("AND")?));
        }
        if self.peek_combinator("OR") {
            return Ok(Rule::Or(self.parse_children("OR")?));
        }
        if self.peek().is_none() {
            return Err(self.error("expected rule, found end of input".to_string()));
        }

        self.parse_condition()
    }

    fn parse_children(&mut self, keyword: &str) -> Result<Vec<Rule>, ParseError> {
        self.pos += keyword.len();
        self.expect_char('(')?;

        self.skip_whitespace();
        if self.peek() == Some(')') {
            return Err(self.error(format!("{} requires at least 1 rule", keyword)));
        }

        let mut rules = vec![self.parse_rule()?];
        loop {
            self.skip_whitespace();
            if self.peek() == Some(')') {
                self.advance();
                break;
            }
            self.expect_char(',')?;
            rules.push(self.parse_rule()?);
        }

        Ok(rules)
    }

    fn parse(&mut self) -> Result<Rule, ParseError> {
        let rule = self.parse_rule()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.error(format!(
                "unexpected input after rule: '{}'",
                self.remaining()
            )));
        }
        Ok(rule)
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

pub fn parse(input: &str) -> Result<Rule, ParseError> {
    let mut parser = Parser::new(input);
    parser.parse()
}

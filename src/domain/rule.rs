//! Rule AST data structures.
//!
//! This module defines the abstract syntax tree for entry/exit rules:
//! - `Operand`: What can be compared (bar fields, indicator columns, constants)
//! - `Comparison`: The comparison operator of a condition
//! - `Condition`: An atomic `left OP right` predicate
//! - `Rule`: A condition leaf or an AND/OR combinator over child rules

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::BarField;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Field(BarField),
    Indicator(String),
    Constant(f64),
}

impl Operand {
    pub fn indicator(name: &str) -> Self {
        Operand::Indicator(name.to_string())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Field(field) => write!(f, "{}", field),
            Operand::Indicator(name) => f.write_str(name),
            Operand::Constant(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Lt,
    Gt,
    Le,
    Ge,
}

impl Comparison {
    pub fn apply(self, left: f64, right: f64) -> bool {
        match self {
            Comparison::Lt => left < right,
            Comparison::Gt => left > right,
            Comparison::Le => left <= right,
            Comparison::Ge => left >= right,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Gt => ">",
            Comparison::Le => "<=",
            Comparison::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub left: Operand,
    pub op: Comparison,
    pub right: Operand,
}

impl Condition {
    pub fn new(left: Operand, op: Comparison, right: Operand) -> Self {
        Self { left, op, right }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op.symbol(), self.right)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Condition(Condition),
    And(Vec<Rule>),
    Or(Vec<Rule>),
}

impl Rule {
    /// Shorthand for a condition leaf.
    pub fn cmp(left: Operand, op: Comparison, right: Operand) -> Self {
        Rule::Condition(Condition::new(left, op, right))
    }

    /// All condition leaves, left to right.
    pub fn conditions(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        match self {
            Rule::Condition(c) => out.push(c),
            Rule::And(children) | Rule::Or(children) => {
                for child in children {
                    child.collect_conditions(out);
                }
            }
        }
    }

    /// Indicator column names referenced anywhere in the tree, first use order,
    /// without duplicates.
    pub fn referenced_indicators(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for cond in self.conditions() {
            for operand in [&cond.left, &cond.right] {
                if let Operand::Indicator(name) = operand {
                    if !names.contains(&name.as_str()) {
                        names.push(name);
                    }
                }
            }
        }
        names
    }

    /// Reject empty combinators and non-finite constants.
    pub fn validate_shape(&self) -> Result<(), SigtraderError> {
        match self {
            Rule::Condition(c) => {
                for operand in [&c.left, &c.right] {
                    if let Operand::Constant(v) = operand {
                        if !v.is_finite() {
                            return Err(SigtraderError::InvalidStrategy {
                                reason: format!("constant in '{}' must be finite", c),
                            });
                        }
                    }
                }
                Ok(())
            }
            Rule::And(children) | Rule::Or(children) => {
                if children.is_empty() {
                    return Err(SigtraderError::EmptyCombinator {
                        combinator: self.combinator_name(),
                    });
                }
                children.iter().try_for_each(Rule::validate_shape)
            }
        }
    }

    fn combinator_name(&self) -> &'static str {
        match self {
            Rule::And(_) => "AND",
            Rule::Or(_) => "OR",
            Rule::Condition(_) => "condition",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Condition(c) => write!(f, "{}", c),
            Rule::And(children) | Rule::Or(children) => {
                write!(f, "{}(", self.combinator_name())?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                f.write_str(")")
            }
        }
    }
}

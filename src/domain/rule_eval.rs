//! Rule evaluation engine.
//!
//! Evaluates a rule tree against an indicator table, producing one boolean
//! per bar.
//!
//! # Evaluation Semantics
//!
//! - Conditions are tri-state per bar: true, false or undefined. A condition
//!   is undefined when either operand is undefined at that bar.
//! - `AND` and `OR` see undefined children as false. Every child is evaluated
//!   for every bar; there is no short-circuiting.
//! - Operand names are resolved against the table before any bar is
//!   evaluated, so a missing column fails the whole call.

use crate::domain::error::SigtraderError;
use crate::domain::indicator_table::IndicatorTable;
use crate::domain::rule::{Condition, Rule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truth {
    True,
    False,
    Undefined,
}

impl Truth {
    /// Collapse to a signal bit; undefined counts as false.
    pub fn as_bool(self) -> bool {
        self == Truth::True
    }
}

impl From<bool> for Truth {
    fn from(b: bool) -> Self {
        if b { Truth::True } else { Truth::False }
    }
}

/// Evaluate a single condition at one bar.
pub fn evaluate_condition_at(condition: &Condition, table: &IndicatorTable, index: usize) -> Truth {
    let left = table.value(&condition.left, index);
    let right = table.value(&condition.right, index);
    match (left, right) {
        (Some(l), Some(r)) => Truth::from(condition.op.apply(l, r)),
        _ => Truth::Undefined,
    }
}

/// Per-bar truth of one condition across the whole table.
pub fn condition_truths(
    condition: &Condition,
    table: &IndicatorTable,
) -> Result<Vec<Truth>, SigtraderError> {
    check_condition(condition, table)?;
    Ok((0..table.len())
        .map(|i| evaluate_condition_at(condition, table, i))
        .collect())
}

/// Evaluate `rule` over every bar of `table`.
pub fn evaluate_rule(rule: &Rule, table: &IndicatorTable) -> Result<Vec<bool>, SigtraderError> {
    rule.validate_shape()?;
    for condition in rule.conditions() {
        check_condition(condition, table)?;
    }
    Ok(evaluate_node(rule, table))
}

fn check_condition(condition: &Condition, table: &IndicatorTable) -> Result<(), SigtraderError> {
    for operand in [&condition.left, &condition.right] {
        if !table.has_operand(operand) {
            return Err(SigtraderError::UndefinedOperand {
                name: operand.to_string(),
            });
        }
    }
    Ok(())
}

fn evaluate_node(rule: &Rule, table: &IndicatorTable) -> Vec<bool> {
    match rule {
        Rule::Condition(c) => (0..table.len())
            .map(|i| evaluate_condition_at(c, table, i).as_bool())
            .collect(),
        Rule::And(children) => combine(children, table, true, |acc, v| acc & v),
        Rule::Or(children) => combine(children, table, false, |acc, v| acc | v),
    }
}

fn combine(
    children: &[Rule],
    table: &IndicatorTable,
    identity: bool,
    op: impl Fn(bool, bool) -> bool,
) -> Vec<bool> {
    let mut acc = vec![identity; table.len()];
    for child in children {
        let values = evaluate_node(child, table);
        for (a, v) in acc.iter_mut().zip(values) {
            *a = op(*a, v);
        }
    }
    acc
}

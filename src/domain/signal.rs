//! Signal evaluation.
//!
//! The three host-facing operations, always run in this order:
//! 1. `compute_indicators(bars, config)`
//! 2. `evaluate_entries(table, config)`
//! 3. `evaluate_exits(table, config)`
//!
//! `SignalFrame::populate` runs all three and keeps the results together as
//! the augmented table handed back to the host.

use crate::domain::error::SigtraderError;
use crate::domain::indicator_table::{build_indicator_table, IndicatorTable};
use crate::domain::ohlcv::Bar;
use crate::domain::rule::{Condition, Rule};
use crate::domain::rule_eval::{condition_truths, evaluate_rule, Truth};
use crate::domain::strategy::StrategyConfig;
use tracing::debug;

pub fn compute_indicators(
    bars: &[Bar],
    config: &StrategyConfig,
) -> Result<IndicatorTable, SigtraderError> {
    build_indicator_table(bars, config.indicators())
}

/// Entry flags as 0/1, one per bar.
pub fn evaluate_entries(
    table: &IndicatorTable,
    config: &StrategyConfig,
) -> Result<Vec<u8>, SigtraderError> {
    to_flags(config.entry_long(), table)
}

/// Exit flags as 0/1, one per bar.
pub fn evaluate_exits(
    table: &IndicatorTable,
    config: &StrategyConfig,
) -> Result<Vec<u8>, SigtraderError> {
    to_flags(config.exit_long(), table)
}

fn to_flags(rule: &Rule, table: &IndicatorTable) -> Result<Vec<u8>, SigtraderError> {
    Ok(evaluate_rule(rule, table)?
        .into_iter()
        .map(u8::from)
        .collect())
}

/// Bars, indicator columns and signal flags for one pair, row-aligned.
#[derive(Debug, Clone)]
pub struct SignalFrame {
    pair: String,
    table: IndicatorTable,
    entry_long: Vec<u8>,
    exit_long: Vec<u8>,
}

impl SignalFrame {
    pub fn populate(
        bars: &[Bar],
        pair: &str,
        config: &StrategyConfig,
    ) -> Result<Self, SigtraderError> {
        let table = compute_indicators(bars, config)?;
        let entry_long = evaluate_entries(&table, config)?;
        let exit_long = evaluate_exits(&table, config)?;

        let frame = Self {
            pair: pair.to_string(),
            table,
            entry_long,
            exit_long,
        };
        debug!(
            pair = %frame.pair,
            strategy = config.name(),
            bars = frame.len(),
            entries = frame.entry_indices().len(),
            exits = frame.exit_indices().len(),
            "signals populated"
        );
        Ok(frame)
    }

    pub fn pair(&self) -> &str {
        &self.pair
    }

    pub fn table(&self) -> &IndicatorTable {
        &self.table
    }

    pub fn bars(&self) -> &[Bar] {
        self.table.bars()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn entry_long(&self) -> &[u8] {
        &self.entry_long
    }

    pub fn exit_long(&self) -> &[u8] {
        &self.exit_long
    }

    pub fn entry_indices(&self) -> Vec<usize> {
        flagged(&self.entry_long)
    }

    pub fn exit_indices(&self) -> Vec<usize> {
        flagged(&self.exit_long)
    }

    /// Conditions of `rule` that are undefined at `index`. An empty result
    /// means every condition had data at that bar.
    pub fn undefined_conditions<'r>(
        &self,
        rule: &'r Rule,
        index: usize,
    ) -> Result<Vec<&'r Condition>, SigtraderError> {
        let mut out = Vec::new();
        for condition in rule.conditions() {
            let truths = condition_truths(condition, &self.table)?;
            if truths.get(index) == Some(&Truth::Undefined) {
                out.push(condition);
            }
        }
        Ok(out)
    }

    /// Per bar, whether at least one entry condition lacked data. Tells
    /// "no data yet" apart from "condition false" for a zero entry flag.
    pub fn undefined_entry_conditions(
        &self,
        config: &StrategyConfig,
    ) -> Result<Vec<bool>, SigtraderError> {
        let mut blocked = vec![false; self.len()];
        for condition in config.entry_long().conditions() {
            for (b, truth) in blocked
                .iter_mut()
                .zip(condition_truths(condition, &self.table)?)
            {
                *b |= truth == Truth::Undefined;
            }
        }
        Ok(blocked)
    }
}

fn flagged(flags: &[u8]) -> Vec<usize> {
    flags
        .iter()
        .enumerate()
        .filter(|(_, f)| **f == 1)
        .map(|(i, _)| i)
        .collect()
}

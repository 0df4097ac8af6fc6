//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: max(fast, slow) - 1 for the line, plus signal - 1 for signal/histogram.

use crate::domain::indicator::{calculate_ema, IndicatorSeries};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone)]
pub struct MacdOutput {
    pub macd: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

pub fn calculate_macd(
    input: &IndicatorSeries,
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdOutput {
    let n = input.len();
    if fast == 0 || slow == 0 || signal_period == 0 {
        return MacdOutput {
            macd: IndicatorSeries::undefined(n),
            signal: IndicatorSeries::undefined(n),
            histogram: IndicatorSeries::undefined(n),
        };
    }

    let ema_fast = calculate_ema(input, fast);
    let ema_slow = calculate_ema(input, slow);

    let line_values: Vec<f64> = ema_fast
        .values
        .iter()
        .zip(&ema_slow.values)
        .map(|(f, s)| f - s)
        .collect();
    let macd = IndicatorSeries::new(line_values, ema_fast.warmup.max(ema_slow.warmup));

    let signal = calculate_ema(&macd, signal_period);

    let histogram_values: Vec<f64> = macd
        .values
        .iter()
        .zip(&signal.values)
        .map(|(m, s)| m - s)
        .collect();
    let histogram = IndicatorSeries::new(histogram_values, signal.warmup);

    MacdOutput {
        macd,
        signal,
        histogram,
    }
}

pub fn calculate_macd_default(input: &IndicatorSeries) -> MacdOutput {
    calculate_macd(input, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

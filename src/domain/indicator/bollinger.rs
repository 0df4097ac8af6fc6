//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (dev_up × StdDev)
//! - Lower: Middle - (dev_down × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multipliers=2.0
//! Warmup: input warmup + (period-1).

use crate::domain::indicator::{calculate_sma, IndicatorSeries};
use crate::domain::indicator_helpers::ratio_or_nan;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct BollingerOutput {
    pub lower: IndicatorSeries,
    pub middle: IndicatorSeries,
    pub upper: IndicatorSeries,
}

pub fn calculate_bollinger(
    input: &IndicatorSeries,
    period: usize,
    dev_up: f64,
    dev_down: f64,
) -> BollingerOutput {
    let n = input.len();
    let middle = calculate_sma(input, period);
    if period == 0 {
        return BollingerOutput {
            lower: IndicatorSeries::undefined(n),
            middle,
            upper: IndicatorSeries::undefined(n),
        };
    }

    let mut upper = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];

    for i in middle.warmup..n {
        let mean = middle.values[i];
        let window = &input.values[i + 1 - period..=i];
        let variance: f64 = window
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;

        let stddev = variance.sqrt();
        upper[i] = mean + dev_up * stddev;
        lower[i] = mean - dev_down * stddev;
    }

    let warmup = middle.warmup;
    BollingerOutput {
        lower: IndicatorSeries::new(lower, warmup),
        middle,
        upper: IndicatorSeries::new(upper, warmup),
    }
}

/// (value - lower) / (upper - lower); undefined for a zero-width band.
pub fn calculate_percent_b(
    value: &IndicatorSeries,
    lower: &IndicatorSeries,
    upper: &IndicatorSeries,
) -> IndicatorSeries {
    let values = value
        .values
        .iter()
        .zip(&lower.values)
        .zip(&upper.values)
        .map(|((v, l), u)| ratio_or_nan(v - l, u - l))
        .collect();
    let warmup = value.warmup.max(lower.warmup).max(upper.warmup);
    IndicatorSeries::new(values, warmup)
}

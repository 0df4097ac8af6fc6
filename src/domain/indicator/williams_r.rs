//! Williams %R.
//!
//! %R = -100 * (HH(n) - C) / (HH(n) - LL(n)), in [-100, 0].
//! A flat high/low window is undefined.
//! Warmup: n - 1.

use crate::domain::indicator::IndicatorSeries;
use crate::domain::indicator_helpers::{ratio_or_nan, rolling_max, rolling_min};

pub fn calculate_williams_r(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
) -> IndicatorSeries {
    let n = close.len();
    if period == 0 || high.len() != n || low.len() != n {
        return IndicatorSeries::undefined(n);
    }

    let highest = rolling_max(high, period);
    let lowest = rolling_min(low, period);
    let values = (0..n)
        .map(|i| -100.0 * ratio_or_nan(highest[i] - close[i], highest[i] - lowest[i]))
        .collect();

    IndicatorSeries::new(values, period - 1)
}

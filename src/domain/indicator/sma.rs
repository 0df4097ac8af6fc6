//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean of the trailing n input values.
//! Warmup: input warmup + (n-1).

use crate::domain::indicator::IndicatorSeries;
use crate::domain::indicator_helpers::window_mean;

pub fn calculate_sma(input: &IndicatorSeries, period: usize) -> IndicatorSeries {
    let n = input.len();
    if period == 0 {
        return IndicatorSeries::undefined(n);
    }

    let warmup = input.warmup + period - 1;
    let mut values = vec![f64::NAN; n];
    for i in warmup..n {
        values[i] = window_mean(&input.values[i + 1 - period..=i]);
    }

    IndicatorSeries::new(values, warmup)
}

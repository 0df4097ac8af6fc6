//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with the SMA of the first n defined inputs, then
//! EMA[i] = X[i]*k + EMA[i-1]*(1-k).
//! Warmup: input warmup + (n-1).

use crate::domain::indicator::IndicatorSeries;
use crate::domain::indicator_helpers::window_mean;

pub fn calculate_ema(input: &IndicatorSeries, period: usize) -> IndicatorSeries {
    let n = input.len();
    if period == 0 {
        return IndicatorSeries::undefined(n);
    }

    let start = input.warmup;
    let warmup = start + period - 1;
    let mut values = vec![f64::NAN; n];

    if warmup < n {
        let k = 2.0 / (period as f64 + 1.0);
        let mut ema = window_mean(&input.values[start..=warmup]);
        values[warmup] = ema;
        for i in (warmup + 1)..n {
            ema = input.values[i] * k + ema * (1.0 - k);
            values[i] = ema;
        }
    }

    IndicatorSeries::new(values, warmup)
}

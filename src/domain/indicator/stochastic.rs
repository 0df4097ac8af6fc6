//! Slow Stochastic Oscillator.
//!
//! raw %K = 100 * (C - LL(k)) / (HH(k) - LL(k))
//! slowk  = SMA(k_smooth) of raw %K
//! slowd  = SMA(d_period) of slowk
//!
//! A flat high/low window makes raw %K undefined at that bar, and every
//! smoothed value whose window covers it.
//!
//! Default parameters: k_period=5, k_smooth=3, d_period=3
//! Warmup: slowk k_period + k_smooth - 2, slowd k_period + k_smooth + d_period - 3.

use crate::domain::indicator::{calculate_sma, IndicatorSeries};
use crate::domain::indicator_helpers::{ratio_or_nan, rolling_max, rolling_min};

pub const DEFAULT_K_PERIOD: usize = 5;
pub const DEFAULT_K_SMOOTH: usize = 3;
pub const DEFAULT_D_PERIOD: usize = 3;

#[derive(Debug, Clone)]
pub struct StochasticOutput {
    pub slowk: IndicatorSeries,
    pub slowd: IndicatorSeries,
}

pub fn calculate_stochastic(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    k_period: usize,
    k_smooth: usize,
    d_period: usize,
) -> StochasticOutput {
    let n = close.len();
    if k_period == 0
        || k_smooth == 0
        || d_period == 0
        || high.len() != n
        || low.len() != n
    {
        return StochasticOutput {
            slowk: IndicatorSeries::undefined(n),
            slowd: IndicatorSeries::undefined(n),
        };
    }

    let highest = rolling_max(high, k_period);
    let lowest = rolling_min(low, k_period);
    let raw_k: Vec<f64> = (0..n)
        .map(|i| 100.0 * ratio_or_nan(close[i] - lowest[i], highest[i] - lowest[i]))
        .collect();
    let raw_k = IndicatorSeries::new(raw_k, k_period - 1);

    let slowk = calculate_sma(&raw_k, k_smooth);
    let slowd = calculate_sma(&slowk, d_period);

    StochasticOutput { slowk, slowd }
}

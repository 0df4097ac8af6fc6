//! Shared helper functions for indicator calculations.

/// Highest value of each trailing window of `period` values; NaN until the
/// first full window.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, f64::max)
}

/// Lowest value of each trailing window of `period` values; NaN until the
/// first full window.
pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, f64::min)
}

fn rolling(values: &[f64], period: usize, pick: fn(f64, f64) -> f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }
    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        out[i] = window.iter().copied().reduce(pick).unwrap_or(f64::NAN);
    }
    out
}

/// Arithmetic mean of a window; NaN if any value in it is undefined.
pub fn window_mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

/// `numerator / denominator`, undefined when the denominator is zero.
pub fn ratio_or_nan(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

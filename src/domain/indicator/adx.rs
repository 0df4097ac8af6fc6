//! Average Directional Index (Wilder).
//!
//! +DM/-DM and true range are smoothed with Wilder's running sum
//! (S[i] = S[i-1] - S[i-1]/n + X[i]), giving +DI and -DI.
//! DX = 100 * |+DI - -DI| / (+DI + -DI); ADX is the Wilder average of DX.
//!
//! When +DI + -DI is zero, DX is taken as 0.
//!
//! Warmup: 2n - 1 bars.

use crate::domain::indicator::IndicatorSeries;

pub fn calculate_adx(high: &[f64], low: &[f64], close: &[f64], period: usize) -> IndicatorSeries {
    let n = close.len();
    if period == 0 || high.len() != n || low.len() != n {
        return IndicatorSeries::undefined(n);
    }

    let warmup = 2 * period - 1;
    let mut values = vec![f64::NAN; n];
    if warmup >= n {
        return IndicatorSeries::new(values, warmup);
    }

    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    let mut tr = vec![0.0; n];

    for i in 1..n {
        let up_move = high[i] - high[i - 1];
        let down_move = low[i - 1] - low[i];

        if up_move > down_move && up_move > 0.0 {
            plus_dm[i] = up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dm[i] = down_move;
        }

        let hl = high[i] - low[i];
        let hc = (high[i] - close[i - 1]).abs();
        let lc = (low[i] - close[i - 1]).abs();
        tr[i] = hl.max(hc).max(lc);
    }

    let p = period as f64;
    let mut smooth_plus: f64 = plus_dm[1..=period].iter().sum();
    let mut smooth_minus: f64 = minus_dm[1..=period].iter().sum();
    let mut smooth_tr: f64 = tr[1..=period].iter().sum();

    let mut dx = vec![0.0; n];
    dx[period] = directional_index(smooth_plus, smooth_minus, smooth_tr);

    for i in (period + 1)..n {
        smooth_plus = smooth_plus - smooth_plus / p + plus_dm[i];
        smooth_minus = smooth_minus - smooth_minus / p + minus_dm[i];
        smooth_tr = smooth_tr - smooth_tr / p + tr[i];
        dx[i] = directional_index(smooth_plus, smooth_minus, smooth_tr);
    }

    let mut adx = dx[period..=warmup].iter().sum::<f64>() / p;
    values[warmup] = adx;
    for i in (warmup + 1)..n {
        adx = (adx * (p - 1.0) + dx[i]) / p;
        values[i] = adx;
    }

    IndicatorSeries::new(values, warmup)
}

fn directional_index(smooth_plus: f64, smooth_minus: f64, smooth_tr: f64) -> f64 {
    if smooth_tr <= 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * smooth_plus / smooth_tr;
    let minus_di = 100.0 * smooth_minus / smooth_tr;
    let di_sum = plus_di + minus_di;
    if di_sum <= 0.0 {
        0.0
    } else {
        100.0 * (plus_di - minus_di).abs() / di_sum
    }
}

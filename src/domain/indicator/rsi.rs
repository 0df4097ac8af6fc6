//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100.
//! If both averages are 0 (flat window): undefined.
//!
//! Warmup: input warmup + n (need n price changes to compute initial average).

use crate::domain::indicator::IndicatorSeries;

pub fn calculate_rsi(input: &IndicatorSeries, period: usize) -> IndicatorSeries {
    let n = input.len();
    if period == 0 {
        return IndicatorSeries::undefined(n);
    }

    let start = input.warmup;
    let warmup = start + period;
    let mut values = vec![f64::NAN; n];
    if warmup >= n {
        return IndicatorSeries::new(values, warmup);
    }

    let change = |i: usize| input.values[i] - input.values[i - 1];
    let gain = |c: f64| if c > 0.0 { c } else { 0.0 };
    let loss = |c: f64| if c < 0.0 { -c } else { 0.0 };

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in (start + 1)..=warmup {
        let c = change(i);
        avg_gain += gain(c);
        avg_loss += loss(c);
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    values[warmup] = rsi_from_averages(avg_gain, avg_loss);

    for i in (warmup + 1)..n {
        let c = change(i);
        avg_gain = (avg_gain * (period - 1) as f64 + gain(c)) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss(c)) / period as f64;
        values[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    IndicatorSeries::new(values, warmup)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { f64::NAN } else { 100.0 }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn series(values: &[f64]) -> IndicatorSeries {
        IndicatorSeries::from(values.to_vec())
    }

    #[test]
    fn rsi_empty_input() {
        let out = calculate_rsi(&series(&[]), 14);
        assert_eq!(out.len(), 0);
    }

    #[test]
    fn rsi_single_value() {
        let out = calculate_rsi(&series(&[100.0]), 14);
        assert_eq!(out.len(), 1);
        assert_eq!(out.get(0), None);
    }

    #[test]
    fn rsi_warmup_period() {
        let closes: Vec<f64> = (1..=15)
            .map(|i| 100.0 + (i as f64 % 5.0) * 2.0)
            .collect();
        let out = calculate_rsi(&series(&closes), 14);

        assert_eq!(out.len(), 15);
        for i in 0..14 {
            assert_eq!(out.get(i), None, "index {} should be undefined", i);
        }
        assert!(out.get(14).is_some(), "index 14 should be defined");
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let out = calculate_rsi(&series(&closes), 14);
        assert_relative_eq!(out.values[14], 100.0);
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let out = calculate_rsi(&series(&closes), 14);
        assert_relative_eq!(out.values[14], 0.0);
    }

    #[test]
    fn rsi_flat_prices_are_undefined() {
        let out = calculate_rsi(&series(&[50.0; 20]), 14);
        assert_eq!(out.defined_count(), 0);
    }

    #[test]
    fn rsi_flat_up_is_100() {
        // Non-decreasing with at least one rise: no losses at all.
        let mut closes = vec![100.0; 10];
        closes.extend([101.0, 101.0, 102.0, 102.0, 102.0, 103.0]);
        let out = calculate_rsi(&series(&closes), 14);
        assert_relative_eq!(out.values[14], 100.0);
        assert_relative_eq!(out.values[15], 100.0);
    }

    #[test]
    fn rsi_wilder_smoothing() {
        // period 2: changes +2, -1, +3
        let out = calculate_rsi(&series(&[10.0, 12.0, 11.0, 14.0]), 2);
        let (g, l) = (1.0, 0.5);
        assert_relative_eq!(out.values[2], 100.0 - 100.0 / (1.0 + g / l));
        let (g, l) = ((g + 3.0) / 2.0, (l + 0.0) / 2.0);
        assert_relative_eq!(out.values[3], 100.0 - 100.0 / (1.0 + g / l));
    }

    #[test]
    fn rsi_zero_period() {
        let out = calculate_rsi(&series(&[100.0, 101.0]), 0);
        assert_eq!(out.len(), 2);
        assert_eq!(out.defined_count(), 0);
    }

    #[test]
    fn rsi_known_calculation() {
        let closes = [
            44.0, 44.25, 44.50, 43.75, 44.50, 44.25, 44.75, 45.25, 45.50, 45.25, 45.50, 46.0,
            46.25, 46.0, 46.50,
        ];
        let out = calculate_rsi(&series(&closes), 14);
        let rsi = out.get(14).unwrap();
        assert!(rsi > 50.0 && rsi < 100.0, "RSI should be in bullish territory");
    }

    proptest! {
        #[test]
        fn rsi_stays_in_range(
            closes in prop::collection::vec(1.0f64..500.0, 0..120),
            period in 1usize..20,
        ) {
            let out = calculate_rsi(&series(&closes), period);
            prop_assert_eq!(out.len(), closes.len());
            for i in 0..out.len() {
                if let Some(v) = out.get(i) {
                    prop_assert!((0.0..=100.0).contains(&v));
                    prop_assert!(i >= period);
                }
            }
        }
    }
}

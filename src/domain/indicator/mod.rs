//! Technical indicator implementations.
//!
//! This module provides the columnar building blocks of the indicator library:
//! - `IndicatorSeries`: one output column aligned 1:1 with the bar sequence,
//!   tagged with its warm-up length
//! - `Source`: where a single-input indicator reads its values from
//! - `Algorithm`: indicator identity + parameters, as named in a strategy
//!
//! Undefined positions are stored as NaN. A position is defined only when it
//! lies at or after the warm-up length and holds a finite number.

pub mod adx;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod williams_r;

pub use adx::calculate_adx;
pub use bollinger::{calculate_bollinger, calculate_percent_b, BollingerOutput};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdOutput};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stochastic::{calculate_stochastic, StochasticOutput};
pub use williams_r::calculate_williams_r;

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::BarField;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub warmup: usize,
    pub values: Vec<f64>,
}

impl IndicatorSeries {
    /// Build a series, masking every position before `warmup` as undefined.
    pub fn new(mut values: Vec<f64>, warmup: usize) -> Self {
        let masked = warmup.min(values.len());
        for v in &mut values[..masked] {
            *v = f64::NAN;
        }
        Self { warmup, values }
    }

    /// A series of `len` positions that are all undefined.
    pub fn undefined(len: usize) -> Self {
        Self {
            warmup: len,
            values: vec![f64::NAN; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value at `index`, or `None` if it is undefined.
    pub fn get(&self, index: usize) -> Option<f64> {
        if index < self.warmup {
            return None;
        }
        self.values.get(index).copied().filter(|v| v.is_finite())
    }

    pub fn defined_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.get(i).is_some()).count()
    }
}

/// Raw columns carry no warm-up.
impl From<Vec<f64>> for IndicatorSeries {
    fn from(values: Vec<f64>) -> Self {
        Self { warmup: 0, values }
    }
}

/// Input of a single-input indicator: a raw bar field or a previously
/// computed column.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Field(BarField),
    Column(String),
}

impl Source {
    pub fn parse(s: &str) -> Self {
        match s.parse::<BarField>() {
            Ok(field) => Source::Field(field),
            Err(()) => Source::Column(s.to_string()),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Field(field) => write!(f, "{}", field),
            Source::Column(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Algorithm {
    Sma {
        period: usize,
        source: Source,
    },
    Ema {
        period: usize,
        source: Source,
    },
    Rsi {
        period: usize,
        source: Source,
    },
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
        source: Source,
    },
    Adx {
        period: usize,
    },
    Bollinger {
        period: usize,
        dev_up: f64,
        dev_down: f64,
        source: Source,
    },
    Stochastic {
        k_period: usize,
        k_smooth: usize,
        d_period: usize,
    },
    WilliamsR {
        period: usize,
    },
    /// Position of `value` inside the `lower`..`upper` envelope, 0 at the
    /// lower edge and 1 at the upper edge.
    BandPercent {
        value: Source,
        lower: Source,
        upper: Source,
    },
}

impl Algorithm {
    /// Algorithm names as accepted in strategy files.
    pub const NAMES: [&'static str; 9] = [
        "sma",
        "ema",
        "rsi",
        "macd",
        "adx",
        "bbands",
        "stoch",
        "willr",
        "band_percent",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Sma { .. } => "sma",
            Algorithm::Ema { .. } => "ema",
            Algorithm::Rsi { .. } => "rsi",
            Algorithm::Macd { .. } => "macd",
            Algorithm::Adx { .. } => "adx",
            Algorithm::Bollinger { .. } => "bbands",
            Algorithm::Stochastic { .. } => "stoch",
            Algorithm::WilliamsR { .. } => "willr",
            Algorithm::BandPercent { .. } => "band_percent",
        }
    }

    /// Number of output columns, in the order the outputs are produced.
    pub fn output_count(&self) -> usize {
        self.output_names().len()
    }

    /// Output names, used as default column suffixes.
    pub fn output_names(&self) -> &'static [&'static str] {
        match self {
            Algorithm::Macd { .. } => &["macd", "signal", "histogram"],
            Algorithm::Bollinger { .. } => &["lower", "middle", "upper"],
            Algorithm::Stochastic { .. } => &["slowk", "slowd"],
            _ => &["value"],
        }
    }

    /// Sources that must already be resolvable before this indicator runs.
    pub fn inputs(&self) -> Vec<&Source> {
        match self {
            Algorithm::Sma { source, .. }
            | Algorithm::Ema { source, .. }
            | Algorithm::Rsi { source, .. }
            | Algorithm::Macd { source, .. }
            | Algorithm::Bollinger { source, .. } => vec![source],
            Algorithm::BandPercent {
                value,
                lower,
                upper,
            } => vec![value, lower, upper],
            Algorithm::Adx { .. } | Algorithm::Stochastic { .. } | Algorithm::WilliamsR { .. } => {
                Vec::new()
            }
        }
    }

    /// Reject zero periods and non-finite or negative band multipliers.
    pub fn validate(&self, indicator: &str) -> Result<(), SigtraderError> {
        let periods: Vec<(&str, usize)> = match self {
            Algorithm::Sma { period, .. }
            | Algorithm::Ema { period, .. }
            | Algorithm::Rsi { period, .. }
            | Algorithm::Adx { period }
            | Algorithm::WilliamsR { period } => vec![("period", *period)],
            Algorithm::Macd {
                fast, slow, signal, ..
            } => vec![("fast", *fast), ("slow", *slow), ("signal", *signal)],
            Algorithm::Bollinger { period, .. } => vec![("period", *period)],
            Algorithm::Stochastic {
                k_period,
                k_smooth,
                d_period,
            } => vec![
                ("k_period", *k_period),
                ("k_smooth", *k_smooth),
                ("d_period", *d_period),
            ],
            Algorithm::BandPercent { .. } => Vec::new(),
        };

        for (key, value) in periods {
            if value == 0 {
                return Err(SigtraderError::InvalidParameter {
                    indicator: indicator.to_string(),
                    reason: format!("{} must be positive", key),
                });
            }
        }

        if let Algorithm::Bollinger {
            dev_up, dev_down, ..
        } = self
        {
            for (key, mult) in [("dev_up", dev_up), ("dev_down", dev_down)] {
                if !mult.is_finite() || *mult < 0.0 {
                    return Err(SigtraderError::InvalidParameter {
                        indicator: indicator.to_string(),
                        reason: format!("{} must be a non-negative number", key),
                    });
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Sma { period, source } => write!(f, "SMA({}, {})", source, period),
            Algorithm::Ema { period, source } => write!(f, "EMA({}, {})", source, period),
            Algorithm::Rsi { period, source } => write!(f, "RSI({}, {})", source, period),
            Algorithm::Macd {
                fast,
                slow,
                signal,
                source,
            } => write!(f, "MACD({}, {},{},{})", source, fast, slow, signal),
            Algorithm::Adx { period } => write!(f, "ADX({})", period),
            Algorithm::Bollinger {
                period,
                dev_up,
                dev_down,
                source,
            } => write!(f, "BBANDS({}, {},{},{})", source, period, dev_up, dev_down),
            Algorithm::Stochastic {
                k_period,
                k_smooth,
                d_period,
            } => write!(f, "STOCH({},{},{})", k_period, k_smooth, d_period),
            Algorithm::WilliamsR { period } => write!(f, "WILLR({})", period),
            Algorithm::BandPercent {
                value,
                lower,
                upper,
            } => write!(f, "BAND_PERCENT({}, {}, {})", value, lower, upper),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_masks_warmup() {
        let series = IndicatorSeries::new(vec![1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(series.get(0), None);
        assert_eq!(series.get(1), None);
        assert_eq!(series.get(2), Some(3.0));
        assert!(series.values[0].is_nan());
    }

    #[test]
    fn get_treats_nan_as_undefined() {
        let series = IndicatorSeries::new(vec![1.0, f64::NAN, 3.0], 0);
        assert_eq!(series.get(1), None);
        assert_eq!(series.defined_count(), 2);
    }

    #[test]
    fn get_out_of_range_is_undefined() {
        let series = IndicatorSeries::from(vec![1.0]);
        assert_eq!(series.get(5), None);
    }

    #[test]
    fn warmup_longer_than_series() {
        let series = IndicatorSeries::new(vec![1.0, 2.0], 5);
        assert_eq!(series.len(), 2);
        assert_eq!(series.defined_count(), 0);
    }

    #[test]
    fn source_parse() {
        assert_eq!(Source::parse("volume"), Source::Field(BarField::Volume));
        assert_eq!(Source::parse("macd"), Source::Column("macd".into()));
    }

    #[test]
    fn algorithm_display_macd() {
        let macd = Algorithm::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
            source: Source::Field(BarField::Close),
        };
        assert_eq!(macd.to_string(), "MACD(close, 12,26,9)");
    }

    #[test]
    fn algorithm_display_bollinger() {
        let boll = Algorithm::Bollinger {
            period: 20,
            dev_up: 2.0,
            dev_down: 2.0,
            source: Source::Field(BarField::Close),
        };
        assert_eq!(boll.to_string(), "BBANDS(close, 20,2,2)");
    }

    #[test]
    fn output_counts() {
        assert_eq!(Algorithm::Adx { period: 14 }.output_count(), 1);
        assert_eq!(
            Algorithm::Stochastic {
                k_period: 5,
                k_smooth: 3,
                d_period: 3
            }
            .output_count(),
            2
        );
    }

    #[test]
    fn validate_rejects_zero_period() {
        let sma = Algorithm::Sma {
            period: 0,
            source: Source::Field(BarField::Close),
        };
        assert!(matches!(
            sma.validate("sma_fast"),
            Err(SigtraderError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn validate_rejects_negative_multiplier() {
        let boll = Algorithm::Bollinger {
            period: 20,
            dev_up: 2.0,
            dev_down: -1.0,
            source: Source::Field(BarField::Close),
        };
        assert!(boll.validate("bb").is_err());
    }

    #[test]
    fn validate_accepts_defaults() {
        let stoch = Algorithm::Stochastic {
            k_period: 5,
            k_smooth: 3,
            d_period: 3,
        };
        assert!(stoch.validate("stoch").is_ok());
    }

    #[test]
    fn names_cover_every_algorithm() {
        let algorithms = [
            Algorithm::Adx { period: 1 },
            Algorithm::WilliamsR { period: 1 },
            Algorithm::BandPercent {
                value: Source::Field(BarField::Close),
                lower: Source::Column("a".into()),
                upper: Source::Column("b".into()),
            },
        ];
        for a in algorithms {
            assert!(Algorithm::NAMES.contains(&a.name()));
        }
    }
}

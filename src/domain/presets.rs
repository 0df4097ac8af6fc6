//! Built-in strategy configurations.
//!
//! Each preset is plain data run through `StrategyConfig::new`, the same
//! path a configuration loaded from an INI file takes.

use crate::domain::error::SigtraderError;
use crate::domain::indicator::{bollinger, macd, stochastic, Algorithm, Source};
use crate::domain::ohlcv::BarField;
use crate::domain::rule::{Comparison, Operand, Rule};
use crate::domain::strategy::{IndicatorSpec, RoiTable, StrategyConfig, StrategyParts, Timeframe};

pub const PRESET_NAMES: [&str; 3] = ["momentum_trend", "trend_following", "mean_reversion"];

/// Resolve a preset by name, ignoring case. `None` if no preset matches.
pub fn by_name(name: &str) -> Option<Result<StrategyConfig, SigtraderError>> {
    match name.to_ascii_lowercase().as_str() {
        "momentum_trend" => Some(momentum_trend()),
        "trend_following" => Some(trend_following()),
        "mean_reversion" => Some(mean_reversion()),
        _ => None,
    }
}

fn col(name: &str) -> Operand {
    Operand::indicator(name)
}

fn num(v: f64) -> Operand {
    Operand::Constant(v)
}

fn field(f: BarField) -> Operand {
    Operand::Field(f)
}

fn close() -> Source {
    Source::Field(BarField::Close)
}

/// RSI oversold inside an uptrend, confirmed by volume.
pub fn momentum_trend() -> Result<StrategyConfig, SigtraderError> {
    use Comparison::*;

    StrategyConfig::new(StrategyParts {
        name: "momentum_trend".into(),
        description: "RSI oversold in an SMA uptrend with above-average volume".into(),
        timeframe: Timeframe::minutes(5),
        stoploss: -0.10,
        minimal_roi: RoiTable::new(vec![(60, 0.01), (30, 0.02), (0, 0.04)])?,
        indicators: vec![
            IndicatorSpec::new("rsi", Algorithm::Rsi { period: 14, source: close() }),
            IndicatorSpec::new("sma_fast", Algorithm::Sma { period: 9, source: close() }),
            IndicatorSpec::new("sma_slow", Algorithm::Sma { period: 21, source: close() }),
            IndicatorSpec::new(
                "volume_sma",
                Algorithm::Sma {
                    period: 20,
                    source: Source::Field(BarField::Volume),
                },
            ),
        ],
        entry_long: Rule::And(vec![
            Rule::cmp(col("rsi"), Lt, num(30.0)),
            Rule::cmp(col("sma_fast"), Gt, col("sma_slow")),
            Rule::cmp(field(BarField::Volume), Gt, col("volume_sma")),
            Rule::cmp(field(BarField::Close), Gt, col("sma_fast")),
        ]),
        exit_long: Rule::Or(vec![
            Rule::cmp(col("rsi"), Gt, num(70.0)),
            Rule::cmp(col("sma_fast"), Lt, col("sma_slow")),
        ]),
    })
}

/// EMA trend confirmed by MACD momentum and ADX strength.
pub fn trend_following() -> Result<StrategyConfig, SigtraderError> {
    use Comparison::*;

    StrategyConfig::new(StrategyParts {
        name: "trend_following".into(),
        description: "EMA trend confirmed by MACD and ADX".into(),
        timeframe: Timeframe::minutes(15),
        stoploss: -0.08,
        minimal_roi: RoiTable::new(vec![(120, 0.01), (60, 0.02), (20, 0.03), (0, 0.05)])?,
        indicators: vec![
            IndicatorSpec::new("ema_fast", Algorithm::Ema { period: 12, source: close() }),
            IndicatorSpec::new("ema_slow", Algorithm::Ema { period: 26, source: close() }),
            IndicatorSpec::multi(
                &["macd", "macdsignal", "macdhist"],
                Algorithm::Macd {
                    fast: macd::DEFAULT_FAST,
                    slow: macd::DEFAULT_SLOW,
                    signal: macd::DEFAULT_SIGNAL,
                    source: close(),
                },
            ),
            IndicatorSpec::new("adx", Algorithm::Adx { period: 14 }),
        ],
        entry_long: Rule::And(vec![
            Rule::cmp(col("ema_fast"), Gt, col("ema_slow")),
            Rule::cmp(col("macd"), Gt, col("macdsignal")),
            Rule::cmp(col("macdhist"), Gt, num(0.0)),
            Rule::cmp(col("adx"), Gt, num(25.0)),
            Rule::cmp(field(BarField::Close), Gt, col("ema_fast")),
        ]),
        exit_long: Rule::Or(vec![
            Rule::cmp(col("ema_fast"), Lt, col("ema_slow")),
            Rule::cmp(col("macd"), Lt, col("macdsignal")),
            Rule::cmp(col("adx"), Lt, num(20.0)),
        ]),
    })
}

/// Fade moves outside the Bollinger envelope when the oscillators agree.
pub fn mean_reversion() -> Result<StrategyConfig, SigtraderError> {
    use Comparison::*;

    StrategyConfig::new(StrategyParts {
        name: "mean_reversion".into(),
        description: "Bollinger band extremes confirmed by Stochastic and Williams %R".into(),
        timeframe: Timeframe::minutes(1),
        stoploss: -0.12,
        minimal_roi: RoiTable::new(vec![(10, 0.01), (5, 0.02), (0, 0.03)])?,
        indicators: vec![
            IndicatorSpec::multi(
                &["bb_lowerband", "bb_middleband", "bb_upperband"],
                Algorithm::Bollinger {
                    period: bollinger::DEFAULT_PERIOD,
                    dev_up: bollinger::DEFAULT_MULTIPLIER,
                    dev_down: bollinger::DEFAULT_MULTIPLIER,
                    source: close(),
                },
            ),
            IndicatorSpec::multi(
                &["slowk", "slowd"],
                Algorithm::Stochastic {
                    k_period: stochastic::DEFAULT_K_PERIOD,
                    k_smooth: stochastic::DEFAULT_K_SMOOTH,
                    d_period: stochastic::DEFAULT_D_PERIOD,
                },
            ),
            IndicatorSpec::new("willr", Algorithm::WilliamsR { period: 14 }),
            IndicatorSpec::new(
                "bb_percent",
                Algorithm::BandPercent {
                    value: close(),
                    lower: Source::Column("bb_lowerband".into()),
                    upper: Source::Column("bb_upperband".into()),
                },
            ),
        ],
        entry_long: Rule::And(vec![
            Rule::cmp(field(BarField::Close), Lt, col("bb_lowerband")),
            Rule::cmp(col("bb_percent"), Lt, num(0.2)),
            Rule::cmp(col("slowk"), Lt, num(20.0)),
            Rule::cmp(col("slowd"), Lt, num(20.0)),
            Rule::cmp(col("willr"), Lt, num(-80.0)),
            Rule::cmp(field(BarField::Volume), Gt, num(0.0)),
        ]),
        exit_long: Rule::Or(vec![
            Rule::cmp(field(BarField::Close), Gt, col("bb_upperband")),
            Rule::cmp(col("bb_percent"), Gt, num(0.8)),
            Rule::cmp(col("slowk"), Gt, num(80.0)),
            Rule::cmp(col("willr"), Gt, num(-20.0)),
        ]),
    })
}

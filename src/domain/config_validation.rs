//! Strategy configuration loading and validation.
//!
//! Reads a strategy from any `ConfigPort`. The `[strategy]` section holds the
//! scalar settings and the two rule texts; every name in its `indicators`
//! list has its own `[indicator.<name>]` section.

use crate::domain::error::SigtraderError;
use crate::domain::indicator::{bollinger, macd, stochastic, Algorithm, Source};
use crate::domain::ohlcv::BarField;
use crate::domain::rule_parser;
use crate::domain::strategy::{IndicatorSpec, RoiTable, StrategyConfig, StrategyParts, Timeframe};
use crate::ports::config_port::ConfigPort;
use std::str::FromStr;

const STRATEGY: &str = "strategy";

/// Check that every required key is present and non-empty.
pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    for key in ["name", "timeframe", "stoploss", "indicators", "entry_long", "exit_long"] {
        required(config, STRATEGY, key)?;
    }
    for id in indicator_ids(config)? {
        required(config, &indicator_section(&id), "algorithm")?;
    }
    Ok(())
}

/// Validate, then build the full `StrategyConfig`.
pub fn build_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, SigtraderError> {
    validate_strategy_config(config)?;

    let timeframe = required(config, STRATEGY, "timeframe")?
        .parse::<Timeframe>()
        .map_err(|reason| invalid(STRATEGY, "timeframe", reason))?;
    let stoploss = parse_value::<f64>(config, STRATEGY, "stoploss")?;
    let minimal_roi = match config.get_string(STRATEGY, "minimal_roi") {
        Some(text) if !text.trim().is_empty() => parse_roi(&text)?,
        _ => RoiTable::new(Vec::new())?,
    };

    let indicators = indicator_ids(config)?
        .iter()
        .map(|id| parse_indicator(config, id))
        .collect::<Result<Vec<_>, _>>()?;

    let entry_long = rule_parser::parse(&required(config, STRATEGY, "entry_long")?)?;
    let exit_long = rule_parser::parse(&required(config, STRATEGY, "exit_long")?)?;

    StrategyConfig::new(StrategyParts {
        name: required(config, STRATEGY, "name")?,
        description: config.get_string(STRATEGY, "description").unwrap_or_default(),
        timeframe,
        stoploss,
        minimal_roi,
        indicators,
        entry_long,
        exit_long,
    })
}

fn indicator_section(id: &str) -> String {
    format!("indicator.{}", id)
}

fn indicator_ids(config: &dyn ConfigPort) -> Result<Vec<String>, SigtraderError> {
    Ok(split_list(&required(config, STRATEGY, "indicators")?))
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, SigtraderError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(SigtraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> SigtraderError {
    SigtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn parse_value<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<T, SigtraderError> {
    let text = required(config, section, key)?;
    text.parse::<T>()
        .map_err(|_| invalid(section, key, format!("cannot parse '{}'", text)))
}

/// Optional value with a default; present but malformed is still an error.
fn parse_or<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, SigtraderError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => parse_value(config, section, key),
        _ => Ok(default),
    }
}

fn parse_roi(text: &str) -> Result<RoiTable, SigtraderError> {
    let mut entries = Vec::new();
    for item in split_list(text) {
        let (minutes, profit) = item
            .split_once(':')
            .ok_or_else(|| invalid(STRATEGY, "minimal_roi", format!("'{}' is not minutes:profit", item)))?;
        let minutes = minutes
            .trim()
            .parse::<u32>()
            .map_err(|_| invalid(STRATEGY, "minimal_roi", format!("bad minutes in '{}'", item)))?;
        let profit = profit
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(STRATEGY, "minimal_roi", format!("bad profit in '{}'", item)))?;
        entries.push((minutes, profit));
    }
    RoiTable::new(entries)
}

fn parse_indicator(config: &dyn ConfigPort, id: &str) -> Result<IndicatorSpec, SigtraderError> {
    let section = indicator_section(id);
    let section = section.as_str();
    let source = || -> Source {
        config
            .get_string(section, "source")
            .map(|s| Source::parse(s.trim()))
            .unwrap_or(Source::Field(BarField::Close))
    };
    let column_input = |key: &str| -> Result<Source, SigtraderError> {
        Ok(Source::parse(&required(config, section, key)?))
    };

    let name = required(config, section, "algorithm")?.to_ascii_lowercase();
    let algorithm = match name.as_str() {
        "sma" => Algorithm::Sma {
            period: parse_value(config, section, "period")?,
            source: source(),
        },
        "ema" => Algorithm::Ema {
            period: parse_value(config, section, "period")?,
            source: source(),
        },
        "rsi" => Algorithm::Rsi {
            period: parse_or(config, section, "period", 14)?,
            source: source(),
        },
        "macd" => Algorithm::Macd {
            fast: parse_or(config, section, "fast", macd::DEFAULT_FAST)?,
            slow: parse_or(config, section, "slow", macd::DEFAULT_SLOW)?,
            signal: parse_or(config, section, "signal", macd::DEFAULT_SIGNAL)?,
            source: source(),
        },
        "adx" => Algorithm::Adx {
            period: parse_or(config, section, "period", 14)?,
        },
        "bbands" => Algorithm::Bollinger {
            period: parse_or(config, section, "period", bollinger::DEFAULT_PERIOD)?,
            dev_up: parse_or(config, section, "dev_up", bollinger::DEFAULT_MULTIPLIER)?,
            dev_down: parse_or(config, section, "dev_down", bollinger::DEFAULT_MULTIPLIER)?,
            source: source(),
        },
        "stoch" => Algorithm::Stochastic {
            k_period: parse_or(config, section, "k_period", stochastic::DEFAULT_K_PERIOD)?,
            k_smooth: parse_or(config, section, "k_smooth", stochastic::DEFAULT_K_SMOOTH)?,
            d_period: parse_or(config, section, "d_period", stochastic::DEFAULT_D_PERIOD)?,
        },
        "willr" => Algorithm::WilliamsR {
            period: parse_or(config, section, "period", 14)?,
        },
        "band_percent" => Algorithm::BandPercent {
            value: column_input("value")?,
            lower: column_input("lower")?,
            upper: column_input("upper")?,
        },
        _ => return Err(SigtraderError::UnknownAlgorithm { name }),
    };

    let columns = match config.get_string(section, "columns") {
        Some(text) if !text.trim().is_empty() => split_list(&text),
        _ if algorithm.output_count() == 1 => vec![id.to_string()],
        _ => algorithm
            .output_names()
            .iter()
            .map(|suffix| format!("{}_{}", id, suffix))
            .collect(),
    };

    Ok(IndicatorSpec {
        columns,
        algorithm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    const MOMENTUM: &str = r#"
[strategy]
name = momentum
description = RSI dip in an uptrend
timeframe = 5m
stoploss = -0.10
minimal_roi = 60:0.01, 30:0.02, 0:0.04
indicators = rsi, sma_fast, sma_slow, volume_sma
entry_long = AND(rsi < 30, sma_fast > sma_slow, volume > volume_sma, close > sma_fast)
exit_long = OR(rsi > 70, sma_fast < sma_slow)

[indicator.rsi]
algorithm = rsi
period = 14

[indicator.sma_fast]
algorithm = sma
period = 9

[indicator.sma_slow]
algorithm = sma
period = 21

[indicator.volume_sma]
algorithm = sma
period = 20
source = volume
"#;

    #[test]
    fn valid_strategy_config_passes() {
        let config = make_config(MOMENTUM);
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn builds_full_strategy() {
        let strategy = build_strategy_config(&make_config(MOMENTUM)).unwrap();
        assert_eq!(strategy.name(), "momentum");
        assert_eq!(strategy.description(), "RSI dip in an uptrend");
        assert_eq!(strategy.timeframe().as_minutes(), 5);
        assert_eq!(strategy.stoploss(), -0.10);
        assert_eq!(
            strategy.minimal_roi().entries(),
            &[(60, 0.01), (30, 0.02), (0, 0.04)]
        );
        assert_eq!(
            strategy.column_names(),
            vec!["rsi", "sma_fast", "sma_slow", "volume_sma"]
        );
        assert_eq!(
            strategy.indicators()[3].algorithm,
            Algorithm::Sma {
                period: 20,
                source: Source::Field(BarField::Volume)
            }
        );
        assert_eq!(strategy.entry_long().conditions().len(), 4);
    }

    #[test]
    fn missing_entry_long_fails() {
        let text = MOMENTUM.replace(
            "entry_long = AND(rsi < 30, sma_fast > sma_slow, volume > volume_sma, close > sma_fast)\n",
            "",
        );
        let err = validate_strategy_config(&make_config(&text)).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigMissing { key, .. } if key == "entry_long"));
    }

    #[test]
    fn missing_indicator_section_fails() {
        let text = MOMENTUM.replace("[indicator.rsi]\nalgorithm = rsi\n", "");
        let err = validate_strategy_config(&make_config(&text)).unwrap_err();
        assert!(
            matches!(err, SigtraderError::ConfigMissing { section, key } if section == "indicator.rsi" && key == "algorithm")
        );
    }

    #[test]
    fn unknown_algorithm_fails() {
        let text = MOMENTUM.replace("algorithm = rsi", "algorithm = kama");
        let err = build_strategy_config(&make_config(&text)).unwrap_err();
        assert!(matches!(err, SigtraderError::UnknownAlgorithm { name } if name == "kama"));
    }

    #[test]
    fn negative_period_fails() {
        let text = MOMENTUM.replace("period = 9", "period = -9");
        let err = build_strategy_config(&make_config(&text)).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "period"));
    }

    #[test]
    fn zero_period_fails() {
        let text = MOMENTUM.replace("period = 9", "period = 0");
        let err = build_strategy_config(&make_config(&text)).unwrap_err();
        assert!(matches!(err, SigtraderError::InvalidParameter { .. }));
    }

    #[test]
    fn rule_with_undefined_operand_fails() {
        let text = MOMENTUM.replace("exit_long = OR(rsi > 70", "exit_long = OR(adx > 70");
        let err = build_strategy_config(&make_config(&text)).unwrap_err();
        assert!(matches!(err, SigtraderError::UndefinedOperand { name } if name == "adx"));
    }

    #[test]
    fn malformed_rule_fails() {
        let text = MOMENTUM.replace("exit_long = OR(rsi > 70, sma_fast < sma_slow)", "exit_long = OR(rsi >)");
        let err = build_strategy_config(&make_config(&text)).unwrap_err();
        assert!(matches!(err, SigtraderError::RuleParse(_)));
    }

    #[test]
    fn bad_timeframe_fails() {
        let text = MOMENTUM.replace("timeframe = 5m", "timeframe = fast");
        let err = build_strategy_config(&make_config(&text)).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "timeframe"));
    }

    #[test]
    fn oversized_timeframe_fails() {
        let text = MOMENTUM.replace("timeframe = 5m", "timeframe = 999999999w");
        let err = build_strategy_config(&make_config(&text)).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "timeframe"));
    }

    #[test]
    fn bad_roi_fails() {
        let text = MOMENTUM.replace("60:0.01, 30:0.02", "60-0.01, 30:0.02");
        let err = build_strategy_config(&make_config(&text)).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "minimal_roi"));
    }

    #[test]
    fn multi_output_columns_default_to_suffixes() {
        let text = r#"
[strategy]
name = trend
timeframe = 15m
stoploss = -0.08
indicators = m
entry_long = m_macd > m_signal
exit_long = m_histogram < 0

[indicator.m]
algorithm = macd
"#;
        let strategy = build_strategy_config(&make_config(text)).unwrap();
        assert_eq!(
            strategy.column_names(),
            vec!["m_macd", "m_signal", "m_histogram"]
        );
        assert!(strategy.minimal_roi().is_empty());
    }

    #[test]
    fn band_percent_reads_earlier_columns() {
        let text = r#"
[strategy]
name = reversion
timeframe = 1m
stoploss = -0.12
indicators = bb, bb_percent
entry_long = bb_percent < 0.2
exit_long = bb_percent > 0.8

[indicator.bb]
algorithm = bbands
columns = bb_lowerband, bb_middleband, bb_upperband

[indicator.bb_percent]
algorithm = band_percent
value = close
lower = bb_lowerband
upper = bb_upperband
"#;
        let strategy = build_strategy_config(&make_config(text)).unwrap();
        assert_eq!(
            strategy.indicators()[1].algorithm,
            Algorithm::BandPercent {
                value: Source::Field(BarField::Close),
                lower: Source::Column("bb_lowerband".into()),
                upper: Source::Column("bb_upperband".into()),
            }
        );
    }
}

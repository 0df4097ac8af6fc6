//! Strategy configuration and composition.
//!
//! A `StrategyConfig` is immutable data: timeframe, stoploss, the
//! return-on-investment table handed through to the host, the indicator list
//! and the entry/exit rule trees. `StrategyConfig::new` is the only way to
//! build one and rejects malformed configurations up front.

use crate::domain::error::SigtraderError;
use crate::domain::indicator::{Algorithm, Source};
use crate::domain::ohlcv::BarField;
use crate::domain::rule::Rule;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// One entry of the indicator configuration: an algorithm and the column
/// names its outputs are stored under, in output order.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSpec {
    pub columns: Vec<String>,
    pub algorithm: Algorithm,
}

impl IndicatorSpec {
    /// A single-output indicator.
    pub fn new(column: &str, algorithm: Algorithm) -> Self {
        Self {
            columns: vec![column.to_string()],
            algorithm,
        }
    }

    /// A multi-output indicator; `columns` bind positionally to
    /// `Algorithm::output_names`.
    pub fn multi(columns: &[&str], algorithm: Algorithm) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            algorithm,
        }
    }

    /// Name used in error messages.
    pub fn label(&self) -> &str {
        self.columns
            .first()
            .map(String::as_str)
            .unwrap_or_else(|| self.algorithm.name())
    }

    pub fn validate(&self) -> Result<(), SigtraderError> {
        let label = self.label();
        if self.columns.len() != self.algorithm.output_count() {
            return Err(SigtraderError::InvalidParameter {
                indicator: label.to_string(),
                reason: format!(
                    "{} produces {} columns, {} named",
                    self.algorithm.name(),
                    self.algorithm.output_count(),
                    self.columns.len()
                ),
            });
        }
        for column in &self.columns {
            if column.trim().is_empty() {
                return Err(SigtraderError::InvalidParameter {
                    indicator: label.to_string(),
                    reason: "column names must not be empty".into(),
                });
            }
        }
        self.algorithm.validate(label)
    }
}

/// Candle duration label such as `5m` or `1h`. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeframe {
    minutes: u32,
}

impl Timeframe {
    pub fn minutes(n: u32) -> Self {
        Self { minutes: n }
    }

    pub fn as_minutes(&self) -> u32 {
        self.minutes
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("timeframe '{}' has no unit", s))?;
        let (count, unit) = s.split_at(split);
        let count: u32 = count
            .parse()
            .map_err(|_| format!("timeframe '{}' has no count", s))?;
        let scale = match unit {
            "m" => 1,
            "h" => 60,
            "d" => 60 * 24,
            "w" => 60 * 24 * 7,
            _ => return Err(format!("timeframe '{}' has unknown unit '{}'", s, unit)),
        };
        if count == 0 {
            return Err(format!("timeframe '{}' must be positive", s));
        }
        let minutes = count
            .checked_mul(scale)
            .ok_or_else(|| format!("timeframe '{}' is too large", s))?;
        Ok(Self { minutes })
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.minutes;
        if m % (60 * 24 * 7) == 0 {
            write!(f, "{}w", m / (60 * 24 * 7))
        } else if m % (60 * 24) == 0 {
            write!(f, "{}d", m / (60 * 24))
        } else if m % 60 == 0 {
            write!(f, "{}h", m / 60)
        } else {
            write!(f, "{}m", m)
        }
    }
}

/// Minimum-profit exit schedule: (minutes since entry, minimum profit).
/// Kept in the order supplied; applying it is the host's job.
#[derive(Debug, Clone, PartialEq)]
pub struct RoiTable {
    entries: Vec<(u32, f64)>,
}

impl RoiTable {
    pub fn new(entries: Vec<(u32, f64)>) -> Result<Self, SigtraderError> {
        let mut seen = HashSet::new();
        for (minutes, profit) in &entries {
            if !seen.insert(*minutes) {
                return Err(SigtraderError::InvalidStrategy {
                    reason: format!("minimal_roi threshold {} appears twice", minutes),
                });
            }
            if !profit.is_finite() {
                return Err(SigtraderError::InvalidStrategy {
                    reason: format!("minimal_roi value at {} must be finite", minutes),
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(u32, f64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for RoiTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (minutes, profit)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}:{}", minutes, profit)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct StrategyConfig {
    name: String,
    description: String,
    timeframe: Timeframe,
    stoploss: f64,
    minimal_roi: RoiTable,
    indicators: Vec<IndicatorSpec>,
    entry_long: Rule,
    exit_long: Rule,
}

/// Unvalidated parts of a strategy, handed to `StrategyConfig::new`.
#[derive(Debug, Clone)]
pub struct StrategyParts {
    pub name: String,
    pub description: String,
    pub timeframe: Timeframe,
    pub stoploss: f64,
    pub minimal_roi: RoiTable,
    pub indicators: Vec<IndicatorSpec>,
    pub entry_long: Rule,
    pub exit_long: Rule,
}

impl StrategyConfig {
    pub fn new(parts: StrategyParts) -> Result<Self, SigtraderError> {
        if parts.name.trim().is_empty() {
            return Err(SigtraderError::InvalidStrategy {
                reason: "name must not be empty".into(),
            });
        }
        if !parts.stoploss.is_finite() || parts.stoploss >= 0.0 || parts.stoploss <= -1.0 {
            return Err(SigtraderError::InvalidStrategy {
                reason: format!(
                    "stoploss must be a negative fraction above -1, got {}",
                    parts.stoploss
                ),
            });
        }

        let columns = check_indicators(&parts.indicators)?;
        for rule in [&parts.entry_long, &parts.exit_long] {
            rule.validate_shape()?;
            for name in rule.referenced_indicators() {
                if !columns.contains(name) {
                    return Err(SigtraderError::UndefinedOperand {
                        name: name.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            name: parts.name,
            description: parts.description,
            timeframe: parts.timeframe,
            stoploss: parts.stoploss,
            minimal_roi: parts.minimal_roi,
            indicators: parts.indicators,
            entry_long: parts.entry_long,
            exit_long: parts.exit_long,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn stoploss(&self) -> f64 {
        self.stoploss
    }

    pub fn minimal_roi(&self) -> &RoiTable {
        &self.minimal_roi
    }

    pub fn indicators(&self) -> &[IndicatorSpec] {
        &self.indicators
    }

    pub fn entry_long(&self) -> &Rule {
        &self.entry_long
    }

    pub fn exit_long(&self) -> &Rule {
        &self.exit_long
    }

    /// Every column the indicator list produces, in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.indicators
            .iter()
            .flat_map(|spec| spec.columns.iter().map(String::as_str))
            .collect()
    }
}

/// Validate each indicator and make sure its inputs are produced earlier.
/// Returns the full set of produced column names.
fn check_indicators(indicators: &[IndicatorSpec]) -> Result<HashSet<&str>, SigtraderError> {
    let mut produced: HashSet<&str> = HashSet::new();
    for spec in indicators {
        spec.validate()?;
        for input in spec.algorithm.inputs() {
            if let Source::Column(name) = input {
                if !produced.contains(name.as_str()) {
                    return Err(SigtraderError::UnknownInput {
                        indicator: spec.label().to_string(),
                        input: name.clone(),
                    });
                }
            }
        }
        for column in &spec.columns {
            if column.parse::<BarField>().is_ok() || !produced.insert(column.as_str()) {
                return Err(SigtraderError::DuplicateColumn {
                    name: column.clone(),
                });
            }
        }
    }
    Ok(produced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rule::{Comparison, Operand};

    fn col(name: &str) -> Operand {
        Operand::indicator(name)
    }

    fn rsi_spec() -> IndicatorSpec {
        IndicatorSpec::new(
            "rsi",
            Algorithm::Rsi {
                period: 14,
                source: Source::Field(BarField::Close),
            },
        )
    }

    fn sample_parts() -> StrategyParts {
        StrategyParts {
            name: "RSI".into(),
            description: "RSI band".into(),
            timeframe: Timeframe::minutes(5),
            stoploss: -0.10,
            minimal_roi: RoiTable::new(vec![(60, 0.01), (30, 0.02), (0, 0.04)]).unwrap(),
            indicators: vec![rsi_spec()],
            entry_long: Rule::cmp(col("rsi"), Comparison::Lt, Operand::Constant(30.0)),
            exit_long: Rule::cmp(col("rsi"), Comparison::Gt, Operand::Constant(70.0)),
        }
    }

    #[test]
    fn valid_strategy_builds() {
        let config = StrategyConfig::new(sample_parts()).unwrap();
        assert_eq!(config.name(), "RSI");
        assert_eq!(config.stoploss(), -0.10);
        assert_eq!(config.timeframe().as_minutes(), 5);
        assert_eq!(config.column_names(), vec!["rsi"]);
        assert_eq!(config.minimal_roi().entries()[2], (0, 0.04));
    }

    #[test]
    fn rule_referencing_missing_column_is_rejected() {
        let parts = StrategyParts {
            exit_long: Rule::cmp(col("sma_fast"), Comparison::Gt, Operand::Constant(1.0)),
            ..sample_parts()
        };
        let err = StrategyConfig::new(parts).unwrap_err();
        assert!(matches!(err, SigtraderError::UndefinedOperand { ref name } if name == "sma_fast"));
        assert!(err.is_configuration());
    }

    #[test]
    fn positive_stoploss_is_rejected() {
        let parts = StrategyParts {
            stoploss: 0.1,
            ..sample_parts()
        };
        assert!(StrategyConfig::new(parts).is_err());
    }

    #[test]
    fn zero_period_is_rejected() {
        let parts = StrategyParts {
            indicators: vec![IndicatorSpec::new(
                "rsi",
                Algorithm::Rsi {
                    period: 0,
                    source: Source::Field(BarField::Close),
                },
            )],
            ..sample_parts()
        };
        assert!(matches!(
            StrategyConfig::new(parts),
            Err(SigtraderError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn duplicate_column_is_rejected() {
        let parts = StrategyParts {
            indicators: vec![rsi_spec(), rsi_spec()],
            ..sample_parts()
        };
        assert!(matches!(
            StrategyConfig::new(parts),
            Err(SigtraderError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn column_shadowing_bar_field_is_rejected() {
        let parts = StrategyParts {
            indicators: vec![IndicatorSpec::new(
                "close",
                Algorithm::Rsi {
                    period: 14,
                    source: Source::Field(BarField::Close),
                },
            )],
            ..sample_parts()
        };
        assert!(StrategyConfig::new(parts).is_err());
    }

    #[test]
    fn forward_input_reference_is_rejected() {
        let parts = StrategyParts {
            indicators: vec![
                IndicatorSpec::new(
                    "rsi_sma",
                    Algorithm::Sma {
                        period: 3,
                        source: Source::Column("rsi".into()),
                    },
                ),
                rsi_spec(),
            ],
            ..sample_parts()
        };
        assert!(matches!(
            StrategyConfig::new(parts),
            Err(SigtraderError::UnknownInput { .. })
        ));
    }

    #[test]
    fn wrong_column_count_is_rejected() {
        let spec = IndicatorSpec::new(
            "macd",
            Algorithm::Macd {
                fast: 12,
                slow: 26,
                signal: 9,
                source: Source::Field(BarField::Close),
            },
        );
        assert!(spec.validate().is_err());
    }

    #[test]
    fn empty_combinator_is_rejected() {
        let parts = StrategyParts {
            entry_long: Rule::And(vec![]),
            ..sample_parts()
        };
        assert!(matches!(
            StrategyConfig::new(parts),
            Err(SigtraderError::EmptyCombinator { .. })
        ));
    }

    #[test]
    fn timeframe_parse() {
        assert_eq!("5m".parse::<Timeframe>().unwrap().as_minutes(), 5);
        assert_eq!("15m".parse::<Timeframe>().unwrap().as_minutes(), 15);
        assert_eq!("1h".parse::<Timeframe>().unwrap().as_minutes(), 60);
        assert_eq!("1d".parse::<Timeframe>().unwrap().as_minutes(), 1440);
        assert!("5".parse::<Timeframe>().is_err());
        assert!("m".parse::<Timeframe>().is_err());
        assert!("0m".parse::<Timeframe>().is_err());
        assert!("5y".parse::<Timeframe>().is_err());
        assert!("999999999w".parse::<Timeframe>().is_err());
        assert_eq!(
            "4294967295m".parse::<Timeframe>().unwrap().as_minutes(),
            u32::MAX
        );
    }

    #[test]
    fn timeframe_display() {
        assert_eq!(Timeframe::minutes(15).to_string(), "15m");
        assert_eq!(Timeframe::minutes(120).to_string(), "2h");
        assert_eq!(Timeframe::minutes(1440).to_string(), "1d");
    }

    #[test]
    fn roi_rejects_duplicate_threshold() {
        assert!(RoiTable::new(vec![(0, 0.04), (0, 0.02)]).is_err());
    }

    #[test]
    fn roi_keeps_given_order() {
        let roi = RoiTable::new(vec![(0, 0.04), (60, 0.01), (30, 0.02)]).unwrap();
        assert_eq!(roi.entries(), &[(0, 0.04), (60, 0.01), (30, 0.02)]);
        assert_eq!(roi.to_string(), "0:0.04, 60:0.01, 30:0.02");
    }
}

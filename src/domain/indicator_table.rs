//! Indicator table and the calculator that assembles it.
//!
//! The table owns the bar sequence plus every named indicator column, all
//! aligned by index. It is built once per (bars, strategy) pair and never
//! mutated afterwards: the only way to add a column is the consuming
//! `with_column`.

use crate::domain::error::SigtraderError;
use crate::domain::indicator::{
    calculate_adx, calculate_bollinger, calculate_ema, calculate_macd, calculate_percent_b,
    calculate_rsi, calculate_sma, calculate_stochastic, calculate_williams_r, Algorithm,
    IndicatorSeries, Source,
};
use crate::domain::ohlcv::{validate_bars, Bar, BarField};
use crate::domain::rule::Operand;
use crate::domain::strategy::IndicatorSpec;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct IndicatorTable {
    bars: Vec<Bar>,
    columns: Vec<(String, IndicatorSeries)>,
}

impl IndicatorTable {
    /// A table with no indicator columns yet.
    pub fn new(bars: Vec<Bar>) -> Self {
        Self {
            bars,
            columns: Vec::new(),
        }
    }

    /// Add a named column. The series must match the bar count and the name
    /// must not collide with a bar field or an existing column.
    pub fn with_column(
        mut self,
        name: &str,
        series: IndicatorSeries,
    ) -> Result<Self, SigtraderError> {
        if series.len() != self.bars.len() {
            return Err(SigtraderError::LengthMismatch {
                name: name.to_string(),
                expected: self.bars.len(),
                actual: series.len(),
            });
        }
        if name.parse::<BarField>().is_ok() || self.column(name).is_some() {
            return Err(SigtraderError::DuplicateColumn {
                name: name.to_string(),
            });
        }
        self.columns.push((name.to_string(), series));
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn column(&self, name: &str) -> Option<&IndicatorSeries> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, series)| series)
    }

    /// Columns in the order they were added.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &IndicatorSeries)> {
        self.columns.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Whether an operand can be resolved against this table.
    pub fn has_operand(&self, operand: &Operand) -> bool {
        match operand {
            Operand::Indicator(name) => self.column(name).is_some(),
            Operand::Field(_) | Operand::Constant(_) => true,
        }
    }

    /// The operand's value at `index`, or `None` when it is undefined there.
    pub fn value(&self, operand: &Operand, index: usize) -> Option<f64> {
        match operand {
            Operand::Constant(v) => Some(*v).filter(|v| v.is_finite()),
            Operand::Field(field) => self.bars.get(index).map(|b| b.field(*field)),
            Operand::Indicator(name) => self.column(name)?.get(index),
        }
    }

    fn resolve(&self, source: &Source, indicator: &str) -> Result<IndicatorSeries, SigtraderError> {
        match source {
            Source::Field(field) => Ok(IndicatorSeries::from(field.column(&self.bars))),
            Source::Column(name) => {
                self.column(name)
                    .cloned()
                    .ok_or_else(|| SigtraderError::UnknownInput {
                        indicator: indicator.to_string(),
                        input: name.clone(),
                    })
            }
        }
    }
}

/// Run every configured indicator in order over `bars` and assemble the table.
///
/// Later indicators may read columns produced by earlier ones.
pub fn build_indicator_table(
    bars: &[Bar],
    indicators: &[IndicatorSpec],
) -> Result<IndicatorTable, SigtraderError> {
    validate_bars(bars)?;

    let mut table = IndicatorTable::new(bars.to_vec());
    for spec in indicators {
        spec.validate()?;
        let outputs = compute_outputs(&table, spec)?;
        for (name, series) in spec.columns.iter().zip(outputs) {
            debug!(
                column = %name,
                algorithm = %spec.algorithm,
                warmup = series.warmup,
                defined = series.defined_count(),
                "indicator column computed"
            );
            table = table.with_column(name, series)?;
        }
    }

    Ok(table)
}

fn compute_outputs(
    table: &IndicatorTable,
    spec: &IndicatorSpec,
) -> Result<Vec<IndicatorSeries>, SigtraderError> {
    let label = spec.label();
    let bars = table.bars();
    let high = || BarField::High.column(bars);
    let low = || BarField::Low.column(bars);
    let close = || BarField::Close.column(bars);

    let outputs = match &spec.algorithm {
        Algorithm::Sma { period, source } => {
            vec![calculate_sma(&table.resolve(source, label)?, *period)]
        }
        Algorithm::Ema { period, source } => {
            vec![calculate_ema(&table.resolve(source, label)?, *period)]
        }
        Algorithm::Rsi { period, source } => {
            vec![calculate_rsi(&table.resolve(source, label)?, *period)]
        }
        Algorithm::Macd {
            fast,
            slow,
            signal,
            source,
        } => {
            let out = calculate_macd(&table.resolve(source, label)?, *fast, *slow, *signal);
            vec![out.macd, out.signal, out.histogram]
        }
        Algorithm::Adx { period } => vec![calculate_adx(&high(), &low(), &close(), *period)],
        Algorithm::Bollinger {
            period,
            dev_up,
            dev_down,
            source,
        } => {
            let out = calculate_bollinger(&table.resolve(source, label)?, *period, *dev_up, *dev_down);
            vec![out.lower, out.middle, out.upper]
        }
        Algorithm::Stochastic {
            k_period,
            k_smooth,
            d_period,
        } => {
            let out = calculate_stochastic(&high(), &low(), &close(), *k_period, *k_smooth, *d_period);
            vec![out.slowk, out.slowd]
        }
        Algorithm::WilliamsR { period } => {
            vec![calculate_williams_r(&high(), &low(), &close(), *period)]
        }
        Algorithm::BandPercent {
            value,
            lower,
            upper,
        } => vec![calculate_percent_b(
            &table.resolve(value, label)?,
            &table.resolve(lower, label)?,
            &table.resolve(upper, label)?,
        )],
    };

    Ok(outputs)
}

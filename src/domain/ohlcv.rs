//! OHLCV bar representation and raw bar fields.

use crate::domain::error::SigtraderError;
use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn field(&self, field: BarField) -> f64 {
        match field {
            BarField::Open => self.open,
            BarField::High => self.high,
            BarField::Low => self.low,
            BarField::Close => self.close,
            BarField::Volume => self.volume,
        }
    }
}

/// A raw column of the bar sequence that rules and indicators can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl BarField {
    pub const ALL: [BarField; 5] = [
        BarField::Open,
        BarField::High,
        BarField::Low,
        BarField::Close,
        BarField::Volume,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BarField::Open => "open",
            BarField::High => "high",
            BarField::Low => "low",
            BarField::Close => "close",
            BarField::Volume => "volume",
        }
    }

    /// Extract this field from every bar as a column.
    pub fn column(self, bars: &[Bar]) -> Vec<f64> {
        bars.iter().map(|b| b.field(self)).collect()
    }
}

impl fmt::Display for BarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BarField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(BarField::Open),
            "high" => Ok(BarField::High),
            "low" => Ok(BarField::Low),
            "close" => Ok(BarField::Close),
            "volume" => Ok(BarField::Volume),
            _ => Err(()),
        }
    }
}

/// Check the sequence contract: strictly increasing timestamps, positive
/// prices inside each bar's low/high range, and non-negative volume.
pub fn validate_bars(bars: &[Bar]) -> Result<(), SigtraderError> {
    for (i, bar) in bars.iter().enumerate() {
        let prices = [bar.open, bar.high, bar.low, bar.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(SigtraderError::InvalidBar {
                index: i,
                reason: "prices must be positive".into(),
            });
        }
        if bar.low > bar.high
            || [bar.open, bar.close]
                .iter()
                .any(|p| *p < bar.low || *p > bar.high)
        {
            return Err(SigtraderError::InvalidBar {
                index: i,
                reason: "open and close must lie within low..=high".into(),
            });
        }
        if !bar.volume.is_finite() || bar.volume < 0.0 {
            return Err(SigtraderError::InvalidBar {
                index: i,
                reason: "volume must be non-negative".into(),
            });
        }
        if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
            return Err(SigtraderError::BarOrder { index: i });
        }
    }
    Ok(())
}

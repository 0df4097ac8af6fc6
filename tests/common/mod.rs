#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use sigtrader::domain::error::SigtraderError;
pub use sigtrader::domain::ohlcv::Bar;
use sigtrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, pair: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(pair.to_string(), bars);
        self
    }

    pub fn with_error(mut self, pair: &str, reason: &str) -> Self {
        self.errors.insert(pair.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, pair: &str) -> Result<Vec<Bar>, SigtraderError> {
        if let Some(reason) = self.errors.get(pair) {
            return Err(SigtraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(pair).cloned().unwrap_or_default())
    }

    fn list_pairs(&self) -> Result<Vec<String>, SigtraderError> {
        let mut pairs: Vec<String> = self.data.keys().cloned().collect();
        pairs.sort();
        Ok(pairs)
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// One bar per minute with a one-point high/low spread around each close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i, close, 1000.0))
        .collect()
}

pub fn make_bar(index: usize, close: f64, volume: f64) -> Bar {
    Bar {
        timestamp: start_time() + Duration::minutes(index as i64),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume,
    }
}

/// `count` bars where high, low and close are all `price`.
pub fn flat_bars(count: usize, price: f64) -> Vec<Bar> {
    (0..count)
        .map(|i| Bar {
            timestamp: start_time() + Duration::minutes(i as i64),
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 500.0,
        })
        .collect()
}

/// A smooth oscillation around `base` with slow drift.
pub fn wave_bars(count: usize, base: f64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            let t = i as f64;
            base + 8.0 * (t / 6.0).sin() + 0.05 * t
        })
        .collect();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i, close, 1000.0 + (i % 7) as f64 * 50.0))
        .collect()
}

pub fn write_csv(path: &std::path::Path, bars: &[Bar]) {
    let mut text = String::from("timestamp,open,high,low,close,volume\n");
    for bar in bars {
        text.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        ));
    }
    std::fs::write(path, text).unwrap();
}

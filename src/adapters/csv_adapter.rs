//! CSV file data adapter.
//!
//! Bars are read from `<base>/<pair>.csv` (a `/` in the pair name becomes
//! `_`) with header `timestamp,open,high,low,close,volume`. Populated frames
//! are written back as CSV with undefined indicator values left empty.

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::{validate_bars, Bar};
use crate::domain::signal::SignalFrame;
use crate::ports::data_port::DataPort;
use crate::ports::signal_sink::SignalSink;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
struct CsvBar {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, pair: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", pair.replace('/', "_")))
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD` or integer epoch
/// seconds. Offsets are normalised to UTC.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT) {
        return Some(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    text.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.naive_utc())
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, pair: &str) -> Result<Vec<Bar>, SigtraderError> {
        let path = self.csv_path(pair);
        let content = fs::read_to_string(&path).map_err(|e| SigtraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (i, result) in rdr.deserialize::<CsvBar>().enumerate() {
            let row = result.map_err(|e| SigtraderError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            let timestamp =
                parse_timestamp(&row.timestamp).ok_or_else(|| SigtraderError::InvalidBar {
                    index: i,
                    reason: format!("unrecognised timestamp '{}'", row.timestamp),
                })?;
            bars.push(Bar {
                timestamp,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }

        validate_bars(&bars)?;
        debug!(pair, bars = bars.len(), path = %path.display(), "bars loaded");
        Ok(bars)
    }

    fn list_pairs(&self) -> Result<Vec<String>, SigtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SigtraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut pairs = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(stem) = name.strip_suffix(".csv") {
                pairs.push(stem.to_string());
            }
        }

        pairs.sort();
        Ok(pairs)
    }
}

fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl SignalSink for CsvAdapter {
    fn write_frame(&self, frame: &SignalFrame, output_path: &Path) -> Result<(), SigtraderError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| SigtraderError::Data {
            reason: format!("failed to create {}: {}", output_path.display(), e),
        })?;
        let csv_err = |e: csv::Error| SigtraderError::Data {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        };

        let table = frame.table();
        let mut header: Vec<&str> = vec!["timestamp", "open", "high", "low", "close", "volume"];
        header.extend(table.column_names());
        header.extend(["entry_long", "exit_long"]);
        wtr.write_record(&header).map_err(csv_err)?;

        for (i, bar) in frame.bars().iter().enumerate() {
            let mut record = vec![
                bar.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
            ];
            record.extend(table.columns().map(|(_, series)| format_value(series.get(i))));
            record.push(frame.entry_long()[i].to_string());
            record.push(frame.exit_long()[i].to_string());
            wtr.write_record(&record).map_err(csv_err)?;
        }

        wtr.flush()?;
        debug!(rows = frame.len(), path = %output_path.display(), "signal frame written");
        Ok(())
    }
}

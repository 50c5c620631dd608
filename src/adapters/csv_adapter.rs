//! CSV bar file adapter.
//!
//! Expected columns: `timestamp,open,high,low,close`, one header row,
//! timestamps as `YYYY-MM-DD HH:MM:SS` (a `T` separator is also accepted).
//! Bars must be in strictly increasing timestamp order.

use crate::domain::bar::Bar;
use crate::domain::error::StrategyError;
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub struct CsvBarAdapter {
    path: PathBuf,
    tick_size: f64,
}

impl CsvBarAdapter {
    pub fn new<P: AsRef<Path>>(path: P, tick_size: f64) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            tick_size,
        }
    }

    pub fn read_bars(&self) -> Result<Vec<Bar>, StrategyError> {
        let content = fs::read_to_string(&self.path)?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars: Vec<Bar> = Vec::new();

        for (index, result) in rdr.records().enumerate() {
            let line = index + 2;
            let record = result.map_err(|e| bar_error(line, format!("CSV parse error: {e}")))?;

            let raw_ts = field(&record, 0, "timestamp", line)?;
            let timestamp = parse_timestamp(raw_ts)
                .ok_or_else(|| bar_error(line, format!("invalid timestamp {raw_ts:?}")))?;

            let bar = Bar {
                timestamp,
                open: price(&record, 1, "open", line)?,
                high: price(&record, 2, "high", line)?,
                low: price(&record, 3, "low", line)?,
                close: price(&record, 4, "close", line)?,
                tick_size: self.tick_size,
            };

            if bar.high < bar.low {
                return Err(bar_error(line, "high below low".to_string()));
            }
            if let Some(prev) = bars.last() {
                if bar.timestamp <= prev.timestamp {
                    return Err(bar_error(
                        line,
                        format!("timestamp {} not after {}", bar.timestamp, prev.timestamp),
                    ));
                }
            }
            bars.push(bar);
        }

        Ok(bars)
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw.trim(), fmt).ok())
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize, name: &str, line: usize) -> Result<&'r str, StrategyError> {
    record
        .get(idx)
        .ok_or_else(|| bar_error(line, format!("missing {name} column")))
}

fn price(record: &csv::StringRecord, idx: usize, name: &str, line: usize) -> Result<f64, StrategyError> {
    field(record, idx, name, line)?
        .trim()
        .parse()
        .map_err(|e| bar_error(line, format!("invalid {name} value: {e}")))
}

fn bar_error(line: usize, reason: String) -> StrategyError {
    StrategyError::BarData {
        reason: format!("line {line}: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn write_bars(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bars.csv");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn read_bars_returns_correct_data() {
        let (_dir, path) = write_bars(
            "timestamp,open,high,low,close\n\
             2024-01-15 03:30:00,100.0,101.0,99.5,100.75\n\
             2024-01-15T03:31:00,100.75,101.5,100.5,101.25\n",
        );
        let bars = CsvBarAdapter::new(path, 0.25).read_bars().unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(
            bars[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(3, 30, 0)
                .unwrap()
        );
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 101.0);
        assert_eq!(bars[0].low, 99.5);
        assert_eq!(bars[0].close, 100.75);
        assert_eq!(bars[1].tick_size, 0.25);
    }

    #[test]
    fn rejects_out_of_order_timestamps() {
        let (_dir, path) = write_bars(
            "timestamp,open,high,low,close\n\
             2024-01-15 03:31:00,100,101,99,100\n\
             2024-01-15 03:30:00,100,101,99,100\n",
        );
        let err = CsvBarAdapter::new(path, 0.25).read_bars().unwrap_err();
        assert!(matches!(err, StrategyError::BarData { reason } if reason.starts_with("line 3")));
    }

    #[test]
    fn rejects_bad_price() {
        let (_dir, path) = write_bars("timestamp,open,high,low,close\n2024-01-15 03:30:00,abc,101,99,100\n");
        let err = CsvBarAdapter::new(path, 0.25).read_bars().unwrap_err();
        assert!(matches!(err, StrategyError::BarData { reason } if reason.contains("open")));
    }

    #[test]
    fn rejects_bad_timestamp() {
        let (_dir, path) = write_bars("timestamp,open,high,low,close\n15/01/2024,100,101,99,100\n");
        assert!(matches!(
            CsvBarAdapter::new(path, 0.25).read_bars(),
            Err(StrategyError::BarData { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = CsvBarAdapter::new("/nonexistent/bars.csv", 0.25).read_bars();
        assert!(matches!(result, Err(StrategyError::Io(_))));
    }
}

//! Time-of-day trading window.
//!
//! Both bounds are inclusive. A window whose start is later than its end
//! wraps past midnight (e.g. 23:00–04:00).

use chrono::NaiveTime;

use crate::domain::error::StrategyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TradingWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        TradingWindow { start, end }
    }

    /// Parse `HH:MM` or `HH:MM:SS` bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self, StrategyError> {
        Ok(TradingWindow {
            start: parse_time_of_day(start, "session_start")?,
            end: parse_time_of_day(end, "session_end")?,
        })
    }

    pub fn crosses_midnight(&self) -> bool {
        self.start > self.end
    }

    pub fn is_eligible(&self, time: NaiveTime) -> bool {
        if self.crosses_midnight() {
            // not (before start and after end)
            !(time < self.start && time > self.end)
        } else {
            time >= self.start && time <= self.end
        }
    }
}

pub fn parse_time_of_day(value: &str, field: &str) -> Result<NaiveTime, StrategyError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| StrategyError::InvalidWindowConfig {
            field: field.to_string(),
            value: value.to_string(),
        })
}

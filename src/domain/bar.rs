//! Price bar consumed by the strategy core.
//!
//! Bars arrive already formed (time, tick or renko aggregation happens
//! upstream) and in strictly increasing timestamp order.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Instrument tick size as reported by the bar source. Order sizing
    /// reads the broker's tick size instead.
    pub tick_size: f64,
}

impl Bar {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn time_of_day(&self) -> NaiveTime {
        self.timestamp.time()
    }

    /// (high + low) / 2
    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// Green brick: close above open.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Red brick: close below open.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

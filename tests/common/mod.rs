#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
pub use renkotrader::adapters::recording_broker::{BrokerCall, RecordingBroker};
pub use renkotrader::domain::bar::Bar;
use renkotrader::domain::config::StrategyConfig;
use renkotrader::domain::order::{FillEvent, OrderAction, OrderRole};
use renkotrader::domain::risk::RiskPolicy;
use renkotrader::domain::window::TradingWindow;

pub const TICK_SIZE: f64 = 0.25;
pub const POINT_VALUE: f64 = 50.0;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    date(2024, 6, day).and_hms_opt(h, m, 0).unwrap()
}

pub fn make_bar(timestamp: NaiveDateTime, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar {
        timestamp,
        open,
        high,
        low,
        close,
        tick_size: TICK_SIZE,
    }
}

/// Green bar closing near its high: Williams %R(3) of -10 over a 100..110 range.
pub fn strong_green(timestamp: NaiveDateTime) -> Bar {
    make_bar(timestamp, 100.0, 110.0, 100.0, 109.0)
}

pub fn broker() -> RecordingBroker {
    RecordingBroker::new(TICK_SIZE, POINT_VALUE)
}

pub fn fill(action: OrderAction, role: OrderRole, price: f64, quantity: u32, timestamp: NaiveDateTime) -> FillEvent {
    FillEvent {
        price,
        quantity,
        action,
        role,
        timestamp,
    }
}

/// Momentum config with %R(3), no warm-up gate, an all-day window and no
/// risk limits. Tests switch on what they exercise.
pub fn momentum_config() -> StrategyConfig {
    StrategyConfig {
        williams_period: 3,
        bars_required_to_trade: 0,
        window: TradingWindow::new(NaiveTime::MIN, NaiveTime::from_hms_opt(23, 59, 59).unwrap()),
        risk: RiskPolicy::default(),
        ..StrategyConfig::default()
    }
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

//! Order-level vocabulary shared by the state machine, the risk tracker and
//! the broker port.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of market exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }

    /// The order side that opens exposure in this direction.
    pub fn opening_action(self) -> OrderAction {
        match self {
            Side::Long => OrderAction::Buy,
            Side::Short => OrderAction::Sell,
        }
    }

    /// The order side that closes exposure in this direction.
    pub fn closing_action(self) -> OrderAction {
        match self {
            Side::Long => OrderAction::Sell,
            Side::Short => OrderAction::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderAction {
    Buy,
    Sell,
}

/// Which order produced a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderRole {
    Entry,
    /// Strategy-initiated exit (signal or forced flat).
    Exit,
    Stop,
    Target,
}

impl OrderRole {
    pub fn is_closing(self) -> bool {
        !matches!(self, OrderRole::Entry)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillEvent {
    pub price: f64,
    pub quantity: u32,
    pub action: OrderAction,
    pub role: OrderRole,
    pub timestamp: NaiveDateTime,
}

/// Profit target attached to an entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfitTarget {
    Ticks(u32),
    /// Monetary amount for the whole position.
    Currency(f64),
}

/// A trade decision produced for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    EnterLong,
    EnterShort,
    ExitLong,
    ExitShort,
    /// Exit whichever side is open.
    Exit,
}

impl Intent {
    pub fn is_entry(self) -> bool {
        matches!(self, Intent::EnterLong | Intent::EnterShort)
    }
}

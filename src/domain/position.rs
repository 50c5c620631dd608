//! Position and order lifecycle.
//!
//! Flat -> Entering -> Long | Short -> Exiting -> Flat
//!
//! Only [`PositionStateMachine`] writes [`PositionState`]. Intents move it
//! forward by calling the broker; fills confirm the move. At most one
//! position is open at a time and a second entry is rejected.

use std::fmt;

use tracing::{debug, info};

use crate::domain::error::StrategyError;
use crate::domain::order::{FillEvent, Intent, OrderRole, ProfitTarget, Side};
use crate::domain::risk::realized_pnl;
use crate::ports::broker_port::BrokerPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    Flat,
    Entering(Side),
    Long,
    Short,
    Exiting(Side),
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionStatus::Flat => write!(f, "flat"),
            PositionStatus::Entering(side) => write!(f, "entering {side}"),
            PositionStatus::Long => write!(f, "long"),
            PositionStatus::Short => write!(f, "short"),
            PositionStatus::Exiting(side) => write!(f, "exiting {side}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionState {
    pub status: PositionStatus,
    /// Filled, still-open quantity.
    pub quantity: u32,
    /// Entry quantity requested but not yet filled.
    pub pending_quantity: u32,
    /// Quantity-weighted average entry fill price.
    pub entry_price: f64,
    pub attached_stop_ticks: Option<u32>,
    pub attached_target: Option<ProfitTarget>,
}

impl Default for PositionState {
    fn default() -> Self {
        PositionState {
            status: PositionStatus::Flat,
            quantity: 0,
            pending_quantity: 0,
            entry_price: 0.0,
            attached_stop_ticks: None,
            attached_target: None,
        }
    }
}

impl PositionState {
    /// Direction of current or pending exposure.
    pub fn exposure(&self) -> Option<Side> {
        match self.status {
            PositionStatus::Flat => None,
            PositionStatus::Entering(side) | PositionStatus::Exiting(side) => Some(side),
            PositionStatus::Long => Some(Side::Long),
            PositionStatus::Short => Some(Side::Short),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.status == PositionStatus::Flat
    }

    pub fn is_long(&self) -> bool {
        self.exposure() == Some(Side::Long)
    }

    pub fn is_short(&self) -> bool {
        self.exposure() == Some(Side::Short)
    }

    /// Side of a confirmed position that an exit could act on.
    pub fn open_side(&self) -> Option<Side> {
        match self.status {
            PositionStatus::Long => Some(Side::Long),
            PositionStatus::Short => Some(Side::Short),
            _ => None,
        }
    }

    pub fn unrealized_pnl(&self, price: f64, point_value: f64) -> f64 {
        match self.exposure() {
            Some(side) => realized_pnl(side, self.entry_price, price, self.quantity, point_value),
            None => 0.0,
        }
    }
}

/// Parameters for one entry request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryOrder {
    pub quantity: u32,
    pub trailing_stop_ticks: Option<u32>,
    pub profit_target: Option<ProfitTarget>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillOutcome {
    EntryPartial { side: Side, filled: u32, remaining: u32 },
    Opened { side: Side, quantity: u32, entry_price: f64 },
    Reduced { side: Side, remaining: u32, realized_pnl: f64 },
    Closed { side: Side, realized_pnl: f64, role: OrderRole },
}

impl FillOutcome {
    pub fn realized_pnl(&self) -> f64 {
        match self {
            FillOutcome::Reduced { realized_pnl, .. } | FillOutcome::Closed { realized_pnl, .. } => {
                *realized_pnl
            }
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PositionStateMachine {
    state: PositionState,
}

impl PositionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    /// Carry out an intent against the broker.
    ///
    /// Returns true if a broker request was issued. Entries while not flat
    /// and exits that do not match the open side are no-ops.
    pub fn execute(&mut self, intent: Intent, order: &EntryOrder, broker: &mut dyn BrokerPort) -> bool {
        match intent {
            Intent::EnterLong => self.enter(Side::Long, order, broker),
            Intent::EnterShort => self.enter(Side::Short, order, broker),
            Intent::ExitLong => self.exit(Some(Side::Long), broker),
            Intent::ExitShort => self.exit(Some(Side::Short), broker),
            Intent::Exit => self.exit(None, broker),
        }
    }

    fn enter(&mut self, side: Side, order: &EntryOrder, broker: &mut dyn BrokerPort) -> bool {
        if !self.state.is_flat() {
            debug!(%side, status = %self.state.status, "entry rejected, position not flat");
            return false;
        }

        match side {
            Side::Long => broker.enter_long(order.quantity),
            Side::Short => broker.enter_short(order.quantity),
        }
        if let Some(ticks) = order.trailing_stop_ticks {
            broker.set_trailing_stop(ticks);
        }
        if let Some(target) = order.profit_target {
            broker.set_profit_target(target);
        }

        self.state = PositionState {
            status: PositionStatus::Entering(side),
            quantity: 0,
            pending_quantity: order.quantity,
            entry_price: 0.0,
            attached_stop_ticks: order.trailing_stop_ticks,
            attached_target: order.profit_target,
        };
        true
    }

    fn exit(&mut self, wanted: Option<Side>, broker: &mut dyn BrokerPort) -> bool {
        let side = match self.state.open_side() {
            Some(side) if wanted.is_none_or(|w| w == side) => side,
            _ => {
                debug!(?wanted, status = %self.state.status, "exit not applicable");
                return false;
            }
        };

        match side {
            Side::Long => broker.exit_long(),
            Side::Short => broker.exit_short(),
        }
        self.state.status = PositionStatus::Exiting(side);
        true
    }

    /// Apply a fill from the external order system.
    ///
    /// A fill that does not fit the tracked state means the broker and the
    /// core disagree about exposure, and is returned as an error.
    pub fn on_fill(&mut self, fill: &FillEvent, point_value: f64) -> Result<FillOutcome, StrategyError> {
        if fill.quantity == 0 {
            return Err(StrategyError::desync("fill with zero quantity"));
        }
        if fill.role.is_closing() {
            self.apply_closing_fill(fill, point_value)
        } else {
            self.apply_entry_fill(fill)
        }
    }

    fn apply_entry_fill(&mut self, fill: &FillEvent) -> Result<FillOutcome, StrategyError> {
        let side = match self.state.status {
            PositionStatus::Entering(side) => side,
            status => {
                return Err(StrategyError::desync(format!(
                    "entry fill received while {status}"
                )));
            }
        };
        if fill.action != side.opening_action() {
            return Err(StrategyError::desync(format!(
                "{:?} entry fill for a {side} entry",
                fill.action
            )));
        }
        if fill.quantity > self.state.pending_quantity {
            return Err(StrategyError::desync(format!(
                "entry fill of {} exceeds pending {}",
                fill.quantity, self.state.pending_quantity
            )));
        }

        let filled_before = self.state.quantity as f64;
        let total = self.state.quantity + fill.quantity;
        self.state.entry_price =
            (self.state.entry_price * filled_before + fill.price * fill.quantity as f64) / total as f64;
        self.state.quantity = total;
        self.state.pending_quantity -= fill.quantity;

        if self.state.pending_quantity > 0 {
            return Ok(FillOutcome::EntryPartial {
                side,
                filled: self.state.quantity,
                remaining: self.state.pending_quantity,
            });
        }

        self.state.status = match side {
            Side::Long => PositionStatus::Long,
            Side::Short => PositionStatus::Short,
        };
        info!(%side, quantity = total, entry_price = self.state.entry_price, "position opened");
        Ok(FillOutcome::Opened {
            side,
            quantity: total,
            entry_price: self.state.entry_price,
        })
    }

    fn apply_closing_fill(&mut self, fill: &FillEvent, point_value: f64) -> Result<FillOutcome, StrategyError> {
        let side = match self.state.status {
            PositionStatus::Long => Side::Long,
            PositionStatus::Short => Side::Short,
            PositionStatus::Exiting(side) => side,
            status => {
                return Err(StrategyError::desync(format!(
                    "{:?} fill received while {status}",
                    fill.role
                )));
            }
        };
        if fill.action != side.closing_action() {
            return Err(StrategyError::desync(format!(
                "{:?} fill cannot close a {side} position",
                fill.action
            )));
        }
        if fill.quantity > self.state.quantity {
            return Err(StrategyError::desync(format!(
                "closing fill of {} exceeds open quantity {}",
                fill.quantity, self.state.quantity
            )));
        }

        let pnl = realized_pnl(side, self.state.entry_price, fill.price, fill.quantity, point_value);
        self.state.quantity -= fill.quantity;

        if self.state.quantity > 0 {
            return Ok(FillOutcome::Reduced {
                side,
                remaining: self.state.quantity,
                realized_pnl: pnl,
            });
        }

        self.state = PositionState::default();
        Ok(FillOutcome::Closed {
            side,
            realized_pnl: pnl,
            role: fill.role,
        })
    }
}

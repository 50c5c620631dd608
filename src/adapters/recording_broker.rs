//! Broker that records every request instead of routing it.

use crate::domain::order::ProfitTarget;
use crate::ports::broker_port::BrokerPort;

#[derive(Debug, Clone, PartialEq)]
pub enum BrokerCall {
    EnterLong(u32),
    EnterShort(u32),
    ExitLong,
    ExitShort,
    TrailingStop(u32),
    ProfitTarget(ProfitTarget),
}

#[derive(Debug, Clone)]
pub struct RecordingBroker {
    tick_size: f64,
    point_value: f64,
    calls: Vec<BrokerCall>,
}

impl RecordingBroker {
    pub fn new(tick_size: f64, point_value: f64) -> Self {
        Self {
            tick_size,
            point_value,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[BrokerCall] {
        &self.calls
    }

    /// Remove and return everything recorded so far.
    pub fn take_calls(&mut self) -> Vec<BrokerCall> {
        std::mem::take(&mut self.calls)
    }
}

impl BrokerPort for RecordingBroker {
    fn enter_long(&mut self, quantity: u32) {
        self.calls.push(BrokerCall::EnterLong(quantity));
    }

    fn enter_short(&mut self, quantity: u32) {
        self.calls.push(BrokerCall::EnterShort(quantity));
    }

    fn exit_long(&mut self) {
        self.calls.push(BrokerCall::ExitLong);
    }

    fn exit_short(&mut self) {
        self.calls.push(BrokerCall::ExitShort);
    }

    fn set_trailing_stop(&mut self, ticks: u32) {
        self.calls.push(BrokerCall::TrailingStop(ticks));
    }

    fn set_profit_target(&mut self, target: ProfitTarget) {
        self.calls.push(BrokerCall::ProfitTarget(target));
    }

    fn tick_size(&self) -> f64 {
        self.tick_size
    }

    fn point_value(&self) -> f64 {
        self.point_value
    }
}

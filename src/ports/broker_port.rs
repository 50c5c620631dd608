//! Broker capability port.
//!
//! The strategy core never routes orders itself; it asks a broker to enter,
//! exit and attach protective orders, and learns about executions through
//! fill events delivered by the host.

use crate::domain::order::ProfitTarget;

pub trait BrokerPort {
    fn enter_long(&mut self, quantity: u32);
    fn enter_short(&mut self, quantity: u32);
    fn exit_long(&mut self);
    fn exit_short(&mut self);

    /// Trailing stop distance in ticks for the next entry.
    fn set_trailing_stop(&mut self, ticks: u32);
    fn set_profit_target(&mut self, target: ProfitTarget);

    fn tick_size(&self) -> f64;
    fn point_value(&self) -> f64;
}

//! Per-bar strategy engine.
//!
//! [`StrategyEngine`] owns one instance of each stateful component
//! (indicators, daily risk, position) plus the immutable config and rule
//! policy. The host drives it with [`StrategyEngine::on_bar`] and
//! [`StrategyEngine::on_fill`], one event at a time.
//!
//! Per bar:
//!
//! 1. indicators update (every bar, so rolling windows stay contiguous)
//! 2. daily rollover
//! 3. warm-up gate (`bars_required_to_trade`)
//! 4. cooldown tick, counted on every bar past warm-up, in the window or not
//! 5. trading window gate
//! 6. hard daily limits, optionally forcing the position flat
//! 7. rule policy
//! 8. intent executed against the broker

use tracing::{debug, error, info, warn};

use crate::domain::bar::Bar;
use crate::domain::config::StrategyConfig;
use crate::domain::error::StrategyError;
use crate::domain::indicator::{IndicatorEngine, IndicatorSnapshot};
use crate::domain::order::{FillEvent, Intent, OrderRole, ProfitTarget};
use crate::domain::policy::{GatingState, RulePolicy};
use crate::domain::position::{EntryOrder, FillOutcome, PositionState, PositionStateMachine};
use crate::domain::risk::{DailyRiskState, DailyRiskTracker, LimitStatus};
use crate::ports::broker_port::BrokerPort;

pub struct StrategyEngine {
    config: StrategyConfig,
    policy: RulePolicy,
    indicators: IndicatorEngine,
    risk: DailyRiskTracker,
    position: PositionStateMachine,
    /// Instrument point value as last reported by the broker.
    point_value: f64,
    last_snapshot: Option<IndicatorSnapshot>,
}

impl StrategyEngine {
    /// Validate `config` and build a fresh engine.
    pub fn configure(config: StrategyConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        info!(
            name = %config.name,
            variant = %config.variant,
            window_start = %config.window.start,
            window_end = %config.window.end,
            "strategy configured"
        );
        Ok(StrategyEngine {
            policy: config.policy(),
            indicators: IndicatorEngine::new(&config.indicator_params()),
            risk: DailyRiskTracker::new(config.risk),
            position: PositionStateMachine::new(),
            point_value: 1.0,
            last_snapshot: None,
            config,
        })
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn position(&self) -> &PositionState {
        self.position.state()
    }

    pub fn daily_state(&self) -> &DailyRiskState {
        self.risk.state()
    }

    /// Restore a previously persisted daily state. A state from another
    /// date is rolled over by the next bar.
    pub fn restore_daily_state(&mut self, state: DailyRiskState) {
        debug!(date = ?state.current_date, pnl = state.cumulative_realized_pnl, "daily state restored");
        self.risk.restore(state);
    }

    /// Host-reported cumulative realized P&L, used with the external source.
    pub fn report_external_pnl(&mut self, cumulative: f64) {
        self.risk.report_external_pnl(cumulative);
    }

    /// Indicator values computed for the most recent bar.
    pub fn last_snapshot(&self) -> Option<&IndicatorSnapshot> {
        self.last_snapshot.as_ref()
    }

    /// Process one bar. Returns the intent that was executed, if any.
    pub fn on_bar(&mut self, bar: &Bar, broker: &mut dyn BrokerPort) -> Option<Intent> {
        self.point_value = broker.point_value();
        let snapshot = self.indicators.update(bar);
        self.last_snapshot = Some(snapshot.clone());

        self.risk.on_new_bar(bar.date());

        if self.indicators.bars_seen() <= self.config.bars_required_to_trade {
            return None;
        }
        self.risk.on_cooldown_tick();
        if !self.config.window.is_eligible(bar.time_of_day()) {
            return None;
        }

        let limit = self.risk.check_limits();
        if limit != LimitStatus::Ok && self.config.risk.flatten_on_limit && self.position().open_side().is_some() {
            let order = self.entry_order(broker);
            if self.position.execute(Intent::Exit, &order, broker) {
                warn!(?limit, timestamp = %bar.timestamp, "daily limit reached, flattening position");
                return Some(Intent::Exit);
            }
        }

        let gating = GatingState {
            entries_allowed: limit == LimitStatus::Ok && !self.risk.cooldown_active(),
        };
        let intent = match self.policy.evaluate(&snapshot, bar, self.position.state(), gating) {
            Ok(Some(intent)) => intent,
            Ok(None) => return None,
            Err(err) => {
                debug_assert!(err.is_transient());
                debug!(%err, timestamp = %bar.timestamp, "rule evaluation skipped");
                return None;
            }
        };

        let order = self.entry_order(broker);
        if !self.position.execute(intent, &order, broker) {
            return None;
        }
        info!(
            ?intent,
            timestamp = %bar.timestamp,
            close = bar.close,
            daily_pnl = self.risk.realized_pnl(),
            "intent executed"
        );
        Some(intent)
    }

    /// Apply a fill notification.
    ///
    /// Fills that contradict the tracked position are logged and returned
    /// as [`StrategyError::DesynchronizedFill`]; the state is left untouched.
    ///
    /// Realized P&L uses the point value cached by the latest `on_bar`.
    /// Before the first bar it is 1.0, so P&L is booked in price points.
    pub fn on_fill(&mut self, fill: &FillEvent) -> Result<(), StrategyError> {
        let outcome = match self.position.on_fill(fill, self.point_value) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(%err, role = ?fill.role, price = fill.price, quantity = fill.quantity, "fill rejected");
                return Err(err);
            }
        };

        if matches!(outcome, FillOutcome::Reduced { .. } | FillOutcome::Closed { .. }) {
            self.risk.on_fill(outcome.realized_pnl());
            if fill.role == OrderRole::Target {
                self.risk.record_target_fill();
            }
        }
        if let FillOutcome::Closed { side, realized_pnl, role } = outcome {
            info!(
                %side,
                ?role,
                realized_pnl,
                daily_pnl = self.risk.realized_pnl(),
                "position closed"
            );
        }
        Ok(())
    }

    /// Tick size and point value come from the broker, not the bar.
    fn entry_order(&self, broker: &dyn BrokerPort) -> EntryOrder {
        let quantity = self.config.quantity;
        let profit_target = self.config.profit_target_ticks.map(|ticks| {
            if !self.config.last_trade_target_sizing {
                return ProfitTarget::Ticks(ticks);
            }
            let tick_target_value =
                ticks as f64 * broker.tick_size() * broker.point_value() * quantity as f64;
            match self.risk.remaining_goal() {
                Some(remaining) if remaining > 0.0 && remaining < tick_target_value => {
                    debug!(remaining, tick_target_value, "last trade of the day, target sized to remaining goal");
                    ProfitTarget::Currency(remaining)
                }
                _ => ProfitTarget::Ticks(ticks),
            }
        });
        EntryOrder {
            quantity,
            trailing_stop_ticks: self.config.trailing_stop_ticks,
            profit_target,
        }
    }
}

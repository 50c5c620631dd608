//! Daily risk tracking.
//!
//! Keeps the realized P&L for the calendar date of the bar stream, latches
//! the hard daily goal / loss limit, and runs the post-target cooldown.
//! Dates come from bar timestamps, never from the wall clock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::order::Side;

/// Where the day's realized P&L comes from. The two are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PnlSource {
    /// Summed from closing fills.
    Fills,
    /// Host-reported cumulative figure, re-baselined at each new date.
    External,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskPolicy {
    /// Stop new entries once realized P&L reaches this amount.
    pub daily_goal: Option<f64>,
    /// Stop new entries once realized P&L falls to minus this amount.
    pub daily_loss_limit: Option<f64>,
    /// Close any open position when a hard limit is reached.
    pub flatten_on_limit: bool,
    /// Bars to suppress entries after a profit-target fill.
    pub cooldown_bars: Option<u32>,
    pub pnl_source: PnlSource,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        RiskPolicy {
            daily_goal: None,
            daily_loss_limit: None,
            flatten_on_limit: false,
            cooldown_bars: None,
            pnl_source: PnlSource::Fills,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitStatus {
    Ok,
    GoalReached,
    LossLimitReached,
}

/// Persistable per-day state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRiskState {
    pub current_date: Option<NaiveDate>,
    pub cumulative_realized_pnl: f64,
    pub target_hit: bool,
    pub bars_since_target_hit: u32,
    pub limit_reached: Option<LimitStatus>,
    pub external_baseline: f64,
    pub last_external: f64,
}

impl Default for DailyRiskState {
    fn default() -> Self {
        DailyRiskState {
            current_date: None,
            cumulative_realized_pnl: 0.0,
            target_hit: false,
            bars_since_target_hit: 0,
            limit_reached: None,
            external_baseline: 0.0,
            last_external: 0.0,
        }
    }
}

/// (exit - entry) * quantity * side sign * point value.
///
/// Closing a long above entry and closing a short below entry are both gains.
pub fn realized_pnl(side: Side, entry_price: f64, exit_price: f64, quantity: u32, point_value: f64) -> f64 {
    (exit_price - entry_price) * quantity as f64 * side.sign() * point_value
}

#[derive(Debug, Clone)]
pub struct DailyRiskTracker {
    policy: RiskPolicy,
    state: DailyRiskState,
}

impl DailyRiskTracker {
    pub fn new(policy: RiskPolicy) -> Self {
        DailyRiskTracker {
            policy,
            state: DailyRiskState::default(),
        }
    }

    pub fn policy(&self) -> &RiskPolicy {
        &self.policy
    }

    pub fn state(&self) -> &DailyRiskState {
        &self.state
    }

    pub fn restore(&mut self, state: DailyRiskState) {
        self.state = state;
    }

    pub fn realized_pnl(&self) -> f64 {
        self.state.cumulative_realized_pnl
    }

    /// Roll the day over if `date` differs from the stored date.
    ///
    /// Returns true when a rollover happened. Must run before `check_limits`
    /// for the bar.
    pub fn on_new_bar(&mut self, date: NaiveDate) -> bool {
        if self.state.current_date == Some(date) {
            return false;
        }

        debug!(
            %date,
            previous_pnl = self.state.cumulative_realized_pnl,
            "daily risk state rolled over"
        );
        self.state.current_date = Some(date);
        self.state.cumulative_realized_pnl = 0.0;
        self.state.target_hit = false;
        self.state.bars_since_target_hit = 0;
        self.state.limit_reached = None;
        self.state.external_baseline = self.state.last_external;
        true
    }

    /// Add a realized P&L delta from a closing fill.
    pub fn on_fill(&mut self, realized_delta: f64) {
        match self.policy.pnl_source {
            PnlSource::Fills => self.state.cumulative_realized_pnl += realized_delta,
            PnlSource::External => {
                debug!(realized_delta, "fill delta ignored, P&L is host-reported");
            }
        }
    }

    /// Record the host's cumulative realized P&L figure.
    pub fn report_external_pnl(&mut self, cumulative: f64) {
        self.state.last_external = cumulative;
        if self.policy.pnl_source == PnlSource::External {
            self.state.cumulative_realized_pnl = cumulative - self.state.external_baseline;
        }
    }

    /// Start the cooldown after a profit-target fill.
    pub fn record_target_fill(&mut self) {
        if self.policy.cooldown_bars.is_some() {
            self.state.target_hit = true;
            self.state.bars_since_target_hit = 0;
        }
    }

    /// Advance the cooldown by one bar. With a cooldown of `n` bars, entries
    /// stay suppressed for the `n` bars after the target fill.
    pub fn on_cooldown_tick(&mut self) {
        if !self.state.target_hit {
            return;
        }
        self.state.bars_since_target_hit += 1;
        let cooldown = self.policy.cooldown_bars.unwrap_or(0);
        if self.state.bars_since_target_hit > cooldown {
            self.state.target_hit = false;
            self.state.bars_since_target_hit = 0;
        }
    }

    pub fn cooldown_active(&self) -> bool {
        self.state.target_hit
    }

    /// Hard daily limits. Once breached the status is latched until the
    /// next date.
    pub fn check_limits(&mut self) -> LimitStatus {
        if let Some(status) = self.state.limit_reached {
            return status;
        }

        let pnl = self.state.cumulative_realized_pnl;
        let status = match (self.policy.daily_goal, self.policy.daily_loss_limit) {
            (Some(goal), _) if pnl >= goal => LimitStatus::GoalReached,
            (_, Some(limit)) if pnl <= -limit => LimitStatus::LossLimitReached,
            _ => LimitStatus::Ok,
        };

        if status != LimitStatus::Ok {
            warn!(pnl, ?status, "daily limit reached, entries suspended for the day");
            self.state.limit_reached = Some(status);
        }
        status
    }

    /// Goal minus realized P&L, when a goal is configured.
    pub fn remaining_goal(&self) -> Option<f64> {
        self.policy
            .daily_goal
            .map(|goal| goal - self.state.cumulative_realized_pnl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn hard_policy() -> RiskPolicy {
        RiskPolicy {
            daily_goal: Some(1000.0),
            daily_loss_limit: Some(1000.0),
            flatten_on_limit: true,
            ..Default::default()
        }
    }

    fn cooldown_policy(bars: u32) -> RiskPolicy {
        RiskPolicy {
            cooldown_bars: Some(bars),
            ..Default::default()
        }
    }

    #[test]
    fn realized_pnl_long_gain() {
        assert_relative_eq!(realized_pnl(Side::Long, 100.0, 102.0, 2, 50.0), 200.0);
    }

    #[test]
    fn realized_pnl_long_loss() {
        assert_relative_eq!(realized_pnl(Side::Long, 100.0, 99.0, 1, 50.0), -50.0);
    }

    #[test]
    fn realized_pnl_short_gain() {
        assert_relative_eq!(realized_pnl(Side::Short, 100.0, 98.0, 1, 20.0), 40.0);
    }

    #[test]
    fn realized_pnl_short_loss() {
        assert_relative_eq!(realized_pnl(Side::Short, 100.0, 101.5, 3, 20.0), -90.0);
    }

    #[test]
    fn first_bar_sets_date() {
        let mut tracker = DailyRiskTracker::new(RiskPolicy::default());
        assert!(tracker.on_new_bar(day(3)));
        assert!(!tracker.on_new_bar(day(3)));
        assert_eq!(tracker.state().current_date, Some(day(3)));
    }

    #[test]
    fn rollover_resets_everything() {
        let mut tracker = DailyRiskTracker::new(RiskPolicy {
            cooldown_bars: Some(5),
            ..hard_policy()
        });
        tracker.on_new_bar(day(3));
        tracker.on_fill(1200.0);
        tracker.record_target_fill();
        assert_eq!(tracker.check_limits(), LimitStatus::GoalReached);

        assert!(tracker.on_new_bar(day(4)));
        assert_eq!(tracker.realized_pnl(), 0.0);
        assert!(!tracker.cooldown_active());
        assert_eq!(tracker.state().bars_since_target_hit, 0);
        assert_eq!(tracker.check_limits(), LimitStatus::Ok);
    }

    #[test]
    fn goal_and_loss_limits() {
        let mut tracker = DailyRiskTracker::new(hard_policy());
        tracker.on_new_bar(day(3));
        tracker.on_fill(400.0);
        assert_eq!(tracker.check_limits(), LimitStatus::Ok);
        tracker.on_fill(600.0);
        assert_eq!(tracker.check_limits(), LimitStatus::GoalReached);

        let mut tracker = DailyRiskTracker::new(hard_policy());
        tracker.on_new_bar(day(3));
        tracker.on_fill(-1000.0);
        assert_eq!(tracker.check_limits(), LimitStatus::LossLimitReached);
    }

    #[test]
    fn breach_is_latched_for_the_day() {
        let mut tracker = DailyRiskTracker::new(hard_policy());
        tracker.on_new_bar(day(3));
        tracker.on_fill(-1100.0);
        assert_eq!(tracker.check_limits(), LimitStatus::LossLimitReached);
        // forced exit fill claws some back; still latched
        tracker.on_fill(300.0);
        assert_eq!(tracker.check_limits(), LimitStatus::LossLimitReached);
    }

    #[test]
    fn no_limits_configured_is_always_ok() {
        let mut tracker = DailyRiskTracker::new(RiskPolicy::default());
        tracker.on_new_bar(day(3));
        tracker.on_fill(1_000_000.0);
        assert_eq!(tracker.check_limits(), LimitStatus::Ok);
        assert_eq!(tracker.remaining_goal(), None);
    }

    #[test]
    fn remaining_goal_tracks_pnl() {
        let mut tracker = DailyRiskTracker::new(hard_policy());
        tracker.on_new_bar(day(3));
        tracker.on_fill(850.0);
        assert_relative_eq!(tracker.remaining_goal().unwrap(), 150.0);
    }

    #[test]
    fn cooldown_suppresses_exactly_n_bars() {
        let mut tracker = DailyRiskTracker::new(cooldown_policy(5));
        tracker.on_new_bar(day(3));
        tracker.record_target_fill();

        for bar in 1..=5 {
            tracker.on_cooldown_tick();
            assert!(tracker.cooldown_active(), "bar {bar} should be suppressed");
        }
        tracker.on_cooldown_tick();
        assert!(!tracker.cooldown_active());
    }

    #[test]
    fn zero_cooldown_clears_on_next_bar() {
        let mut tracker = DailyRiskTracker::new(cooldown_policy(0));
        tracker.on_new_bar(day(3));
        tracker.record_target_fill();
        assert!(tracker.cooldown_active());
        tracker.on_cooldown_tick();
        assert!(!tracker.cooldown_active());
    }

    #[test]
    fn target_fill_without_cooldown_policy_is_ignored() {
        let mut tracker = DailyRiskTracker::new(RiskPolicy::default());
        tracker.record_target_fill();
        assert!(!tracker.cooldown_active());
    }

    #[test]
    fn repeated_target_fill_restarts_cooldown() {
        let mut tracker = DailyRiskTracker::new(cooldown_policy(3));
        tracker.record_target_fill();
        tracker.on_cooldown_tick();
        tracker.on_cooldown_tick();
        tracker.record_target_fill();
        assert_eq!(tracker.state().bars_since_target_hit, 0);
        for _ in 0..3 {
            tracker.on_cooldown_tick();
            assert!(tracker.cooldown_active());
        }
    }

    #[test]
    fn external_source_ignores_fill_deltas() {
        let mut tracker = DailyRiskTracker::new(RiskPolicy {
            pnl_source: PnlSource::External,
            ..hard_policy()
        });
        tracker.on_new_bar(day(3));
        tracker.on_fill(500.0);
        assert_eq!(tracker.realized_pnl(), 0.0);
        tracker.report_external_pnl(700.0);
        assert_relative_eq!(tracker.realized_pnl(), 700.0);
    }

    #[test]
    fn external_source_rebaselines_at_rollover() {
        let mut tracker = DailyRiskTracker::new(RiskPolicy {
            pnl_source: PnlSource::External,
            ..hard_policy()
        });
        tracker.on_new_bar(day(3));
        tracker.report_external_pnl(700.0);

        tracker.on_new_bar(day(4));
        assert_eq!(tracker.realized_pnl(), 0.0);
        tracker.report_external_pnl(1000.0);
        assert_relative_eq!(tracker.realized_pnl(), 300.0);
    }

    #[test]
    fn fills_source_ignores_external_reports() {
        let mut tracker = DailyRiskTracker::new(hard_policy());
        tracker.on_new_bar(day(3));
        tracker.report_external_pnl(5000.0);
        assert_eq!(tracker.realized_pnl(), 0.0);
    }

    #[test]
    fn restore_keeps_same_day_progress() {
        let mut first = DailyRiskTracker::new(hard_policy());
        first.on_new_bar(day(3));
        first.on_fill(600.0);

        let mut second = DailyRiskTracker::new(hard_policy());
        second.restore(first.state().clone());
        assert!(!second.on_new_bar(day(3)));
        assert_relative_eq!(second.realized_pnl(), 600.0);

        assert!(second.on_new_bar(day(4)));
        assert_eq!(second.realized_pnl(), 0.0);
    }

    proptest! {
        #[test]
        fn daily_pnl_is_exact_sum_of_fills(deltas in prop::collection::vec(-500.0f64..500.0, 0..40)) {
            let mut tracker = DailyRiskTracker::new(RiskPolicy::default());
            tracker.on_new_bar(day(10));
            let mut expected = 0.0;
            for d in &deltas {
                tracker.on_fill(*d);
                expected += *d;
            }
            prop_assert_eq!(tracker.realized_pnl(), expected);

            tracker.on_new_bar(day(11));
            prop_assert_eq!(tracker.realized_pnl(), 0.0);
        }
    }
}

//! Named strategy presets.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;

use crate::domain::config::{EntryStyle, StrategyConfig};
use crate::domain::risk::{PnlSource, RiskPolicy};
use crate::domain::window::TradingWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyVariant {
    /// %R momentum with renko colour exit and a loose daily limit.
    WilliamsRenko,
    /// Same entries, hard daily goal/loss that flattens on breach.
    WilliamsRenkoDaily,
    /// %R momentum filtered by a long WMA, with post-target cooldown.
    WilliamsRenkoWma,
    /// %R momentum confirmed by bar colour, with post-target cooldown.
    WilliamsRenkoConfirmed,
    /// Supertrend trend following.
    Supertrend,
}

impl StrategyVariant {
    pub const ALL: [StrategyVariant; 5] = [
        StrategyVariant::WilliamsRenko,
        StrategyVariant::WilliamsRenkoDaily,
        StrategyVariant::WilliamsRenkoWma,
        StrategyVariant::WilliamsRenkoConfirmed,
        StrategyVariant::Supertrend,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            StrategyVariant::WilliamsRenko => "williams_renko",
            StrategyVariant::WilliamsRenkoDaily => "williams_renko_daily",
            StrategyVariant::WilliamsRenkoWma => "williams_renko_wma",
            StrategyVariant::WilliamsRenkoConfirmed => "williams_renko_confirmed",
            StrategyVariant::Supertrend => "supertrend",
        }
    }

    pub fn preset(self) -> StrategyConfig {
        let momentum = StrategyConfig {
            name: self.tag().to_string(),
            variant: self,
            entry_style: EntryStyle::Momentum,
            overbought: -20.0,
            oversold: -80.0,
            wma_filter: false,
            bar_color_confirmation: false,
            renko_color_exit: false,
            williams_period: 14,
            wma_period: 100,
            atr_period: 10,
            supertrend_multiplier: 1.5,
            quantity: 1,
            trailing_stop_ticks: Some(80),
            profit_target_ticks: Some(80),
            last_trade_target_sizing: false,
            risk: RiskPolicy::default(),
            window: window(hm(3, 30), hm(4, 0)),
            bars_required_to_trade: 20,
        };

        match self {
            StrategyVariant::WilliamsRenko => StrategyConfig {
                renko_color_exit: true,
                risk: RiskPolicy {
                    daily_goal: Some(500.0),
                    daily_loss_limit: Some(300.0),
                    ..RiskPolicy::default()
                },
                window: window(hm(7, 0), hm(10, 0)),
                ..momentum
            },
            StrategyVariant::WilliamsRenkoDaily => StrategyConfig {
                risk: RiskPolicy {
                    daily_goal: Some(1000.0),
                    daily_loss_limit: Some(1000.0),
                    flatten_on_limit: true,
                    cooldown_bars: None,
                    pnl_source: PnlSource::Fills,
                },
                last_trade_target_sizing: true,
                ..momentum
            },
            StrategyVariant::WilliamsRenkoWma => StrategyConfig {
                wma_filter: true,
                williams_period: 20,
                trailing_stop_ticks: Some(65),
                risk: RiskPolicy {
                    cooldown_bars: Some(0),
                    ..RiskPolicy::default()
                },
                ..momentum
            },
            StrategyVariant::WilliamsRenkoConfirmed => StrategyConfig {
                bar_color_confirmation: true,
                williams_period: 20,
                trailing_stop_ticks: Some(65),
                risk: RiskPolicy {
                    cooldown_bars: Some(0),
                    ..RiskPolicy::default()
                },
                ..momentum
            },
            StrategyVariant::Supertrend => StrategyConfig {
                entry_style: EntryStyle::Supertrend,
                trailing_stop_ticks: None,
                profit_target_ticks: Some(10),
                window: window(hm(9, 30), hm(16, 0)),
                bars_required_to_trade: 10,
                ..momentum
            },
        }
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

fn window(start: NaiveTime, end: NaiveTime) -> TradingWindow {
    TradingWindow::new(start, end)
}

impl fmt::Display for StrategyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for StrategyVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        StrategyVariant::ALL
            .into_iter()
            .find(|v| v.tag() == wanted)
            .ok_or_else(|| format!("unknown strategy variant {s:?}"))
    }
}

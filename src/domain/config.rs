//! Strategy configuration and validation.
//!
//! A [`StrategyConfig`] starts from a variant preset, optionally overridden
//! from a [`ConfigPort`], and is validated once before the engine is built.

use crate::domain::error::StrategyError;
use crate::domain::indicator::IndicatorParams;
use crate::domain::policy::{EntryRule, RulePolicy};
use crate::domain::risk::{PnlSource, RiskPolicy};
use crate::domain::variant::StrategyVariant;
use crate::domain::window::TradingWindow;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStyle {
    Momentum,
    Supertrend,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub name: String,
    pub variant: StrategyVariant,

    pub entry_style: EntryStyle,
    pub overbought: f64,
    pub oversold: f64,
    pub wma_filter: bool,
    pub bar_color_confirmation: bool,
    pub renko_color_exit: bool,

    pub williams_period: usize,
    pub wma_period: usize,
    pub atr_period: usize,
    pub supertrend_multiplier: f64,

    pub quantity: u32,
    pub trailing_stop_ticks: Option<u32>,
    pub profit_target_ticks: Option<u32>,
    /// Shrink the target to the remaining daily goal when it is smaller.
    pub last_trade_target_sizing: bool,

    pub risk: RiskPolicy,
    pub window: TradingWindow,
    pub bars_required_to_trade: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyVariant::WilliamsRenko.preset()
    }
}

impl StrategyConfig {
    pub fn indicator_params(&self) -> IndicatorParams {
        IndicatorParams {
            williams_period: self.williams_period,
            wma_period: self.wma_period,
            atr_period: self.atr_period,
            supertrend_multiplier: self.supertrend_multiplier,
        }
    }

    pub fn policy(&self) -> RulePolicy {
        let entry = match self.entry_style {
            EntryStyle::Momentum => EntryRule::MomentumThreshold {
                overbought: self.overbought,
                oversold: self.oversold,
                wma_filter: self.wma_filter,
                bar_color_confirmation: self.bar_color_confirmation,
            },
            EntryStyle::Supertrend => EntryRule::TrendFollowing,
        };
        RulePolicy {
            entry,
            renko_color_exit: self.renko_color_exit,
        }
    }

    pub fn validate(&self) -> Result<(), StrategyError> {
        validate_period("williams_period", self.williams_period)?;
        validate_period("wma_period", self.wma_period)?;
        validate_period("atr_period", self.atr_period)?;
        validate_multiplier(self.supertrend_multiplier)?;
        validate_thresholds(self.overbought, self.oversold)?;
        validate_orders(self)?;
        validate_risk(&self.risk)?;
        Ok(())
    }
}

fn validate_period(field: &str, value: usize) -> Result<(), StrategyError> {
    if value < 1 {
        return Err(StrategyError::out_of_range(field, "period must be at least 1"));
    }
    Ok(())
}

fn validate_multiplier(value: f64) -> Result<(), StrategyError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(StrategyError::out_of_range(
            "supertrend_multiplier",
            "multiplier must be positive",
        ));
    }
    Ok(())
}

fn validate_thresholds(overbought: f64, oversold: f64) -> Result<(), StrategyError> {
    for (field, value) in [("overbought", overbought), ("oversold", oversold)] {
        if !(-100.0..=0.0).contains(&value) {
            return Err(StrategyError::out_of_range(field, "Williams %R levels lie in [-100, 0]"));
        }
    }
    if oversold > overbought {
        return Err(StrategyError::out_of_range(
            "oversold",
            "oversold level must not exceed the overbought level",
        ));
    }
    Ok(())
}

fn validate_orders(config: &StrategyConfig) -> Result<(), StrategyError> {
    if config.quantity < 1 {
        return Err(StrategyError::out_of_range("quantity", "quantity must be at least 1"));
    }
    if config.trailing_stop_ticks == Some(0) {
        return Err(StrategyError::out_of_range(
            "trailing_stop_ticks",
            "distance must be positive, leave unset to disable",
        ));
    }
    if config.profit_target_ticks == Some(0) {
        return Err(StrategyError::out_of_range(
            "profit_target_ticks",
            "distance must be positive, leave unset to disable",
        ));
    }
    Ok(())
}

fn validate_risk(risk: &RiskPolicy) -> Result<(), StrategyError> {
    if let Some(goal) = risk.daily_goal {
        if !goal.is_finite() || goal <= 0.0 {
            return Err(StrategyError::out_of_range("daily_goal", "goal must be positive"));
        }
    }
    if let Some(limit) = risk.daily_loss_limit {
        if !limit.is_finite() || limit <= 0.0 {
            return Err(StrategyError::out_of_range(
                "daily_loss_limit",
                "loss limit is a positive amount",
            ));
        }
    }
    Ok(())
}

/// Build a validated config from `[strategy]`, `[indicators]`, `[orders]`,
/// `[risk]` and `[session]`. Missing keys keep the variant preset's value.
pub fn load_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, StrategyError> {
    let variant = match config.get_string("strategy", "variant") {
        Some(tag) => tag
            .parse::<StrategyVariant>()
            .map_err(|reason| StrategyError::out_of_range("variant", reason))?,
        None => StrategyVariant::WilliamsRenko,
    };
    let mut c = variant.preset();

    if let Some(name) = config.get_string("strategy", "name") {
        c.name = name;
    }
    c.overbought = config.get_double("strategy", "overbought")?.unwrap_or(c.overbought);
    c.oversold = config.get_double("strategy", "oversold")?.unwrap_or(c.oversold);
    c.wma_filter = config.get_bool("strategy", "wma_filter")?.unwrap_or(c.wma_filter);
    c.bar_color_confirmation = config
        .get_bool("strategy", "bar_color_confirmation")?
        .unwrap_or(c.bar_color_confirmation);
    c.renko_color_exit = config
        .get_bool("strategy", "renko_color_exit")?
        .unwrap_or(c.renko_color_exit);

    c.williams_period = read_count(config, "indicators", "williams_period", c.williams_period)?;
    c.wma_period = read_count(config, "indicators", "wma_period", c.wma_period)?;
    c.atr_period = read_count(config, "indicators", "atr_period", c.atr_period)?;
    c.supertrend_multiplier = config
        .get_double("indicators", "supertrend_multiplier")?
        .unwrap_or(c.supertrend_multiplier);

    c.quantity = read_u32(config, "orders", "quantity")?.unwrap_or(c.quantity);
    c.trailing_stop_ticks = read_ticks(config, "orders", "trailing_stop_ticks", c.trailing_stop_ticks)?;
    c.profit_target_ticks = read_ticks(config, "orders", "profit_target_ticks", c.profit_target_ticks)?;
    c.last_trade_target_sizing = config
        .get_bool("orders", "last_trade_target_sizing")?
        .unwrap_or(c.last_trade_target_sizing);

    c.risk.daily_goal = read_amount(config, "risk", "daily_goal", c.risk.daily_goal)?;
    c.risk.daily_loss_limit = read_amount(config, "risk", "daily_loss_limit", c.risk.daily_loss_limit)?;
    c.risk.flatten_on_limit = config
        .get_bool("risk", "flatten_on_limit")?
        .unwrap_or(c.risk.flatten_on_limit);
    if let Some(bars) = read_u32(config, "risk", "cooldown_bars")? {
        c.risk.cooldown_bars = Some(bars);
    }
    if let Some(source) = config.get_string("risk", "pnl_source") {
        c.risk.pnl_source = parse_pnl_source(&source)?;
    }
    c.bars_required_to_trade =
        read_count(config, "risk", "bars_required_to_trade", c.bars_required_to_trade)?;

    let start = config.get_string("session", "start");
    let end = config.get_string("session", "end");
    match (start, end) {
        (Some(start), Some(end)) => c.window = TradingWindow::parse(&start, &end)?,
        (None, None) => {}
        (Some(_), None) => {
            return Err(StrategyError::ConfigMissing {
                section: "session".to_string(),
                key: "end".to_string(),
            });
        }
        (None, Some(_)) => {
            return Err(StrategyError::ConfigMissing {
                section: "session".to_string(),
                key: "start".to_string(),
            });
        }
    }

    c.validate()?;
    Ok(c)
}

fn read_count(config: &dyn ConfigPort, section: &str, key: &str, default: usize) -> Result<usize, StrategyError> {
    match config.get_int(section, key)? {
        Some(value) => usize::try_from(value).map_err(|_| StrategyError::out_of_range(key, "must not be negative")),
        None => Ok(default),
    }
}

fn read_u32(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<u32>, StrategyError> {
    config
        .get_int(section, key)?
        .map(|value| {
            u32::try_from(value).map_err(|_| StrategyError::out_of_range(key, "must be between 0 and 2^32-1"))
        })
        .transpose()
}

/// 0 disables the order.
fn read_ticks(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: Option<u32>,
) -> Result<Option<u32>, StrategyError> {
    Ok(match read_u32(config, section, key)? {
        Some(0) => None,
        Some(ticks) => Some(ticks),
        None => default,
    })
}

/// 0 disables the limit.
fn read_amount(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: Option<f64>,
) -> Result<Option<f64>, StrategyError> {
    Ok(match config.get_double(section, key)? {
        Some(amount) if amount == 0.0 => None,
        Some(amount) => Some(amount),
        None => default,
    })
}

fn parse_pnl_source(value: &str) -> Result<PnlSource, StrategyError> {
    match value.trim().to_lowercase().as_str() {
        "fills" => Ok(PnlSource::Fills),
        "external" => Ok(PnlSource::External),
        _ => Err(StrategyError::out_of_range(
            "pnl_source",
            format!("expected fills or external, got {value:?}"),
        )),
    }
}

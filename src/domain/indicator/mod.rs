//! Incremental technical indicators.
//!
//! Every indicator consumes one [`Bar`] per call and keeps only the bounded
//! state its recurrence needs. [`IndicatorEngine`] drives all of them in
//! lockstep and hands back an [`IndicatorSnapshot`] for the bar.
//!
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorPoint`: one indicator's output for one bar, including warm-up
//! - `IndicatorSnapshot`: all outputs for one bar plus the prior-bar values
//!   the crossover rules need

pub mod atr;
pub mod supertrend;
pub mod williams_r;
pub mod wma;

use std::fmt;

use crate::domain::bar::Bar;
use crate::domain::error::StrategyError;

pub use atr::Atr;
pub use supertrend::Supertrend;
pub use williams_r::WilliamsR;
pub use wma::Wma;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    WilliamsR(usize),
    Wma(usize),
    Atr(usize),
    Supertrend {
        period: usize,
        multiplier_x100: u32,
    },
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::WilliamsR(period) => write!(f, "WILLIAMS_R({})", period),
            IndicatorType::Wma(period) => write!(f, "WMA({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Supertrend {
                period,
                multiplier_x100,
            } => {
                let mult = *multiplier_x100 as f64 / 100.0;
                write!(f, "SUPERTREND({},{})", period, mult)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointState {
    Valid(f64),
    WarmingUp { have: usize, need: usize },
    /// The formula has no value for this bar (e.g. a zero-range window).
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub indicator_type: IndicatorType,
    pub state: PointState,
}

impl IndicatorPoint {
    pub fn valid(indicator_type: IndicatorType, value: f64) -> Self {
        IndicatorPoint {
            indicator_type,
            state: PointState::Valid(value),
        }
    }

    pub fn warming_up(indicator_type: IndicatorType, have: usize, need: usize) -> Self {
        IndicatorPoint {
            indicator_type,
            state: PointState::WarmingUp { have, need },
        }
    }

    pub fn undefined(indicator_type: IndicatorType) -> Self {
        IndicatorPoint {
            indicator_type,
            state: PointState::Undefined,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.state, PointState::Valid(_))
    }

    /// The value, or the reason there is none.
    pub fn value(&self) -> Result<f64, StrategyError> {
        match self.state {
            PointState::Valid(v) => Ok(v),
            PointState::WarmingUp { have, need } => Err(StrategyError::InsufficientHistory {
                indicator: self.indicator_type,
                have,
                need,
            }),
            PointState::Undefined => Err(StrategyError::IndicatorUndefined {
                indicator: self.indicator_type,
            }),
        }
    }
}

/// Direction derived from close vs. the supertrend line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub williams_r: IndicatorPoint,
    pub wma: IndicatorPoint,
    pub atr: IndicatorPoint,
    pub supertrend: IndicatorPoint,
    /// Supertrend value on the previous bar, once two values exist.
    pub prev_supertrend: Option<f64>,
    pub prev_close: Option<f64>,
}

impl IndicatorSnapshot {
    /// Up iff the current close is strictly above the supertrend value.
    pub fn trend(&self) -> Result<Trend, StrategyError> {
        let st = self.supertrend.value()?;
        Ok(if self.close > st { Trend::Up } else { Trend::Down })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorParams {
    pub williams_period: usize,
    pub wma_period: usize,
    pub atr_period: usize,
    pub supertrend_multiplier: f64,
}

/// Owns every rolling buffer for one strategy instance.
///
/// `update` must be called exactly once per bar, in timestamp order. Calling
/// it twice for the same bar silently corrupts the windows.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    williams_r: WilliamsR,
    wma: Wma,
    atr: Atr,
    supertrend: Supertrend,
    prev_close: Option<f64>,
    bars_seen: usize,
}

impl IndicatorEngine {
    pub fn new(params: &IndicatorParams) -> Self {
        IndicatorEngine {
            williams_r: WilliamsR::new(params.williams_period),
            wma: Wma::new(params.wma_period),
            atr: Atr::new(params.atr_period),
            supertrend: Supertrend::new(params.atr_period, params.supertrend_multiplier),
            prev_close: None,
            bars_seen: 0,
        }
    }

    pub fn bars_seen(&self) -> usize {
        self.bars_seen
    }

    pub fn update(&mut self, bar: &Bar) -> IndicatorSnapshot {
        let williams_r = self.williams_r.update(bar);
        let wma = self.wma.update(bar.close);
        let atr = self.atr.update(bar);
        let prev_supertrend = self.supertrend.current();
        let supertrend = self.supertrend.update(bar, &atr);

        let snapshot = IndicatorSnapshot {
            close: bar.close,
            williams_r,
            wma,
            atr,
            supertrend,
            prev_supertrend,
            prev_close: self.prev_close,
        };

        self.prev_close = Some(bar.close);
        self.bars_seen += 1;
        snapshot
    }
}

//! Entry/exit rule policy.
//!
//! One policy value, selected by configuration, replaces the per-script
//! strategy classes: an [`EntryRule`] plus an optional renko-colour exit.
//! The policy holds no mutable state; everything it reads comes from the
//! indicator snapshot, the bar and the position.

use crate::domain::bar::Bar;
use crate::domain::error::StrategyError;
use crate::domain::indicator::IndicatorSnapshot;
use crate::domain::order::{Intent, Side};
use crate::domain::position::PositionState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryRule {
    /// Williams %R momentum: long above `overbought`, short below `oversold`.
    MomentumThreshold {
        overbought: f64,
        oversold: f64,
        /// Require close above (long) / below (short) the WMA.
        wma_filter: bool,
        /// Require a green bar for longs and a red bar for shorts.
        bar_color_confirmation: bool,
    },
    /// Supertrend: enter with the line, exit on the opposite cross.
    TrendFollowing,
}

/// Per-bar gating decided outside the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatingState {
    pub entries_allowed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulePolicy {
    pub entry: EntryRule,
    /// Exit a long on a red brick and a short on a green brick.
    pub renko_color_exit: bool,
}

impl RulePolicy {
    /// Decide the intent for this bar.
    ///
    /// Exits are evaluated before entries. Indicator warm-up surfaces as a
    /// transient error that the caller treats as "no decision".
    pub fn evaluate(
        &self,
        snapshot: &IndicatorSnapshot,
        bar: &Bar,
        position: &PositionState,
        gating: GatingState,
    ) -> Result<Option<Intent>, StrategyError> {
        if let Some(side) = position.open_side() {
            if let Some(exit) = self.exit_signal(side, snapshot, bar)? {
                return Ok(Some(exit));
            }
        }

        if !gating.entries_allowed {
            return Ok(None);
        }

        match self.entry {
            EntryRule::MomentumThreshold {
                overbought,
                oversold,
                wma_filter,
                bar_color_confirmation,
            } => {
                let williams_r = snapshot.williams_r.value()?;
                let (above_wma, below_wma) = if wma_filter {
                    let wma = snapshot.wma.value()?;
                    (bar.close > wma, bar.close < wma)
                } else {
                    (true, true)
                };
                let (green, red) = if bar_color_confirmation {
                    (bar.is_bullish(), bar.is_bearish())
                } else {
                    (true, true)
                };

                if williams_r > overbought && !position.is_long() && above_wma && green {
                    Ok(Some(Intent::EnterLong))
                } else if williams_r < oversold && !position.is_short() && below_wma && red {
                    Ok(Some(Intent::EnterShort))
                } else {
                    Ok(None)
                }
            }
            EntryRule::TrendFollowing => {
                if !position.is_flat() {
                    return Ok(None);
                }
                let Some((prev_close, prev_st, st)) = supertrend_pair(snapshot)? else {
                    return Ok(None);
                };
                if prev_close > prev_st && bar.close > st {
                    Ok(Some(Intent::EnterLong))
                } else if prev_close < prev_st && bar.close < st {
                    Ok(Some(Intent::EnterShort))
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn exit_signal(
        &self,
        side: Side,
        snapshot: &IndicatorSnapshot,
        bar: &Bar,
    ) -> Result<Option<Intent>, StrategyError> {
        if self.renko_color_exit {
            match side {
                Side::Long if bar.is_bearish() => return Ok(Some(Intent::ExitLong)),
                Side::Short if bar.is_bullish() => return Ok(Some(Intent::ExitShort)),
                _ => {}
            }
        }

        if self.entry == EntryRule::TrendFollowing {
            let Some((prev_close, prev_st, st)) = supertrend_pair(snapshot)? else {
                return Ok(None);
            };
            match side {
                Side::Long if prev_close > prev_st && bar.close < st => {
                    return Ok(Some(Intent::ExitLong));
                }
                Side::Short if prev_close < prev_st && bar.close > st => {
                    return Ok(Some(Intent::ExitShort));
                }
                _ => {}
            }
        }

        Ok(None)
    }
}

/// (previous close, previous supertrend, current supertrend), once the line
/// has two values.
fn supertrend_pair(snapshot: &IndicatorSnapshot) -> Result<Option<(f64, f64, f64)>, StrategyError> {
    let st = snapshot.supertrend.value()?;
    Ok(match (snapshot.prev_close, snapshot.prev_supertrend) {
        (Some(prev_close), Some(prev_st)) => Some((prev_close, prev_st, st)),
        _ => None,
    })
}

//! Average True Range with Wilder smoothing.
//!
//! TR[0] = high - low, TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|).
//! Seed is the simple mean of the first n true ranges, then
//! ATR[i] = (ATR[i-1] * (n-1) + TR[i]) / n.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorType};

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    prev_close: Option<f64>,
    seed_sum: f64,
    count: usize,
    value: Option<f64>,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Atr {
            period,
            prev_close: None,
            seed_sum: 0.0,
            count: 0,
            value: None,
        }
    }

    pub fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Atr(self.period)
    }

    pub fn update(&mut self, bar: &Bar) -> IndicatorPoint {
        let tr = match self.prev_close {
            Some(prev) => bar.true_range(prev),
            None => bar.high - bar.low,
        };
        self.prev_close = Some(bar.close);
        self.count += 1;

        if self.period == 0 {
            return IndicatorPoint::warming_up(self.indicator_type(), 0, 0);
        }

        let atr = match self.value {
            Some(prev_atr) => (prev_atr * (self.period - 1) as f64 + tr) / self.period as f64,
            None => {
                self.seed_sum += tr;
                if self.count < self.period {
                    return IndicatorPoint::warming_up(self.indicator_type(), self.count, self.period);
                }
                self.seed_sum / self.period as f64
            }
        };

        self.value = Some(atr);
        IndicatorPoint::valid(self.indicator_type(), atr)
    }
}

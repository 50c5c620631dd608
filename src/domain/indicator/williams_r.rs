//! Williams %R.
//!
//! %R = -100 * (HH(n) - C) / (HH(n) - LL(n))
//! Warmup: first (n-1) bars are invalid. A window whose highest high equals
//! its lowest low has no value and is reported as undefined.

use std::collections::VecDeque;

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorType};

#[derive(Debug, Clone)]
pub struct WilliamsR {
    period: usize,
    highs: VecDeque<f64>,
    lows: VecDeque<f64>,
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        WilliamsR {
            period,
            highs: VecDeque::with_capacity(period),
            lows: VecDeque::with_capacity(period),
        }
    }

    pub fn indicator_type(&self) -> IndicatorType {
        IndicatorType::WilliamsR(self.period)
    }

    pub fn update(&mut self, bar: &Bar) -> IndicatorPoint {
        if self.period == 0 {
            return IndicatorPoint::warming_up(self.indicator_type(), 0, 0);
        }

        if self.highs.len() == self.period {
            self.highs.pop_front();
            self.lows.pop_front();
        }
        self.highs.push_back(bar.high);
        self.lows.push_back(bar.low);

        if self.highs.len() < self.period {
            return IndicatorPoint::warming_up(self.indicator_type(), self.highs.len(), self.period);
        }

        let highest = self.highs.iter().copied().fold(f64::MIN, f64::max);
        let lowest = self.lows.iter().copied().fold(f64::MAX, f64::min);
        let range = highest - lowest;

        if range == 0.0 {
            return IndicatorPoint::undefined(self.indicator_type());
        }

        IndicatorPoint::valid(self.indicator_type(), -100.0 * (highest - bar.close) / range)
    }
}

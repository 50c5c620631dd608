//! Weighted Moving Average indicator.
//!
//! O(1) sliding update using the Diophantine technique.
//! WMA(n) = (1*P[i-n+1] + 2*P[i-n+2] + ... + n*P[i]) / (n*(n+1)/2)
//! Warmup: first (n-1) bars are invalid.

use std::collections::VecDeque;

use crate::domain::indicator::{IndicatorPoint, IndicatorType};

#[derive(Debug, Clone)]
pub struct Wma {
    period: usize,
    window: VecDeque<f64>,
    weighted_sum: f64,
    window_sum: f64,
}

impl Wma {
    pub fn new(period: usize) -> Self {
        Wma {
            period,
            window: VecDeque::with_capacity(period),
            weighted_sum: 0.0,
            window_sum: 0.0,
        }
    }

    pub fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Wma(self.period)
    }

    pub fn update(&mut self, close: f64) -> IndicatorPoint {
        if self.period == 0 {
            return IndicatorPoint::warming_up(self.indicator_type(), 0, 0);
        }

        if self.window.len() < self.period {
            let weight = (self.window.len() + 1) as f64;
            self.weighted_sum += weight * close;
            self.window_sum += close;
        } else {
            let dropped = self.window.pop_front().unwrap_or(0.0);
            self.weighted_sum += self.period as f64 * close - self.window_sum;
            self.window_sum += close - dropped;
        }
        self.window.push_back(close);

        if self.window.len() < self.period {
            return IndicatorPoint::warming_up(self.indicator_type(), self.window.len(), self.period);
        }

        let divisor = (self.period * (self.period + 1)) as f64 / 2.0;
        IndicatorPoint::valid(self.indicator_type(), self.weighted_sum / divisor)
    }
}

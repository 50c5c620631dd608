//! Supertrend band.
//!
//! basic upper/lower = (H+L)/2 ± multiplier * ATR(n).
//! The line ratchets off its previous value using the previous close:
//! - prev close above prev value: max(basic lower, prev value)
//! - prev close below prev value: min(basic upper, prev value)
//! - prev close equal to prev value: prev value is held
//!
//! The result is then clamped into [basic lower, basic upper] so the line
//! never leaves the current bar's band. The first value is the basic lower
//! band. Lookback: same as the ATR.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorType, PointState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub upper: f64,
    pub lower: f64,
}

#[derive(Debug, Clone)]
pub struct Supertrend {
    period: usize,
    multiplier: f64,
    value: Option<f64>,
    bands: Option<Bands>,
    prev_close: Option<f64>,
}

impl Supertrend {
    pub fn new(period: usize, multiplier: f64) -> Self {
        Supertrend {
            period,
            multiplier,
            value: None,
            bands: None,
            prev_close: None,
        }
    }

    pub fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Supertrend {
            period: self.period,
            multiplier_x100: (self.multiplier * 100.0).round() as u32,
        }
    }

    /// Most recent supertrend value, if any.
    pub fn current(&self) -> Option<f64> {
        self.value
    }

    /// Basic bands of the most recent valid bar.
    pub fn bands(&self) -> Option<Bands> {
        self.bands
    }

    /// Advance by one bar. `atr` must be the ATR(period) point for the same bar.
    pub fn update(&mut self, bar: &Bar, atr: &IndicatorPoint) -> IndicatorPoint {
        let prev_close = self.prev_close.replace(bar.close);

        let atr = match atr.state {
            PointState::Valid(v) => v,
            PointState::WarmingUp { have, need } => {
                return IndicatorPoint::warming_up(self.indicator_type(), have, need);
            }
            PointState::Undefined => return IndicatorPoint::undefined(self.indicator_type()),
        };

        let mid = bar.midpoint();
        let bands = Bands {
            upper: mid + self.multiplier * atr,
            lower: mid - self.multiplier * atr,
        };

        let ratcheted = match (self.value, prev_close) {
            (Some(prev), Some(pc)) if pc > prev => bands.lower.max(prev),
            (Some(prev), Some(pc)) if pc < prev => bands.upper.min(prev),
            (Some(prev), _) => prev,
            (None, _) => bands.lower,
        };
        let value = ratcheted.max(bands.lower).min(bands.upper);

        self.value = Some(value);
        self.bands = Some(bands);
        IndicatorPoint::valid(self.indicator_type(), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::Atr;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn make_bar(i: usize, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                + chrono::Duration::minutes(i as i64),
            open: close,
            high,
            low,
            close,
            tick_size: 0.25,
        }
    }

    fn step(st: &mut Supertrend, atr: &mut Atr, bar: &Bar) -> IndicatorPoint {
        let a = atr.update(bar);
        st.update(bar, &a)
    }

    #[test]
    fn supertrend_warms_up_with_atr() {
        let mut st = Supertrend::new(3, 1.5);
        let mut atr = Atr::new(3);
        let p0 = step(&mut st, &mut atr, &make_bar(0, 11.0, 9.0, 10.0));
        let p1 = step(&mut st, &mut atr, &make_bar(1, 11.0, 9.0, 10.0));
        let p2 = step(&mut st, &mut atr, &make_bar(2, 11.0, 9.0, 10.0));

        assert_eq!(p0.state, PointState::WarmingUp { have: 1, need: 3 });
        assert_eq!(p1.state, PointState::WarmingUp { have: 2, need: 3 });
        assert!(p2.is_valid());
        assert!(st.current().is_some());
    }

    #[test]
    fn supertrend_seeds_on_lower_band() {
        let mut st = Supertrend::new(1, 2.0);
        let mut atr = Atr::new(1);
        // TR = 2, mid = 10 → lower = 6
        let p = step(&mut st, &mut atr, &make_bar(0, 11.0, 9.0, 10.0));
        assert_relative_eq!(p.value().unwrap(), 6.0);
    }

    #[test]
    fn supertrend_ratchets_up_in_uptrend() {
        let mut st = Supertrend::new(1, 1.0);
        let mut atr = Atr::new(1);
        step(&mut st, &mut atr, &make_bar(0, 11.0, 9.0, 10.0)); // value 8
        // prev close 10 > 8 → max(lower, 8); bar TR=max(2,|13-10|,|11-10|)=3, mid 12, lower 9
        let p = step(&mut st, &mut atr, &make_bar(1, 13.0, 11.0, 12.0));
        assert_relative_eq!(p.value().unwrap(), 9.0);
        // prev close 12 > 9; falling bar TR=max(2,|11-12|,|9-12|)=3, mid 10, lower 7 → hold 9
        let p = step(&mut st, &mut atr, &make_bar(2, 11.0, 9.0, 10.0));
        assert_relative_eq!(p.value().unwrap(), 9.0);
    }

    #[test]
    fn supertrend_ratchets_down_in_downtrend() {
        let mut st = Supertrend::new(1, 1.0);
        let mut atr = Atr::new(1);
        step(&mut st, &mut atr, &make_bar(0, 11.0, 9.0, 10.0)); // 8
        // prev close 10 > 8; TR=max(6,|10-10|,|4-10|)=6, mid 7, lower 1, upper 13 → max(1, 8) = 8
        let p = step(&mut st, &mut atr, &make_bar(1, 10.0, 4.0, 5.0));
        assert_relative_eq!(p.value().unwrap(), 8.0);
        // prev close 5 < 8; TR=max(2,|6-5|,|4-5|)=2, mid 5, upper 7 → min(7, 8) = 7
        let p = step(&mut st, &mut atr, &make_bar(2, 6.0, 4.0, 5.0));
        assert_relative_eq!(p.value().unwrap(), 7.0);
    }

    #[test]
    fn supertrend_holds_on_exact_tie() {
        let mut st = Supertrend::new(1, 1.0);
        let mut atr = Atr::new(1);
        // seed: TR 4, mid 10, lower 6
        step(&mut st, &mut atr, &make_bar(0, 12.0, 8.0, 6.0));
        // prev close 6 == value 6 → hold 6; TR=max(4,|12-6|,|8-6|)=6, band [4, 16]
        let p = step(&mut st, &mut atr, &make_bar(1, 12.0, 8.0, 9.0));
        assert_relative_eq!(p.value().unwrap(), 6.0);
    }

    #[test]
    fn supertrend_clamped_into_current_band() {
        let mut st = Supertrend::new(1, 1.0);
        let atr = IndicatorPoint::valid(IndicatorType::Atr(1), 1.0);
        st.update(&make_bar(0, 101.0, 99.0, 100.0), &atr); // 99
        // prev close 100 > 99 → max(51, 99) = 99, but the band tops out at 52 + 1
        let p = st.update(&make_bar(1, 53.0, 51.0, 52.0), &atr);
        let bands = st.bands().unwrap();
        assert_relative_eq!(bands.upper, 53.0);
        assert_relative_eq!(p.value().unwrap(), 53.0);
    }

    #[test]
    fn supertrend_indicator_type() {
        let st = Supertrend::new(10, 1.5);
        assert_eq!(
            st.indicator_type(),
            IndicatorType::Supertrend {
                period: 10,
                multiplier_x100: 150
            }
        );
    }

    proptest! {
        #[test]
        fn supertrend_never_leaves_band(
            bars in prop::collection::vec((10.0f64..500.0, 0.0f64..20.0, 0.0f64..1.0), 1..80),
            period in 1usize..12,
            multiplier in 0.5f64..4.0,
        ) {
            let mut st = Supertrend::new(period, multiplier);
            let mut atr = Atr::new(period);
            for (i, (low, span, frac)) in bars.into_iter().enumerate() {
                let bar = make_bar(i, low + span, low, low + span * frac);
                let point = step(&mut st, &mut atr, &bar);
                if let PointState::Valid(v) = point.state {
                    let bands = st.bands().unwrap();
                    prop_assert!(v >= bands.lower - 1e-9);
                    prop_assert!(v <= bands.upper + 1e-9);
                }
            }
        }
    }
}

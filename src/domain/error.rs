//! Domain error types.
//!
//! Per-bar transient conditions (warm-up, outside the trading window, a
//! daily limit reached) are not errors; they only suppress rule evaluation.
//! The variants here are the failures a host has to see.

use crate::domain::indicator::IndicatorType;

/// Top-level error type for renkotrader.
#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error("insufficient history for {indicator}: have {have} bars, need {need}")]
    InsufficientHistory {
        indicator: IndicatorType,
        have: usize,
        need: usize,
    },

    #[error("{indicator} is undefined over a flat window")]
    IndicatorUndefined { indicator: IndicatorType },

    #[error("invalid trading window {field}: {value:?}")]
    InvalidWindowConfig { field: String, value: String },

    #[error("config value out of range for {field}: {reason}")]
    ConfigOutOfRange { field: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid value for [{section}] {key}: expected {expected}, got {value:?}")]
    ConfigValue {
        section: String,
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("fill does not match tracked position: {reason}")]
    DesynchronizedFill { reason: String },

    #[error("bar data error: {reason}")]
    BarData { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StrategyError {
    pub(crate) fn out_of_range(field: &str, reason: impl Into<String>) -> Self {
        StrategyError::ConfigOutOfRange {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn desync(reason: impl Into<String>) -> Self {
        StrategyError::DesynchronizedFill {
            reason: reason.into(),
        }
    }

    /// True for the warm-up and flat-window conditions a caller should treat
    /// as "skip this bar" rather than a failure.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StrategyError::InsufficientHistory { .. } | StrategyError::IndicatorUndefined { .. }
        )
    }
}

impl From<&StrategyError> for std::process::ExitCode {
    fn from(err: &StrategyError) -> Self {
        let code: u8 = match err {
            StrategyError::Io(_) => 1,
            StrategyError::InvalidWindowConfig { .. }
            | StrategyError::ConfigOutOfRange { .. }
            | StrategyError::ConfigParse { .. }
            | StrategyError::ConfigValue { .. }
            | StrategyError::ConfigMissing { .. } => 2,
            StrategyError::BarData { .. } => 3,
            StrategyError::DesynchronizedFill { .. } => 4,
            StrategyError::InsufficientHistory { .. } | StrategyError::IndicatorUndefined { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_names_field() {
        let err = StrategyError::out_of_range("williams_period", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "config value out of range for williams_period: must be at least 1"
        );
    }

    #[test]
    fn bad_config_value_names_key() {
        let err = StrategyError::ConfigValue {
            section: "orders".into(),
            key: "quantity".into(),
            value: "abc".into(),
            expected: "an integer",
        };
        assert_eq!(
            err.to_string(),
            "invalid value for [orders] quantity: expected an integer, got \"abc\""
        );
        assert_eq!(
            format!("{:?}", std::process::ExitCode::from(&err)),
            format!("{:?}", std::process::ExitCode::from(2))
        );
    }

    #[test]
    fn insufficient_history_message() {
        let err = StrategyError::InsufficientHistory {
            indicator: IndicatorType::Wma(100),
            have: 12,
            need: 100,
        };
        assert_eq!(
            err.to_string(),
            "insufficient history for WMA(100): have 12 bars, need 100"
        );
    }

    #[test]
    fn transient_classification() {
        assert!(
            StrategyError::InsufficientHistory {
                indicator: IndicatorType::Atr(10),
                have: 1,
                need: 10
            }
            .is_transient()
        );
        assert!(
            StrategyError::IndicatorUndefined {
                indicator: IndicatorType::WilliamsR(14)
            }
            .is_transient()
        );
        assert!(!StrategyError::desync("no open position").is_transient());
    }

    #[test]
    fn exit_codes_by_family() {
        use std::process::ExitCode;
        let desync = StrategyError::desync("x");
        let window = StrategyError::InvalidWindowConfig {
            field: "start".into(),
            value: "25:00".into(),
        };
        assert_eq!(
            format!("{:?}", ExitCode::from(&desync)),
            format!("{:?}", ExitCode::from(4))
        );
        assert_eq!(
            format!("{:?}", ExitCode::from(&window)),
            format!("{:?}", ExitCode::from(2))
        );
    }
}

//! Configuration access port.
//!
//! Typed lookups by `[section] key`. `Ok(None)` means the key is absent; a
//! present value that does not parse as the requested type is a
//! [`StrategyError::ConfigValue`] naming the key.

use crate::domain::error::StrategyError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, StrategyError>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, StrategyError>;
    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, StrategyError>;
}

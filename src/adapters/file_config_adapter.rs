//! INI file configuration adapter.

use crate::domain::error::StrategyError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::fs;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StrategyError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::parse(content, &path.display().to_string())
    }

    pub fn from_string(content: &str) -> Result<Self, StrategyError> {
        Self::parse(content.to_string(), "<string>")
    }

    fn parse(content: String, file: &str) -> Result<Self, StrategyError> {
        let mut config = Ini::new();
        config
            .read(content)
            .map_err(|reason| StrategyError::ConfigParse {
                file: file.to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }

    fn invalid(&self, section: &str, key: &str, expected: &'static str) -> StrategyError {
        StrategyError::ConfigValue {
            section: section.to_string(),
            key: key.to_string(),
            value: self.config.get(section, key).unwrap_or_default(),
            expected,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, StrategyError> {
        self.config
            .getint(section, key)
            .map_err(|_| self.invalid(section, key, "an integer"))
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, StrategyError> {
        self.config
            .getfloat(section, key)
            .map_err(|_| self.invalid(section, key, "a number"))
    }

    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, StrategyError> {
        match self.config.get(section, key) {
            None => Ok(None),
            Some(raw) => Self::parse_bool(&raw)
                .map(Some)
                .ok_or_else(|| self.invalid(section, key, "a boolean")),
        }
    }
}

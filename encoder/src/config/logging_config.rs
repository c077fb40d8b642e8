use crate::error::Result;
use logging::{LogLevel, Logger};
use serde::Deserialize;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_file_path: String,
    pub log_level: String,
    pub enable_console: bool,
    pub enable_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_file_path: "stream-encoder.log".to_string(),
            log_level: "info".to_string(),
            enable_console: true,
            enable_file: true,
        }
    }
}

impl LoggingConfig {
    /// Level from `log_level`, `Info` when unrecognised.
    pub fn level(&self) -> LogLevel {
        LogLevel::parse_or(&self.log_level, LogLevel::Info)
    }

    /// Builds the root logger for `component`.
    ///
    /// With `enable_file` off the logger writes to stderr only, whatever
    /// `enable_console` says.
    pub fn create_logger(&self, component: &str) -> Result<Logger> {
        if !self.enable_file {
            return Ok(Logger::console(self.level()).for_component(component));
        }

        let logger = Logger::with_component(
            self.log_file_path.clone().into(),
            self.level(),
            Some(component.to_string()),
            self.enable_console,
        )?;
        Ok(logger)
    }
}

//! Internal log message structure.

use crate::log_level::LogLevel;
use chrono::Local;

/// Internal representation of a log message.
#[derive(Debug, Clone)]
pub(crate) struct LogMessage {
    pub timestamp: String,
    pub level: LogLevel,
    pub context: Option<String>,
    pub message: String,
}

impl LogMessage {
    /// Creates a new log message stamped with the local time.
    pub fn new(level: LogLevel, context: Option<String>, message: String) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            level,
            context,
            message,
        }
    }

    /// Formats the line: `[timestamp] LEVEL [context]: message\n`
    pub fn format(&self) -> String {
        match self.context {
            Some(ref context) => format!(
                "[{}] {} [{}]: {}\n",
                self.timestamp,
                self.level.as_str(),
                context,
                self.message
            ),
            None => format!(
                "[{}] {}: {}\n",
                self.timestamp,
                self.level.as_str(),
                self.message
            ),
        }
    }
}

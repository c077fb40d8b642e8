//! Thread-safe asynchronous logger implementation.
//!
//! [`Logger`] is cheap to clone. Every clone and every component logger
//! derived from it feeds the same writer thread.

use crate::error::Result;
use crate::log_level::LogLevel;
use crate::log_message::LogMessage;
use crate::log_writer::{WriterCommand, spawn_writer_thread};
use std::path::PathBuf;
use std::sync::mpsc::{Sender, channel};
use std::time::Duration;

/// Thread-safe, non-blocking logger.
///
/// # Examples
///
/// ```no_run
/// use logging::{LogLevel, Logger};
///
/// let logger = Logger::new("encoder.log".into(), LogLevel::Info).unwrap();
/// let pump = logger.for_component("pump").with_field("codec", "libx265");
/// pump.info("session opened");
/// ```
#[derive(Clone)]
pub struct Logger {
    sender: Option<Sender<WriterCommand>>,
    level: LogLevel,
    component: Option<String>,
    fields: Vec<(String, String)>,
    console_output: bool,
}

impl Logger {
    /// Creates a file logger with a dedicated writer thread.
    ///
    /// # Errors
    ///
    /// Returns error if the log file cannot be created or opened.
    pub fn new(log_path: PathBuf, level: LogLevel) -> Result<Self> {
        Self::with_component(log_path, level, None, false)
    }

    /// Creates a file logger tagged with a component name, optionally
    /// echoing every line to stderr.
    ///
    /// # Errors
    ///
    /// Returns error if the log file cannot be created or opened.
    pub fn with_component(
        log_path: PathBuf,
        level: LogLevel,
        component: Option<String>,
        console_output: bool,
    ) -> Result<Self> {
        let (sender, receiver) = channel();
        spawn_writer_thread(&log_path, receiver)?;
        Ok(Logger {
            sender: Some(sender),
            level,
            component,
            fields: Vec::new(),
            console_output,
        })
    }

    /// Creates a logger that only writes to stderr.
    pub fn console(level: LogLevel) -> Self {
        Logger {
            sender: None,
            level,
            component: None,
            fields: Vec::new(),
            console_output: true,
        }
    }

    /// Returns a logger for another component sharing this writer.
    ///
    /// Context fields are not inherited.
    pub fn for_component(&self, component: &str) -> Self {
        Logger {
            sender: self.sender.clone(),
            level: self.level,
            component: Some(component.to_string()),
            fields: Vec::new(),
            console_output: self.console_output,
        }
    }

    /// Returns a copy that prefixes every line with `key=value`.
    pub fn with_field(&self, key: &str, value: impl ToString) -> Self {
        let mut logger = self.clone();
        logger.fields.push((key.to_string(), value.to_string()));
        logger
    }

    /// Minimum level this logger records.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Returns true if a message at `level` would be recorded.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// Blocks until every message sent before this call is on disk, or
    /// `timeout` passes. Returns false on timeout or a dead writer.
    ///
    /// Call before `process::exit`: the writer thread is detached and dies
    /// with the process.
    pub fn flush(&self, timeout: Duration) -> bool {
        let Some(ref sender) = self.sender else {
            return true;
        };
        let (ack, done) = channel();
        if sender.send(WriterCommand::Flush(ack)).is_err() {
            return false;
        }
        done.recv_timeout(timeout).is_ok()
    }

    fn context(&self) -> Option<String> {
        if self.component.is_none() && self.fields.is_empty() {
            return None;
        }

        let mut parts: Vec<String> = Vec::with_capacity(self.fields.len() + 1);
        if let Some(ref component) = self.component {
            parts.push(component.clone());
        }
        parts.extend(self.fields.iter().map(|(k, v)| format!("{}={}", k, v)));
        Some(parts.join(" "))
    }

    fn log(&self, level: LogLevel, message: &str) {
        if !self.enabled(level) {
            return;
        }

        let msg = LogMessage::new(level, self.context(), message.to_string());

        // stderr, stdout may be carrying the bitstream
        if self.console_output {
            eprint!("{}", msg.format());
        }

        if let Some(ref sender) = self.sender {
            let _ = sender.send(WriterCommand::Write(msg));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use tempfile::tempdir;

    fn wait_for_write() {
        thread::sleep(Duration::from_millis(50));
    }

    #[test]
    fn test_logger_creates_file() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");

        let logger = Logger::new(log_path.clone(), LogLevel::Debug).unwrap();
        logger.info("session opened");
        wait_for_write();

        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("session opened"));
    }

    #[test]
    fn test_logger_respects_level() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");

        let logger = Logger::new(log_path.clone(), LogLevel::Warn).unwrap();
        logger.debug("packet drained");
        logger.info("frame submitted");
        logger.warn("frame skipped");
        wait_for_write();

        let content = fs::read_to_string(log_path).unwrap();
        assert!(!content.contains("packet drained"));
        assert!(!content.contains("frame submitted"));
        assert!(content.contains("frame skipped"));
    }

    #[test]
    fn test_component_shares_writer() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");

        let main = Logger::new(log_path.clone(), LogLevel::Info).unwrap();
        let pump = main.for_component("pump");

        main.info("from main");
        pump.info("from pump");
        wait_for_write();

        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("INFO: from main"));
        assert!(content.contains("INFO [pump]: from pump"));
    }

    #[test]
    fn test_fields_prefix_lines() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");

        let logger = Logger::new(log_path.clone(), LogLevel::Info)
            .unwrap()
            .for_component("pump")
            .with_field("codec", "libx265")
            .with_field("lag", 4);
        logger.info("configured");
        wait_for_write();

        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("[pump codec=libx265 lag=4]: configured"));
    }

    #[test]
    fn test_logger_clone_across_threads() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");

        let logger = Logger::new(log_path.clone(), LogLevel::Info).unwrap();
        let logger_clone = logger.clone();

        thread::spawn(move || {
            logger_clone.info("Message from thread");
        })
        .join()
        .unwrap();

        logger.info("Message from main");
        wait_for_write();

        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Message from thread"));
        assert!(content.contains("Message from main"));
    }

    #[test]
    fn test_flush_waits_for_pending_lines() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");

        let logger = Logger::new(log_path.clone(), LogLevel::Info).unwrap();
        logger.error("Encoding failed: stalled");
        assert!(logger.flush(Duration::from_secs(1)));

        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Encoding failed: stalled"));
    }

    #[test]
    fn test_console_logger_flush_is_immediate() {
        assert!(Logger::console(LogLevel::Info).flush(Duration::ZERO));
    }

    #[test]
    fn test_console_logger_filters() {
        let logger = Logger::console(LogLevel::Error);
        assert!(!logger.enabled(LogLevel::Warn));
        assert!(logger.enabled(LogLevel::Error));
        logger.warn("suppressed");
    }
}

//! Log file writer running on its own thread.

use crate::error::{LoggingError, Result};
use crate::log_message::LogMessage;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::mpsc::{Receiver, Sender};

/// What loggers send to the writer thread.
pub(crate) enum WriterCommand {
    Write(LogMessage),
    /// Flush everything received so far, then acknowledge.
    Flush(Sender<()>),
}

/// Appends formatted messages to a single log file.
pub(crate) struct LogWriter {
    file: BufWriter<File>,
}

impl LogWriter {
    /// Opens or creates the file in append mode.
    pub fn new(log_path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;
        Ok(Self {
            file: BufWriter::new(file),
        })
    }

    fn write_message(&mut self, message: &LogMessage) {
        if let Err(e) = self.file.write_all(message.format().as_bytes()) {
            eprintln!("Error writing log: {}", e);
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.file.flush() {
            eprintln!("Error flushing log: {}", e);
        }
    }

    fn handle(&mut self, command: WriterCommand) {
        match command {
            WriterCommand::Write(message) => self.write_message(&message),
            WriterCommand::Flush(ack) => {
                self.flush();
                let _ = ack.send(());
            }
        }
    }

    /// Drains the channel until every sender is gone.
    ///
    /// The buffer is flushed whenever the channel runs dry, so bursts of
    /// per-frame messages cost one write syscall.
    pub fn run(mut self, receiver: Receiver<WriterCommand>) {
        while let Ok(command) = receiver.recv() {
            self.handle(command);
            for queued in receiver.try_iter() {
                self.handle(queued);
            }
            self.flush();
        }
    }
}

/// Spawns the writer thread for `log_path`.
pub(crate) fn spawn_writer_thread(
    log_path: &Path,
    receiver: Receiver<WriterCommand>,
) -> Result<()> {
    let writer = LogWriter::new(log_path)?;
    std::thread::Builder::new()
        .name("log-writer".to_string())
        .spawn(move || writer.run(receiver))
        .map_err(|e| LoggingError::Logging(format!("Failed to spawn writer thread: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_level::LogLevel;
    use std::fs;
    use std::sync::mpsc::channel;
    use std::thread;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_log_writer_creates_file() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("encoder.log");

        assert!(LogWriter::new(&log_path).is_ok());
        assert!(log_path.exists());
    }

    #[test]
    fn test_log_writer_rejects_missing_directory() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("missing").join("encoder.log");

        assert!(LogWriter::new(&log_path).is_err());
    }

    #[test]
    fn test_spawn_writer_thread_flushes_burst() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("encoder.log");
        let (sender, receiver) = channel();

        spawn_writer_thread(&log_path, receiver).unwrap();

        for frame in 0..10 {
            sender
                .send(WriterCommand::Write(LogMessage::new(
                    LogLevel::Debug,
                    None,
                    format!("frame {}", frame),
                )))
                .unwrap();
        }
        drop(sender);

        thread::sleep(Duration::from_millis(100));

        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("frame 0"));
        assert!(content.contains("frame 9"));
        assert_eq!(content.lines().count(), 10);
    }

    #[test]
    fn test_flush_command_is_acknowledged_after_write() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("encoder.log");
        let (sender, receiver) = channel();
        spawn_writer_thread(&log_path, receiver).unwrap();

        sender
            .send(WriterCommand::Write(LogMessage::new(
                LogLevel::Error,
                None,
                "encoding failed".to_string(),
            )))
            .unwrap();
        let (ack, done) = channel();
        sender.send(WriterCommand::Flush(ack)).unwrap();
        done.recv_timeout(Duration::from_secs(1)).unwrap();

        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("encoding failed"));
    }
}

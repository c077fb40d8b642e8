//! Error types for encoder operations.
//!
//! A busy codec is retried inside the pump and never surfaces here. Every
//! variant below fails the call that returned it, end of stream on drain
//! included (`Session(SessionError::EndOfStream)`).

use crate::session::SessionError;
use std::io;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EncoderError>;

/// Error type for encoder operations
#[derive(Debug, Error)]
pub enum EncoderError {
    /// Invalid or inconsistent configuration
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Codec could not be found, configured or opened
    #[error("Codec error: {0}")]
    Codec(String),

    /// The codec session failed a call or ended its stream
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Neither input nor output made progress
    #[error("Encoder stalled: codec accepts no input and produces no output")]
    Stalled,

    /// The frame was not accepted within the time budget
    #[error("Frame not accepted within {0:?}")]
    Timeout(Duration),

    /// A frame buffer could not be allocated
    #[error("Allocation error: {0}")]
    Allocation(String),

    /// Host frame does not match the configured geometry
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// The pump was already flushed and torn down
    #[error("Encoder already finished")]
    Finished,

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] logging::LoggingError),

    /// Configuration file could not be loaded
    #[error(transparent)]
    ConfigLoad(#[from] config_loader::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config() {
        let err = EncoderError::Config("width must be even".to_string());
        assert_eq!(err.to_string(), "Config error: width must be even");
    }

    #[test]
    fn test_error_display_timeout() {
        let err = EncoderError::Timeout(Duration::from_millis(50));
        assert_eq!(err.to_string(), "Frame not accepted within 50ms");
    }

    #[test]
    fn test_error_from_session() {
        let err: EncoderError = SessionError::Failed("invalid argument".to_string()).into();
        assert!(matches!(err, EncoderError::Session(_)));
        assert!(err.to_string().contains("invalid argument"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "short read");
        let err: EncoderError = io_err.into();
        assert!(matches!(err, EncoderError::Io(_)));
    }
}

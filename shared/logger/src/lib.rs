//! Thread-safe asynchronous logging for the encoder workspace.
//!
//! Messages are filtered by level on the calling thread and handed to a
//! dedicated writer thread, so an encode loop never blocks on file I/O.

pub mod error;
mod log_level;
mod log_message;
mod log_writer;
mod logger;

pub use error::{LoggingError, Result};
pub use log_level::LogLevel;
pub use logger::Logger;

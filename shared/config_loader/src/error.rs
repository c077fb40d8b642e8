use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while locating, reading or decoding a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No file at the given path, or none in the search locations.
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// The file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    ReadError(String),

    /// The content is not valid JSON for the requested type.
    #[error("Invalid configuration in {path}: {reason}")]
    Parse { path: String, reason: String },
}

//! Encoder configuration

pub mod encoder_config;
pub mod logging_config;

pub use encoder_config::{EncoderSettings, PumpConfig, StreamEncoderConfig};
pub use logging_config::LoggingConfig;

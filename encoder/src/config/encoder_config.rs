use crate::bitstream::DiscardRule;
use crate::config::LoggingConfig;
use crate::error::{EncoderError, Result};
use crate::frame::{FrameGeometry, PixelFormat};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Codec session settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// FFmpeg encoder name
    pub codec: String,
    pub width: u32,
    pub height: u32,
    pub pixel_format: String,
    pub fps_num: u32,
    pub fps_den: u32,
    /// Target bitrate in bits per second
    pub bitrate: u64,
    /// GOP size
    pub keyframe_interval: u32,
    /// 0 = one per available core
    pub threads: u32,
    /// Private codec options, passed to the encoder untouched
    pub options: BTreeMap<String, String>,
    pub discard_rule: DiscardRule,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        EncoderSettings {
            codec: "libx265".to_string(),
            width: 1280,
            height: 720,
            pixel_format: "yuv420p".to_string(),
            fps_num: 30,
            fps_den: 1,
            bitrate: 2_500_000,
            keyframe_interval: 60,
            threads: 0,
            options: BTreeMap::new(),
            discard_rule: DiscardRule::Strict,
        }
    }
}

impl EncoderSettings {
    pub fn pixel_format(&self) -> Result<PixelFormat> {
        self.pixel_format.parse()
    }

    pub fn geometry(&self) -> Result<FrameGeometry> {
        Ok(FrameGeometry::new(
            self.width,
            self.height,
            self.pixel_format()?,
        ))
    }

    pub fn validate(&self) -> Result<()> {
        if self.codec.trim().is_empty() {
            return Err(EncoderError::Config("codec name is empty".to_string()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(EncoderError::Config(format!(
                "invalid dimensions {}x{}",
                self.width, self.height
            )));
        }
        if self.fps_num == 0 || self.fps_den == 0 {
            return Err(EncoderError::Config(format!(
                "invalid frame rate {}/{}",
                self.fps_num, self.fps_den
            )));
        }

        let format = self.pixel_format()?;
        let (shift_x, shift_y) = format.chroma_shift();
        if (shift_x > 0 && self.width % 2 != 0) || (shift_y > 0 && self.height % 2 != 0) {
            return Err(EncoderError::Config(format!(
                "{} needs even dimensions, got {}x{}",
                format, self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Encode pump timing
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PumpConfig {
    /// Time budget per frame
    pub budget_ms: u64,
    /// Sleep between retries while the codec is busy
    pub retry_interval_ms: u64,
    /// Free-pool idle window
    pub idle_window_ms: u64,
    /// Maximum drains during the teardown flush
    pub flush_limit: u32,
}

impl Default for PumpConfig {
    fn default() -> Self {
        PumpConfig {
            budget_ms: 50,
            retry_interval_ms: 1,
            idle_window_ms: 1000,
            flush_limit: 1000,
        }
    }
}

impl PumpConfig {
    pub fn budget(&self) -> Duration {
        Duration::from_millis(self.budget_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn idle_window(&self) -> Duration {
        Duration::from_millis(self.idle_window_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.budget_ms == 0 {
            return Err(EncoderError::Config("budget_ms must be > 0".to_string()));
        }
        if self.flush_limit == 0 {
            return Err(EncoderError::Config("flush_limit must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Stream encoder configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StreamEncoderConfig {
    pub encoder: EncoderSettings,
    pub pump: PumpConfig,
    pub logging: LoggingConfig,
}

impl StreamEncoderConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: StreamEncoderConfig = config_loader::load_json(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: StreamEncoderConfig = config_loader::parse_json(json, "inline JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.encoder.validate()?;
        self.pump.validate()
    }
}

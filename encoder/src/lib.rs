//! Stream Encoder
//!
//! Control core of a video encoder adapter: feeds raw frames into a codec
//! session, pulls compressed packets out, and captures the stream's
//! parameter sets and SEI from the first packet.
//!
//! - [`bitstream`]: Annex-B scanning and header extraction
//! - [`frame`]: frame buffers and the recycling pool
//! - [`session`]: the codec session contract and its FFmpeg implementation
//! - [`pump`]: the non-blocking submit/drain loop

pub mod bitstream;
pub mod codecs;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod pump;
pub mod session;

pub use error::{EncoderError, Result};

pub use bitstream::{DiscardRule, StreamHeaders, UnitSyntax, extract_units};
pub use config::{EncoderSettings, LoggingConfig, PumpConfig, StreamEncoderConfig};
pub use frame::{FrameBuffer, FrameGeometry, FramePool, HeapFrame, PixelFormat, RawFrame, RawPlane};
pub use pump::EncodePump;
pub use session::{CodecId, CodecSession, EncodedPacket, FfmpegSession, SessionError};

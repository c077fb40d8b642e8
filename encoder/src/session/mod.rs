//! Codec sessions
//!
//! The [`CodecSession`] contract and its FFmpeg implementation.

pub mod ffmpeg;
pub mod packet;
pub mod traits;

pub use ffmpeg::FfmpegSession;
pub use packet::EncodedPacket;
pub use traits::{CodecId, CodecSession, SessionError, SessionResult};

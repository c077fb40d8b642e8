//! Codec session boundary
//!
//! The pump only talks to a codec through [`CodecSession`]. Submit and
//! drain are both non-blocking and may independently report
//! [`SessionError::NotReady`]; the pump is responsible for interleaving
//! them.

use super::packet::EncodedPacket;
use crate::frame::{FrameBuffer, FrameGeometry};
use thiserror::Error;

pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Outcome of a submit, drain or flush that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Try again later. Submit: input queue full. Drain: no output yet.
    #[error("session not ready")]
    NotReady,
    /// The session has been flushed and will not produce more.
    #[error("end of stream")]
    EndOfStream,
    /// Anything else. Fatal for the current call.
    #[error("{0}")]
    Failed(String),
}

/// Codec family, decides how stream headers are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecId {
    H264,
    Hevc,
    /// Any codec whose headers come from the session's extradata
    Other,
}

/// A codec session with a two-phase submit/drain contract.
pub trait CodecSession {
    type Frame: FrameBuffer;

    fn codec_id(&self) -> CodecId;

    /// Encoder name for logs (e.g. "libx265").
    fn codec_name(&self) -> &str;

    fn geometry(&self) -> FrameGeometry;

    /// Frames the session may hold before its first output.
    fn pipeline_depth(&self) -> u64;

    /// True if output lags input and must be flushed at teardown.
    fn delays_output(&self) -> bool;

    /// Out-of-band codec headers, when the session exposes them.
    fn extradata(&self) -> Option<&[u8]>;

    /// Hands a frame to the codec. The caller keeps ownership of the
    /// storage until the matching packet has been drained.
    fn submit(&mut self, frame: &Self::Frame) -> SessionResult<()>;

    /// Moves one compressed packet into `packet`.
    fn drain(&mut self, packet: &mut EncodedPacket) -> SessionResult<()>;

    /// Signals end of input.
    fn flush(&mut self) -> SessionResult<()>;
}

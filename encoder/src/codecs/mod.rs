//! Per-codec header strategies
//!
//! The pump asks its handler once, on the first drained packet, to fill
//! the stream headers. The handler is picked when the pump is built, from
//! the session's codec family.

pub mod extradata;
pub mod h264;
pub mod hevc;

pub use extradata::ExtradataHandler;
pub use h264::AvcHandler;
pub use hevc::HevcHandler;

use crate::bitstream::{DiscardRule, StreamHeaders};
use crate::session::CodecId;

/// Strategy for obtaining codec headers.
pub trait CodecHandler: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Populates `headers` from the first packet of a session.
    ///
    /// `extradata` is the session's out-of-band header blob, if any.
    fn extract_headers(
        &self,
        packet: &[u8],
        extradata: Option<&[u8]>,
        rule: DiscardRule,
        headers: &mut StreamHeaders,
    );
}

/// Handler for `codec`.
pub fn handler_for(codec: CodecId) -> Box<dyn CodecHandler> {
    match codec {
        CodecId::Hevc => Box::new(HevcHandler),
        CodecId::H264 => Box::new(AvcHandler),
        CodecId::Other => Box::new(ExtradataHandler),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_selection() {
        assert_eq!(handler_for(CodecId::Hevc).name(), "hevc");
        assert_eq!(handler_for(CodecId::H264).name(), "h264");
        assert_eq!(handler_for(CodecId::Other).name(), "extradata");
    }
}

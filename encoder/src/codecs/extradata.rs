//! Headers from the session's extradata.

use super::CodecHandler;
use crate::bitstream::{DiscardRule, StreamHeaders};

/// Copies the codec's extradata into the header buffer. No SEI.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtradataHandler;

impl CodecHandler for ExtradataHandler {
    fn name(&self) -> &'static str {
        "extradata"
    }

    fn extract_headers(
        &self,
        _packet: &[u8],
        extradata: Option<&[u8]>,
        _rule: DiscardRule,
        headers: &mut StreamHeaders,
    ) {
        if let Some(bytes) = extradata {
            headers.set_header(bytes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copies_extradata() {
        let mut headers = StreamHeaders::new();
        ExtradataHandler.extract_headers(
            &[0x12],
            Some(&[1, 2, 3][..]),
            DiscardRule::Strict,
            &mut headers,
        );
        assert_eq!(headers.header(), Some(&[1u8, 2, 3][..]));
        assert_eq!(headers.supplemental(), None);
    }

    #[test]
    fn test_without_extradata() {
        let mut headers = StreamHeaders::new();
        ExtradataHandler.extract_headers(&[0x12], None, DiscardRule::Strict, &mut headers);
        assert!(!headers.is_populated());
    }
}

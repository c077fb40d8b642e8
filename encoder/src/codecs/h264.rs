//! H.264 header extraction.

use super::CodecHandler;
use crate::bitstream::{DiscardRule, StreamHeaders, UnitSyntax, extract_units};

/// Splits SPS/PPS and SEI units out of the first packet.
#[derive(Debug, Default, Clone, Copy)]
pub struct AvcHandler;

impl CodecHandler for AvcHandler {
    fn name(&self) -> &'static str {
        "h264"
    }

    fn extract_headers(
        &self,
        packet: &[u8],
        _extradata: Option<&[u8]>,
        rule: DiscardRule,
        headers: &mut StreamHeaders,
    ) {
        *headers = extract_units(packet, UnitSyntax::Avc, rule);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_parameter_sets() {
        let packet = [
            0x00, 0x00, 0x00, 0x01, 0x67, 0x42, 0xC0, // SPS
            0x00, 0x00, 0x00, 0x01, 0x68, 0xCE, 0x3C, // PPS
            0x00, 0x00, 0x00, 0x01, 0x65, 0x88, 0x84, // IDR slice
        ];
        let mut headers = StreamHeaders::new();
        AvcHandler.extract_headers(&packet, None, DiscardRule::Strict, &mut headers);

        assert_eq!(headers.header(), Some(&packet[..14]));
        assert_eq!(headers.supplemental(), None);
    }
}

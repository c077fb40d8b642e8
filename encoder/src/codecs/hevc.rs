//! H.265 header extraction.

use super::CodecHandler;
use crate::bitstream::{DiscardRule, StreamHeaders, UnitSyntax, extract_units};

/// Splits VPS/SPS/PPS and SEI units out of the first packet.
#[derive(Debug, Default, Clone, Copy)]
pub struct HevcHandler;

impl CodecHandler for HevcHandler {
    fn name(&self) -> &'static str {
        "hevc"
    }

    fn extract_headers(
        &self,
        packet: &[u8],
        _extradata: Option<&[u8]>,
        rule: DiscardRule,
        headers: &mut StreamHeaders,
    ) {
        *headers = extract_units(packet, UnitSyntax::Hevc, rule);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignores_extradata() {
        let packet = [
            0x00, 0x00, 0x00, 0x01, 0x42, 0x01, 0x01, // SPS
            0x00, 0x00, 0x00, 0x01, 0x4E, 0x01, 0x05, // prefix SEI
            0x00, 0x00, 0x00, 0x01, 0x26, 0x01, 0xAF, // IDR slice
        ];
        let mut headers = StreamHeaders::new();
        HevcHandler.extract_headers(&packet, Some(&[0xFF][..]), DiscardRule::Strict, &mut headers);

        assert_eq!(headers.header(), Some(&packet[..7]));
        assert_eq!(headers.supplemental(), Some(&packet[7..14]));
    }
}
